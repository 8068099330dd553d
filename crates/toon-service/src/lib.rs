//! # toon-service
//!
//! HTTP microservice converting between JSON and TOON, built on axum.
//!
//! | Method | Path | Body | Success |
//! |---|---|---|---|
//! | GET | `/health` | none | `{"status":"ok","message":"Toon microservice running"}` |
//! | POST | `/convert/json-to-toon` | JSON value | TOON text (`text/plain`) |
//! | POST | `/convert/toon-to-json` | raw TOON, or `{"toon": "..."}` as JSON | JSON value |
//!
//! Empty input and malformed JSON are 400; codec failures are 500 with the
//! error kind, message and (for syntax errors) position. Bodies over the
//! configured limit are 413.
//!
//! The [`v1`] gateway routes under `/api/v1` expose the same conversions (plus
//! Base64 helpers and a richer health check) with `{"status": ...}` envelopes.
//!
//! ```no_run
//! use toon_service::{ServeConfig, Server};
//!
//! # async fn start() -> Result<(), toon_service::ServiceError> {
//! let server = Server::bind(&ServeConfig::default()).await?;
//! println!("listening on {}", server.local_addr());
//! server.run().await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod v1;

pub use config::ServeConfig;
pub use error::{ApiError, ServiceError};
pub use routes::{router, AppState};
pub use server::{shutdown_signal, Server};
