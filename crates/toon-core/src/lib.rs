//! # toon-core
//!
//! Pure-Rust, lossless codec between JSON values and **TOON (Token-Oriented
//! Object Notation)**.
//!
//! TOON is a compact, human-readable serialization format designed to reduce LLM
//! token consumption when processing structured data. It drops braces in favor of
//! indentation, compresses uniform object arrays into tables, and quotes strings
//! only when they would otherwise be ambiguous.
//!
//! The codec is pure: no I/O, no global state. `decode(encode(v)) == v` holds for
//! every JSON value (numbers compare by value), and malformed TOON is reported as
//! a positioned [`ToonError::Syntax`] instead of being guessed at.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use toon_core::{decode, encode};
//!
//! let value = json!({"name": "Alice", "scores": [95, 87, 92]});
//! let toon = encode(&value).unwrap();
//! assert_eq!(toon, "name: Alice\nscores[3]: 95,87,92");
//!
//! assert_eq!(decode(&toon).unwrap(), value);
//! ```
//!
//! ## Modules
//!
//! - [`encoder`]: JSON value → TOON text
//! - [`decoder`]: TOON text → JSON value
//! - [`codec`]: the [`Codec`] trait and the [`Toon`] implementation
//! - [`options`]: indentation, delimiter and strictness settings
//! - [`error`]: error taxonomy

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod options;
mod scalar;

pub use codec::{Codec, Toon};
pub use decoder::{decode, decode_to_json, decode_with};
pub use encoder::{encode, encode_json, encode_json_with, encode_with, parse_json};
pub use error::{ErrorKind, Result, ToonError};
pub use options::{DecodeOptions, Delimiter, EncodeOptions, MAX_DEPTH};
