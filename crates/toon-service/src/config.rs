//! Service configuration: command-line flags with environment fallbacks.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use toon_core::{DecodeOptions, Delimiter, EncodeOptions, Toon};

use crate::error::ServiceError;

pub const DEFAULT_BIND: &str = "0.0.0.0:4000";
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "toon-service",
    version,
    about = "HTTP microservice converting between JSON and TOON"
)]
pub struct ServeConfig {
    /// Address to listen on
    #[arg(long, env = "TOON_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "TOON_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: u64,

    /// Seconds to wait for in-flight requests after a shutdown signal
    #[arg(
        long,
        env = "TOON_SHUTDOWN_TIMEOUT_SECS",
        default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS
    )]
    pub shutdown_timeout_secs: u64,

    /// Spaces per indentation level, for both directions
    #[arg(long, env = "TOON_INDENT", default_value_t = 2)]
    pub indent: usize,

    /// Delimiter for inline arrays and table rows: comma, tab or pipe
    #[arg(long, env = "TOON_DELIMITER", default_value_t = Delimiter::Comma)]
    pub delimiter: Delimiter,

    /// Accept array length and indentation mismatches when decoding
    #[arg(long, env = "TOON_LAX")]
    pub lax: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 4000)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            indent: 2,
            delimiter: Delimiter::Comma,
            lax: false,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.max_body_bytes == 0 {
            return Err(ServiceError::Config(
                "--max-body-bytes must be greater than zero".to_string(),
            ));
        }
        if usize::try_from(self.max_body_bytes).is_err() {
            return Err(ServiceError::Config(
                "--max-body-bytes exceeds platform limits".to_string(),
            ));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(ServiceError::Config(
                "--shutdown-timeout-secs must be greater than zero".to_string(),
            ));
        }
        if self.indent == 0 {
            return Err(ServiceError::Config(
                "--indent must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Body limit as a `usize`; saturates where `validate` would have refused.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_body_bytes).unwrap_or(usize::MAX)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// The codec the routes convert with.
    pub fn codec(&self) -> Toon {
        Toon::new(
            EncodeOptions {
                indent: self.indent,
                delimiter: self.delimiter,
            },
            DecodeOptions {
                indent: self.indent,
                strict: !self.lax,
            },
        )
    }
}
