//! The `Codec` seam between a text grammar and its callers.
//!
//! Callers that only need "JSON value in, text out" (and back) depend on
//! [`Codec`] rather than on the TOON functions directly, so another grammar can
//! be swapped in without touching them.

use serde_json::Value;

use crate::decoder::decode_with;
use crate::encoder::encode_with;
use crate::error::Result;
use crate::options::{DecodeOptions, EncodeOptions};

/// A lossless, stateless JSON ⇄ text codec.
///
/// Implementations must satisfy `decode(encode(v)) == v` for every value they
/// accept, and must be safe to call concurrently.
pub trait Codec: Send + Sync {
    /// Short format name, used in logs.
    fn name(&self) -> &'static str;

    /// MIME type of the encoded text.
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn encode(&self, value: &Value) -> Result<String>;

    fn decode(&self, text: &str) -> Result<Value>;
}

/// The TOON grammar with fixed encoder and decoder options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toon {
    pub encode: EncodeOptions,
    pub decode: DecodeOptions,
}

impl Toon {
    pub fn new(encode: EncodeOptions, decode: DecodeOptions) -> Self {
        Self { encode, decode }
    }
}

impl Codec for Toon {
    fn name(&self) -> &'static str {
        "toon"
    }

    fn encode(&self, value: &Value) -> Result<String> {
        encode_with(value, &self.encode)
    }

    fn decode(&self, text: &str) -> Result<Value> {
        decode_with(text, &self.decode)
    }
}
