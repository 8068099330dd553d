//! Encoder and decoder configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ToonError};

/// Maximum nesting depth of arrays/objects accepted by both directions.
///
/// Matches serde_json's default recursion limit so any value parsed from JSON
/// text is encodable.
pub const MAX_DEPTH: usize = 128;

/// Separator between inline array values and tabular cells.
///
/// Comma is implicit in array headers (`[3]`); tab and pipe are declared inside
/// the brackets (`[3\t]`, `[3|]`) so the decoder knows which one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Marker written inside an array header's brackets. Empty for comma.
    pub(crate) fn header_marker(self) -> &'static str {
        match self {
            Delimiter::Comma => "",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }

    pub(crate) fn from_marker(c: char) -> Option<Self> {
        match c {
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Delimiter::Comma => "comma",
            Delimiter::Tab => "tab",
            Delimiter::Pipe => "pipe",
        })
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "comma" | "," => Ok(Delimiter::Comma),
            "tab" | "\t" => Ok(Delimiter::Tab),
            "pipe" | "|" => Ok(Delimiter::Pipe),
            other => Err(format!(
                "unknown delimiter '{other}' (expected comma, tab or pipe)"
            )),
        }
    }
}

/// Options controlling TOON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Delimiter for inline arrays and tabular rows.
    pub delimiter: Delimiter,
}

impl EncodeOptions {
    /// Reject settings whose output would not decode to the same value.
    pub fn validate(&self) -> Result<()> {
        check_indent(self.indent)
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            delimiter: Delimiter::Comma,
        }
    }
}

/// Options controlling TOON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Enforce declared array lengths, tabular row widths and exact indentation.
    pub strict: bool,
}

impl DecodeOptions {
    pub fn validate(&self) -> Result<()> {
        check_indent(self.indent)
    }
}

/// Zero-width indentation puts children at their parent's depth.
fn check_indent(indent: usize) -> Result<()> {
    if indent == 0 {
        return Err(ToonError::InvalidOptions(
            "indent must be at least 1 space".to_string(),
        ));
    }
    Ok(())
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            strict: true,
        }
    }
}
