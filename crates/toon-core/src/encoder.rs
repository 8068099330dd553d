//! TOON encoder: `serde_json::Value` → Token-Oriented Object Notation.
//!
//! The encoder walks the value tree once and picks the most compact TOON form
//! for every node:
//!
//! - **Indentation**: nested objects are expressed by indentation, no braces
//! - **Inline arrays**: primitive arrays as `key[N]: v1,v2,v3`
//! - **Tabular arrays**: uniform object arrays as `key[N]{f1,f2}:` followed by rows
//! - **Expanded lists**: anything else as `key[N]:` followed by `- item` lines
//! - **Context-dependent quoting**: strings are quoted only when they would be
//!   misread by the decoder in their position
//! - **Number normalization**: no exponents, no trailing zeros, `-0` → `0`
//!
//! Output never ends with a newline and never carries trailing spaces.
//!
//! # Example
//! ```
//! use serde_json::json;
//! let toon = toon_core::encode(&json!({"name": "Alice", "tags": ["rust", "wasm"]})).unwrap();
//! assert_eq!(toon, "name: Alice\ntags[2]: rust,wasm");
//! ```

use serde_json::{Map, Number, Value};

use crate::error::{Result, ToonError};
use crate::options::{Delimiter, EncodeOptions, MAX_DEPTH};
use crate::scalar::{is_identifier_key, looks_numeric, push_quoted};

/// Encode a JSON value into TOON with default options.
pub fn encode(value: &Value) -> Result<String> {
    encode_with(value, &EncodeOptions::default())
}

/// Encode a JSON value into TOON.
///
/// Fails with [`ToonError::Unencodable`] if the value nests deeper than
/// [`MAX_DEPTH`] or holds a number without a finite decimal form, and with
/// [`ToonError::InvalidOptions`] for a zero indent.
pub fn encode_with(value: &Value, options: &EncodeOptions) -> Result<String> {
    options.validate()?;
    let mut writer = Writer {
        options,
        out: String::new(),
    };
    writer.root(value)?;
    Ok(writer.out)
}

/// Parse JSON text and encode it into TOON with default options.
pub fn encode_json(json: &str) -> Result<String> {
    encode_json_with(json, &EncodeOptions::default())
}

/// Parse JSON text and encode it into TOON.
pub fn encode_json_with(json: &str, options: &EncodeOptions) -> Result<String> {
    encode_with(&parse_json(json)?, options)
}

/// Parse JSON text into a value, classifying failures for the encoder.
///
/// JSON text carrying non-finite numbers (`NaN`, `Infinity`, `-Infinity`, or a
/// literal that overflows `f64`) is reported as [`ToonError::Unencodable`]:
/// the text is well-formed apart from holding a value outside the JSON number
/// domain. Anything else that fails to parse is [`ToonError::Json`].
pub fn parse_json(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|err| classify_json_error(json, err))
}

fn classify_json_error(json: &str, err: serde_json::Error) -> ToonError {
    let (line, column) = (err.line(), err.column());
    if err.to_string().starts_with("number out of range") {
        return ToonError::Unencodable(format!(
            "number at line {line}, column {column} is not finite"
        ));
    }
    if let Some(literal) = non_finite_literal_at(json, line, column) {
        return ToonError::Unencodable(format!(
            "non-finite number {literal} at line {line}, column {column}"
        ));
    }
    ToonError::Json(err)
}

/// Look for a non-finite literal at (or one byte before) the position serde_json
/// stopped at. Positions are 1-based line and byte column.
fn non_finite_literal_at(json: &str, line: usize, column: usize) -> Option<&'static str> {
    const LITERALS: [&str; 5] = ["-Infinity", "Infinity", "-NaN", "NaN", "+Infinity"];
    if line == 0 || column == 0 {
        return None;
    }
    let line_start: usize = json
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let pos = line_start + column - 1;
    for start in [pos.saturating_sub(1), pos] {
        let Some(rest) = json.get(start..) else {
            continue;
        };
        if let Some(literal) = LITERALS.iter().find(|lit| rest.starts_with(**lit)) {
            return Some(*literal);
        }
    }
    None
}

/// Where a primitive is written; decides which characters force quoting.
#[derive(Clone, Copy, PartialEq)]
enum QuoteContext {
    /// Object field value, list item, or bare root primitive: colon is structural.
    Document,
    /// Inline array value or tabular cell: the active delimiter is structural.
    Array(Delimiter),
}

struct Writer<'a> {
    options: &'a EncodeOptions,
    out: String,
}

impl Writer<'_> {
    /// Top-level dispatch: objects emit fields, arrays emit a keyless header,
    /// primitives emit a bare value.
    fn root(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Object(map) => self.fields(map, 0, 1),
            Value::Array(arr) => self.array(arr, 0, 1),
            _ => self.primitive(value, QuoteContext::Document),
        }
    }

    /// Emit all key-value pairs of an object at `depth`, one per line.
    ///
    /// Relies on `serde_json::Map` with `preserve_order` to keep the original
    /// insertion order.
    fn fields(&mut self, map: &Map<String, Value>, depth: usize, nesting: usize) -> Result<()> {
        check_nesting(nesting)?;
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.newline(depth);
            }
            self.field(key, value, depth, nesting)?;
        }
        Ok(())
    }

    /// Emit `key` and its value. The cursor is already positioned at the key.
    /// `depth` is the level the key lives on; bodies go one level deeper.
    fn field(&mut self, key: &str, value: &Value, depth: usize, nesting: usize) -> Result<()> {
        self.key(key);
        match value {
            Value::Object(map) if map.is_empty() => {
                check_nesting(nesting + 1)?;
                self.out.push(':');
            }
            Value::Object(map) => {
                self.out.push(':');
                self.newline(depth + 1);
                self.fields(map, depth + 1, nesting + 1)?;
            }
            Value::Array(arr) => self.array(arr, depth, nesting + 1)?,
            _ => {
                self.out.push_str(": ");
                self.primitive(value, QuoteContext::Document)?;
            }
        }
        Ok(())
    }

    /// Emit an array header and body, selecting the most compact form:
    ///
    /// 1. **Empty**: `[0]:`
    /// 2. **Tabular**: uniform objects with primitive values → `[N]{f1,f2}:` + rows
    /// 3. **Inline**: all primitives → `[N]: v1,v2,v3`
    /// 4. **Expanded list**: everything else → `[N]:` + `- item` lines
    ///
    /// Body lines are written at `depth + 1`.
    fn array(&mut self, arr: &[Value], depth: usize, nesting: usize) -> Result<()> {
        check_nesting(nesting)?;
        let delimiter = self.options.delimiter;
        self.header(arr.len());

        if arr.is_empty() {
            self.out.push(':');
            return Ok(());
        }

        if let Some(fields) = detect_tabular(arr) {
            check_nesting(nesting + 1)?;
            self.out.push('{');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    self.out.push(delimiter.as_char());
                }
                self.key(field);
            }
            self.out.push_str("}:");
            for row in arr {
                self.newline(depth + 1);
                if let Value::Object(map) = row {
                    for (i, cell) in map.values().enumerate() {
                        if i > 0 {
                            self.out.push(delimiter.as_char());
                        }
                        self.primitive(cell, QuoteContext::Array(delimiter))?;
                    }
                }
            }
            return Ok(());
        }

        if all_primitives(arr) {
            self.out.push_str(": ");
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    self.out.push(delimiter.as_char());
                }
                self.primitive(item, QuoteContext::Array(delimiter))?;
            }
            return Ok(());
        }

        self.out.push(':');
        for item in arr {
            self.newline(depth + 1);
            self.list_item(item, depth + 1, nesting)?;
        }
        Ok(())
    }

    /// Emit one expanded list item at `depth`. Objects put their first field on
    /// the hyphen line and the remaining fields one level deeper; an empty object
    /// is a bare `-`.
    fn list_item(&mut self, item: &Value, depth: usize, nesting: usize) -> Result<()> {
        self.out.push('-');
        match item {
            Value::Object(map) if map.is_empty() => check_nesting(nesting + 1),
            Value::Object(map) => {
                check_nesting(nesting + 1)?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i == 0 {
                        self.out.push(' ');
                    } else {
                        self.newline(depth + 1);
                    }
                    self.field(key, value, depth + 1, nesting + 1)?;
                }
                Ok(())
            }
            Value::Array(inner) => {
                self.out.push(' ');
                self.array(inner, depth, nesting + 1)
            }
            _ => {
                self.out.push(' ');
                self.primitive(item, QuoteContext::Document)
            }
        }
    }

    /// `[N]`, with the delimiter marker for tab and pipe.
    fn header(&mut self, len: usize) {
        self.out.push('[');
        self.out.push_str(&len.to_string());
        self.out.push_str(self.options.delimiter.header_marker());
        self.out.push(']');
    }

    fn key(&mut self, key: &str) {
        if is_identifier_key(key) {
            self.out.push_str(key);
        } else {
            push_quoted(key, &mut self.out);
        }
    }

    /// Emit a primitive JSON value (null, bool, number, string).
    fn primitive(&mut self, value: &Value, ctx: QuoteContext) -> Result<()> {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.out.push_str(&format_number(n)?),
            Value::String(s) => {
                if needs_quoting(s, ctx) {
                    push_quoted(s, &mut self.out);
                } else {
                    self.out.push_str(s);
                }
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(ToonError::Unencodable(
                    "container in primitive position".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth * self.options.indent {
            self.out.push(' ');
        }
    }
}

fn check_nesting(nesting: usize) -> Result<()> {
    if nesting > MAX_DEPTH {
        return Err(ToonError::Unencodable(format!(
            "nesting exceeds maximum depth of {MAX_DEPTH}"
        )));
    }
    Ok(())
}

/// Format a JSON number in canonical TOON form:
/// - No scientific notation
/// - Whole floats written as integers (`5.0` → `5`)
/// - Negative zero normalizes to `0`
/// - Shortest decimal that reads back to the same `f64`
fn format_number(n: &Number) -> Result<String> {
    if let Some(i) = n.as_i64() {
        return Ok(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.to_string());
    }
    let f = n
        .as_f64()
        .ok_or_else(|| ToonError::Unencodable(format!("number {n} has no f64 value")))?;
    if !f.is_finite() {
        return Err(ToonError::Unencodable(format!("non-finite number {f}")));
    }
    if f == 0.0 {
        return Ok("0".to_string());
    }
    if f.fract() == 0.0 && f.abs() < (i64::MAX as f64) {
        return Ok((f as i64).to_string());
    }
    // Display for f64 never uses an exponent and prints the shortest round-trip digits.
    Ok(format!("{f}"))
}

/// Determine if a string must be quoted to be read back as the same string.
///
/// A string MUST be quoted if it:
/// - Is empty or has leading/trailing whitespace
/// - Is `true`, `false` or `null`
/// - Looks numeric (including leading-zero forms like `05`)
/// - Contains `"`, `\`, brackets, braces, or a control character
/// - Starts with `-` (list item marker)
/// - Contains the structural character of its context: `:` in document
///   positions, the active delimiter inside arrays
fn needs_quoting(s: &str, ctx: QuoteContext) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    if matches!(s, "true" | "false" | "null") || looks_numeric(s) {
        return true;
    }
    if s.starts_with('-') {
        return true;
    }
    if s
        .chars()
        .any(|c| matches!(c, '"' | '\\' | '[' | ']' | '{' | '}') || c.is_control())
    {
        return true;
    }
    match ctx {
        QuoteContext::Document => s.contains(':'),
        QuoteContext::Array(delimiter) => s.contains(delimiter.as_char()),
    }
}

/// Detect a tabular array: every element is a non-empty object with the same
/// keys in the same order, and every value is a primitive.
fn detect_tabular(arr: &[Value]) -> Option<Vec<&str>> {
    let first = arr.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in arr {
        let obj = item.as_object()?;
        if obj.len() != fields.len() {
            return None;
        }
        for ((key, value), field) in obj.iter().zip(&fields) {
            if key != field || value.is_object() || value.is_array() {
                return None;
            }
        }
    }
    Some(fields)
}

fn all_primitives(arr: &[Value]) -> bool {
    arr.iter().all(|v| !v.is_object() && !v.is_array())
}
