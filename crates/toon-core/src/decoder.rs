//! TOON decoder: Token-Oriented Object Notation → `serde_json::Value`.
//!
//! The decoder first splits the input into non-blank [`Line`]s annotated with
//! their indentation depth, then runs a recursive-descent parser over them.
//! It understands every construct the encoder emits:
//!
//! - Flat and nested objects (indentation-based)
//! - Inline primitive arrays (`key[N]: v1,v2`)
//! - Tabular arrays (`key[N]{f1,f2}:` + rows)
//! - Expanded lists (`key[N]:` + `- item` lines, bare `-` for an empty object)
//! - Tab and pipe delimiters declared in the header (`[N|]`, `[N\t]`)
//! - Quoted/unquoted keys and values with escape sequences
//!
//! # Key design decisions
//!
//! - **No guessing**: anything that does not fit the grammar is a
//!   [`ToonError::Syntax`] carrying the line, column and byte offset of the
//!   offending token (or of the construct it belongs to, which always precedes it).
//! - **Type inference mirrors encoder quoting**: unquoted `true`/`false`/`null`
//!   and strict number literals become JSON scalars; everything else unquoted is
//!   a string. Leading-zero forms such as `05` stay strings.
//! - **Strict mode** (default) enforces declared array lengths, tabular row
//!   widths and indentation that is an exact multiple of the indent size.

use serde_json::{Map, Value};

use crate::error::{Result, ToonError};
use crate::options::{DecodeOptions, Delimiter, MAX_DEPTH};
use crate::scalar::{is_number_literal, parse_number};

/// Decode TOON text into a JSON value with default (strict) options.
pub fn decode(toon: &str) -> Result<Value> {
    decode_with(toon, &DecodeOptions::default())
}

/// Decode TOON text into a JSON value.
///
/// Fails with [`ToonError::InvalidOptions`] for a zero indent.
pub fn decode_with(toon: &str, options: &DecodeOptions) -> Result<Value> {
    options.validate()?;
    let lines = scan_lines(toon, options)?;
    Parser {
        lines,
        pos: 0,
        strict: options.strict,
    }
    .document()
}

/// Decode TOON text and serialize the result as compact JSON text.
pub fn decode_to_json(toon: &str) -> Result<String> {
    let value = decode(toon)?;
    Ok(serde_json::to_string(&value)?)
}

/// One non-blank input line.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 1-based line number.
    number: usize,
    /// Byte offset of the line start in the input.
    offset: usize,
    /// Leading spaces.
    indent: usize,
    depth: usize,
    /// The line without its trailing `\r`.
    raw: &'a str,
    /// The line after indentation.
    content: &'a str,
}

/// Build a syntax error pointing at byte `at` of `line.content`.
fn error_at(line: &Line<'_>, at: usize, message: impl Into<String>) -> ToonError {
    let byte = (line.indent + at).min(line.raw.len());
    let column = line.raw.get(..byte).map_or(byte, |s| s.chars().count()) + 1;
    ToonError::Syntax {
        line: line.number,
        column,
        offset: line.offset + byte,
        message: message.into(),
    }
}

fn scan_lines<'a>(input: &'a str, options: &DecodeOptions) -> Result<Vec<Line<'a>>> {
    let size = options.indent;
    let mut lines = Vec::new();
    let mut offset = 0;
    for (idx, segment) in input.split('\n').enumerate() {
        let line_offset = offset;
        offset += segment.len() + 1;
        let raw = segment.strip_suffix('\r').unwrap_or(segment);
        if raw.trim().is_empty() {
            continue;
        }
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        if options.strict && indent % size != 0 {
            return Err(ToonError::Syntax {
                line: idx + 1,
                column: 1,
                offset: line_offset,
                message: format!("indentation of {indent} spaces is not a multiple of {size}"),
            });
        }
        let line = Line {
            number: idx + 1,
            offset: line_offset,
            indent,
            depth: indent / size,
            raw,
            content: &raw[indent..],
        };
        if line.content.starts_with('\t') {
            return Err(error_at(&line, 0, "tab character in indentation"));
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Parsed array header: `[N<delim>]{fields}:` optionally followed by inline values.
#[derive(Debug)]
struct Header {
    len: usize,
    delimiter: Delimiter,
    fields: Option<Vec<String>>,
    /// Byte index in the line content where inline values start.
    inline: Option<usize>,
    /// Byte index of `[`, for length errors.
    at: usize,
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    strict: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    /// Classify the document as empty, root array, root primitive or object.
    fn document(mut self) -> Result<Value> {
        let Some(first) = self.peek() else {
            return Ok(Value::Object(Map::new()));
        };
        if first.depth != 0 {
            return Err(error_at(&first, 0, "unexpected indentation"));
        }

        let value = if first.content.starts_with('[') {
            self.pos += 1;
            let header = parse_header(&first, 0)?;
            self.array(&first, header, 0, 1)?
        } else if self.lines.len() == 1 && !is_field(first.content) {
            self.pos += 1;
            parse_primitive(&first, 0)?
        } else {
            Value::Object(self.object(0, 1)?)
        };

        if let Some(extra) = self.peek() {
            let message = if extra.depth > 0 {
                "unexpected indentation"
            } else {
                "unexpected content after document root"
            };
            return Err(error_at(&extra, 0, message));
        }
        Ok(value)
    }

    /// Parse consecutive field lines at `depth` into an object.
    fn object(&mut self, depth: usize, nesting: usize) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if map.is_empty() {
                check_nesting(&line, nesting)?;
            }
            if line.depth > depth {
                return Err(error_at(&line, 0, "unexpected indentation"));
            }
            self.pos += 1;
            self.field(&line, 0, depth, nesting, &mut map)?;
        }
        Ok(map)
    }

    /// Parse one `key...` field starting at byte `start` of `line.content`.
    ///
    /// `depth` is the level the key lives on; nested bodies sit at `depth + 1`.
    fn field(
        &mut self,
        line: &Line<'a>,
        start: usize,
        depth: usize,
        nesting: usize,
        map: &mut Map<String, Value>,
    ) -> Result<()> {
        let (key, after) = parse_key(line, start)?;
        let rest = &line.content[after..];

        let value = if rest.starts_with('[') {
            let header = parse_header(line, after)?;
            self.array(line, header, depth, nesting + 1)?
        } else if let Some(tail) = rest.strip_prefix(':') {
            if tail.trim_matches(' ').is_empty() {
                match self.peek() {
                    Some(next) if next.depth > depth => {
                        if next.depth != depth + 1 {
                            return Err(error_at(&next, 0, "unexpected indentation"));
                        }
                        Value::Object(self.object(depth + 1, nesting + 1)?)
                    }
                    _ => {
                        check_nesting(line, nesting + 1)?;
                        Value::Object(Map::new())
                    }
                }
            } else {
                if !tail.starts_with(' ') {
                    return Err(error_at(line, after + 1, "expected a space after ':'"));
                }
                parse_primitive(line, after + 1)?
            }
        } else {
            return Err(error_at(line, after, "expected ':' after key"));
        };

        map.insert(key, value);
        Ok(())
    }

    /// Parse the body of an array whose header sits on `line` at level `depth`.
    /// Rows and list items are expected at `depth + 1`.
    fn array(
        &mut self,
        line: &Line<'a>,
        header: Header,
        depth: usize,
        nesting: usize,
    ) -> Result<Value> {
        check_nesting(line, nesting)?;

        let items = if let Some(start) = header.inline {
            split_cells(line, start, header.delimiter)?
        } else if let Some(fields) = &header.fields {
            self.tabular_rows(fields, header.delimiter, depth + 1, nesting + 1)?
        } else {
            self.list_items(depth + 1, nesting)?
        };

        if self.strict && items.len() != header.len {
            return Err(error_at(
                line,
                header.at,
                format!(
                    "array declares {} items but has {}",
                    header.len,
                    items.len()
                ),
            ));
        }
        Ok(Value::Array(items))
    }

    fn tabular_rows(
        &mut self,
        fields: &[String],
        delimiter: Delimiter,
        depth: usize,
        nesting: usize,
    ) -> Result<Vec<Value>> {
        let mut rows = Vec::new();
        while let Some(line) = self.peek() {
            if line.depth != depth {
                break;
            }
            if rows.is_empty() {
                check_nesting(&line, nesting)?;
            }
            self.pos += 1;
            let cells = split_cells(&line, 0, delimiter)?;
            if self.strict && cells.len() != fields.len() {
                return Err(error_at(
                    &line,
                    0,
                    format!(
                        "row has {} values but the header declares {} fields",
                        cells.len(),
                        fields.len()
                    ),
                ));
            }
            let mut cells = cells.into_iter();
            let mut row = Map::new();
            for field in fields {
                row.insert(field.clone(), cells.next().unwrap_or(Value::Null));
            }
            rows.push(Value::Object(row));
        }
        Ok(rows)
    }

    /// Collect `- item` lines at `depth`. `nesting` is the enclosing array's.
    fn list_items(&mut self, depth: usize, nesting: usize) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(error_at(&line, 0, "unexpected indentation"));
            }
            if line.content != "-" && !line.content.starts_with("- ") {
                return Err(error_at(&line, 0, "expected list item '- '"));
            }
            self.pos += 1;
            items.push(self.list_item(&line, depth, nesting)?);
        }
        Ok(items)
    }

    /// Parse one list item. Objects keep their first field on the hyphen line
    /// and the remaining fields at `depth + 1`.
    fn list_item(&mut self, line: &Line<'a>, depth: usize, nesting: usize) -> Result<Value> {
        if line.content == "-" {
            check_nesting(line, nesting + 1)?;
            return Ok(Value::Object(Map::new()));
        }
        let start = 2 + skip_spaces(&line.content[2..]);
        let body = &line.content[start..];

        if body.starts_with('[') {
            let header = parse_header(line, start)?;
            return self.array(line, header, depth, nesting + 1);
        }
        if !is_field(body) {
            return parse_primitive(line, start);
        }

        check_nesting(line, nesting + 1)?;
        let mut map = Map::new();
        self.field(line, start, depth + 1, nesting + 1, &mut map)?;
        while let Some(next) = self.peek() {
            if next.depth != depth + 1 {
                break;
            }
            self.pos += 1;
            self.field(&next, 0, depth + 1, nesting + 1, &mut map)?;
        }
        Ok(Value::Object(map))
    }
}

fn check_nesting(line: &Line<'_>, nesting: usize) -> Result<()> {
    if nesting > MAX_DEPTH {
        return Err(error_at(
            line,
            0,
            format!("nesting exceeds maximum depth of {MAX_DEPTH}"),
        ));
    }
    Ok(())
}

fn skip_spaces(s: &str) -> usize {
    s.len() - s.trim_start_matches(' ').len()
}

/// Characters that end an unquoted key.
fn ends_unquoted_key(c: char) -> bool {
    matches!(c, ':' | '[' | ']' | '{' | '}' | '"') || c.is_whitespace()
}

/// Does `content` start with a key followed by `:` or `[`?
fn is_field(content: &str) -> bool {
    let rest = if let Some(inner) = content.strip_prefix('"') {
        match find_closing_quote(inner) {
            Some(end) => &inner[end + 1..],
            None => return false,
        }
    } else {
        let end = content.find(ends_unquoted_key).unwrap_or(content.len());
        if end == 0 {
            return false;
        }
        &content[end..]
    };
    rest.starts_with(':') || rest.starts_with('[')
}

/// Byte index of the closing quote in `s` (which starts after the opening quote).
fn find_closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Parse a key at byte `start`; returns the key and the byte index after it.
fn parse_key(line: &Line<'_>, start: usize) -> Result<(String, usize)> {
    let content = line.content;
    if content[start..].starts_with('"') {
        return parse_quoted(line, start);
    }
    let end = content[start..]
        .find(ends_unquoted_key)
        .map_or(content.len(), |p| start + p);
    if end == start {
        return Err(error_at(line, start, "expected a key"));
    }
    Ok((content[start..end].to_string(), end))
}

/// Parse a quoted string whose opening quote is at byte `start`.
/// Returns the unescaped string and the byte index after the closing quote.
fn parse_quoted(line: &Line<'_>, start: usize) -> Result<(String, usize)> {
    let content = line.content;
    let mut out = String::new();
    let mut chars = content[start + 1..].char_indices();
    while let Some((i, c)) = chars.next() {
        let at = start + 1 + i;
        match c {
            '"' => return Ok((out, at + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, 't')) => out.push('\t'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, '"')) => out.push('"'),
                Some((_, other)) => {
                    return Err(error_at(
                        line,
                        at,
                        format!("invalid escape sequence '\\{other}'"),
                    ))
                }
                None => break,
            },
            _ => out.push(c),
        }
    }
    Err(error_at(line, start, "unterminated string"))
}

/// Parse the rest of the line from byte `start` as a single primitive.
fn parse_primitive(line: &Line<'_>, start: usize) -> Result<Value> {
    let content = line.content;
    let start = start + skip_spaces(&content[start..]);
    if content[start..].starts_with('"') {
        let (s, end) = parse_quoted(line, start)?;
        let trailing = end + skip_spaces(&content[end..]);
        if trailing < content.len() {
            return Err(error_at(
                line,
                trailing,
                "unexpected characters after closing quote",
            ));
        }
        return Ok(Value::String(s));
    }
    scalar(line, start, content[start..].trim_end_matches(' '))
}

/// Type inference for an unquoted token starting at byte `at`.
fn scalar(line: &Line<'_>, at: usize, token: &str) -> Result<Value> {
    Ok(match token {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if is_number_literal(token) => match parse_number(token) {
            Some(n) => Value::Number(n),
            None => return Err(error_at(line, at, format!("number {token} is out of range"))),
        },
        _ => Value::String(token.to_string()),
    })
}

/// Split delimiter-separated primitives from byte `start` to the end of the line.
fn split_cells(line: &Line<'_>, start: usize, delimiter: Delimiter) -> Result<Vec<Value>> {
    let content = line.content;
    let delim = delimiter.as_char();
    let mut cells = Vec::new();
    let mut i = start;
    loop {
        i += skip_spaces(&content[i..]);
        if content[i..].starts_with('"') {
            let (s, end) = parse_quoted(line, i)?;
            cells.push(Value::String(s));
            i = end + skip_spaces(&content[end..]);
            match content[i..].chars().next() {
                None => break,
                Some(c) if c == delim => i += c.len_utf8(),
                Some(_) => {
                    return Err(error_at(
                        line,
                        i,
                        format!("expected '{}' between values", delim.escape_default()),
                    ))
                }
            }
        } else {
            let end = content[i..].find(delim).map_or(content.len(), |p| i + p);
            cells.push(scalar(line, i, content[i..end].trim_end_matches(' '))?);
            if end == content.len() {
                break;
            }
            i = end + delim.len_utf8();
        }
    }
    Ok(cells)
}

/// Parse an array header whose `[` is at byte `start` of `line.content`.
fn parse_header(line: &Line<'_>, start: usize) -> Result<Header> {
    let content = line.content;
    let mut i = start + 1;

    let digits = content[i..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(error_at(line, i, "expected array length"));
    }
    let len: usize = content[i..i + digits]
        .parse()
        .map_err(|_| error_at(line, i, "array length is too large"))?;
    i += digits;

    let mut delimiter = Delimiter::Comma;
    if let Some(marker) = content[i..].chars().next().and_then(Delimiter::from_marker) {
        delimiter = marker;
        i += 1;
    }
    if !content[i..].starts_with(']') {
        return Err(error_at(line, i, "expected ']' to close array length"));
    }
    i += 1;

    let mut fields = None;
    if content[i..].starts_with('{') {
        let (names, end) = parse_fields(line, i + 1, delimiter)?;
        fields = Some(names);
        i = end;
    }

    if !content[i..].starts_with(':') {
        return Err(error_at(line, i, "expected ':' after array header"));
    }
    i += 1;

    let mut inline = None;
    let tail = &content[i..];
    if !tail.trim_matches(' ').is_empty() {
        if !tail.starts_with(' ') {
            return Err(error_at(line, i, "expected a space after ':'"));
        }
        if fields.is_some() {
            return Err(error_at(line, i, "tabular header cannot carry inline values"));
        }
        inline = Some(i + 1);
    }

    Ok(Header {
        len,
        delimiter,
        fields,
        inline,
        at: start,
    })
}

/// Parse `f1<delim>f2}` starting after `{`; returns the names and the byte
/// index after `}`.
fn parse_fields(
    line: &Line<'_>,
    start: usize,
    delimiter: Delimiter,
) -> Result<(Vec<String>, usize)> {
    let content = line.content;
    let delim = delimiter.as_char();
    let mut names = Vec::new();
    let mut i = start;
    loop {
        i += skip_spaces(&content[i..]);
        let (name, end) = if content[i..].starts_with('"') {
            parse_quoted(line, i)?
        } else {
            let end = content[i..]
                .find(|c: char| c == delim || matches!(c, '}' | ':' | '"' | '[' | ']' | '{'))
                .map_or(content.len(), |p| i + p);
            let name = content[i..end].trim_end_matches(' ');
            if name.is_empty() {
                return Err(error_at(line, i, "expected a field name"));
            }
            (name.to_string(), end)
        };
        names.push(name);
        i = end + skip_spaces(&content[end..]);
        match content[i..].chars().next() {
            Some('}') => return Ok((names, i + 1)),
            Some(c) if c == delim => i += c.len_utf8(),
            _ => return Err(error_at(line, i, "expected '}' to close field list")),
        }
    }
}
