//! Table-literal reader and writer.
//!
//! The document format is a single Lua-style table literal:
//!
//! ```text
//! {
//!   ["version"] = 2,
//!   ["layers"] = {
//!     { ["id"] = "layer-1", ["visible"] = true },
//!   },
//! }
//! ```
//!
//! Keys are string literals in brackets (bare identifiers are accepted on
//! read). Positional entries form the table's array part. Values are `nil`,
//! booleans, numbers, strings and nested tables. A leading `return` and `--`
//! line comments are skipped.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A parsed literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Table(Table),
}

impl Value {
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as an integer, if it is a number with no fractional part.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        let n = self.as_f64()?;
        (n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type name for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Table(_) => "table",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

/// A table with a positional part and a string-keyed part.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub array: Vec<Value>,
    pub map: BTreeMap<String, Value>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding only positional entries.
    #[must_use]
    pub fn array(values: Vec<Value>) -> Self {
        Self {
            array: values,
            map: BTreeMap::new(),
        }
    }

    /// Look up a keyed entry. `nil` entries read as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key).filter(|v| !matches!(v, Value::Nil))
    }

    /// Builder-style keyed insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.array.push(value.into());
    }

    fn depth(&self) -> usize {
        1 + self
            .array
            .iter()
            .chain(self.map.values())
            .map(|v| match v {
                Value::Table(t) => t.depth(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Parse a complete literal. Trailing content other than whitespace and
/// comments is an error.
pub fn parse(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    parser.skip_trivia();
    if parser.eat_keyword("return") {
        parser.skip_trivia();
    }
    let value = parser.value()?;
    parser.skip_trivia();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(value)
}

/// Nesting limit; deeper input is rejected instead of overflowing the stack.
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn expect(&mut self, want: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(format!("expected '{want}', found '{c}'"))),
            None => Err(self.error(format!("expected '{want}', found end of input"))),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('-') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.next() != Some('-') {
                        return;
                    }
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        let mut ahead = self.chars.clone();
        for want in word.chars() {
            if ahead.next() != Some(want) {
                return false;
            }
        }
        if ahead.next().is_some_and(is_ident_char) {
            return false;
        }
        for _ in word.chars() {
            self.bump();
        }
        true
    }

    fn value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('{') => self.table(),
            Some('"' | '\'') => self.string().map(Value::Str),
            Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if is_ident_start(c) => {
                let word = self.identifier();
                match word.as_str() {
                    "nil" => Ok(Value::Nil),
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.error(format!("unexpected identifier '{word}'"))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn table(&mut self) -> Result<Value> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("tables nested too deeply"));
        }
        self.expect('{')?;
        let mut table = Table::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    break;
                }
                Some('[') => {
                    self.bump();
                    self.skip_trivia();
                    if !matches!(self.peek(), Some('"' | '\'')) {
                        return Err(self.error("only string keys are supported"));
                    }
                    let key = self.string()?;
                    self.skip_trivia();
                    self.expect(']')?;
                    self.keyed_entry(&mut table, key)?;
                }
                Some(c) if is_ident_start(c) && self.is_bare_key() => {
                    let key = self.identifier();
                    self.keyed_entry(&mut table, key)?;
                }
                Some(_) => {
                    let value = self.value()?;
                    table.array.push(value);
                }
                None => return Err(self.error("unterminated table")),
            }
            self.skip_trivia();
            match self.peek() {
                Some(',' | ';') => {
                    self.bump();
                }
                Some('}') => {}
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unterminated table")),
            }
        }
        self.depth -= 1;
        Ok(Value::Table(table))
    }

    fn keyed_entry(&mut self, table: &mut Table, key: String) -> Result<()> {
        self.skip_trivia();
        self.expect('=')?;
        self.skip_trivia();
        let value = self.value()?;
        table.map.insert(key, value);
        Ok(())
    }

    /// An identifier followed by `=` is a key; otherwise it is a value.
    fn is_bare_key(&self) -> bool {
        let mut ahead = self.chars.clone();
        while ahead.peek().copied().is_some_and(is_ident_char) {
            ahead.next();
        }
        while ahead.peek().is_some_and(|c| c.is_whitespace()) {
            ahead.next();
        }
        ahead.next() == Some('=') && ahead.next() != Some('=')
    }

    fn identifier(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|&c| is_ident_char(c)) {
            word.push(c);
            self.bump();
        }
        word
    }

    fn number(&mut self) -> Result<Value> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        while let Some(c) = self
            .peek()
            .filter(|&c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E'))
        {
            text.push(c);
            self.bump();
            if matches!(c, 'e' | 'E') {
                if let Some(sign) = self.peek().filter(|&s| s == '+' || s == '-') {
                    text.push(sign);
                    self.bump();
                }
            }
        }
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number '{text}'")))
    }

    fn string(&mut self) -> Result<String> {
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') if !self.peek().is_some_and(|c| c.is_ascii_digit()) => Ok('\0'),
            Some(c @ ('\\' | '"' | '\'')) => Ok(c),
            Some('u') => {
                self.expect('{')?;
                let mut hex = String::new();
                while let Some(c) = self.peek().filter(char::is_ascii_hexdigit) {
                    hex.push(c);
                    self.bump();
                }
                self.expect('}')?;
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(format!("invalid escape \\u{{{hex}}}")))
            }
            Some(d) if d.is_ascii_digit() => {
                let mut code = d.to_digit(10).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(10)) {
                        Some(digit) => {
                            code = code * 10 + digit;
                            self.bump();
                        }
                        None => break,
                    }
                }
                char::from_u32(code)
                    .filter(|_| code <= 255)
                    .ok_or_else(|| self.error(format!("invalid escape \\{code}")))
            }
            Some(c) => Err(self.error(format!("invalid escape '\\{c}'"))),
            None => Err(self.error("unterminated string")),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ============================================================================
// Writing
// ============================================================================

/// Tables at most this deep are written on one line.
const INLINE_DEPTH: usize = 3;

/// Render a value as a literal that [`parse`] reads back unchanged.
#[must_use]
pub fn write(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out.push('\n');
    out
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, *n),
        Value::Str(s) => write_string(out, s),
        Value::Table(table) => {
            if table.map.is_empty() && table.depth() <= INLINE_DEPTH {
                write_inline(out, table);
            } else {
                write_block(out, table, indent);
            }
        }
    }
}

fn write_inline(out: &mut String, table: &Table) {
    out.push('{');
    for (i, value) in table.array.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(out, value, 0);
    }
    out.push('}');
}

fn write_block(out: &mut String, table: &Table, indent: usize) {
    let pad = "  ".repeat(indent + 1);
    out.push_str("{\n");
    for value in &table.array {
        out.push_str(&pad);
        write_value(out, value, indent + 1);
        out.push_str(",\n");
    }
    for (key, value) in &table.map {
        out.push_str(&pad);
        out.push('[');
        write_string(out, key);
        out.push_str("] = ");
        write_value(out, value, indent + 1);
        out.push_str(",\n");
    }
    out.push_str(&"  ".repeat(indent));
    out.push('}');
}

fn write_number(out: &mut String, n: f64) {
    if !n.is_finite() {
        out.push('0');
    } else if n.fract() == 0.0 && n.abs() < 9.0e15 {
        let _ = write!(out, "{}", n as i64);
    } else {
        let _ = write!(out, "{n}");
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse("nil").unwrap(), Value::Nil);
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse(" -12.5 ").unwrap(), Value::Number(-12.5));
        assert_eq!(parse("1e3").unwrap(), Value::Number(1000.0));
        assert_eq!(parse("'it\\'s'").unwrap(), Value::Str("it's".to_string()));
        assert_eq!(parse(r#""\65\u{2580}""#).unwrap(), Value::Str("A\u{2580}".to_string()));
    }

    #[test]
    fn test_parse_table_with_comments_and_return() {
        let src = r#"
            -- saved document
            return {
              ["version"] = 2, -- format
              name = "x";
              {1, 2, -3},
            }
        "#;
        let value = parse(src).unwrap();
        let table = value.as_table().unwrap();
        assert_eq!(table.get("version").and_then(Value::as_i64), Some(2));
        assert_eq!(table.get("name").and_then(Value::as_str), Some("x"));
        let inner = table.array[0].as_table().unwrap();
        assert_eq!(inner.array.len(), 3);
        assert_eq!(inner.array[2].as_i64(), Some(-3));
    }

    #[test]
    fn test_nil_entry_reads_absent() {
        let value = parse(r#"{ ["parentId"] = nil }"#).unwrap();
        assert!(value.as_table().unwrap().get("parentId").is_none());
    }

    #[test]
    fn test_parse_errors_have_positions() {
        let err = parse("{\n  [\"a\"] 1 }").unwrap_err();
        match err {
            Error::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse("{1, 2").is_err());
        assert!(parse("\"open").is_err());
        assert!(parse("{[1] = 2}").is_err());
        assert!(parse("{} {}").is_err());
        assert!(parse("bogus").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "{".repeat(100), "}".repeat(100));
        assert!(parse(&deep).is_err());
    }

    #[test]
    fn test_write_reads_back() {
        let row = Table::array(vec![
            Value::from("q\"\\\n"),
            Table::array(vec![Value::from(-1i64), Value::from(0.5)]).into(),
        ]);
        let doc = Table::new()
            .with("version", 2i64)
            .with("flag", false)
            .with("rows", Table::array(vec![row.into()]));
        let value = Value::Table(doc);
        let text = write(&value);
        assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn test_write_layout() {
        let value = Value::Table(
            Table::new()
                .with("version", 1i64)
                .with("grid", Table::array(vec![Value::from(1i64), Value::from(2i64)])),
        );
        insta::assert_snapshot!(write(&value), @r#"
        {
          ["grid"] = {1,2},
          ["version"] = 1,
        }
        "#);
    }
}
