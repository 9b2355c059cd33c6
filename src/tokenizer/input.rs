//! Low-level input handling for the tokenizer.
//!
//! [`ScanInput`] owns the decoded document text and provides position
//! tracking (line, column, byte offset) together with the scanning
//! primitives the tokenizer is built from: peeking, advancing, name parsing,
//! reference expansion and attribute value parsing.
//!
//! Nesting depth, name length and the number of reference expansions are
//! bounded by the limits in [`TokenizerOptions`](super::TokenizerOptions).

use std::collections::{HashMap, HashSet};

use crate::error::{ErrorSeverity, ParseDiagnostic, ParseError, SourceLocation};
use crate::util::chars::{is_name_char, is_name_start_char, is_xml_char};

/// Nesting limit for entities whose replacement text references other
/// entities.
const MAX_ENTITY_NESTING: u32 = 16;

/// Internal general entities declared in the DTD internal subset.
#[derive(Debug, Default)]
pub(crate) struct EntityTable {
    /// Replacement text keyed by entity name.
    pub internal: HashMap<String, String>,
    /// Names declared with a SYSTEM or PUBLIC identifier.
    pub external: HashSet<String>,
}

pub(crate) struct ScanInput {
    input: String,
    pos: usize,
    line: u32,
    column: u32,
    depth: u32,
    max_depth: u32,
    max_name_length: usize,
    entity_expansions: u32,
    max_entity_expansions: u32,
    pub(crate) entities: EntityTable,
    pub(crate) diagnostics: Vec<ParseDiagnostic>,
}

impl ScanInput {
    pub fn new(input: String) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            max_depth: super::DEFAULT_MAX_DEPTH,
            max_name_length: super::DEFAULT_MAX_NAME_LENGTH,
            entity_expansions: 0,
            max_entity_expansions: super::DEFAULT_MAX_ENTITY_EXPANSIONS,
            entities: EntityTable::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn set_max_depth(&mut self, max: u32) {
        self.max_depth = max;
    }

    pub fn set_max_name_length(&mut self, max: usize) {
        self.max_name_length = max;
    }

    pub fn set_max_entity_expansions(&mut self, max: u32) {
        self.max_entity_expansions = max;
    }

    // -- Depth tracking --

    /// Increments the nesting depth. Returns an error if the limit is exceeded.
    pub fn increment_depth(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.fatal(format!(
                "maximum nesting depth exceeded ({})",
                self.max_depth
            )));
        }
        Ok(())
    }

    pub fn decrement_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- Position queries --

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            byte_offset: self.pos,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the text between two byte offsets previously observed
    /// through [`pos`](Self::pos).
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.input[start..end]
    }

    // -- Peek --

    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|s| s.chars().next())
    }

    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.input.as_bytes()[self.pos..].starts_with(s)
    }

    // -- Advance --

    /// Advances by `count` ASCII bytes, updating line/column.
    pub fn advance(&mut self, count: usize) {
        for _ in 0..count {
            match self.peek() {
                Some(b'\n') => {
                    self.line += 1;
                    self.column = 1;
                }
                Some(_) => self.column += 1,
                None => return,
            }
            self.pos += 1;
        }
    }

    fn advance_char(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += ch.len_utf8();
    }

    pub fn next_byte(&mut self) -> Result<u8, ParseError> {
        let b = self
            .peek()
            .ok_or_else(|| self.fatal("unexpected end of input"))?;
        self.advance(1);
        Ok(b)
    }

    /// Consumes the next character with `\r\n` normalization (XML 1.0 §2.11)
    /// and `Char` validation (XML 1.0 §2.2).
    pub fn next_char(&mut self) -> Result<char, ParseError> {
        let ch = self
            .peek_char()
            .ok_or_else(|| self.fatal("unexpected end of input"))?;
        if !is_xml_char(ch) {
            return Err(self.fatal(format!("invalid XML character: U+{:04X}", ch as u32)));
        }
        self.advance_char(ch);
        if ch == '\r' {
            if self.peek() == Some(b'\n') {
                self.advance(1);
            }
            return Ok('\n');
        }
        Ok(ch)
    }

    pub fn expect_byte(&mut self, expected: u8) -> Result<(), ParseError> {
        let b = self.next_byte()?;
        if b != expected {
            return Err(self.fatal(format!(
                "expected '{}', found '{}'",
                expected as char, b as char
            )));
        }
        Ok(())
    }

    pub fn expect_str(&mut self, expected: &[u8]) -> Result<(), ParseError> {
        for &b in expected {
            self.expect_byte(b)?;
        }
        Ok(())
    }

    // -- Whitespace --

    /// Skips whitespace. Returns `true` if any was consumed.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance(1);
        }
        self.pos > start
    }

    pub fn skip_whitespace_required(&mut self) -> Result<(), ParseError> {
        if !self.skip_whitespace() {
            return Err(self.fatal("whitespace required"));
        }
        Ok(())
    }

    /// Consumes ASCII bytes while `pred` holds and returns them.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.advance(1);
        }
        &self.input[start..self.pos]
    }

    // -- Names (XML 1.0 §2.3) --

    pub fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let first = self
            .peek_char()
            .ok_or_else(|| self.fatal("expected name, found end of input"))?;
        if !is_name_start_char(first) {
            return Err(self.fatal(format!("invalid name start character: '{first}'")));
        }
        self.advance_char(first);
        while let Some(ch) = self.peek_char().filter(|&c| is_name_char(c)) {
            self.advance_char(ch);
        }

        let len = self.pos - start;
        if len > self.max_name_length {
            return Err(self.fatal(format!(
                "name length ({len}) exceeds maximum ({})",
                self.max_name_length
            )));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    // -- References (XML 1.0 §4.1) --

    fn count_expansion(&mut self) -> Result<(), ParseError> {
        self.entity_expansions += 1;
        if self.entity_expansions > self.max_entity_expansions {
            return Err(self.fatal(format!(
                "entity expansion limit exceeded ({})",
                self.max_entity_expansions
            )));
        }
        Ok(())
    }

    /// Parses `&...;` at the current position and appends its expansion.
    ///
    /// Handles character references, the five predefined entities and
    /// internal entities from the DTD internal subset.
    pub fn parse_reference_into(&mut self, out: &mut String) -> Result<(), ParseError> {
        self.count_expansion()?;
        self.expect_byte(b'&')?;

        if self.peek() == Some(b'#') {
            self.advance(1);
            let value = if self.peek() == Some(b'x') {
                self.advance(1);
                let hex = self.take_while(|b| b.is_ascii_hexdigit()).to_string();
                u32::from_str_radix(&hex, 16)
                    .map_err(|_| self.fatal("invalid hex character reference"))?
            } else {
                let dec = self.take_while(|b| b.is_ascii_digit()).to_string();
                dec.parse::<u32>()
                    .map_err(|_| self.fatal("invalid decimal character reference"))?
            };
            self.expect_byte(b';')?;
            let ch = char::from_u32(value)
                .filter(|&c| is_xml_char(c))
                .ok_or_else(|| {
                    self.fatal(format!(
                        "character reference &#x{value:X}; does not refer to a valid XML character"
                    ))
                })?;
            out.push(ch);
            return Ok(());
        }

        let name = self.parse_name()?;
        self.expect_byte(b';')?;
        match name.as_str() {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "apos" => out.push('\''),
            "quot" => out.push('"'),
            _ => self.expand_declared_entity(&name, out, 0)?,
        }
        Ok(())
    }

    fn expand_declared_entity(
        &mut self,
        name: &str,
        out: &mut String,
        nesting: u32,
    ) -> Result<(), ParseError> {
        if self.entities.external.contains(name) {
            return Err(self.fatal(format!(
                "reference to external entity '{name}' is not supported"
            )));
        }
        let Some(text) = self.entities.internal.get(name).cloned() else {
            return Err(self.fatal(format!("undefined entity '{name}'")));
        };
        if nesting >= MAX_ENTITY_NESTING {
            return Err(self.fatal(format!("entity '{name}' nests too deeply")));
        }
        if text.contains('<') {
            return Err(self.fatal(format!(
                "entity '{name}' contains markup, which is not supported"
            )));
        }

        let mut rest = text.as_str();
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = after
                .find(';')
                .ok_or_else(|| self.fatal(format!("unterminated reference in entity '{name}'")))?;
            let inner = &after[..semi];
            self.count_expansion()?;
            match inner {
                "amp" => out.push('&'),
                "lt" => out.push('<'),
                "gt" => out.push('>'),
                "apos" => out.push('\''),
                "quot" => out.push('"'),
                _ => self.expand_declared_entity(inner, out, nesting + 1)?,
            }
            rest = &after[semi + 1..];
        }
        out.push_str(rest);
        Ok(())
    }

    // -- Attribute values (XML 1.0 §3.3.3) --

    /// Parses a quoted attribute value with reference expansion and
    /// whitespace normalization. Returns the value and its quote character.
    pub fn parse_attribute_value(&mut self) -> Result<(String, char), ParseError> {
        let quote = self.next_byte()?;
        if quote != b'"' && quote != b'\'' {
            return Err(self.fatal("attribute value must be quoted"));
        }

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.fatal("unexpected end of input in attribute value")),
                Some(b) if b == quote => {
                    self.advance(1);
                    break;
                }
                Some(b'&') => self.parse_reference_into(&mut value)?,
                Some(b'<') => return Err(self.fatal("'<' not allowed in attribute values")),
                Some(_) => match self.next_char()? {
                    '\n' | '\t' => value.push(' '),
                    ch => value.push(ch),
                },
            }
        }
        Ok((value, quote as char))
    }

    /// Parses a quoted literal without reference expansion.
    pub fn parse_quoted_value(&mut self) -> Result<String, ParseError> {
        let quote = self.next_byte()?;
        if quote != b'"' && quote != b'\'' {
            return Err(self.fatal("expected quoted value"));
        }
        let start = self.pos;
        while !self.at_end() && self.peek() != Some(quote) {
            match self.peek_char() {
                Some(ch) => self.advance_char(ch),
                None => break,
            }
        }
        let value = self.input[start..self.pos].to_string();
        self.expect_byte(quote)?;
        Ok(value)
    }

    // -- Errors --

    pub fn fatal(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.location(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    pub fn push_diagnostic(&mut self, severity: ErrorSeverity, message: String) {
        self.diagnostics.push(ParseDiagnostic {
            severity,
            message,
            location: self.location(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(s: &str) -> ScanInput {
        ScanInput::new(s.to_string())
    }

    #[test]
    fn test_peek_and_advance() {
        let mut inp = input("ab\ncd");
        assert_eq!(inp.peek(), Some(b'a'));
        assert_eq!(inp.peek_at(1), Some(b'b'));
        inp.advance(3);
        assert_eq!(inp.location().line, 2);
        assert_eq!(inp.location().column, 1);
        assert_eq!(inp.peek(), Some(b'c'));
    }

    #[test]
    fn test_next_char_normalizes_crlf() {
        let mut inp = input("\r\nx");
        assert_eq!(inp.next_char().unwrap(), '\n');
        assert_eq!(inp.next_char().unwrap(), 'x');
        assert!(inp.at_end());
    }

    #[test]
    fn test_next_char_rejects_control_characters() {
        let mut inp = input("\u{1}");
        assert!(inp.next_char().is_err());
    }

    #[test]
    fn test_parse_name() {
        let mut inp = input("x:item rest");
        assert_eq!(inp.parse_name().unwrap(), "x:item");
        assert_eq!(inp.peek(), Some(b' '));
    }

    #[test]
    fn test_parse_name_limit() {
        let mut inp = input("abcdef");
        inp.set_max_name_length(3);
        let err = inp.parse_name().unwrap_err();
        assert!(err.message.contains("exceeds maximum"));
    }

    #[test]
    fn test_parse_name_rejects_digit_start() {
        assert!(input("1a").parse_name().is_err());
    }

    #[test]
    fn test_references() {
        let mut inp = input("&amp;&#65;&#x42;&quot;");
        let mut out = String::new();
        while !inp.at_end() {
            inp.parse_reference_into(&mut out).unwrap();
        }
        assert_eq!(out, "&AB\"");
    }

    #[test]
    fn test_declared_entity_expansion() {
        let mut inp = input("&greet;");
        inp.entities
            .internal
            .insert("greet".to_string(), "hello &who;".to_string());
        inp.entities
            .internal
            .insert("who".to_string(), "world".to_string());
        let mut out = String::new();
        inp.parse_reference_into(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_recursive_entity_is_rejected() {
        let mut inp = input("&a;");
        inp.entities
            .internal
            .insert("a".to_string(), "&a;".to_string());
        let mut out = String::new();
        assert!(inp.parse_reference_into(&mut out).is_err());
    }

    #[test]
    fn test_undefined_entity() {
        let mut out = String::new();
        let err = input("&nope;").parse_reference_into(&mut out).unwrap_err();
        assert!(err.message.contains("undefined entity"));
    }

    #[test]
    fn test_expansion_limit() {
        let mut inp = input("&amp;&amp;&amp;");
        inp.set_max_entity_expansions(2);
        let mut out = String::new();
        inp.parse_reference_into(&mut out).unwrap();
        inp.parse_reference_into(&mut out).unwrap();
        assert!(inp.parse_reference_into(&mut out).is_err());
    }

    #[test]
    fn test_attribute_value_normalization() {
        let mut inp = input("'a\tb\nc&#10;d'");
        let (value, quote) = inp.parse_attribute_value().unwrap();
        assert_eq!(value, "a b c\nd");
        assert_eq!(quote, '\'');
    }

    #[test]
    fn test_attribute_value_rejects_lt() {
        assert!(input("\"a<b\"").parse_attribute_value().is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut inp = input("");
        inp.set_max_depth(1);
        inp.increment_depth().unwrap();
        assert!(inp.increment_depth().is_err());
        inp.decrement_depth();
        inp.decrement_depth();
        inp.decrement_depth();
        inp.increment_depth().unwrap();
    }
}
