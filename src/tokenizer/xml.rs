//! The byte-level XML tokenizer.
//!
//! A hand-rolled scanner over decoded text that checks well-formedness as
//! it goes (XML 1.0 Fifth Edition) and emits [`RawToken`]s one at a time.
//! It tracks just enough structure to do that: the document phase (prolog,
//! element content, epilog) and the stack of open element names for end-tag
//! matching. Namespaces are left to the consumer.

use std::collections::HashSet;

use super::input::{EntityTable, ScanInput};
use super::{RawAttribute, RawToken, TokenSource, TokenizerOptions};
use crate::error::{ErrorSeverity, ParseDiagnostic, ParseError};
use crate::util::chars::{is_xml_char, is_xml_whitespace};
use crate::util::qname::validate_qname;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing consumed yet; only here may the XML declaration appear.
    Start,
    /// Misc items and the DOCTYPE before the root element.
    Prolog,
    /// Inside the root element.
    Content,
    /// Misc items after the root element.
    Epilog,
    Done,
}

/// Streaming tokenizer over an owned UTF-8 document.
///
/// # Examples
///
/// ```
/// use xmlcursor::tokenizer::{RawToken, TokenSource, Tokenizer, TokenizerOptions};
///
/// let mut tok = Tokenizer::new("<a>hi</a>".to_string(), TokenizerOptions::default());
/// assert_eq!(tok.next_token().unwrap(), Some(RawToken::start("a")));
/// assert_eq!(tok.next_token().unwrap(), Some(RawToken::text("hi")));
/// assert_eq!(tok.next_token().unwrap(), Some(RawToken::end("a")));
/// assert_eq!(tok.next_token().unwrap(), None);
/// ```
pub struct Tokenizer {
    input: ScanInput,
    options: TokenizerOptions,
    phase: Phase,
    /// Names of the currently open elements, innermost last.
    open: Vec<String>,
    seen_doctype: bool,
}

impl Tokenizer {
    /// Creates a tokenizer over `input`.
    #[must_use]
    pub fn new(input: String, options: TokenizerOptions) -> Self {
        let mut scan = ScanInput::new(input);
        scan.set_max_depth(options.max_depth);
        scan.set_max_name_length(options.max_name_length);
        scan.set_max_entity_expansions(options.max_entity_expansions);
        Self {
            input: scan,
            options,
            phase: Phase::Start,
            open: Vec::new(),
            seen_doctype: false,
        }
    }

    fn finish(&mut self) -> Result<Option<RawToken>, ParseError> {
        self.phase = Phase::Done;
        Ok(None)
    }

    fn read_start(&mut self) -> Result<Option<RawToken>, ParseError> {
        self.phase = Phase::Prolog;
        let is_decl = self.input.looking_at(b"<?xml")
            && matches!(
                self.input.peek_at(5),
                Some(b' ' | b'\t' | b'\r' | b'\n' | b'?')
            );
        if is_decl {
            return self.parse_xml_declaration().map(Some);
        }
        self.read_prolog()
    }

    fn read_prolog(&mut self) -> Result<Option<RawToken>, ParseError> {
        self.input.skip_whitespace();

        if self.input.at_end() {
            self.input
                .push_diagnostic(ErrorSeverity::Error, "document is empty".to_string());
            return self.finish();
        }
        if self.input.looking_at(b"<!DOCTYPE") {
            if self.seen_doctype {
                return Err(self.input.fatal("only one DOCTYPE declaration is allowed"));
            }
            self.seen_doctype = true;
            return self.parse_doctype().map(Some);
        }
        if let Some(token) = self.read_misc()? {
            return Ok(Some(token));
        }
        if self.input.peek() == Some(b'<') {
            return self.parse_start_tag().map(Some);
        }
        Err(self.input.fatal("expected root element"))
    }

    fn read_epilog(&mut self) -> Result<Option<RawToken>, ParseError> {
        self.input.skip_whitespace();
        if self.input.at_end() {
            return self.finish();
        }
        if let Some(token) = self.read_misc()? {
            return Ok(Some(token));
        }
        Err(self.input.fatal("content after document element"))
    }

    /// Comments and processing instructions, allowed in every phase.
    fn read_misc(&mut self) -> Result<Option<RawToken>, ParseError> {
        if self.input.looking_at(b"<!--") {
            return self.parse_comment().map(Some);
        }
        if self.input.looking_at(b"<?") {
            return self.parse_processing_instruction().map(Some);
        }
        Ok(None)
    }

    fn read_content(&mut self) -> Result<Option<RawToken>, ParseError> {
        loop {
            if self.input.at_end() {
                let open = self.open.last().cloned().unwrap_or_default();
                self.input.push_diagnostic(
                    ErrorSeverity::Error,
                    format!("premature end of data in element <{open}>"),
                );
                return self.finish();
            }
            if self.input.looking_at(b"</") {
                return self.parse_end_tag().map(Some);
            }
            if self.input.looking_at(b"<![CDATA[") && !self.options.cdata_as_text {
                return self.parse_cdata().map(|text| Some(RawToken::CData(text)));
            }
            if let Some(token) = self.read_misc()? {
                return Ok(Some(token));
            }
            if self.input.peek() == Some(b'<') && !self.input.looking_at(b"<![CDATA[") {
                return self.parse_start_tag().map(Some);
            }

            let (text, has_cdata) = self.parse_text_run()?;
            if has_cdata || !is_xml_whitespace(&text) {
                return Ok(Some(RawToken::Text(text)));
            }
            if !self.options.no_blanks {
                return Ok(Some(RawToken::Whitespace(text)));
            }
        }
    }

    // === Individual constructs ===

    fn parse_xml_declaration(&mut self) -> Result<RawToken, ParseError> {
        let input = &mut self.input;
        input.expect_str(b"<?xml")?;
        input.skip_whitespace_required()?;

        input.expect_str(b"version")?;
        input.skip_whitespace();
        input.expect_byte(b'=')?;
        input.skip_whitespace();
        let version = input.parse_quoted_value()?;
        if !is_valid_version_num(&version) {
            return Err(input.fatal(format!("invalid version number: '{version}'")));
        }

        let had_ws = input.skip_whitespace();
        let encoding = if input.looking_at(b"encoding") {
            if !had_ws {
                return Err(input.fatal("whitespace required before encoding"));
            }
            input.expect_str(b"encoding")?;
            input.skip_whitespace();
            input.expect_byte(b'=')?;
            input.skip_whitespace();
            let enc = input.parse_quoted_value()?;
            if !is_valid_encoding_name(&enc) {
                return Err(input.fatal(format!("invalid encoding name: '{enc}'")));
            }
            Some(enc)
        } else {
            None
        };

        let had_ws2 = input.skip_whitespace() || (encoding.is_none() && had_ws);
        let standalone = if input.looking_at(b"standalone") {
            if !had_ws2 {
                return Err(input.fatal("whitespace required before standalone"));
            }
            input.expect_str(b"standalone")?;
            input.skip_whitespace();
            input.expect_byte(b'=')?;
            input.skip_whitespace();
            match input.parse_quoted_value()?.as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => return Err(input.fatal("standalone must be 'yes' or 'no'")),
            }
        } else {
            None
        };

        input.skip_whitespace();
        input.expect_str(b"?>")?;
        Ok(RawToken::XmlDeclaration {
            version,
            encoding,
            standalone,
        })
    }

    fn parse_doctype(&mut self) -> Result<RawToken, ParseError> {
        self.input.expect_str(b"<!DOCTYPE")?;
        self.input.skip_whitespace_required()?;
        let name = self.input.parse_name()?;
        self.input.skip_whitespace();

        let mut public_id = None;
        let mut system_id = None;
        if self.input.looking_at(b"SYSTEM") {
            self.input.expect_str(b"SYSTEM")?;
            self.input.skip_whitespace_required()?;
            system_id = Some(self.input.parse_quoted_value()?);
            self.input.skip_whitespace();
        } else if self.input.looking_at(b"PUBLIC") {
            self.input.expect_str(b"PUBLIC")?;
            self.input.skip_whitespace_required()?;
            public_id = Some(self.input.parse_quoted_value()?);
            self.input.skip_whitespace_required()?;
            system_id = Some(self.input.parse_quoted_value()?);
            self.input.skip_whitespace();
        }

        let mut internal_subset = None;
        if self.input.peek() == Some(b'[') {
            self.input.advance(1);
            let start = self.input.pos();
            self.skip_internal_subset()?;
            let subset = self.input.slice(start, self.input.pos()).to_string();
            self.input.expect_byte(b']')?;
            self.input.skip_whitespace();
            let entities =
                scan_entity_declarations(&subset).map_err(|msg| self.input.fatal(msg))?;
            self.input.entities = entities;
            internal_subset = Some(subset);
        }

        self.input.expect_byte(b'>')?;
        Ok(RawToken::DocumentType {
            name,
            public_id,
            system_id,
            internal_subset,
        })
    }

    /// Advances to the `]` closing the internal subset, stepping over
    /// comments and quoted literals.
    fn skip_internal_subset(&mut self) -> Result<(), ParseError> {
        loop {
            if self.input.at_end() {
                return Err(self.input.fatal("unexpected end of input in DOCTYPE"));
            }
            if self.input.looking_at(b"<!--") {
                self.parse_comment()?;
                continue;
            }
            match self.input.peek() {
                Some(b']') => return Ok(()),
                Some(b'"' | b'\'') => {
                    self.input.parse_quoted_value()?;
                }
                _ => {
                    self.input.next_char()?;
                }
            }
        }
    }

    fn parse_start_tag(&mut self) -> Result<RawToken, ParseError> {
        self.input.expect_byte(b'<')?;
        let name = self.input.parse_name()?;
        if let Some(problem) = validate_qname(&name) {
            return Err(self.input.fatal(format!("{problem}: '{name}'")));
        }

        let mut attributes: Vec<RawAttribute> = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let had_ws = self.input.skip_whitespace();
            if self.input.peek() == Some(b'>') || self.input.looking_at(b"/>") {
                break;
            }
            if self.input.at_end() {
                return Err(self.input.fatal("unexpected end of input in start tag"));
            }
            if !had_ws {
                return Err(self.input.fatal("whitespace required between attributes"));
            }
            let attr_name = self.input.parse_name()?;
            if let Some(problem) = validate_qname(&attr_name) {
                return Err(self.input.fatal(format!("{problem}: '{attr_name}'")));
            }
            if !seen.insert(attr_name.clone()) {
                return Err(self
                    .input
                    .fatal(format!("attribute '{attr_name}' redefined on <{name}>")));
            }
            if attributes.len() >= self.options.max_attributes as usize {
                return Err(self.input.fatal(format!(
                    "too many attributes on <{name}> (maximum {})",
                    self.options.max_attributes
                )));
            }
            self.input.skip_whitespace();
            self.input.expect_byte(b'=')?;
            self.input.skip_whitespace();
            let (value, quote) = self.input.parse_attribute_value()?;
            attributes.push(RawAttribute {
                name: attr_name,
                value,
                quote,
                is_default: false,
            });
        }

        let empty = self.input.looking_at(b"/>");
        if empty {
            self.input.advance(2);
        } else {
            self.input.expect_byte(b'>')?;
        }

        match (empty, self.phase) {
            (false, _) => {
                self.input.increment_depth()?;
                self.open.push(name.clone());
                self.phase = Phase::Content;
            }
            (true, Phase::Prolog) => self.phase = Phase::Epilog,
            (true, _) => {}
        }

        Ok(RawToken::StartElement {
            name,
            attributes,
            empty,
        })
    }

    fn parse_end_tag(&mut self) -> Result<RawToken, ParseError> {
        self.input.expect_str(b"</")?;
        let name = self.input.parse_name()?;
        self.input.skip_whitespace();
        self.input.expect_byte(b'>')?;

        match self.open.last() {
            Some(expected) if *expected == name => {}
            Some(expected) => {
                return Err(self.input.fatal(format!(
                    "mismatched end tag: expected </{expected}>, found </{name}>"
                )));
            }
            None => return Err(self.input.fatal(format!("unexpected end tag </{name}>"))),
        }

        self.open.pop();
        self.input.decrement_depth();
        if self.open.is_empty() {
            self.phase = Phase::Epilog;
        }
        Ok(RawToken::EndElement { name })
    }

    /// Reads consecutive character data, folding in CDATA sections when
    /// `cdata_as_text` is set. Returns the text and whether any CDATA was
    /// folded in.
    fn parse_text_run(&mut self) -> Result<(String, bool), ParseError> {
        let mut text = String::new();
        let mut has_cdata = false;
        loop {
            match self.input.peek() {
                None => break,
                Some(b'<') => {
                    if self.options.cdata_as_text && self.input.looking_at(b"<![CDATA[") {
                        text.push_str(&self.parse_cdata()?);
                        has_cdata = true;
                        continue;
                    }
                    break;
                }
                Some(b'&') => self.input.parse_reference_into(&mut text)?,
                Some(b']') if self.input.looking_at(b"]]>") => {
                    return Err(self.input.fatal("']]>' not allowed in character data"));
                }
                Some(_) => text.push(self.input.next_char()?),
            }
        }
        Ok((text, has_cdata))
    }

    fn parse_cdata(&mut self) -> Result<String, ParseError> {
        self.input.expect_str(b"<![CDATA[")?;
        let mut content = String::new();
        loop {
            if self.input.at_end() {
                return Err(self.input.fatal("unexpected end of input in CDATA section"));
            }
            if self.input.looking_at(b"]]>") {
                self.input.advance(3);
                return Ok(content);
            }
            content.push(self.input.next_char()?);
        }
    }

    fn parse_comment(&mut self) -> Result<RawToken, ParseError> {
        self.input.expect_str(b"<!--")?;
        let mut content = String::new();
        loop {
            if self.input.at_end() {
                return Err(self.input.fatal("unexpected end of input in comment"));
            }
            if self.input.looking_at(b"-->") {
                self.input.advance(3);
                return Ok(RawToken::Comment(content));
            }
            if self.input.looking_at(b"--") {
                return Err(self.input.fatal("'--' not allowed inside comments"));
            }
            content.push(self.input.next_char()?);
        }
    }

    fn parse_processing_instruction(&mut self) -> Result<RawToken, ParseError> {
        self.input.expect_str(b"<?")?;
        let target = self.input.parse_name()?;
        if target.eq_ignore_ascii_case("xml") {
            return Err(self
                .input
                .fatal("XML declaration allowed only at the start of the document"));
        }
        if target.contains(':') {
            return Err(self.input.fatal("PI target must not contain a colon"));
        }

        if !self.input.skip_whitespace() {
            self.input.expect_str(b"?>")?;
            return Ok(RawToken::ProcessingInstruction { target, data: None });
        }
        let mut data = String::new();
        loop {
            if self.input.at_end() {
                return Err(self
                    .input
                    .fatal("unexpected end of input in processing instruction"));
            }
            if self.input.looking_at(b"?>") {
                self.input.advance(2);
                break;
            }
            data.push(self.input.next_char()?);
        }
        let data = (!data.is_empty()).then_some(data);
        Ok(RawToken::ProcessingInstruction { target, data })
    }
}

impl TokenSource for Tokenizer {
    fn next_token(&mut self) -> Result<Option<RawToken>, ParseError> {
        let result = match self.phase {
            Phase::Start => self.read_start(),
            Phase::Prolog => self.read_prolog(),
            Phase::Content => self.read_content(),
            Phase::Epilog => self.read_epilog(),
            Phase::Done => Ok(None),
        };
        if result.is_err() {
            self.phase = Phase::Done;
        }
        result
    }

    fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.input.diagnostics
    }
}

/// Collects `<!ENTITY name "value">` and external entity declarations from
/// an internal subset. Parameter entities are ignored.
///
/// Character references in a literal value are replaced as the declaration
/// is read (XML 1.0 §4.5); general entity references stay in the
/// replacement text and are expanded at the point of use.
fn scan_entity_declarations(subset: &str) -> Result<EntityTable, String> {
    let mut table = EntityTable::default();
    let mut rest = subset;
    while let Some(at) = rest.find("<!ENTITY") {
        rest = &rest[at + "<!ENTITY".len()..];
        let decl = rest.trim_start();
        if decl.starts_with('%') {
            continue;
        }
        let name_end = decl
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(decl.len());
        let name = &decl[..name_end];
        let body = decl[name_end..].trim_start();

        if let Some(quote @ ('"' | '\'')) = body.chars().next() {
            if let Some(end) = body[1..].find(quote) {
                let replacement = expand_char_refs(&body[1..=end])?;
                table
                    .internal
                    .entry(name.to_string())
                    .or_insert(replacement);
            }
        } else if body.starts_with("SYSTEM") || body.starts_with("PUBLIC") {
            table.external.insert(name.to_string());
        }
    }
    Ok(table)
}

/// Replaces `&#N;` and `&#xH;` in an entity value with the characters they
/// name.
fn expand_char_refs(value: &str) -> Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find("&#") {
        out.push_str(&rest[..at]);
        let after = &rest[at + 2..];
        let semi = after
            .find(';')
            .ok_or_else(|| "unterminated character reference in entity value".to_string())?;
        let digits = &after[..semi];
        let code = match digits.strip_prefix('x') {
            Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()
            }
            None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits.parse::<u32>().ok()
            }
            _ => None,
        };
        let ch = code
            .and_then(char::from_u32)
            .filter(|&c| is_xml_char(c))
            .ok_or_else(|| {
                format!("character reference &#{digits}; does not refer to a valid XML character")
            })?;
        out.push(ch);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// `VersionNum ::= '1.' [0-9]+`
fn is_valid_version_num(s: &str) -> bool {
    s.strip_prefix("1.")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// `EncName ::= [A-Za-z] ([A-Za-z0-9._] | '-')*`
fn is_valid_encoding_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.first().is_some_and(u8::is_ascii_alphabetic)
        && bytes[1..]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens_with(input: &str, options: TokenizerOptions) -> Result<Vec<RawToken>, ParseError> {
        let mut tok = Tokenizer::new(input.to_string(), options);
        let mut out = Vec::new();
        while let Some(token) = tok.next_token()? {
            out.push(token);
        }
        Ok(out)
    }

    fn tokens(input: &str) -> Vec<RawToken> {
        tokens_with(input, TokenizerOptions::default()).unwrap()
    }

    #[test]
    fn test_simple_document() {
        assert_eq!(
            tokens("<a><b/>t</a>"),
            vec![
                RawToken::start("a"),
                RawToken::empty("b"),
                RawToken::text("t"),
                RawToken::end("a"),
            ]
        );
    }

    #[test]
    fn test_attributes_keep_order_and_quotes() {
        let toks = tokens("<a x='1' y=\"2\"/>");
        let RawToken::StartElement { attributes, .. } = &toks[0] else {
            panic!("expected start element");
        };
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name, "x");
        assert_eq!(attributes[0].quote, '\'');
        assert_eq!(attributes[1].value, "2");
        assert_eq!(attributes[1].quote, '"');
    }

    #[test]
    fn test_duplicate_attribute_is_fatal() {
        let err = tokens_with("<a x='1' x='2'/>", TokenizerOptions::default()).unwrap_err();
        assert!(err.message.contains("redefined"));
    }

    #[test]
    fn test_xml_declaration() {
        assert_eq!(
            tokens("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><r/>")[0],
            RawToken::XmlDeclaration {
                version: "1.0".to_string(),
                encoding: Some("UTF-8".to_string()),
                standalone: Some(true),
            }
        );
    }

    #[test]
    fn test_late_xml_declaration_is_fatal() {
        assert!(tokens_with("<r/><?xml version='1.0'?>", TokenizerOptions::default()).is_err());
    }

    #[test]
    fn test_cdata_kept_separate_by_default() {
        assert_eq!(
            tokens("<r>a<![CDATA[<b>]]>c</r>"),
            vec![
                RawToken::start("r"),
                RawToken::text("a"),
                RawToken::CData("<b>".to_string()),
                RawToken::text("c"),
                RawToken::end("r"),
            ]
        );
    }

    #[test]
    fn test_cdata_as_text_merges_run() {
        let toks = tokens_with(
            "<r>a<![CDATA[<b>]]>c</r>",
            TokenizerOptions::default().cdata_as_text(true),
        )
        .unwrap();
        assert_eq!(
            toks,
            vec![
                RawToken::start("r"),
                RawToken::text("a<b>c"),
                RawToken::end("r"),
            ]
        );
    }

    #[test]
    fn test_whitespace_tokens_and_no_blanks() {
        let xml = "<r>\n  <a/>\n</r>";
        assert_eq!(tokens(xml)[1], RawToken::Whitespace("\n  ".to_string()));
        let toks = tokens_with(xml, TokenizerOptions::default().no_blanks(true)).unwrap();
        assert_eq!(
            toks,
            vec![RawToken::start("r"), RawToken::empty("a"), RawToken::end("r")]
        );
    }

    #[test]
    fn test_whitespace_only_cdata_is_text() {
        let toks = tokens_with(
            "<r><![CDATA[ ]]></r>",
            TokenizerOptions::default().cdata_as_text(true).no_blanks(true),
        )
        .unwrap();
        assert_eq!(toks[1], RawToken::text(" "));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = tokens_with("<a></b>", TokenizerOptions::default()).unwrap_err();
        assert!(err.message.contains("mismatched end tag"));
        assert_eq!(err.location.line, 1);
    }

    #[test]
    fn test_truncated_content_is_end_of_input() {
        let mut tok = Tokenizer::new("<a><b/>".to_string(), TokenizerOptions::default());
        assert_eq!(tok.next_token().unwrap(), Some(RawToken::start("a")));
        assert_eq!(tok.next_token().unwrap(), Some(RawToken::empty("b")));
        assert_eq!(tok.next_token().unwrap(), None);
        assert_eq!(tok.diagnostics().len(), 1);
        assert!(tok.diagnostics()[0].message.contains("premature end of data"));
    }

    #[test]
    fn test_truncated_tag_is_fatal() {
        assert!(tokens_with("<a><b x='1", TokenizerOptions::default()).is_err());
    }

    #[test]
    fn test_empty_document() {
        let mut tok = Tokenizer::new(String::new(), TokenizerOptions::default());
        assert_eq!(tok.next_token().unwrap(), None);
        assert_eq!(tok.diagnostics()[0].message, "document is empty");
    }

    #[test]
    fn test_content_after_root_is_fatal() {
        let err = tokens_with("<a/><b/>", TokenizerOptions::default()).unwrap_err();
        assert!(err.message.contains("content after document element"));
    }

    #[test]
    fn test_text_before_root_is_fatal() {
        assert!(tokens_with("junk<a/>", TokenizerOptions::default()).is_err());
    }

    #[test]
    fn test_prolog_and_epilog_misc() {
        assert_eq!(
            tokens("<!--c--><?pi data?><r/><!--t-->"),
            vec![
                RawToken::Comment("c".to_string()),
                RawToken::ProcessingInstruction {
                    target: "pi".to_string(),
                    data: Some("data".to_string()),
                },
                RawToken::empty("r"),
                RawToken::Comment("t".to_string()),
            ]
        );
    }

    #[test]
    fn test_double_hyphen_in_comment_is_fatal() {
        assert!(tokens_with("<r><!-- a -- b --></r>", TokenizerOptions::default()).is_err());
    }

    #[test]
    fn test_doctype_with_internal_entities() {
        let toks = tokens("<!DOCTYPE r [<!ENTITY who \"world\">]><r>hello &who;</r>");
        let RawToken::DocumentType {
            name,
            internal_subset,
            ..
        } = &toks[0]
        else {
            panic!("expected doctype");
        };
        assert_eq!(name, "r");
        assert_eq!(internal_subset.as_deref(), Some("<!ENTITY who \"world\">"));
        assert_eq!(toks[2], RawToken::text("hello world"));
    }

    #[test]
    fn test_doctype_external_id() {
        let toks = tokens("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"x.dtd\"><html/>");
        assert_eq!(
            toks[0],
            RawToken::DocumentType {
                name: "html".to_string(),
                public_id: Some("-//W3C//DTD XHTML 1.0//EN".to_string()),
                system_id: Some("x.dtd".to_string()),
                internal_subset: None,
            }
        );
    }

    #[test]
    fn test_external_entity_reference_is_fatal() {
        let xml = "<!DOCTYPE r [<!ENTITY ext SYSTEM \"x.ent\">]><r>&ext;</r>";
        let err = tokens_with(xml, TokenizerOptions::default()).unwrap_err();
        assert!(err.message.contains("external entity"));
    }

    #[test]
    fn test_max_depth() {
        let opts = TokenizerOptions::default().max_depth(2);
        assert!(tokens_with("<a><b></b></a>", opts.clone()).is_ok());
        assert!(tokens_with("<a><b><c></c></b></a>", opts).is_err());
    }

    #[test]
    fn test_max_attributes() {
        let opts = TokenizerOptions::default().max_attributes(1);
        assert!(tokens_with("<a x='1' y='2'/>", opts).is_err());
    }

    #[test]
    fn test_invalid_qname() {
        assert!(tokens_with("<a:b:c/>", TokenizerOptions::default()).is_err());
    }

    #[test]
    fn test_cdata_end_in_text_is_fatal() {
        assert!(tokens_with("<r>a]]>b</r>", TokenizerOptions::default()).is_err());
    }

    #[test]
    fn test_no_tokens_after_error() {
        let mut tok = Tokenizer::new("<a></b><c/>".to_string(), TokenizerOptions::default());
        tok.next_token().unwrap();
        assert!(tok.next_token().is_err());
        assert_eq!(tok.next_token().unwrap(), None);
    }

    #[test]
    fn test_version_and_encoding_names() {
        assert!(is_valid_version_num("1.0"));
        assert!(!is_valid_version_num("2.0"));
        assert!(is_valid_encoding_name("ISO-8859-1"));
        assert!(!is_valid_encoding_name("8bit"));
    }

    #[test]
    fn test_scan_entity_declarations_ignores_parameter_entities() {
        let table = scan_entity_declarations(
            "<!ENTITY % pe 'x'><!ENTITY a 'A'><!ENTITY b PUBLIC 'p' 's'>",
        )
        .unwrap();
        assert_eq!(table.internal.get("a").map(String::as_str), Some("A"));
        assert!(!table.internal.contains_key("pe"));
        assert!(table.external.contains("b"));
    }

    #[test]
    fn test_char_refs_in_entity_value() {
        let toks = tokens("<!DOCTYPE r [<!ENTITY e \"caf&#233;&#x21;\">]><r>&e;</r>");
        assert_eq!(toks[2], RawToken::text("caf\u{e9}!"));
    }

    #[test]
    fn test_char_ref_yielding_reference_is_expanded_at_use() {
        let toks = tokens("<!DOCTYPE r [<!ENTITY e 'a&#38;amp;b'>]><r>&e;</r>");
        assert_eq!(toks[2], RawToken::text("a&b"));
    }

    #[test]
    fn test_invalid_char_ref_in_entity_value_is_fatal() {
        let err = tokens_with(
            "<!DOCTYPE r [<!ENTITY e '&#0;'>]><r/>",
            TokenizerOptions::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("valid XML character"));
        assert!(expand_char_refs("&#xZZ;").is_err());
        assert!(expand_char_refs("&#12").is_err());
    }
}
