//! The token stream the cursor navigates.
//!
//! A [`TokenSource`] yields [`RawToken`]s in document order: raw qualified
//! names, raw (entity-expanded) values, no namespace processing. The
//! cursor layers namespace scopes, attribute tables and depth on top, so
//! any source that produces well-nested tokens can drive it. [`Tokenizer`]
//! is the byte-level implementation shipped with the crate; [`TokenQueue`]
//! replays a prepared sequence, which is handy for exercising the cursor
//! against token shapes that are awkward to produce from text.

mod input;
mod xml;

use std::collections::VecDeque;

use crate::error::{ParseDiagnostic, ParseError};

pub use xml::Tokenizer;

pub(crate) const DEFAULT_MAX_DEPTH: u32 = 256;
pub(crate) const DEFAULT_MAX_ATTRIBUTES: u32 = 256;
pub(crate) const DEFAULT_MAX_NAME_LENGTH: usize = 50_000;
pub(crate) const DEFAULT_MAX_ENTITY_EXPANSIONS: u32 = 10_000;

/// An attribute exactly as written on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// The qualified name (`xmlns:p`, `x:id`, `id`).
    pub name: String,
    /// The normalized, entity-expanded value.
    pub value: String,
    /// The quote character that delimited the value.
    pub quote: char,
    /// Whether the attribute was supplied by a DTD default rather than
    /// written in the document.
    pub is_default: bool,
}

impl RawAttribute {
    /// Creates a written (non-default) attribute quoted with `"`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            quote: '"',
            is_default: false,
        }
    }
}

/// One event of the raw token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken {
    /// `<?xml version="1.0" ...?>`.
    XmlDeclaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    /// `<!DOCTYPE name ...>`.
    DocumentType {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        internal_subset: Option<String>,
    },
    /// A start tag, or a whole empty-element tag when `empty` is set.
    StartElement {
        name: String,
        attributes: Vec<RawAttribute>,
        empty: bool,
    },
    /// An end tag.
    EndElement { name: String },
    /// Character data (with CDATA sections folded in when the source is
    /// configured to do so).
    Text(String),
    /// A CDATA section kept as its own node.
    CData(String),
    /// Whitespace-only character data.
    Whitespace(String),
    /// `<!-- ... -->`.
    Comment(String),
    /// `<?target data?>`.
    ProcessingInstruction { target: String, data: Option<String> },
}

impl RawToken {
    /// Shorthand for a start tag with no attributes.
    pub fn start(name: impl Into<String>) -> Self {
        Self::StartElement {
            name: name.into(),
            attributes: Vec::new(),
            empty: false,
        }
    }

    /// Shorthand for an empty-element tag with no attributes.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::StartElement {
            name: name.into(),
            attributes: Vec::new(),
            empty: true,
        }
    }

    /// Shorthand for an end tag.
    pub fn end(name: impl Into<String>) -> Self {
        Self::EndElement { name: name.into() }
    }

    /// Shorthand for a text token.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns `true` for the character-data tokens `read_string` folds
    /// together.
    pub(crate) fn is_textual(&self) -> bool {
        matches!(self, Self::Text(_) | Self::CData(_) | Self::Whitespace(_))
    }
}

/// A pull source of raw tokens.
///
/// `Ok(None)` means the input is exhausted. After an `Err` the source is
/// not asked for more tokens.
pub trait TokenSource {
    /// Produces the next token in document order.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when the input is not well-formed.
    fn next_token(&mut self) -> Result<Option<RawToken>, ParseError>;

    /// Non-fatal diagnostics collected so far.
    fn diagnostics(&self) -> &[ParseDiagnostic] {
        &[]
    }
}

/// A [`TokenSource`] that replays a prepared sequence.
///
/// # Examples
///
/// ```
/// use xmlcursor::cursor::XmlCursor;
/// use xmlcursor::tokenizer::{RawToken, TokenQueue};
///
/// let tokens = TokenQueue::new(vec![RawToken::start("a"), RawToken::end("a")]);
/// let mut cursor = XmlCursor::from_source(tokens);
/// assert!(cursor.read());
/// assert!(cursor.element_has_qname("a"));
/// ```
#[derive(Debug, Default)]
pub struct TokenQueue {
    items: VecDeque<Result<RawToken, ParseError>>,
}

impl TokenQueue {
    /// Creates a queue from well-formed tokens.
    pub fn new(tokens: impl IntoIterator<Item = RawToken>) -> Self {
        Self {
            items: tokens.into_iter().map(Ok).collect(),
        }
    }

    /// Appends an error that will be reported after the queued tokens.
    #[must_use]
    pub fn then_fail(mut self, error: ParseError) -> Self {
        self.items.push_back(Err(error));
        self
    }
}

impl TokenSource for TokenQueue {
    fn next_token(&mut self) -> Result<Option<RawToken>, ParseError> {
        self.items.pop_front().transpose()
    }
}

/// Options for [`Tokenizer`].
///
/// ```
/// use xmlcursor::tokenizer::TokenizerOptions;
///
/// let opts = TokenizerOptions::default()
///     .cdata_as_text(true)
///     .no_blanks(true)
///     .max_depth(64);
/// assert!(opts.no_blanks);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Fold CDATA sections into the surrounding text.
    pub cdata_as_text: bool,
    /// Drop whitespace-only character data.
    pub no_blanks: bool,
    /// Maximum element nesting depth.
    pub max_depth: u32,
    /// Maximum number of attributes on a single element.
    pub max_attributes: u32,
    /// Maximum length in bytes of a name.
    pub max_name_length: usize,
    /// Maximum number of entity and character references expanded.
    pub max_entity_expansions: u32,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            cdata_as_text: false,
            no_blanks: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_entity_expansions: DEFAULT_MAX_ENTITY_EXPANSIONS,
        }
    }
}

impl TokenizerOptions {
    /// Enables or disables folding CDATA sections into text.
    #[must_use]
    pub fn cdata_as_text(mut self, yes: bool) -> Self {
        self.cdata_as_text = yes;
        self
    }

    /// Enables or disables dropping whitespace-only text.
    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the maximum number of attributes per element.
    #[must_use]
    pub fn max_attributes(mut self, max: u32) -> Self {
        self.max_attributes = max;
        self
    }

    /// Sets the maximum name length in bytes.
    #[must_use]
    pub fn max_name_length(mut self, max: usize) -> Self {
        self.max_name_length = max;
        self
    }

    /// Sets the maximum number of reference expansions.
    #[must_use]
    pub fn max_entity_expansions(mut self, max: u32) -> Self {
        self.max_entity_expansions = max;
        self
    }
}
