//! Cursor configuration.

use crate::tokenizer::{
    TokenizerOptions, DEFAULT_MAX_ATTRIBUTES, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENTITY_EXPANSIONS,
    DEFAULT_MAX_NAME_LENGTH,
};

/// Options fixed for the lifetime of an [`XmlCursor`](super::XmlCursor).
///
/// The read mode itself is not configurable: CDATA sections always come
/// back as text merged with their neighbours, and whitespace-only text
/// between markup is never surfaced.
///
/// ```
/// use xmlcursor::cursor::CursorOptions;
///
/// let opts = CursorOptions::default()
///     .base_uri("http://example.com/feed.xml")
///     .max_depth(64);
/// assert_eq!(opts.max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorOptions {
    /// Base URI reported when no `xml:base` is in scope.
    pub base_uri: Option<String>,

    // -- Security limits --
    /// Maximum element nesting depth (default: 256).
    pub max_depth: u32,
    /// Maximum length in bytes of a name (default: 50,000).
    pub max_name_length: usize,
    /// Maximum number of attributes on a single element (default: 256).
    pub max_attributes: u32,
    /// Maximum number of entity and character references expanded
    /// (default: 10,000).
    pub max_entity_expansions: u32,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            base_uri: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            max_entity_expansions: DEFAULT_MAX_ENTITY_EXPANSIONS,
        }
    }
}

impl CursorOptions {
    /// Sets the base URI of the document.
    #[must_use]
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the maximum name length in bytes.
    #[must_use]
    pub fn max_name_length(mut self, max: usize) -> Self {
        self.max_name_length = max;
        self
    }

    /// Sets the maximum number of attributes per element.
    #[must_use]
    pub fn max_attributes(mut self, max: u32) -> Self {
        self.max_attributes = max;
        self
    }

    /// Sets the maximum number of reference expansions.
    #[must_use]
    pub fn max_entity_expansions(mut self, max: u32) -> Self {
        self.max_entity_expansions = max;
        self
    }

    /// The tokenizer configuration the cursor runs with.
    pub(crate) fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions::default()
            .cdata_as_text(true)
            .no_blanks(true)
            .max_depth(self.max_depth)
            .max_name_length(self.max_name_length)
            .max_attributes(self.max_attributes)
            .max_entity_expansions(self.max_entity_expansions)
    }
}
