//! Node kinds, read states and the snapshot of the node under the cursor.

use std::fmt;

use super::attributes::AttributeTable;

/// The type of the node the cursor is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlNodeType {
    /// No node: before the first read, at end of input, after an error.
    None,
    /// An element start tag, e.g. `<div>` or `<br/>`.
    ///
    /// Self-closing elements do not produce a separate `EndElement` node.
    Element,
    /// An element end tag, e.g. `</div>`.
    EndElement,
    /// An attribute of the current element.
    Attribute,
    /// Character data. CDATA sections read through the byte tokenizer are
    /// merged into text.
    Text,
    /// A CDATA section, only seen with token sources that keep them apart.
    CData,
    /// Whitespace-only character data, only seen with token sources that
    /// report it.
    Whitespace,
    /// `<!-- comment -->`.
    Comment,
    /// `<?target data?>`.
    ProcessingInstruction,
    /// `<!DOCTYPE ...>`.
    DocumentType,
    /// `<?xml version="1.0"?>`.
    XmlDeclaration,
}

impl fmt::Display for XmlNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Element => "Element",
            Self::EndElement => "EndElement",
            Self::Attribute => "Attribute",
            Self::Text => "Text",
            Self::CData => "CDATA",
            Self::Whitespace => "Whitespace",
            Self::Comment => "Comment",
            Self::ProcessingInstruction => "ProcessingInstruction",
            Self::DocumentType => "DocumentType",
            Self::XmlDeclaration => "XmlDeclaration",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a cursor.
///
/// `Initial` → `Interactive` → `EndOfFile`, with `Error` and `Closed` as
/// terminal states reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadState {
    /// Created, not read yet.
    Initial,
    /// Positioned on a node.
    Interactive,
    /// The input is exhausted.
    EndOfFile,
    /// The input was malformed; see [`XmlCursor::error`](super::XmlCursor::error).
    Error,
    /// [`XmlCursor::close`](super::XmlCursor::close) was called.
    Closed,
}

impl fmt::Display for ReadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "Initial",
            Self::Interactive => "Interactive",
            Self::EndOfFile => "EndOfFile",
            Self::Error => "Error",
            Self::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// Where the cursor points within the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorPosition {
    /// On the node itself.
    #[default]
    OnNode,
    /// On the attribute with this index.
    OnAttribute(usize),
    /// On the text of the attribute with this index, entered through
    /// [`XmlCursor::read_attribute_value`](super::XmlCursor::read_attribute_value).
    OnAttributeValue(usize),
}

impl CursorPosition {
    /// The attribute index, when positioned on an attribute or its value.
    #[must_use]
    pub fn attribute_index(self) -> Option<usize> {
        match self {
            Self::OnNode => None,
            Self::OnAttribute(i) | Self::OnAttributeValue(i) => Some(i),
        }
    }
}

/// The in-scope value of `xml:space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum XmlSpace {
    /// No `xml:space` in scope.
    #[default]
    None,
    /// `xml:space="default"`.
    Default,
    /// `xml:space="preserve"`.
    Preserve,
}

/// Everything the accessors report about the node under the cursor.
/// Replaced wholesale on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeSnapshot {
    pub node_type: XmlNodeType,
    /// Qualified name; empty for nodes without one.
    pub name: String,
    /// Byte offset of the local part within `name`.
    pub local_start: usize,
    pub namespace_uri: Option<String>,
    pub value: Option<String>,
    pub depth: u32,
    pub is_empty_element: bool,
    pub attributes: AttributeTable,
    /// Public and system identifiers of a document type node.
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

impl NodeSnapshot {
    pub fn new(node_type: XmlNodeType, depth: u32) -> Self {
        Self {
            node_type,
            name: String::new(),
            local_start: 0,
            namespace_uri: None,
            value: None,
            depth,
            is_empty_element: false,
            attributes: AttributeTable::default(),
            public_id: None,
            system_id: None,
        }
    }

    pub fn none() -> Self {
        Self::new(XmlNodeType::None, 0)
    }

    #[must_use]
    pub fn with_name(mut self, name: String) -> Self {
        self.local_start = name.find(':').map_or(0, |colon| colon + 1);
        self.name = name;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    pub fn name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }

    pub fn local_name(&self) -> Option<&str> {
        self.name().map(|name| &name[self.local_start..])
    }

    pub fn prefix(&self) -> Option<&str> {
        (self.local_start > 0).then(|| &self.name[..self.local_start - 1])
    }
}
