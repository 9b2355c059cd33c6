//! Pull-based cursor navigation over an XML token stream.
//!
//! [`XmlCursor`] walks a document one node at a time without building a
//! tree. Each call to [`XmlCursor::read`] moves to the next node in document
//! order; accessor methods describe the node under the cursor. Attributes
//! are visited with a second, independent cursor
//! ([`XmlCursor::move_to_first_attribute`] and friends) that never touches
//! the input.
//!
//! The read mode is fixed: CDATA sections come back as text merged with the
//! text around them, and whitespace-only text between markup is dropped.
//!
//! # Examples
//!
//! ```
//! use xmlcursor::cursor::{XmlCursor, XmlNodeType};
//!
//! let mut cursor = XmlCursor::new("<feed><entry id=\"1\">one</entry><entry id=\"2\"/></feed>");
//! let mut ids = Vec::new();
//!
//! while cursor.read_element() {
//!     if cursor.element_has_qname("entry") {
//!         ids.push(cursor.attribute_with_qname("id").unwrap_or_default().to_string());
//!     }
//! }
//!
//! assert_eq!(ids, vec!["1", "2"]);
//! assert!(cursor.is_eof());
//! ```

pub mod attributes;
mod markup;
pub mod namespace;
mod node;
mod options;

use tracing::{debug, trace};

use crate::encoding::{decode_to_utf8, decode_with, transcode, EncodingError, TextEncoding};
use crate::error::{ParseDiagnostic, ParseError};
use crate::tokenizer::{RawAttribute, RawToken, TokenSource, Tokenizer};
use crate::util::chars;
use crate::util::qname::qname_matches;

pub use attributes::Attribute;
use attributes::AttributeTable;
use namespace::{declared_prefix, NamespaceResolver};
pub use node::{CursorPosition, ReadState, XmlNodeType, XmlSpace};
use node::NodeSnapshot;
pub use options::CursorOptions;

/// `xml:base`, `xml:lang` and `xml:space` in effect for one open element.
#[derive(Debug, Clone, Default)]
struct ElementScope {
    base: Option<String>,
    lang: Option<String>,
    space: XmlSpace,
}

/// A forward-only cursor over an XML document.
///
/// The cursor owns its [`TokenSource`]. The default source is the crate's
/// [`Tokenizer`]; [`XmlCursor::from_source`] accepts any other.
///
/// Malformed input never surfaces as a `Result`: navigation returns `false`
/// and the cursor moves to [`ReadState::Error`], keeping the error for
/// [`XmlCursor::error`]. Calling a navigation method after
/// [`XmlCursor::close`], or addressing an attribute index that does not
/// exist, is a programming error and panics.
///
/// # Examples
///
/// ```
/// use xmlcursor::cursor::{XmlCursor, XmlNodeType};
///
/// let mut cursor = XmlCursor::new("<doc attr=\"val\">text</doc>");
///
/// assert!(cursor.read());
/// assert_eq!(cursor.node_type(), XmlNodeType::Element);
/// assert_eq!(cursor.name(), Some("doc"));
/// assert_eq!(cursor.depth(), 0);
/// assert_eq!(cursor.attribute_with_qname("attr"), Some("val"));
///
/// assert!(cursor.read());
/// assert_eq!(cursor.node_type(), XmlNodeType::Text);
/// assert_eq!(cursor.value(), Some("text"));
/// assert_eq!(cursor.depth(), 1);
///
/// assert!(cursor.read());
/// assert_eq!(cursor.node_type(), XmlNodeType::EndElement);
/// assert_eq!(cursor.depth(), 0);
///
/// assert!(!cursor.read());
/// assert!(cursor.is_eof());
/// ```
pub struct XmlCursor<T: TokenSource = Tokenizer> {
    /// `None` once the cursor is closed.
    source: Option<T>,
    options: CursorOptions,
    state: ReadState,
    position: CursorPosition,
    current: NodeSnapshot,
    ns: NamespaceResolver,
    /// One entry per open element, kept in step with the namespace frames.
    scopes: Vec<ElementScope>,
    /// Number of elements the cursor is inside of, the current one included.
    open_elements: u32,
    /// The current node is an empty element or an end tag; its scope is
    /// closed at the start of the next read.
    pending_pop: bool,
    /// One token read ahead by `read_string`.
    lookahead: Option<Result<Option<RawToken>, ParseError>>,
    error: Option<ParseError>,
}

impl XmlCursor<Tokenizer> {
    /// Creates a cursor over a UTF-8 string.
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new("<root/>");
    /// assert!(cursor.read());
    /// ```
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self::with_options(input, CursorOptions::default())
    }

    /// Creates a cursor over a UTF-8 string with custom options.
    ///
    /// ```
    /// use xmlcursor::cursor::{CursorOptions, XmlCursor};
    ///
    /// let opts = CursorOptions::default().base_uri("http://example.com/");
    /// let mut cursor = XmlCursor::with_options("<root/>", opts);
    /// cursor.read();
    /// assert_eq!(cursor.base_uri(), Some("http://example.com/"));
    /// ```
    #[must_use]
    pub fn with_options(input: impl Into<String>, options: CursorOptions) -> Self {
        let tokenizer = Tokenizer::new(input.into(), options.tokenizer_options());
        Self::with_source(tokenizer, options)
    }

    /// Creates a cursor over `bytes` in the given platform encoding.
    ///
    /// The encoding is mapped to its IANA registered name before decoding.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` when the encoding has no IANA name or no
    /// decoder, or when `bytes` are malformed for it.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    /// use xmlcursor::encoding::TextEncoding;
    ///
    /// let mut cursor = XmlCursor::create(b"<p>caf\xE9</p>", TextEncoding::IsoLatin1).unwrap();
    /// cursor.read();
    /// assert_eq!(cursor.read_string(), "caf\u{e9}");
    ///
    /// assert!(XmlCursor::create(b"<p/>", TextEncoding::Symbol).is_err());
    /// ```
    pub fn create(bytes: &[u8], encoding: TextEncoding) -> Result<Self, EncodingError> {
        let (text, name) = decode_with(bytes, encoding)?;
        debug!(encoding = name, "cursor created");
        Ok(Self::with_options(text, CursorOptions::default()))
    }

    /// Creates a cursor over `bytes` in the encoding named by `label`
    /// (`"utf-8"`, `"latin1"`, `"Shift_JIS"`, ...).
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` for unknown labels and malformed input.
    pub fn create_with_label(bytes: &[u8], label: &str) -> Result<Self, EncodingError> {
        let text = transcode(bytes, label.trim())?;
        debug!(encoding = label, "cursor created");
        Ok(Self::with_options(text, CursorOptions::default()))
    }

    /// Creates a cursor over `bytes`, detecting the encoding from the byte
    /// order mark and the XML declaration.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` when the detected encoding is unsupported or
    /// the bytes are malformed for it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        let text = decode_to_utf8(bytes)?;
        debug!("cursor created from sniffed encoding");
        Ok(Self::with_options(text, CursorOptions::default()))
    }

    /// Returns `true` if `s` is an XML `Name`. See [`chars::is_name`].
    #[must_use]
    pub fn is_name(s: &str) -> bool {
        chars::is_name(s)
    }

    /// Returns `true` if `s` is an XML `Nmtoken`. See
    /// [`chars::is_name_token`].
    #[must_use]
    pub fn is_name_token(s: &str) -> bool {
        chars::is_name_token(s)
    }
}

impl<T: TokenSource> XmlCursor<T> {
    /// Creates a cursor driven by an arbitrary token source.
    pub fn from_source(source: T) -> Self {
        Self::with_source(source, CursorOptions::default())
    }

    fn with_source(source: T, options: CursorOptions) -> Self {
        Self {
            source: Some(source),
            options,
            state: ReadState::Initial,
            position: CursorPosition::OnNode,
            current: NodeSnapshot::none(),
            ns: NamespaceResolver::new(),
            scopes: Vec::new(),
            open_elements: 0,
            pending_pop: false,
            lookahead: None,
            error: None,
        }
    }

    // === Navigation ===

    /// Moves to the next node in document order.
    ///
    /// Returns `false` at end of input ([`ReadState::EndOfFile`]) and on
    /// malformed input ([`ReadState::Error`]); both are final. The attribute
    /// cursor is reset to the node.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read(&mut self) -> bool {
        self.assert_open("read");
        self.position = CursorPosition::OnNode;
        if matches!(self.state, ReadState::EndOfFile | ReadState::Error) {
            return false;
        }
        if self.pending_pop {
            self.leave_element();
        }

        match self.next_raw() {
            Ok(Some(token)) => {
                self.enter(token);
                self.state = ReadState::Interactive;
                trace!(
                    node_type = %self.current.node_type,
                    name = %self.current.name,
                    depth = self.current.depth,
                    "node"
                );
                true
            }
            Ok(None) => {
                debug!("end of input");
                self.finish(ReadState::EndOfFile);
                false
            }
            Err(err) => {
                debug!(error = %err, "malformed input");
                self.error = Some(err);
                self.finish(ReadState::Error);
                false
            }
        }
    }

    /// Reads until the cursor is on an element start tag.
    ///
    /// Returns `false` at end of input or on malformed input.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read_element(&mut self) -> bool {
        self.assert_open("read_element");
        while self.read() {
            if self.current.node_type == XmlNodeType::Element {
                return true;
            }
        }
        false
    }

    /// Reads until the next element start tag, stopping early at the end
    /// tag of the container named `qname`.
    ///
    /// The stop applies to an end tag with that qualified name that is no
    /// deeper than the node the scan starts from, so the loop below visits
    /// the children of `items` whether it starts on `items` or on one of
    /// them. After a stop the cursor sits on the end tag and the state is
    /// still [`ReadState::Interactive`]; running out of input leaves
    /// [`ReadState::EndOfFile`] instead.
    ///
    /// ```
    /// use xmlcursor::cursor::{ReadState, XmlCursor};
    ///
    /// let mut cursor = XmlCursor::new("<items><x/><y/></items>");
    /// cursor.read();
    /// let mut seen = Vec::new();
    /// while cursor.read_element_until("items") {
    ///     seen.push(cursor.name().unwrap_or_default().to_string());
    /// }
    /// assert_eq!(seen, vec!["x", "y"]);
    /// assert_eq!(cursor.read_state(), ReadState::Interactive);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read_element_until(&mut self, qname: &str) -> bool {
        self.assert_open("read_element_until");
        let stop_depth = self.current.depth;
        while self.read() {
            match self.current.node_type {
                XmlNodeType::Element => return true,
                XmlNodeType::EndElement
                    if self.current.depth <= stop_depth && self.current_has_qname(qname) =>
                {
                    trace!(qname, "soft stop");
                    return false;
                }
                _ => {}
            }
        }
        false
    }

    /// Skips the current element with all of its content and moves to the
    /// node that follows it.
    ///
    /// On an attribute, skips the owning element. On any other node this is
    /// a single [`read`](Self::read).
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new("<r><a><a/></a><b/></r>");
    /// cursor.read();
    /// cursor.read();
    /// assert!(cursor.skip());
    /// assert_eq!(cursor.name(), Some("b"));
    /// assert_eq!(cursor.depth(), 1);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn skip(&mut self) -> bool {
        self.assert_open("skip");
        self.position = CursorPosition::OnNode;
        if self.on_open_element() {
            let depth = self.current.depth;
            while self.read() {
                if self.is_end_of(depth) {
                    break;
                }
            }
        }
        self.read()
    }

    /// Returns the markup of the current element's content and moves past
    /// the element.
    ///
    /// On an attribute, returns its value without moving. On other nodes,
    /// returns an empty string without moving.
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new("<r><p>a <b>bold</b> move</p><q/></r>");
    /// cursor.read();
    /// cursor.read();
    /// assert_eq!(cursor.read_inner_xml(), "a <b>bold</b> move");
    /// assert_eq!(cursor.name(), Some("q"));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read_inner_xml(&mut self) -> String {
        self.assert_open("read_inner_xml");
        if let Some(attr) = self.current_attribute() {
            return attr.value().to_string();
        }
        let mut out = String::new();
        if self.state != ReadState::Interactive
            || self.current.node_type != XmlNodeType::Element
        {
            return out;
        }
        self.capture_content(&mut out, false);
        out
    }

    /// Returns the markup of the current node, its own tags included, and
    /// moves past it.
    ///
    /// On an attribute, returns `name="value"` without moving. On an end
    /// tag, or when not positioned on a node, returns an empty string
    /// without moving.
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new("<r><e k='v'>x<!--c--></e></r>");
    /// cursor.read();
    /// cursor.read();
    /// assert_eq!(cursor.read_outer_xml(), "<e k='v'>x<!--c--></e>");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read_outer_xml(&mut self) -> String {
        self.assert_open("read_outer_xml");
        let mut out = String::new();
        if let Some(attr) = self.current_attribute() {
            markup::write_attribute(&mut out, attr);
            return out;
        }
        if self.state != ReadState::Interactive {
            return out;
        }
        match self.current.node_type {
            XmlNodeType::EndElement | XmlNodeType::None => {}
            XmlNodeType::Element => {
                markup::write_node(&mut out, &self.current);
                self.capture_content(&mut out, true);
            }
            _ => {
                markup::write_node(&mut out, &self.current);
                self.read();
            }
        }
        out
    }

    /// Returns the text of the current node joined with the character
    /// data that immediately follows it.
    ///
    /// On an element with content, collects its leading text children.
    /// Stops in front of the first node that is not character data, leaving
    /// it unread; the cursor ends on the last text node consumed. On an
    /// attribute, returns the attribute value.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read_string(&mut self) -> String {
        self.assert_open("read_string");
        if let Some(attr) = self.current_attribute() {
            return attr.value().to_string();
        }
        let mut out = String::new();
        if self.state != ReadState::Interactive {
            return out;
        }
        match self.current.node_type {
            XmlNodeType::Text | XmlNodeType::CData | XmlNodeType::Whitespace => {
                out.push_str(self.current.value.as_deref().unwrap_or(""));
            }
            XmlNodeType::Element if !self.current.is_empty_element => {}
            _ => return out,
        }
        while self.peek_raw().is_some_and(RawToken::is_textual) && self.read() {
            out.push_str(self.current.value.as_deref().unwrap_or(""));
        }
        out
    }

    /// Moves from an attribute onto its value, which reads as a text node
    /// one level below the attribute.
    ///
    /// Returns `false` when not positioned on an attribute, including when
    /// already on the value.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn read_attribute_value(&mut self) -> bool {
        self.assert_open("read_attribute_value");
        match self.position {
            CursorPosition::OnAttribute(index) => {
                self.position = CursorPosition::OnAttributeValue(index);
                true
            }
            CursorPosition::OnNode | CursorPosition::OnAttributeValue(_) => false,
        }
    }

    /// Releases the token source and all scope tables.
    ///
    /// Idempotent. Every navigation method panics afterwards; accessors keep
    /// working and describe no node.
    pub fn close(&mut self) {
        if self.state == ReadState::Closed {
            return;
        }
        self.source = None;
        self.lookahead = None;
        self.finish(ReadState::Closed);
        self.position = CursorPosition::OnNode;
        debug!("cursor closed");
    }

    // === Attribute cursor ===

    /// Number of attributes of the current element (or of the element
    /// owning the current attribute). Zero on other nodes.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.current.attributes.len()
    }

    /// Returns `true` if [`attribute_count`](Self::attribute_count) is
    /// non-zero.
    #[must_use]
    pub fn has_attributes(&self) -> bool {
        !self.current.attributes.is_empty()
    }

    /// The value of the attribute at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= attribute_count()`.
    #[must_use]
    pub fn attribute_at_index(&self, index: usize) -> &str {
        match self.current.attributes.get(index) {
            Some(attr) => attr.value(),
            None => panic!(
                "XmlCursor::attribute_at_index: index {index} out of range (attribute count {})",
                self.attribute_count()
            ),
        }
    }

    /// The value of the attribute with qualified name `qname`.
    #[must_use]
    pub fn attribute_with_qname(&self, qname: &str) -> Option<&str> {
        let index = self.current.attributes.position_of_qname(qname)?;
        self.current.attributes.get(index).map(Attribute::value)
    }

    /// The value of the attribute with local name `local` in namespace
    /// `namespace_uri`. An empty `namespace_uri` selects attributes in no
    /// namespace.
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new(r#"<r xmlns:x="urn:x" x:id="1" id="2"/>"#);
    /// cursor.read();
    /// assert_eq!(cursor.attribute_with_local_name("id", "urn:x"), Some("1"));
    /// assert_eq!(cursor.attribute_with_local_name("id", ""), Some("2"));
    /// ```
    #[must_use]
    pub fn attribute_with_local_name(&self, local: &str, namespace_uri: &str) -> Option<&str> {
        let index = self
            .current
            .attributes
            .position_of_local_name(local, namespace_uri)?;
        self.current.attributes.get(index).map(Attribute::value)
    }

    /// Moves the attribute cursor to the attribute at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= attribute_count()` or the cursor has been
    /// closed.
    pub fn move_to_attribute_at_index(&mut self, index: usize) {
        self.assert_open("move_to_attribute_at_index");
        assert!(
            index < self.attribute_count(),
            "XmlCursor::move_to_attribute_at_index: index {index} out of range (attribute count {})",
            self.attribute_count()
        );
        self.position = CursorPosition::OnAttribute(index);
    }

    /// Moves to the attribute with qualified name `qname`. On a miss the
    /// position is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn move_to_attribute_with_qname(&mut self, qname: &str) -> bool {
        self.assert_open("move_to_attribute_with_qname");
        let found = self.current.attributes.position_of_qname(qname);
        self.move_to_found(found)
    }

    /// Moves to the attribute with local name `local` in `namespace_uri`.
    /// On a miss the position is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn move_to_attribute_with_local_name(&mut self, local: &str, namespace_uri: &str) -> bool {
        self.assert_open("move_to_attribute_with_local_name");
        let found = self
            .current
            .attributes
            .position_of_local_name(local, namespace_uri);
        self.move_to_found(found)
    }

    /// Moves to the first attribute. Returns `false` when there is none.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn move_to_first_attribute(&mut self) -> bool {
        self.assert_open("move_to_first_attribute");
        let found = (!self.current.attributes.is_empty()).then_some(0);
        self.move_to_found(found)
    }

    /// Moves to the next attribute, or to the first one when on the node.
    ///
    /// On the last attribute, returns `false` and stays there.
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new("<root a=\"1\" b=\"2\"/>");
    /// cursor.read();
    /// assert!(cursor.move_to_next_attribute());
    /// assert_eq!(cursor.name(), Some("a"));
    /// assert!(cursor.move_to_next_attribute());
    /// assert_eq!(cursor.name(), Some("b"));
    /// assert!(!cursor.move_to_next_attribute());
    /// assert_eq!(cursor.name(), Some("b"));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn move_to_next_attribute(&mut self) -> bool {
        self.assert_open("move_to_next_attribute");
        match self.position {
            CursorPosition::OnNode => self.move_to_first_attribute(),
            CursorPosition::OnAttribute(index) | CursorPosition::OnAttributeValue(index) => {
                let next = index + 1;
                self.move_to_found((next < self.attribute_count()).then_some(next))
            }
        }
    }

    /// Returns from an attribute to its element. Returns `true` if the
    /// cursor was on an attribute.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has been closed.
    pub fn move_to_element(&mut self) -> bool {
        self.assert_open("move_to_element");
        let moved = self.position != CursorPosition::OnNode;
        self.position = CursorPosition::OnNode;
        moved
    }

    /// The attribute cursor's index, if it is on an attribute.
    #[must_use]
    pub fn attribute_index(&self) -> Option<usize> {
        self.position.attribute_index()
    }

    /// The attributes of the current element, in document order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.current.attributes.iter()
    }

    // === Names ===

    /// Returns `true` if the current node's qualified name is `qname`.
    #[must_use]
    pub fn element_has_qname(&self, qname: &str) -> bool {
        self.local_name()
            .is_some_and(|local| qname_matches(self.prefix(), local, qname))
    }

    fn current_has_qname(&self, qname: &str) -> bool {
        self.current
            .local_name()
            .is_some_and(|local| qname_matches(self.current.prefix(), local, qname))
    }

    /// Returns `true` if the current node's local name is `local`.
    #[must_use]
    pub fn element_has_name(&self, local: &str) -> bool {
        self.local_name() == Some(local)
    }

    /// Resolves `prefix` in the scope of the current node. The empty
    /// prefix is the default namespace; `xml` is always bound.
    ///
    /// ```
    /// use xmlcursor::cursor::XmlCursor;
    ///
    /// let mut cursor = XmlCursor::new(r#"<a xmlns:p="u1"><b xmlns:p="u2"/></a>"#);
    /// cursor.read();
    /// cursor.read();
    /// assert_eq!(cursor.lookup_namespace("p"), Some("u2"));
    /// cursor.read();
    /// assert_eq!(cursor.lookup_namespace("p"), Some("u1"));
    /// assert_eq!(cursor.lookup_namespace(""), None);
    /// ```
    #[must_use]
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.ns.resolve((!prefix.is_empty()).then_some(prefix))
    }

    // === Node accessors ===

    /// The type of the current node.
    #[must_use]
    pub fn node_type(&self) -> XmlNodeType {
        match self.position {
            CursorPosition::OnNode => self.current.node_type,
            CursorPosition::OnAttribute(_) => XmlNodeType::Attribute,
            CursorPosition::OnAttributeValue(_) => XmlNodeType::Text,
        }
    }

    /// The qualified name of the current node.
    ///
    /// Elements, end tags and attributes report their name, processing
    /// instructions their target, the document type its root name and the
    /// XML declaration `xml`. Character data and comments have none.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.position {
            CursorPosition::OnNode => self.current.name(),
            CursorPosition::OnAttribute(_) => self.current_attribute().map(Attribute::name),
            CursorPosition::OnAttributeValue(_) => None,
        }
    }

    /// The local part of [`name`](Self::name).
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        match self.position {
            CursorPosition::OnNode => self.current.local_name(),
            CursorPosition::OnAttribute(_) => self.current_attribute().map(Attribute::local_name),
            CursorPosition::OnAttributeValue(_) => None,
        }
    }

    /// The prefix of [`name`](Self::name), if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        match self.position {
            CursorPosition::OnNode => self.current.prefix(),
            CursorPosition::OnAttribute(_) => self.current_attribute().and_then(Attribute::prefix),
            CursorPosition::OnAttributeValue(_) => None,
        }
    }

    /// The namespace URI of the current element, end tag or attribute.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        match self.position {
            CursorPosition::OnNode => self.current.namespace_uri.as_deref(),
            CursorPosition::OnAttribute(_) => {
                self.current_attribute().and_then(Attribute::namespace_uri)
            }
            CursorPosition::OnAttributeValue(_) => None,
        }
    }

    /// The value of the current node.
    ///
    /// Text, comments, processing instruction data, attributes and their
    /// values carry one. The XML declaration reports its pseudo-attributes
    /// and the document type its internal subset.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self.position {
            CursorPosition::OnNode => self.current.value.as_deref(),
            CursorPosition::OnAttribute(_) | CursorPosition::OnAttributeValue(_) => {
                self.current_attribute().map(Attribute::value)
            }
        }
    }

    /// Returns `true` if [`value`](Self::value) is `Some`.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value().is_some()
    }

    /// Nesting depth of the current node. The root element is at depth 0,
    /// its end tag too; attributes are one deeper than their element and
    /// attribute values two.
    #[must_use]
    pub fn depth(&self) -> u32 {
        match self.position {
            CursorPosition::OnNode => self.current.depth,
            CursorPosition::OnAttribute(_) => self.current.depth + 1,
            CursorPosition::OnAttributeValue(_) => self.current.depth + 2,
        }
    }

    /// Returns `true` on an element written as `<name/>`.
    #[must_use]
    pub fn is_empty_element(&self) -> bool {
        self.position == CursorPosition::OnNode && self.current.is_empty_element
    }

    /// Returns `true` on an attribute supplied by a DTD default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.current_attribute().is_some_and(Attribute::is_default)
    }

    /// The quote character of the current attribute; `"` elsewhere.
    #[must_use]
    pub fn quote_char(&self) -> char {
        self.current_attribute().map_or('"', Attribute::quote_char)
    }

    /// The innermost `xml:base` in scope, else the configured base URI.
    #[must_use]
    pub fn base_uri(&self) -> Option<&str> {
        self.scopes
            .last()
            .and_then(|scope| scope.base.as_deref())
            .or(self.options.base_uri.as_deref())
    }

    /// The innermost `xml:lang` in scope.
    #[must_use]
    pub fn xml_lang(&self) -> Option<&str> {
        self.scopes.last().and_then(|scope| scope.lang.as_deref())
    }

    /// The innermost `xml:space` in scope.
    #[must_use]
    pub fn xml_space(&self) -> XmlSpace {
        self.scopes.last().map_or(XmlSpace::None, |scope| scope.space)
    }

    /// The cursor's lifecycle state.
    #[must_use]
    pub fn read_state(&self) -> ReadState {
        self.state
    }

    /// Returns `true` once the input is exhausted.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.state == ReadState::EndOfFile
    }

    /// The error that moved the cursor to [`ReadState::Error`].
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Non-fatal diagnostics reported by the token source.
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        match &self.source {
            Some(source) => source.diagnostics(),
            None => &[],
        }
    }

    // === Internal ===

    fn assert_open(&self, operation: &str) {
        assert!(
            self.state != ReadState::Closed,
            "XmlCursor::{operation} called on a closed cursor"
        );
    }

    fn current_attribute(&self) -> Option<&Attribute> {
        self.position
            .attribute_index()
            .and_then(|index| self.current.attributes.get(index))
    }

    fn move_to_found(&mut self, found: Option<usize>) -> bool {
        match found {
            Some(index) => {
                self.position = CursorPosition::OnAttribute(index);
                true
            }
            None => false,
        }
    }

    fn on_open_element(&self) -> bool {
        self.state == ReadState::Interactive
            && self.current.node_type == XmlNodeType::Element
            && !self.current.is_empty_element
    }

    fn is_end_of(&self, depth: u32) -> bool {
        self.current.node_type == XmlNodeType::EndElement && self.current.depth == depth
    }

    /// Writes the content of the current element to `out`, its end tag too
    /// when `with_end_tag` is set, and moves past the element.
    fn capture_content(&mut self, out: &mut String, with_end_tag: bool) {
        if self.current.is_empty_element {
            self.read();
            return;
        }
        let depth = self.current.depth;
        while self.read() {
            if self.is_end_of(depth) {
                if with_end_tag {
                    markup::write_node(out, &self.current);
                }
                self.read();
                return;
            }
            markup::write_node(out, &self.current);
        }
    }

    fn next_raw(&mut self) -> Result<Option<RawToken>, ParseError> {
        if let Some(ahead) = self.lookahead.take() {
            return ahead;
        }
        match self.source.as_mut() {
            Some(source) => source.next_token(),
            None => Ok(None),
        }
    }

    fn peek_raw(&mut self) -> Option<&RawToken> {
        if self.lookahead.is_none() {
            let next = match self.source.as_mut() {
                Some(source) => source.next_token(),
                None => Ok(None),
            };
            self.lookahead = Some(next);
        }
        match &self.lookahead {
            Some(Ok(Some(token))) => Some(token),
            _ => None,
        }
    }

    fn enter(&mut self, token: RawToken) {
        let depth = self.open_elements;
        self.current = match token {
            RawToken::StartElement {
                name,
                attributes,
                empty,
            } => self.enter_element(name, attributes, empty),
            RawToken::EndElement { name } => {
                self.pending_pop = true;
                let mut node = NodeSnapshot::new(XmlNodeType::EndElement, depth.saturating_sub(1))
                    .with_name(name);
                node.namespace_uri = self.ns.resolve(node.prefix()).map(str::to_string);
                node
            }
            RawToken::Text(text) => NodeSnapshot::new(XmlNodeType::Text, depth).with_value(Some(text)),
            RawToken::CData(text) => {
                NodeSnapshot::new(XmlNodeType::CData, depth).with_value(Some(text))
            }
            RawToken::Whitespace(text) => {
                NodeSnapshot::new(XmlNodeType::Whitespace, depth).with_value(Some(text))
            }
            RawToken::Comment(text) => {
                NodeSnapshot::new(XmlNodeType::Comment, depth).with_value(Some(text))
            }
            RawToken::ProcessingInstruction { target, data } => {
                NodeSnapshot::new(XmlNodeType::ProcessingInstruction, depth)
                    .with_name(target)
                    .with_value(data)
            }
            RawToken::XmlDeclaration {
                version,
                encoding,
                standalone,
            } => {
                let mut decl = format!("version=\"{version}\"");
                if let Some(encoding) = encoding {
                    decl.push_str(&format!(" encoding=\"{encoding}\""));
                }
                if let Some(standalone) = standalone {
                    let yes_no = if standalone { "yes" } else { "no" };
                    decl.push_str(&format!(" standalone=\"{yes_no}\""));
                }
                NodeSnapshot::new(XmlNodeType::XmlDeclaration, depth)
                    .with_name("xml".to_string())
                    .with_value(Some(decl))
            }
            RawToken::DocumentType {
                name,
                public_id,
                system_id,
                internal_subset,
            } => {
                let mut node = NodeSnapshot::new(XmlNodeType::DocumentType, depth)
                    .with_name(name)
                    .with_value(internal_subset);
                node.public_id = public_id;
                node.system_id = system_id;
                node
            }
        };
    }

    fn enter_element(
        &mut self,
        name: String,
        attributes: Vec<RawAttribute>,
        empty: bool,
    ) -> NodeSnapshot {
        let depth = self.open_elements;
        self.ns.push_scope();
        let mut scope = self.scopes.last().cloned().unwrap_or_default();
        for attr in &attributes {
            if let Some(prefix) = declared_prefix(&attr.name) {
                self.ns.bind(prefix, &attr.value);
            }
            match attr.name.as_str() {
                "xml:base" => scope.base = Some(attr.value.clone()),
                "xml:lang" => scope.lang = Some(attr.value.clone()),
                "xml:space" => match attr.value.as_str() {
                    "preserve" => scope.space = XmlSpace::Preserve,
                    "default" => scope.space = XmlSpace::Default,
                    _ => {}
                },
                _ => {}
            }
        }
        self.scopes.push(scope);
        self.open_elements += 1;
        self.pending_pop = empty;

        let mut node = NodeSnapshot::new(XmlNodeType::Element, depth).with_name(name);
        node.namespace_uri = self.ns.resolve(node.prefix()).map(str::to_string);
        node.is_empty_element = empty;
        node.attributes = AttributeTable::resolve(attributes, &self.ns);
        node
    }

    fn leave_element(&mut self) {
        self.pending_pop = false;
        self.ns.pop_scope();
        self.scopes.pop();
        self.open_elements = self.open_elements.saturating_sub(1);
    }

    fn finish(&mut self, state: ReadState) {
        self.state = state;
        self.current = NodeSnapshot::none();
        self.ns.reset();
        self.scopes.clear();
        self.open_elements = 0;
        self.pending_pop = false;
        self.lookahead = None;
    }
}
