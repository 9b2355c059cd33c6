//! Namespace scope tracking for the cursor.
//!
//! One frame is pushed per element the cursor enters and popped when the
//! cursor leaves it. Lookups walk the frames from the innermost outward.
//! The resolver knows nothing about tokens; the cursor drives it.

/// The namespace permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace permanently bound to the `xmlns` prefix, and the namespace
/// of every namespace declaration attribute.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A stack of prefix-to-URI binding frames.
///
/// The bottom frame holds the permanent `xml` and `xmlns` bindings and is
/// never popped.
///
/// # Examples
///
/// ```
/// use xmlcursor::cursor::namespace::NamespaceResolver;
///
/// let mut ns = NamespaceResolver::new();
/// ns.push_scope();
/// ns.bind(Some("p"), "u1");
/// ns.push_scope();
/// ns.bind(Some("p"), "u2");
/// assert_eq!(ns.resolve(Some("p")), Some("u2"));
/// ns.pop_scope();
/// assert_eq!(ns.resolve(Some("p")), Some("u1"));
/// ```
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    /// Binding frames, innermost last. A `None` prefix is the default
    /// namespace.
    stack: Vec<Vec<(Option<String>, String)>>,
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceResolver {
    /// Creates a resolver holding only the permanent bindings.
    #[must_use]
    pub fn new() -> Self {
        let base = vec![
            (Some("xml".to_string()), XML_NAMESPACE.to_string()),
            (Some("xmlns".to_string()), XMLNS_NAMESPACE.to_string()),
        ];
        Self { stack: vec![base] }
    }

    /// Opens an empty frame for an element.
    pub fn push_scope(&mut self) {
        self.stack.push(Vec::new());
    }

    /// Closes the innermost element frame.
    ///
    /// Returns `false`, and leaves the resolver untouched, when only the
    /// permanent frame is left.
    pub fn pop_scope(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Drops every element frame.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
    }

    /// Binds `prefix` to `uri` in the innermost frame. `None` is the default
    /// namespace; an empty `uri` undeclares it.
    ///
    /// The `xml` and `xmlns` prefixes can not be rebound; attempts are
    /// ignored.
    pub fn bind(&mut self, prefix: Option<&str>, uri: &str) {
        if matches!(prefix, Some("xml" | "xmlns")) || self.stack.len() == 1 {
            return;
        }
        if let Some(frame) = self.stack.last_mut() {
            frame.push((prefix.map(str::to_string), uri.to_string()));
        }
    }

    /// Resolves a prefix to its URI, innermost frame first.
    ///
    /// Returns `None` when the prefix is unbound, or when the innermost
    /// binding is empty (`xmlns=""`).
    #[must_use]
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        self.stack
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(p, _)| p.as_deref() == prefix)
            .and_then(|(_, uri)| (!uri.is_empty()).then_some(uri.as_str()))
    }

    /// Number of open element frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

/// Returns the prefix an `xmlns` / `xmlns:p` attribute declares, wrapped in
/// `Some`, or `None` when `name` is not a namespace declaration.
///
/// `xmlns` declares the default namespace, reported as `Some(None)`.
pub(crate) fn declared_prefix(name: &str) -> Option<Option<&str>> {
    if name == "xmlns" {
        Some(None)
    } else {
        name.strip_prefix("xmlns:").map(Some)
    }
}
