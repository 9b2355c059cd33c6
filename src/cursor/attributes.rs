//! The attribute table of the element the cursor is on.

use super::namespace::{declared_prefix, NamespaceResolver, XMLNS_NAMESPACE};
use crate::tokenizer::RawAttribute;
use crate::util::qname::split_qname;

/// One attribute of the current element, with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    /// Byte offset of the local part within `name`.
    local_start: usize,
    namespace_uri: Option<String>,
    value: String,
    quote: char,
    is_default: bool,
}

impl Attribute {
    /// The qualified name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part of the name after the prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.name[self.local_start..]
    }

    /// The prefix, if the name has one.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        (self.local_start > 0).then(|| &self.name[..self.local_start - 1])
    }

    /// The namespace URI. Unprefixed attributes have none; `xmlns` and
    /// `xmlns:p` are in [`XMLNS_NAMESPACE`].
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// The entity-expanded, normalized value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The quote character that delimited the value.
    #[must_use]
    pub fn quote_char(&self) -> char {
        self.quote
    }

    /// Whether the attribute came from a DTD default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    fn resolve(raw: RawAttribute, ns: &NamespaceResolver) -> Self {
        let (prefix, local) = split_qname(&raw.name);
        let local_start = raw.name.len() - local.len();
        let namespace_uri = if declared_prefix(&raw.name).is_some() {
            Some(XMLNS_NAMESPACE.to_string())
        } else {
            prefix.and_then(|p| ns.resolve(Some(p))).map(str::to_string)
        };
        Self {
            local_start,
            namespace_uri,
            value: raw.value,
            quote: raw.quote,
            is_default: raw.is_default,
            name: raw.name,
        }
    }
}

/// Ordered attributes of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AttributeTable {
    items: Vec<Attribute>,
}

impl AttributeTable {
    /// Builds the table for an element whose namespace declarations are
    /// already bound in `ns`.
    pub fn resolve(raw: Vec<RawAttribute>, ns: &NamespaceResolver) -> Self {
        Self {
            items: raw.into_iter().map(|a| Attribute::resolve(a, ns)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Index of the attribute whose qualified name is `qname`.
    pub fn position_of_qname(&self, qname: &str) -> Option<usize> {
        self.items.iter().position(|a| a.name == qname)
    }

    /// Index of the attribute with local name `local` in `namespace_uri`.
    /// An empty `namespace_uri` matches attributes in no namespace.
    pub fn position_of_local_name(&self, local: &str, namespace_uri: &str) -> Option<usize> {
        self.items.iter().position(|a| {
            a.local_name() == local && a.namespace_uri().unwrap_or("") == namespace_uri
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(attrs: &[(&str, &str)]) -> AttributeTable {
        let mut ns = NamespaceResolver::new();
        ns.push_scope();
        ns.bind(Some("x"), "urn:x");
        ns.bind(None, "urn:default");
        let raw = attrs
            .iter()
            .map(|(n, v)| RawAttribute::new(*n, *v))
            .collect();
        AttributeTable::resolve(raw, &ns)
    }

    #[test]
    fn test_names_split() {
        let t = table(&[("x:id", "1"), ("plain", "2")]);
        let a = t.get(0).unwrap();
        assert_eq!(a.name(), "x:id");
        assert_eq!(a.prefix(), Some("x"));
        assert_eq!(a.local_name(), "id");
        assert_eq!(a.namespace_uri(), Some("urn:x"));

        let b = t.get(1).unwrap();
        assert_eq!(b.prefix(), None);
        assert_eq!(b.local_name(), "plain");
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let t = table(&[("plain", "2")]);
        assert_eq!(t.get(0).unwrap().namespace_uri(), None);
    }

    #[test]
    fn test_declarations_are_in_xmlns_namespace() {
        let t = table(&[("xmlns", "urn:d"), ("xmlns:q", "urn:q")]);
        assert_eq!(t.get(0).unwrap().namespace_uri(), Some(XMLNS_NAMESPACE));
        assert_eq!(t.get(1).unwrap().namespace_uri(), Some(XMLNS_NAMESPACE));
        assert_eq!(t.get(1).unwrap().local_name(), "q");
    }

    #[test]
    fn test_xml_prefix_resolves() {
        let t = table(&[("xml:lang", "en")]);
        assert_eq!(
            t.get(0).unwrap().namespace_uri(),
            Some(super::super::namespace::XML_NAMESPACE)
        );
    }

    #[test]
    fn test_unbound_prefix_has_no_namespace() {
        let t = table(&[("zz:a", "1")]);
        assert_eq!(t.get(0).unwrap().namespace_uri(), None);
    }

    #[test]
    fn test_lookups() {
        let t = table(&[("a", "1"), ("x:a", "2")]);
        assert_eq!(t.position_of_qname("x:a"), Some(1));
        assert_eq!(t.position_of_qname("b"), None);
        assert_eq!(t.position_of_local_name("a", "urn:x"), Some(1));
        assert_eq!(t.position_of_local_name("a", ""), Some(0));
        assert_eq!(t.position_of_local_name("a", "urn:none"), None);
    }

    #[test]
    fn test_quote_and_default_flag_carried() {
        let mut ns = NamespaceResolver::new();
        ns.push_scope();
        let raw = vec![RawAttribute {
            name: "a".to_string(),
            value: "v".to_string(),
            quote: '\'',
            is_default: true,
        }];
        let t = AttributeTable::resolve(raw, &ns);
        let a = t.get(0).unwrap();
        assert_eq!(a.quote_char(), '\'');
        assert!(a.is_default());
        assert_eq!(t.len(), 1);
        assert!(!t.is_empty());
    }
}
