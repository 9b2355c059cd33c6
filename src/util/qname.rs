//! `QName` (qualified name) handling.
//!
//! A `QName` is a name of the form `prefix:localname` or just `localname`.
//! The cursor compares names as plain strings: `element_has_qname` matches
//! the full lexical form, `element_has_name` only the local part.
//!
//! See <https://www.w3.org/TR/xml-names/#NT-QName>

/// Splits a `QName` into its prefix and local name parts.
///
/// Only the first colon separates the parts.
///
/// # Examples
///
/// ```
/// use xmlcursor::util::qname::split_qname;
///
/// assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
/// assert_eq!(split_qname("div"), (None, "div"));
/// ```
#[must_use]
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.find(':') {
        Some(pos) => (Some(&qname[..pos]), &qname[pos + 1..]),
        None => (None, qname),
    }
}

/// Returns `true` if the `(prefix, local)` pair spells exactly `qname`.
///
/// No string is allocated; the comparison walks the two halves.
///
/// # Examples
///
/// ```
/// use xmlcursor::util::qname::qname_matches;
///
/// assert!(qname_matches(Some("x"), "item", "x:item"));
/// assert!(qname_matches(None, "item", "item"));
/// assert!(!qname_matches(None, "item", "x:item"));
/// ```
#[must_use]
pub fn qname_matches(prefix: Option<&str>, local: &str, qname: &str) -> bool {
    match prefix {
        Some(pfx) => qname
            .strip_prefix(pfx)
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|rest| rest == local),
        None => qname == local,
    }
}

/// Validates that a name is a legal `QName` per Namespaces in XML 1.0 §4.
///
/// Returns a message describing the problem, or `None` if valid.
pub(crate) fn validate_qname(name: &str) -> Option<&'static str> {
    let colon_count = name.bytes().filter(|&b| b == b':').count();
    if colon_count > 1 {
        return Some("QName contains multiple colons");
    }
    if colon_count == 1 && (name.starts_with(':') || name.ends_with(':')) {
        return Some("QName has empty prefix or local part");
    }
    None
}
