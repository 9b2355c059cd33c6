//! XML character classes and the `Name` / `Nmtoken` productions.
//!
//! See XML 1.0 (Fifth Edition) §2.2 and §2.3.

/// Returns `true` if `c` is a valid `Char` per XML 1.0 §2.2 `[2]`.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// Returns `true` if `c` is a `NameStartChar` per XML 1.0 §2.3 `[4]`.
pub(crate) fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` is a `NameChar` per XML 1.0 §2.3 `[4a]`.
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Returns `true` if `s` matches the XML `Name` production.
///
/// A name starts with a letter, `_` or `:` (or another `NameStartChar`)
/// and continues with name characters.
///
/// # Examples
///
/// ```
/// use xmlcursor::util::chars::is_name;
///
/// assert!(is_name("xsl:template"));
/// assert!(is_name("_id"));
/// assert!(!is_name("1abc"));
/// assert!(!is_name(""));
/// ```
#[must_use]
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Returns `true` if `s` matches the XML `Nmtoken` production: one or more
/// name characters, with digits, `-` and `.` allowed in first position.
///
/// # Examples
///
/// ```
/// use xmlcursor::util::chars::is_name_token;
///
/// assert!(is_name_token("1abc"));
/// assert!(is_name_token("-x.y"));
/// assert!(!is_name_token("a b"));
/// ```
#[must_use]
pub fn is_name_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_name_char)
}

/// Returns `true` if `s` consists only of XML whitespace.
pub(crate) fn is_xml_whitespace(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}
