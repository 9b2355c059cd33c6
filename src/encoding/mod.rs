//! Encoding identification and transcoding.
//!
//! Callers name the character encoding of their input with a platform
//! identifier ([`TextEncoding`]) or a free-form label. Both are mapped to the
//! IANA registered charset name before decoding, which goes through
//! `encoding_rs`. The mapping tables are plain `match`es; there is no
//! process-wide registry.
//!
//! When no encoding is supplied, [`decode_to_utf8`] sniffs a Byte Order Mark
//! and the XML declaration's `encoding=` pseudo-attribute (XML 1.0
//! Appendix F).

use std::fmt;

/// An error raised while choosing an encoding or decoding input with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
    /// A human-readable description of the encoding error.
    pub message: String,
}

impl EncodingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding error: {}", self.message)
    }
}

impl std::error::Error for EncodingError {}

/// Platform-level text encoding identifiers a caller can hand to
/// [`XmlCursor::create`](crate::cursor::XmlCursor::create).
///
/// Not every identifier has an IANA registered counterpart; those that do
/// not (for example [`TextEncoding::Symbol`]) are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// 7-bit ASCII.
    Ascii,
    /// UTF-8.
    Utf8,
    /// ISO 8859-1 (Latin-1).
    IsoLatin1,
    /// ISO 8859-2 (Latin-2).
    IsoLatin2,
    /// UTF-16 with byte order taken from the BOM.
    Utf16,
    /// UTF-16 big-endian.
    Utf16BigEndian,
    /// UTF-16 little-endian.
    Utf16LittleEndian,
    /// UTF-32 with byte order taken from the BOM.
    Utf32,
    /// UTF-32 big-endian.
    Utf32BigEndian,
    /// UTF-32 little-endian.
    Utf32LittleEndian,
    /// Windows code page 1250 (Central European).
    WindowsCp1250,
    /// Windows code page 1251 (Cyrillic).
    WindowsCp1251,
    /// Windows code page 1252 (Western).
    WindowsCp1252,
    /// Windows code page 1253 (Greek).
    WindowsCp1253,
    /// Windows code page 1254 (Turkish).
    WindowsCp1254,
    /// Shift JIS.
    ShiftJis,
    /// EUC-JP.
    JapaneseEuc,
    /// ISO-2022-JP.
    Iso2022Jp,
    /// Classic Mac OS Roman.
    MacOsRoman,
    /// Adobe Symbol; no IANA charset.
    Symbol,
    /// 7-bit ASCII with `\uXXXX` escapes; no IANA charset.
    NonLossyAscii,
    /// NeXTSTEP; no IANA charset.
    NextStep,
}

impl TextEncoding {
    /// Returns the IANA registered charset name for this encoding, or
    /// `None` when there is no registered equivalent.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlcursor::encoding::TextEncoding;
    ///
    /// assert_eq!(TextEncoding::Utf8.iana_name(), Some("UTF-8"));
    /// assert_eq!(TextEncoding::ShiftJis.iana_name(), Some("Shift_JIS"));
    /// assert_eq!(TextEncoding::Symbol.iana_name(), None);
    /// ```
    #[must_use]
    pub const fn iana_name(self) -> Option<&'static str> {
        match self {
            Self::Ascii => Some("US-ASCII"),
            Self::Utf8 => Some("UTF-8"),
            Self::IsoLatin1 => Some("ISO-8859-1"),
            Self::IsoLatin2 => Some("ISO-8859-2"),
            Self::Utf16 => Some("UTF-16"),
            Self::Utf16BigEndian => Some("UTF-16BE"),
            Self::Utf16LittleEndian => Some("UTF-16LE"),
            Self::Utf32 => Some("UTF-32"),
            Self::Utf32BigEndian => Some("UTF-32BE"),
            Self::Utf32LittleEndian => Some("UTF-32LE"),
            Self::WindowsCp1250 => Some("windows-1250"),
            Self::WindowsCp1251 => Some("windows-1251"),
            Self::WindowsCp1252 => Some("windows-1252"),
            Self::WindowsCp1253 => Some("windows-1253"),
            Self::WindowsCp1254 => Some("windows-1254"),
            Self::ShiftJis => Some("Shift_JIS"),
            Self::JapaneseEuc => Some("EUC-JP"),
            Self::Iso2022Jp => Some("ISO-2022-JP"),
            Self::MacOsRoman => Some("macintosh"),
            Self::Symbol | Self::NonLossyAscii | Self::NextStep => None,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iana_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Maps a free-form encoding label (`"utf8"`, `"latin1"`, `"SJIS"`, ...)
/// to the canonical name of the decoder that handles it.
///
/// Returns `None` for labels `encoding_rs` does not know.
#[must_use]
pub fn canonical_name_for_label(label: &str) -> Option<&'static str> {
    match single_byte_charset(label) {
        Some(SingleByte::Latin1) => Some("ISO-8859-1"),
        Some(SingleByte::Ascii) => Some("US-ASCII"),
        None => encoding_rs::Encoding::for_label(label.trim().as_bytes())
            .map(encoding_rs::Encoding::name),
    }
}

/// Charsets `encoding_rs` folds into windows-1252 but that decode on their
/// own here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SingleByte {
    Latin1,
    Ascii,
}

fn single_byte_charset(label: &str) -> Option<SingleByte> {
    const LATIN1: &[&str] = &[
        "iso-8859-1",
        "iso_8859-1",
        "iso_8859-1:1987",
        "iso8859-1",
        "iso88591",
        "latin1",
        "l1",
        "iso-ir-100",
        "cp819",
        "ibm819",
        "csisolatin1",
    ];
    const ASCII: &[&str] = &[
        "us-ascii",
        "ascii",
        "us",
        "ansi_x3.4-1968",
        "iso646-us",
        "iso-ir-6",
        "cp367",
        "ibm367",
        "csascii",
    ];
    let label = label.trim();
    if LATIN1.iter().any(|l| l.eq_ignore_ascii_case(label)) {
        Some(SingleByte::Latin1)
    } else if ASCII.iter().any(|l| l.eq_ignore_ascii_case(label)) {
        Some(SingleByte::Ascii)
    } else {
        None
    }
}

/// Detects the encoding of an XML byte stream by inspecting the Byte Order
/// Mark. Returns the IANA name and the number of BOM bytes.
///
/// # Examples
///
/// ```
/// use xmlcursor::encoding::detect_encoding;
///
/// assert_eq!(detect_encoding(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_encoding(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Transcodes `bytes` from the encoding named `encoding_name` into UTF-8.
///
/// ISO-8859-1 maps every byte to the code point of the same value, and
/// US-ASCII rejects any byte above 0x7F. Every other name goes through
/// `encoding_rs`, where a BOM at the start of the input takes precedence
/// over the name.
///
/// # Errors
///
/// Returns `EncodingError` if the name is not supported or if the input
/// contains byte sequences that are malformed for the encoding.
pub fn transcode(bytes: &[u8], encoding_name: &str) -> Result<String, EncodingError> {
    match single_byte_charset(encoding_name) {
        Some(SingleByte::Latin1) => {
            return Ok(encoding_rs::mem::decode_latin1(bytes).into_owned());
        }
        Some(SingleByte::Ascii) => {
            let valid = encoding_rs::Encoding::ascii_valid_up_to(bytes);
            return match bytes.get(valid) {
                Some(byte) => Err(EncodingError::new(format!(
                    "byte 0x{byte:02X} at offset {valid} is not valid US-ASCII"
                ))),
                None => String::from_utf8(bytes.to_vec())
                    .map_err(|_| EncodingError::new("input is not valid US-ASCII")),
            };
        }
        None => {}
    }

    let encoding = encoding_rs::Encoding::for_label(encoding_name.as_bytes())
        .ok_or_else(|| EncodingError::new(format!("unsupported encoding: {encoding_name}")))?;

    let (result, _used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {encoding_name}"
        )));
    }
    Ok(result.into_owned())
}

/// Decodes `bytes` with an explicitly chosen platform encoding.
///
/// Returns the decoded text and the IANA name that was used.
///
/// # Errors
///
/// Returns `EncodingError` when the encoding has no IANA name, is not
/// supported by the decoder, or the bytes are malformed for it.
pub fn decode_with(
    bytes: &[u8],
    encoding: TextEncoding,
) -> Result<(String, &'static str), EncodingError> {
    let name = encoding.iana_name().ok_or_else(|| {
        EncodingError::new(format!("{encoding:?} has no IANA registered name"))
    })?;
    let text = transcode(bytes, name)?;
    Ok((text, name))
}

/// Decodes raw XML bytes, detecting the encoding from the BOM and the XML
/// declaration.
///
/// # Errors
///
/// Returns `EncodingError` if the detected or declared encoding is not
/// supported, or the bytes are malformed for it.
///
/// # Examples
///
/// ```
/// use xmlcursor::encoding::decode_to_utf8;
///
/// let text = decode_to_utf8(b"<?xml version=\"1.0\"?><root/>").unwrap();
/// assert!(text.ends_with("<root/>"));
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (bom_encoding, bom_skip) = detect_encoding(bytes);
    let content = &bytes[bom_skip..];

    if bom_encoding != "UTF-8" {
        return transcode(content, bom_encoding);
    }

    // The declaration is ASCII-compatible even when the body is not UTF-8.
    if let Some(declared) = declared_encoding(content) {
        if !is_utf8_label(&declared) {
            return transcode(content, &declared);
        }
    }

    std::str::from_utf8(content)
        .map(str::to_string)
        .map_err(|_| EncodingError::new("input is not valid UTF-8"))
}

/// Extracts the `encoding` pseudo-attribute from an XML declaration at the
/// start of `bytes`, reading them as ASCII.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let scan = &bytes[..bytes.len().min(200)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let decl_end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..decl_end];

    let needle = b"encoding";
    let at = decl.windows(needle.len()).position(|w| w == needle)?;
    let rest = skip_ascii_whitespace(&decl[at + needle.len()..]);
    let rest = skip_ascii_whitespace(rest.strip_prefix(b"=")?);

    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = rest.iter().position(|&b| b == quote)?;
    let name = &rest[..end];
    name.is_ascii()
        .then(|| String::from_utf8_lossy(name).into_owned())
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count();
    &bytes[skip..]
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("UTF-8") || label.eq_ignore_ascii_case("UTF8")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_iana_names_for_unicode_encodings() {
        assert_eq!(TextEncoding::Utf16BigEndian.iana_name(), Some("UTF-16BE"));
        assert_eq!(TextEncoding::Utf16LittleEndian.iana_name(), Some("UTF-16LE"));
        assert_eq!(TextEncoding::Utf32.iana_name(), Some("UTF-32"));
    }

    #[test]
    fn test_unmappable_encodings() {
        for enc in [
            TextEncoding::Symbol,
            TextEncoding::NonLossyAscii,
            TextEncoding::NextStep,
        ] {
            assert_eq!(enc.iana_name(), None);
            let err = decode_with(b"<a/>", enc).unwrap_err();
            assert!(err.message.contains("no IANA registered name"));
        }
    }

    #[test]
    fn test_mappable_but_unsupported_encoding() {
        let err = decode_with(b"<a/>", TextEncoding::Utf32).unwrap_err();
        assert!(err.message.contains("unsupported encoding"));
    }

    #[test]
    fn test_decode_with_latin1() {
        let (text, name) = decode_with(b"<a>caf\xE9</a>", TextEncoding::IsoLatin1).unwrap();
        assert_eq!(name, "ISO-8859-1");
        assert_eq!(text, "<a>caf\u{e9}</a>");
    }

    #[test]
    fn test_latin1_is_not_windows_1252() {
        let (text, _) = decode_with(b"\x80\x9F\xFF", TextEncoding::IsoLatin1).unwrap();
        assert_eq!(text, "\u{80}\u{9f}\u{ff}");
        assert_eq!(canonical_name_for_label("Latin1"), Some("ISO-8859-1"));
        assert_eq!(transcode(b"\x80", "windows-1252").unwrap(), "\u{20ac}");
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let (text, name) = decode_with(b"<a>ok</a>", TextEncoding::Ascii).unwrap();
        assert_eq!((text.as_str(), name), ("<a>ok</a>", "US-ASCII"));
        let err = decode_with(b"<a>caf\xE9</a>", TextEncoding::Ascii).unwrap_err();
        assert_eq!(err.message, "byte 0xE9 at offset 6 is not valid US-ASCII");
        assert_eq!(canonical_name_for_label("ascii"), Some("US-ASCII"));
    }

    #[test]
    fn test_decode_with_utf16le() {
        let bytes: Vec<u8> = "<a/>".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let (text, _) = decode_with(&bytes, TextEncoding::Utf16LittleEndian).unwrap();
        assert_eq!(text, "<a/>");
    }

    #[test]
    fn test_decode_with_malformed_utf8() {
        let err = decode_with(b"<a>\xFF\xFE\xFD</a>", TextEncoding::Utf8).unwrap_err();
        assert!(err.message.contains("malformed byte sequence"));
    }

    #[test]
    fn test_canonical_name_for_label() {
        assert_eq!(canonical_name_for_label("utf8"), Some("UTF-8"));
        assert_eq!(canonical_name_for_label(" Shift_JIS "), Some("Shift_JIS"));
        assert_eq!(canonical_name_for_label("no-such-charset"), None);
    }

    #[test]
    fn test_detect_utf16_boms() {
        assert_eq!(detect_encoding(b"\xFE\xFF\x00<"), ("UTF-16BE", 2));
        assert_eq!(detect_encoding(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
        assert_eq!(detect_encoding(b"\xEF"), ("UTF-8", 0));
    }

    #[test]
    fn test_decode_to_utf8_strips_bom() {
        let text = decode_to_utf8(b"\xEF\xBB\xBF<root/>").unwrap();
        assert_eq!(text, "<root/>");
    }

    #[test]
    fn test_decode_to_utf8_honours_declaration() {
        let mut bytes = b"<?xml version='1.0' encoding='ISO-8859-1'?>".to_vec();
        bytes.extend_from_slice(b"<r>\xE9</r>");
        let text = decode_to_utf8(&bytes).unwrap();
        assert!(text.ends_with("<r>\u{e9}</r>"));
    }

    #[test]
    fn test_decode_to_utf8_rejects_invalid_utf8() {
        assert!(decode_to_utf8(&[0x80, 0x81, 0x82]).is_err());
    }

    #[test]
    fn test_text_encoding_display() {
        assert_eq!(TextEncoding::MacOsRoman.to_string(), "macintosh");
        assert_eq!(TextEncoding::NextStep.to_string(), "NextStep");
    }

    #[test]
    fn test_encoding_error_display() {
        let err = EncodingError::new("boom");
        assert_eq!(err.to_string(), "encoding error: boom");
    }
}
