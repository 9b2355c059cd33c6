//! End-to-end navigation tests: node order, depth bookkeeping, the
//! attribute cursor and the read-state lifecycle.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use xmlcursor::tokenizer::{RawAttribute, RawToken, TokenQueue};
use xmlcursor::{ReadState, XmlCursor, XmlNodeType};

/// Collects `(type, depth, name)` for every node of `xml`.
fn trace(xml: &str) -> Vec<(XmlNodeType, u32, String)> {
    let mut cursor = XmlCursor::new(xml);
    let mut nodes = Vec::new();
    while cursor.read() {
        nodes.push((
            cursor.node_type(),
            cursor.depth(),
            cursor.name().unwrap_or("#").to_string(),
        ));
    }
    assert_eq!(cursor.read_state(), ReadState::EndOfFile);
    nodes
}

// ---------------------------------------------------------------------------
// Document order
// ---------------------------------------------------------------------------

#[test]
fn test_rss_feed_walk() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>News</title>
    <item><title>One</title><link>http://a/1</link></item>
    <item><title>Two</title><link>http://a/2</link></item>
  </channel>
</rss>
"#;
    let mut cursor = XmlCursor::new(xml);
    let mut titles = Vec::new();
    while cursor.read_element() {
        if cursor.element_has_qname("item") {
            while cursor.read_element_until("item") {
                if cursor.element_has_name("title") {
                    titles.push(cursor.read_string());
                }
            }
            assert_eq!(cursor.read_state(), ReadState::Interactive);
        }
    }
    assert_eq!(titles, vec!["One", "Two"]);
    assert!(cursor.is_eof());
}

#[test]
fn test_depths_of_mixed_content() {
    use XmlNodeType::{Comment, Element, EndElement, ProcessingInstruction, Text};
    assert_eq!(
        trace("<a><b>x<c/>y</b><?p d?><!--z--></a>"),
        vec![
            (Element, 0, "a".to_string()),
            (Element, 1, "b".to_string()),
            (Text, 2, "#".to_string()),
            (Element, 2, "c".to_string()),
            (Text, 2, "#".to_string()),
            (EndElement, 1, "b".to_string()),
            (ProcessingInstruction, 1, "p".to_string()),
            (Comment, 1, "#".to_string()),
            (EndElement, 0, "a".to_string()),
        ]
    );
}

#[test]
fn test_whitespace_between_markup_is_never_surfaced() {
    let nodes = trace("<a>\n\t<b> </b>\r\n  <c>  x  </c>\n</a>\n");
    assert!(nodes
        .iter()
        .all(|(t, _, _)| *t != XmlNodeType::Whitespace));
    let texts: Vec<_> = nodes
        .iter()
        .filter(|(t, _, _)| *t == XmlNodeType::Text)
        .collect();
    assert_eq!(texts.len(), 1);
}

#[test]
fn test_cdata_normalized_into_text() {
    let mut cursor = XmlCursor::new("<a>one <![CDATA[<two>]]> three</a>");
    cursor.read();
    cursor.read();
    assert_eq!(cursor.node_type(), XmlNodeType::Text);
    assert_eq!(cursor.value(), Some("one <two> three"));
    cursor.read();
    assert_eq!(cursor.node_type(), XmlNodeType::EndElement);
}

#[test]
fn test_read_element_skips_non_elements() {
    let mut cursor = XmlCursor::new("<!--c--><a>t<!--d--><b/></a>");
    let mut names = Vec::new();
    while cursor.read_element() {
        names.push(cursor.name().unwrap().to_string());
    }
    assert_eq!(names, vec!["a", "b"]);
    assert!(cursor.is_eof());
    assert!(cursor.error().is_none());
}

// ---------------------------------------------------------------------------
// Skip
// ---------------------------------------------------------------------------

#[test]
fn test_skip_keeps_depth_for_any_nesting() {
    for inner in ["", "<x/>", "<x><x><x/></x></x>", "t<x>u</x>v", "<!--c--><?p?>"] {
        let xml = format!("<r><x>{inner}</x><after/></r>");
        let mut cursor = XmlCursor::new(&xml);
        cursor.read();
        cursor.read();
        let depth = cursor.depth();
        assert!(cursor.skip(), "skip failed for {xml}");
        assert_eq!(cursor.depth(), depth, "depth changed for {xml}");
        assert_eq!(cursor.name(), Some("after"), "wrong node for {xml}");
    }
}

#[test]
fn test_skip_over_siblings() {
    let mut cursor = XmlCursor::new("<r><a><deep><er/></deep></a><b>t</b><c/></r>");
    cursor.read();
    cursor.read();
    let mut seen = vec![cursor.name().unwrap().to_string()];
    while cursor.skip() && cursor.node_type() == XmlNodeType::Element {
        seen.push(cursor.name().unwrap().to_string());
    }
    assert_eq!(seen, vec!["a", "b", "c"]);
    assert_eq!(cursor.node_type(), XmlNodeType::EndElement);
}

#[test]
fn test_skip_into_truncated_input() {
    let mut cursor = XmlCursor::new("<r><a><b>");
    cursor.read();
    cursor.read();
    assert!(!cursor.skip());
    assert!(cursor.is_eof());
}

// ---------------------------------------------------------------------------
// Attribute cursor
// ---------------------------------------------------------------------------

#[test]
fn test_attribute_cursor_visits_every_index_once() {
    for count in 0..5 {
        let attrs: String = (0..count).map(|i| format!(" a{i}='{i}'")).collect();
        let xml = format!("<e{attrs}/>");
        let mut cursor = XmlCursor::new(&xml);
        cursor.read();
        assert_eq!(cursor.attribute_count(), count);

        let mut visited = Vec::new();
        if cursor.move_to_first_attribute() {
            visited.push(cursor.attribute_index().unwrap());
            while cursor.move_to_next_attribute() {
                visited.push(cursor.attribute_index().unwrap());
            }
            for _ in 0..3 {
                assert!(!cursor.move_to_next_attribute());
            }
            assert!(cursor.move_to_element());
        }
        assert_eq!(visited, (0..count).collect::<Vec<_>>());
        assert_eq!(cursor.node_type(), XmlNodeType::Element);
    }
}

#[test]
fn test_attribute_lookups() {
    let mut cursor = XmlCursor::new(r#"<e id="7" class='big red' xmlns:x="urn:x" x:id="9"/>"#);
    cursor.read();
    assert!(cursor.has_attributes());
    assert_eq!(cursor.attribute_at_index(1), "big red");
    assert_eq!(cursor.attribute_with_qname("x:id"), Some("9"));
    assert_eq!(cursor.attribute_with_qname("missing"), None);
    assert_eq!(cursor.attribute_with_local_name("id", "urn:x"), Some("9"));
    assert_eq!(cursor.attribute_with_local_name("id", ""), Some("7"));

    let names: Vec<_> = cursor.attributes().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["id", "class", "xmlns:x", "x:id"]);
}

#[test]
fn test_attributes_stay_reachable_from_attribute_position() {
    let mut cursor = XmlCursor::new("<e a='1' b='2'/>");
    cursor.read();
    cursor.move_to_attribute_at_index(1);
    assert_eq!(cursor.attribute_count(), 2);
    assert_eq!(cursor.attribute_with_qname("a"), Some("1"));
    assert_eq!(cursor.name(), Some("b"));
    assert!(!cursor.is_empty_element());
    assert!(cursor.move_to_element());
    assert!(cursor.is_empty_element());
}

#[test]
fn test_attribute_value_normalization_and_references() {
    let mut cursor = XmlCursor::new("<e v='a\tb&#10;c &lt;&amp;&gt;'/>");
    cursor.read();
    assert_eq!(cursor.attribute_with_qname("v"), Some("a b\nc <&>"));
}

#[test]
fn test_non_element_nodes_have_no_attributes() {
    let mut cursor = XmlCursor::new("<e a='1'>t</e>");
    cursor.read();
    cursor.read();
    assert_eq!(cursor.attribute_count(), 0);
    assert!(!cursor.has_attributes());
    assert!(!cursor.move_to_first_attribute());
    assert!(!cursor.move_to_next_attribute());
    assert!(!cursor.move_to_element());
}

#[test]
fn test_default_attributes_from_source() {
    let queue = TokenQueue::new(vec![RawToken::StartElement {
        name: "e".to_string(),
        attributes: vec![
            RawAttribute::new("written", "1"),
            RawAttribute {
                name: "fixed".to_string(),
                value: "2".to_string(),
                quote: '"',
                is_default: true,
            },
        ],
        empty: true,
    }]);
    let mut cursor = XmlCursor::from_source(queue);
    cursor.read();
    cursor.move_to_first_attribute();
    assert!(!cursor.is_default());
    cursor.move_to_next_attribute();
    assert!(cursor.is_default());
    cursor.move_to_element();
    assert!(!cursor.is_default());
}

// ---------------------------------------------------------------------------
// Read state
// ---------------------------------------------------------------------------

#[test]
fn test_error_is_terminal_and_kept() {
    let mut cursor = XmlCursor::new("<a><b x='1' x='2'/></a>");
    assert!(cursor.read());
    assert!(!cursor.read());
    assert_eq!(cursor.read_state(), ReadState::Error);
    let err = cursor.error().unwrap();
    assert!(err.message.contains("redefined"), "{err}");
    assert!(!cursor.read_element());
    assert!(!cursor.skip());
    assert_eq!(cursor.read_inner_xml(), "");
    assert_eq!(cursor.read_state(), ReadState::Error);
    assert!(!cursor.is_eof());
}

#[test]
fn test_empty_document_is_end_of_file() {
    let mut cursor = XmlCursor::new("   ");
    assert!(!cursor.read());
    assert!(cursor.is_eof());
    assert_eq!(cursor.diagnostics()[0].message, "document is empty");
}

#[test]
fn test_closed_cursor_reports_nothing() {
    let mut cursor = XmlCursor::new("<a b='1'>t</a>");
    cursor.read();
    cursor.close();
    assert_eq!(cursor.read_state(), ReadState::Closed);
    assert_eq!(cursor.node_type(), XmlNodeType::None);
    assert_eq!(cursor.name(), None);
    assert_eq!(cursor.lookup_namespace("xml"), Some("http://www.w3.org/XML/1998/namespace"));
}

#[test]
#[should_panic(expected = "move_to_first_attribute called on a closed cursor")]
fn test_attribute_navigation_after_close_panics() {
    let mut cursor = XmlCursor::new("<a b='1'/>");
    cursor.read();
    cursor.close();
    cursor.move_to_first_attribute();
}

#[test]
#[should_panic(expected = "read_outer_xml called on a closed cursor")]
fn test_subtree_capture_after_close_panics() {
    let mut cursor = XmlCursor::new("<a/>");
    cursor.close();
    let _ = cursor.read_outer_xml();
}

#[test]
fn test_depth_limit_is_malformed_input() {
    let xml = format!("{}{}", "<a>".repeat(300), "</a>".repeat(300));
    let mut cursor = XmlCursor::new(&xml);
    while cursor.read() {}
    assert_eq!(cursor.read_state(), ReadState::Error);
    assert!(cursor.error().unwrap().message.contains("depth"));
}

#[test]
fn test_entity_expansion_limit() {
    let refs = "&amp;".repeat(50);
    let opts = xmlcursor::CursorOptions::default().max_entity_expansions(10);
    let mut cursor = XmlCursor::with_options(format!("<a>{refs}</a>"), opts);
    cursor.read();
    assert!(!cursor.read());
    assert!(cursor.error().unwrap().message.contains("entity expansion limit"));
}
