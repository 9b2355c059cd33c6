//! Markup reconstruction for `read_inner_xml` / `read_outer_xml`.
//!
//! The cursor never sees the original bytes, so subtree capture writes each
//! node back out from its snapshot. Text and attribute values are escaped
//! the way a serializer would; attribute quotes are reproduced as written.

use std::fmt::Write;

use super::attributes::Attribute;
use super::node::{NodeSnapshot, XmlNodeType};

/// Appends the markup of `node` to `out`.
///
/// Elements are written as a start tag (self-closing when empty); nodes
/// without markup of their own write nothing.
pub(crate) fn write_node(out: &mut String, node: &NodeSnapshot) {
    let value = node.value.as_deref().unwrap_or("");
    match node.node_type {
        XmlNodeType::Element => write_start_tag(out, node),
        XmlNodeType::EndElement => {
            out.push_str("</");
            out.push_str(&node.name);
            out.push('>');
        }
        XmlNodeType::Text => write_escaped_text(out, value),
        XmlNodeType::Whitespace => out.push_str(value),
        XmlNodeType::CData => {
            out.push_str("<![CDATA[");
            out.push_str(value);
            out.push_str("]]>");
        }
        XmlNodeType::Comment => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        XmlNodeType::ProcessingInstruction => {
            out.push_str("<?");
            out.push_str(&node.name);
            if let Some(data) = node.value.as_deref() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
        XmlNodeType::XmlDeclaration => {
            out.push_str("<?xml ");
            out.push_str(value);
            out.push_str("?>");
        }
        XmlNodeType::DocumentType => write_doctype(out, node),
        XmlNodeType::Attribute | XmlNodeType::None => {}
    }
}

/// Appends `name="value"` with the attribute's own quote character.
pub(crate) fn write_attribute(out: &mut String, attr: &Attribute) {
    let quote = attr.quote_char();
    out.push_str(attr.name());
    out.push('=');
    out.push(quote);
    write_escaped_attr(out, attr.value(), quote);
    out.push(quote);
}

fn write_start_tag(out: &mut String, node: &NodeSnapshot) {
    out.push('<');
    out.push_str(&node.name);
    for attr in node.attributes.iter() {
        out.push(' ');
        write_attribute(out, attr);
    }
    out.push_str(if node.is_empty_element { "/>" } else { ">" });
}

fn write_doctype(out: &mut String, node: &NodeSnapshot) {
    out.push_str("<!DOCTYPE ");
    out.push_str(&node.name);
    match (&node.public_id, &node.system_id) {
        (Some(public), Some(system)) => {
            let _ = write!(out, " PUBLIC \"{public}\" \"{system}\"");
        }
        (None, Some(system)) => {
            let _ = write!(out, " SYSTEM \"{system}\"");
        }
        _ => {}
    }
    if let Some(subset) = node.value.as_deref() {
        out.push_str(" [");
        out.push_str(subset);
        out.push(']');
    }
    out.push('>');
}

/// Escapes character data.
pub(crate) fn write_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '\t' | '\n' => out.push(ch),
            c if (c as u32) < 0x20 => write_hex_char_ref(out, c),
            _ => out.push(ch),
        }
    }
}

/// Escapes an attribute value delimited by `quote`.
pub(crate) fn write_escaped_attr(out: &mut String, value: &str, quote: char) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if (c as u32) < 0x20 => write_hex_char_ref(out, c),
            _ => out.push(ch),
        }
    }
}

fn write_hex_char_ref(out: &mut String, c: char) {
    let _ = write!(out, "&#x{:X};", c as u32);
}
