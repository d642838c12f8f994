//! Shared XML attribute and name utilities.
//!
//! These helpers sit between quick-xml's borrowed events and the owned
//! markup tree. All of them handle namespace-prefixed names and UTF-8
//! conversion, reporting failures as crate errors.

use std::borrow::Cow;

use quick_xml::events::BytesStart;

use crate::error::{Result, SheetpatchError};

/// Get the qualified element name (prefix included) as an owned string.
pub fn qualified_name(e: &BytesStart) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| SheetpatchError::Parse(format!("element name is not UTF-8: {err}")))
}

/// Collect every attribute as `(qualified name, unescaped value)`, in document order.
pub fn attributes(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| SheetpatchError::Parse(format!("attribute name is not UTF-8: {err}")))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        out.push((key, value));
    }
    Ok(out)
}

/// If `key` declares a namespace, return the prefix it binds (`""` for `xmlns`).
pub fn namespace_declaration(key: &str) -> Option<&str> {
    if key == "xmlns" {
        Some("")
    } else {
        key.strip_prefix("xmlns:")
    }
}

/// Split `"x:row"` into `(Some("x"), "row")` and `"row"` into `(None, "row")`.
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Escape an attribute value for a double-quoted attribute.
///
/// Tabs and line breaks become character references; written raw they would
/// be normalized to spaces by the next reader.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\n' | '\r' | '\t')) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
