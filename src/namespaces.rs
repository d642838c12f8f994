//! XML namespace constants and namespace harvesting for package parts.
//!
//! Parts in an XLSX package bind their vocabularies to prefixes chosen by
//! whatever tool wrote them. Queries and newly emitted elements must go
//! through the bindings a part actually declares, which is what
//! [`Namespaces`] records.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, SheetpatchError};
use crate::xml_helpers::{attributes, namespace_declaration};

// =============================================================================
// Spreadsheet namespaces
// =============================================================================

/// Main spreadsheet namespace (Transitional conformance)
pub const NS_SPREADSHEET: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace (used by `r:id` attributes)
pub const NS_OFFICE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Spreadsheet 2009 row/column extensions (`x14ac:dyDescent`)
pub const NS_X14AC: &str = "http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac";

// =============================================================================
// Package namespaces
// =============================================================================

/// Relationships namespace
pub const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Content types namespace
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Dublin Core terms (`dcterms:modified` in `docProps/core.xml`)
pub const NS_DCTERMS: &str = "http://purl.org/dc/terms/";

/// Extended properties (`AppVersion` in `docProps/app.xml`)
pub const NS_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

// =============================================================================
// Relationship and content types
// =============================================================================

/// Relationship type for shared strings
pub const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Strict relationship type for shared strings
pub const REL_SHARED_STRINGS_STRICT: &str =
    "http://purl.oclc.org/ooxml/officeDocument/relationships/sharedStrings";

/// Content type registered for the shared string part
pub const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

/// Check if a relationship type is for shared strings.
pub fn is_shared_strings_relationship(rel_type: &str) -> bool {
    rel_type == REL_SHARED_STRINGS
        || rel_type == REL_SHARED_STRINGS_STRICT
        || rel_type.contains("sharedStrings")
}

// =============================================================================
// Namespace bindings
// =============================================================================

/// Key under which the unprefixed (default) namespace is stored.
pub const DEFAULT_PREFIX: &str = "default";

/// Prefix -> URI bindings declared on a part's root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    bindings: BTreeMap<String, String>,
}

impl Namespaces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding. An empty prefix is stored under [`DEFAULT_PREFIX`].
    pub fn insert(&mut self, prefix: &str, uri: &str) {
        let key = if prefix.is_empty() { DEFAULT_PREFIX } else { prefix };
        self.bindings.insert(key.to_string(), uri.to_string());
    }

    /// URI bound to `prefix` (`"default"` for the unprefixed namespace).
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.get(DEFAULT_PREFIX)
    }

    /// Prefix bound to `uri`, preferring the default namespace.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        if self.default_namespace() == Some(uri) {
            return Some(DEFAULT_PREFIX);
        }
        self.bindings
            .iter()
            .find(|(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Name to emit for a new element or attribute in `uri`.
    ///
    /// Unprefixed when `uri` is the default namespace or not bound at all,
    /// `prefix:local` otherwise.
    pub fn qualified_name(&self, uri: &str, local: &str) -> String {
        match self.prefix_for(uri) {
            Some(DEFAULT_PREFIX) | None => local.to_string(),
            Some(prefix) => format!("{prefix}:{local}"),
        }
    }

    /// Query step matching `local` in `uri`.
    ///
    /// Falls back to a bare local name (any namespace) when the part does not
    /// bind `uri`.
    pub fn path_step(&self, uri: &str, local: &str) -> String {
        match self.prefix_for(uri) {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Collect the namespace declarations of a part's root element.
///
/// Reading stops at the root start tag; declarations on nested elements are
/// not considered.
pub fn harvest_namespaces(xml: &str) -> Result<Namespaces> {
    let mut reader = Reader::from_str(xml);
    let mut namespaces = Namespaces::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                for (key, value) in attributes(e)? {
                    if let Some(prefix) = namespace_declaration(&key) {
                        namespaces.insert(prefix, &value);
                    }
                }
                return Ok(namespaces);
            }
            Event::Eof => {
                return Err(SheetpatchError::Parse(
                    "document has no root element".to_string(),
                ));
            }
            _ => {}
        }
    }
}
