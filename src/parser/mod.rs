//! Read-only extraction of workbook metadata from fixed package parts.
//!
//! Every part goes through the same two steps: harvest the root namespace
//! bindings, then build the markup tree. Queries are written against the
//! bindings the part actually declares, so prefixed and unprefixed parts
//! read the same way.

mod properties;
mod relationships;
pub(crate) mod worksheet;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::markup::Document;
use crate::namespaces::{harvest_namespaces, Namespaces};
use crate::package::Package;
use crate::types::{Relationship, SheetEntry};

pub(crate) use relationships::{next_relationship_id, parse_relationships, parse_sheets};

/// Workbook manifest.
pub const WORKBOOK_PART: &str = "xl/workbook.xml";
/// Workbook relationships.
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
/// Content-type registry.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Core document properties (`dcterms:modified`).
pub const CORE_PROPS_PART: &str = "docProps/core.xml";
/// Extended document properties (`AppVersion`).
pub const APP_PROPS_PART: &str = "docProps/app.xml";

/// Read a part and return its tree together with its root namespace bindings.
pub(crate) fn load_part(package: &Package, name: &str) -> Result<(Document, Namespaces)> {
    let xml = package.read_text(name)?;
    let namespaces = harvest_namespaces(&xml)?;
    let document = Document::parse(&xml)?;
    Ok((document, namespaces))
}

/// Metadata derived from a package snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WorkbookMeta {
    pub modification_date: Option<DateTime<Utc>>,
    pub version: Option<String>,
    /// Declared sheets, in declaration order.
    pub sheets: Vec<SheetEntry>,
    /// Workbook relationships, in document order.
    pub relationships: Vec<Relationship>,
}

impl WorkbookMeta {
    pub fn read(package: &Package) -> Result<Self> {
        let modification_date = properties::modification_date(package)?;
        let version = properties::app_version(package)?;

        let (workbook, namespaces) = load_part(package, WORKBOOK_PART)?;
        let sheets = parse_sheets(&workbook, &namespaces)?;

        let (rels, namespaces) = load_part(package, WORKBOOK_RELS_PART)?;
        let relationships = parse_relationships(&rels, &namespaces)?;

        log::debug!(
            "workbook metadata: {} sheets, {} relationships",
            sheets.len(),
            relationships.len()
        );

        Ok(Self {
            modification_date,
            version,
            sheets,
            relationships,
        })
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetEntry> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
