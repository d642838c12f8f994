//! Lazy creation of the shared string part and its registrations.

use crate::error::Result;
use crate::markup::{select_attributes, Element};
use crate::namespaces::{
    is_shared_strings_relationship, CT_SHARED_STRINGS, NS_CONTENT_TYPES, NS_RELATIONSHIPS,
    REL_SHARED_STRINGS,
};
use crate::package::{Package, Replacements};
use crate::parser::{
    load_part, next_relationship_id, parse_relationships, CONTENT_TYPES_PART, WORKBOOK_RELS_PART,
};
use crate::shared_strings::{SharedStringTable, SHARED_STRINGS_PART};

/// Part name of the shared string part as registered in `[Content_Types].xml`.
const SHARED_STRINGS_PART_NAME: &str = "/xl/sharedStrings.xml";

/// Relationship target of the shared string part, relative to `xl/`.
const SHARED_STRINGS_TARGET: &str = "sharedStrings.xml";

/// Make sure the package has a shared string part.
///
/// When the part is missing, a one-entry placeholder table is created, a
/// relationship and a content-type override are registered for it, and all
/// three edits are committed in one rewrite. Registrations that already exist
/// are not duplicated. Returns `None` when the part was already there.
pub(crate) fn provision_shared_strings(package: &Package) -> Result<Option<Package>> {
    if package.contains(SHARED_STRINGS_PART) {
        return Ok(None);
    }

    let mut replacements = Replacements::new();
    replacements.insert(
        SHARED_STRINGS_PART.to_string(),
        SharedStringTable::placeholder_xml().into_bytes(),
    );
    if let Some(rels) = register_relationship(package)? {
        replacements.insert(WORKBOOK_RELS_PART.to_string(), rels);
    }
    if let Some(types) = register_content_type(package)? {
        replacements.insert(CONTENT_TYPES_PART.to_string(), types);
    }

    log::debug!(
        "provisioning {SHARED_STRINGS_PART} in {} ({} parts)",
        package.path().display(),
        replacements.len()
    );
    package.rewrite(&replacements).map(Some)
}

/// Workbook relationships with a shared string relationship appended, or
/// `None` if one is already declared.
fn register_relationship(package: &Package) -> Result<Option<Vec<u8>>> {
    let (mut doc, ns) = load_part(package, WORKBOOK_RELS_PART)?;
    let relationships = parse_relationships(&doc, &ns)?;
    if relationships
        .iter()
        .any(|r| is_shared_strings_relationship(&r.rel_type))
    {
        return Ok(None);
    }

    let uri = doc
        .root()
        .namespace()
        .unwrap_or(NS_RELATIONSHIPS)
        .to_string();
    let id = next_relationship_id(&relationships);
    log::debug!("registering shared strings relationship {id}");

    doc.root_mut().push(
        Element::new(ns.qualified_name(&uri, "Relationship"), Some(uri.as_str()))
            .with_attribute("Id", id)
            .with_attribute("Type", REL_SHARED_STRINGS)
            .with_attribute("Target", SHARED_STRINGS_TARGET),
    );
    doc.to_xml().map(Some)
}

/// Content types with an override for the shared string part appended, or
/// `None` if it is already registered.
fn register_content_type(package: &Package) -> Result<Option<Vec<u8>>> {
    let (mut doc, ns) = load_part(package, CONTENT_TYPES_PART)?;
    let path = ns.path_step(NS_CONTENT_TYPES, "Override");
    let registered = select_attributes(doc.root(), &path, &ns)?
        .iter()
        .any(|attrs| attrs.get("PartName").map(String::as_str) == Some(SHARED_STRINGS_PART_NAME));
    if registered {
        return Ok(None);
    }

    let uri = doc
        .root()
        .namespace()
        .unwrap_or(NS_CONTENT_TYPES)
        .to_string();
    doc.root_mut().push(
        Element::new(ns.qualified_name(&uri, "Override"), Some(uri.as_str()))
            .with_attribute("PartName", SHARED_STRINGS_PART_NAME)
            .with_attribute("ContentType", CT_SHARED_STRINGS),
    );
    doc.to_xml().map(Some)
}
