//! Sheet declarations (`xl/workbook.xml`) and workbook relationships
//! (`xl/_rels/workbook.xml.rels`).

use crate::error::Result;
use crate::markup::{select, select_attributes, Document, Element};
use crate::namespaces::{Namespaces, NS_OFFICE_RELATIONSHIPS, NS_RELATIONSHIPS, NS_SPREADSHEET};
use crate::types::{Relationship, SheetEntry};

/// Every `sheet` under the workbook's `sheets` node, in declaration order.
///
/// Sheet names are unique; a repeated name keeps its first declaration.
pub(crate) fn parse_sheets(workbook: &Document, ns: &Namespaces) -> Result<Vec<SheetEntry>> {
    let path = format!(
        ".//{}/{}",
        ns.path_step(NS_SPREADSHEET, "sheets"),
        ns.path_step(NS_SPREADSHEET, "sheet")
    );
    let id_attr = ns.qualified_name(NS_OFFICE_RELATIONSHIPS, "id");

    let mut sheets: Vec<SheetEntry> = Vec::new();
    for sheet in select(workbook.root(), &path, ns)? {
        let Some(name) = sheet.attribute("name") else {
            log::warn!("skipping sheet declaration without a name");
            continue;
        };
        if sheets.iter().any(|s| s.name == name) {
            log::warn!("duplicate sheet name '{name}' ignored");
            continue;
        }
        sheets.push(SheetEntry {
            name: name.to_string(),
            relationship_id: relationship_id(sheet, &id_attr).unwrap_or_default().to_string(),
        });
    }
    Ok(sheets)
}

/// The sheet's relationship id: the `r:id`-style attribute under whatever
/// prefix the part binds, or any `*:id` attribute if the namespace is unbound.
fn relationship_id<'a>(sheet: &'a Element, id_attr: &str) -> Option<&'a str> {
    sheet.attribute(id_attr).or_else(|| {
        sheet
            .attributes()
            .iter()
            .find(|(key, _)| key.ends_with(":id"))
            .map(|(_, value)| value.as_str())
    })
}

/// Every `Relationship` in a relationships part, in document order.
pub(crate) fn parse_relationships(rels: &Document, ns: &Namespaces) -> Result<Vec<Relationship>> {
    let path = format!(".//{}", ns.path_step(NS_RELATIONSHIPS, "Relationship"));

    let mut out = Vec::new();
    for attrs in select_attributes(rels.root(), &path, ns)? {
        let (Some(id), Some(target)) = (attrs.get("Id"), attrs.get("Target")) else {
            log::warn!("skipping relationship without Id or Target");
            continue;
        };
        out.push(Relationship {
            id: id.clone(),
            rel_type: attrs.get("Type").cloned().unwrap_or_default(),
            target: target.clone(),
        });
    }
    Ok(out)
}

/// Next free relationship id: `rId{max + 1}` over the well-formed ids.
pub(crate) fn next_relationship_id(relationships: &[Relationship]) -> String {
    let mut max = 0u32;
    for rel in relationships {
        match rel.id_number() {
            Some(n) => max = max.max(n),
            None => log::warn!("relationship id '{}' is not of the form rId<N>", rel.id),
        }
    }
    format!("rId{}", max.saturating_add(1))
}
