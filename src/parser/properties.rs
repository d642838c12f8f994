//! Document properties: `docProps/core.xml` and `docProps/app.xml`.

use chrono::{DateTime, Utc};

use super::{load_part, APP_PROPS_PART, CORE_PROPS_PART};
use crate::error::{Result, SheetpatchError};
use crate::markup::select_text;
use crate::namespaces::{NS_DCTERMS, NS_EXTENDED_PROPERTIES};
use crate::package::Package;

/// The `dcterms:modified` timestamp, if the part carries one.
pub(super) fn modification_date(package: &Package) -> Result<Option<DateTime<Utc>>> {
    let (doc, ns) = load_part(package, CORE_PROPS_PART)?;
    let path = format!(".//{}", ns.path_step(NS_DCTERMS, "modified"));

    let Some(raw) = select_text(doc.root(), &path, &ns)?.into_iter().next() else {
        return Ok(None);
    };
    parse_timestamp(raw.trim()).map(Some)
}

/// The producing application's `AppVersion`, if present.
pub(super) fn app_version(package: &Package) -> Result<Option<String>> {
    let (doc, ns) = load_part(package, APP_PROPS_PART)?;
    let path = format!(".//{}", ns.path_step(NS_EXTENDED_PROPERTIES, "AppVersion"));

    Ok(select_text(doc.root(), &path, &ns)?
        .into_iter()
        .next()
        .map(|v| v.trim().to_string()))
}

/// ISO-8601 timestamp with offset (W3CDTF as written by spreadsheet tools),
/// normalized to UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SheetpatchError::Parse(format!("invalid modification date '{raw}': {e}")))
}
