use serde::{Deserialize, Serialize};

/// Rectangular string grid: rows of cell strings, row-major.
pub type Grid = Vec<Vec<String>>;

/// A sheet as declared in `xl/workbook.xml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntry {
    /// Display name (`name` attribute), unique within the workbook.
    pub name: String,
    /// Relationship id (`r:id` attribute) pointing into the workbook relationships.
    pub relationship_id: String,
}

/// One `Relationship` from `xl/_rels/workbook.xml.rels`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target as written, relative to `xl/` unless it starts with `/`.
    pub target: String,
}

impl Relationship {
    /// Package path of the target part (e.g. `"xl/worksheets/sheet1.xml"`).
    pub fn part_path(&self) -> String {
        resolve_target(&self.target)
    }

    /// Numeric suffix of an `rId<N>` id.
    pub fn id_number(&self) -> Option<u32> {
        self.id.strip_prefix("rId").and_then(|n| n.parse().ok())
    }
}

/// Resolve a workbook relationship target to a package path.
///
/// Absolute targets (`/xl/...`) lose their leading slash; relative ones are
/// taken from `xl/`, with `..` and `.` segments folded.
pub fn resolve_target(target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => format!("xl/{target}"),
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Identifies a sheet by name or zero-based declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetId<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for SheetId<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for SheetId<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for SheetId<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for SheetId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "#{index}"),
        }
    }
}
