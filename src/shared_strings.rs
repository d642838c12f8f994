//! The shared string table (`xl/sharedStrings.xml`).
//!
//! Sheets reference text cells by position in this table, so positions are
//! never reused or reordered: entries are only ever appended.
//!
//! ```xml
//! <sst xmlns="..." count="2" uniqueCount="2">
//!   <si><t>Plain</t></si>
//!   <si><r><t>Rich </t></r><r><t>run</t></r></si>
//! </sst>
//! ```

use std::collections::HashMap;

use crate::error::Result;
use crate::markup::{Document, Element};
use crate::namespaces::{harvest_namespaces, Namespaces, NS_SPREADSHEET};
use crate::package::Package;

/// Package path of the shared string part.
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Text of the single entry a freshly provisioned table carries.
pub const PLACEHOLDER_STRING: &str = "";

/// Ordered, deduplicated catalog of the text values referenced by sheets.
#[derive(Debug, Clone)]
pub struct SharedStringTable {
    document: Document,
    namespaces: Namespaces,
    strings: Vec<String>,
    /// First position of each distinct string.
    positions: HashMap<String, usize>,
    loaded_len: usize,
}

impl SharedStringTable {
    /// Parse a shared string part.
    pub fn parse(xml: &str) -> Result<Self> {
        let namespaces = harvest_namespaces(xml)?;
        let document = Document::parse(xml)?;

        let strings: Vec<String> = document
            .root()
            .child_elements()
            .filter(|e| e.local_name() == "si")
            .map(run_text)
            .collect();

        let mut positions = HashMap::with_capacity(strings.len());
        for (i, s) in strings.iter().enumerate() {
            positions.entry(s.clone()).or_insert(i);
        }

        Ok(Self {
            document,
            namespaces,
            loaded_len: strings.len(),
            strings,
            positions,
        })
    }

    /// Load the table from a package.
    pub fn load(package: &Package) -> Result<Self> {
        Self::parse(&package.read_text(SHARED_STRINGS_PART)?)
    }

    /// Load the table, or start an empty one if the package has none yet.
    pub fn load_or_empty(package: &Package) -> Result<Self> {
        if package.contains(SHARED_STRINGS_PART) {
            Self::load(package)
        } else {
            Ok(Self::empty())
        }
    }

    /// A table with no entries.
    pub fn empty() -> Self {
        let root = Element::new("sst", Some(NS_SPREADSHEET))
            .with_attribute("xmlns", NS_SPREADSHEET)
            .with_attribute("count", "0")
            .with_attribute("uniqueCount", "0");
        let mut namespaces = Namespaces::new();
        namespaces.insert("", NS_SPREADSHEET);

        Self {
            document: Document::new(root),
            namespaces,
            strings: Vec::new(),
            positions: HashMap::new(),
            loaded_len: 0,
        }
    }

    /// Minimal valid table holding one placeholder entry.
    pub fn placeholder_xml() -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n\
             <sst xmlns=\"{NS_SPREADSHEET}\" count=\"1\" uniqueCount=\"1\"><si><t>{PLACEHOLDER_STRING}</t></si></sst>"
        )
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// `(true, first position)` if `value` is present, else `(false, len)`.
    ///
    /// The second form is the position `value` will take once appended;
    /// callers must append before reserving again.
    pub fn lookup_or_reserve(&self, value: &str) -> (bool, usize) {
        match self.positions.get(value) {
            Some(&index) => (true, index),
            None => (false, self.strings.len()),
        }
    }

    /// Append `value` as a new entry and return its position.
    pub fn append(&mut self, value: &str) -> usize {
        let uri = self
            .document
            .root()
            .namespace()
            .unwrap_or(NS_SPREADSHEET)
            .to_string();

        let mut t = Element::new(self.namespaces.qualified_name(&uri, "t"), Some(uri.as_str()));
        if value.trim() != value {
            t.set_attribute("xml:space", "preserve");
        }
        if !value.is_empty() {
            t.push_text(value);
        }
        let mut si = Element::new(self.namespaces.qualified_name(&uri, "si"), Some(uri.as_str()));
        si.push(t);
        self.document.root_mut().push(si);

        let index = self.strings.len();
        self.strings.push(value.to_string());
        self.positions.entry(value.to_string()).or_insert(index);
        index
    }

    /// Position of `value`, appending it first if needed.
    pub fn intern(&mut self, value: &str) -> usize {
        match self.lookup_or_reserve(value) {
            (true, index) => index,
            (false, _) => self.append(value),
        }
    }

    /// Whether entries were appended since the table was loaded.
    pub fn is_dirty(&self) -> bool {
        self.strings.len() != self.loaded_len
    }

    /// Serialize the part. `count`/`uniqueCount` are rewritten only if the
    /// number of entries changed.
    pub fn to_xml(&mut self) -> Result<Vec<u8>> {
        if self.is_dirty() {
            let len = self.strings.len().to_string();
            let root = self.document.root_mut();
            root.set_attribute("count", len.as_str());
            root.set_attribute("uniqueCount", len);
            self.loaded_len = self.strings.len();
        }
        self.document.to_xml()
    }
}

/// Text of an `si` entry (or an inline `is` string): every `t` run
/// concatenated, phonetic runs skipped.
pub(crate) fn run_text(si: &Element) -> String {
    let mut out = String::new();
    collect_runs(si, &mut out);
    out
}

fn collect_runs(element: &Element, out: &mut String) {
    for child in element.child_elements() {
        match child.local_name() {
            "t" => out.push_str(&child.text()),
            "rPh" => {}
            _ => collect_runs(child, out),
        }
    }
}
