//! Test fixtures for generating XLSX packages in memory.
//!
//! [`PackageBuilder`] writes the minimal set of parts a workbook needs and
//! can leave any of them out, which is how the corrupt-package tests get
//! their input.
//!
//! # Example
//!
//! ```rust
//! use fixtures::PackageBuilder;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = PackageBuilder::new()
//!     .add_sheet("Data", &[&["name", "qty"], &["apple", "3"]])
//!     .without_part("docProps/app.xml")
//!     .write_to(dir.path());
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_X14AC: &str = "http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac";

pub const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Sheet contents: generated from rows, or supplied verbatim.
#[derive(Debug, Clone)]
enum SheetBody {
    Rows(Vec<Vec<String>>),
    Raw(String),
}

#[derive(Debug, Clone)]
struct SheetFixture {
    name: String,
    body: SheetBody,
}

/// Builder for XLSX packages.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    sheets: Vec<SheetFixture>,
    shared_strings: bool,
    prefixed: bool,
    omitted: Vec<String>,
    extra_parts: Vec<(String, Vec<u8>, CompressionMethod)>,
    modified: Option<String>,
    app_version: Option<String>,
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self {
            sheets: Vec::new(),
            shared_strings: true,
            prefixed: false,
            omitted: Vec::new(),
            extra_parts: Vec::new(),
            modified: Some("2024-03-05T10:20:30Z".to_string()),
            app_version: Some("16.0300".to_string()),
        }
    }
}

impl PackageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet. Values that parse as numbers become literal cells, the
    /// rest shared strings; `""` leaves the cell out.
    #[must_use]
    pub fn add_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_string(),
            body: SheetBody::Rows(
                rows.iter()
                    .map(|r| r.iter().map(|v| (*v).to_string()).collect())
                    .collect(),
            ),
        });
        self
    }

    /// Add a sheet whose part is `xml` verbatim.
    #[must_use]
    pub fn add_raw_sheet(mut self, name: &str, xml: &str) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_string(),
            body: SheetBody::Raw(xml.to_string()),
        });
        self
    }

    /// Leave `xl/sharedStrings.xml` and its registrations out. Text cells
    /// are written as inline strings instead.
    #[must_use]
    pub fn without_shared_strings(mut self) -> Self {
        self.shared_strings = false;
        self
    }

    /// Write sheets and the string table with an `x:` prefix for the main
    /// namespace and an `x14ac` declaration.
    #[must_use]
    pub fn prefixed(mut self) -> Self {
        self.prefixed = true;
        self
    }

    /// Drop a generated part. Parts added with [`with_part`](Self::with_part)
    /// are always written.
    #[must_use]
    pub fn without_part(mut self, name: &str) -> Self {
        self.omitted.push(name.to_string());
        self
    }

    /// Add an unrelated part, stored with `method`.
    #[must_use]
    pub fn with_part(mut self, name: &str, body: &[u8], method: CompressionMethod) -> Self {
        self.extra_parts.push((name.to_string(), body.to_vec(), method));
        self
    }

    #[must_use]
    pub fn modified(mut self, value: Option<&str>) -> Self {
        self.modified = value.map(str::to_string);
        self
    }

    #[must_use]
    pub fn app_version(mut self, value: Option<&str>) -> Self {
        self.app_version = value.map(str::to_string);
        self
    }

    /// Build the package as XLSX bytes.
    pub fn build(self) -> Vec<u8> {
        let strings = self.collect_strings();
        let mut parts: Vec<(String, Vec<u8>, CompressionMethod)> = vec![
            part("[Content_Types].xml", self.content_types()),
            part("_rels/.rels", ROOT_RELS.to_string()),
            part("docProps/core.xml", self.core_xml()),
            part("docProps/app.xml", self.app_xml()),
            part("xl/workbook.xml", self.workbook_xml()),
            part("xl/_rels/workbook.xml.rels", self.workbook_rels()),
            part("xl/theme/theme1.xml", THEME.to_string()),
            part("xl/styles.xml", STYLES.to_string()),
        ];
        for (i, sheet) in self.sheets.iter().enumerate() {
            parts.push(part(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                self.sheet_xml(sheet, &strings),
            ));
        }
        if self.shared_strings {
            parts.push(part("xl/sharedStrings.xml", self.shared_strings_xml(&strings)));
        }
        // Omissions apply to generated parts only, so a part can be swapped out.
        parts.retain(|(name, _, _)| !self.omitted.contains(name));
        parts.extend(self.extra_parts.iter().cloned());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body, method) in parts {
            zip.start_file(name.as_str(), FileOptions::default().compression_method(method))
                .unwrap();
            zip.write_all(&body).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Build and write the package as `book.xlsx` inside `dir`.
    pub fn write_to(self, dir: &Path) -> PathBuf {
        self.write_as(dir, "book.xlsx")
    }

    pub fn write_as(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }

    fn main_prefix(&self) -> &'static str {
        if self.prefixed {
            "x:"
        } else {
            ""
        }
    }

    fn main_xmlns(&self) -> String {
        if self.prefixed {
            format!(r#"xmlns:x="{NS_MAIN}" xmlns:x14ac="{NS_X14AC}""#)
        } else {
            format!(r#"xmlns="{NS_MAIN}""#)
        }
    }

    fn collect_strings(&self) -> Vec<String> {
        let mut strings: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            if let SheetBody::Rows(rows) = &sheet.body {
                for value in rows.iter().flatten() {
                    if is_text(value) && !strings.contains(value) {
                        strings.push(value.clone());
                    }
                }
            }
        }
        strings
    }

    fn content_types(&self) -> String {
        let mut overrides = String::from(
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        );
        for i in 1..=self.sheets.len() {
            overrides.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
        }
        if self.shared_strings {
            overrides.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
        }
        format!(
            r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
        )
    }

    fn core_xml(&self) -> String {
        let modified = self
            .modified
            .as_ref()
            .map(|m| format!(r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{m}</dcterms:modified>"#))
            .unwrap_or_default();
        format!(
            r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>fixture</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">2024-01-01T00:00:00Z</dcterms:created>{modified}</cp:coreProperties>"#
        )
    }

    fn app_xml(&self) -> String {
        let version = self
            .app_version
            .as_ref()
            .map(|v| format!("<AppVersion>{v}</AppVersion>"))
            .unwrap_or_default();
        format!(
            r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>Microsoft Excel</Application>{version}</Properties>"#
        )
    }

    fn workbook_xml(&self) -> String {
        let sheets: String = self
            .sheets
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    escape(&s.name),
                    i + 1,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"{XML_DECL}
<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_R}"><bookViews><workbookView/></bookViews><sheets>{sheets}</sheets><calcPr calcId="191029"/></workbook>"#
        )
    }

    fn workbook_rels(&self) -> String {
        let n = self.sheets.len();
        let mut rels: String = (1..=n)
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{i}" Type="{NS_R}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
                )
            })
            .collect();
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{NS_R}/theme" Target="theme/theme1.xml"/><Relationship Id="rId{}" Type="{NS_R}/styles" Target="styles.xml"/>"#,
            n + 1,
            n + 2
        ));
        if self.shared_strings {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{NS_R}/sharedStrings" Target="sharedStrings.xml"/>"#,
                n + 3
            ));
        }
        format!(
            r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
    }

    fn sheet_xml(&self, sheet: &SheetFixture, strings: &[String]) -> String {
        let rows = match &sheet.body {
            SheetBody::Raw(xml) => return xml.clone(),
            SheetBody::Rows(rows) => rows,
        };

        let p = self.main_prefix();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let dimension = if rows.is_empty() || width == 0 {
            "A1".to_string()
        } else {
            format!("A1:{}{}", column_letters(width), rows.len())
        };

        let mut data = String::new();
        for (r, row) in rows.iter().enumerate() {
            let descent = if self.prefixed { r#" x14ac:dyDescent="0.25""# } else { "" };
            data.push_str(&format!(r#"<{p}row r="{}" spans="1:{}"{descent}>"#, r + 1, row.len().max(1)));
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let label = format!("{}{}", column_letters(c + 1), r + 1);
                if !is_text(value) {
                    data.push_str(&format!(r#"<{p}c r="{label}"><{p}v>{value}</{p}v></{p}c>"#));
                } else if self.shared_strings {
                    let index = strings.iter().position(|s| s == value).unwrap();
                    data.push_str(&format!(r#"<{p}c r="{label}" t="s"><{p}v>{index}</{p}v></{p}c>"#));
                } else {
                    data.push_str(&format!(
                        r#"<{p}c r="{label}" t="inlineStr"><{p}is><{p}t>{}</{p}t></{p}is></{p}c>"#,
                        escape(value)
                    ));
                }
            }
            data.push_str(&format!("</{p}row>"));
        }

        format!(
            r#"{XML_DECL}
<{p}worksheet {} xmlns:r="{NS_R}"><{p}dimension ref="{dimension}"/><{p}sheetViews><{p}sheetView workbookViewId="0"/></{p}sheetViews><{p}sheetFormatPr defaultRowHeight="15"/><{p}sheetData>{data}</{p}sheetData><{p}pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></{p}worksheet>"#,
            self.main_xmlns()
        )
    }

    fn shared_strings_xml(&self, strings: &[String]) -> String {
        let p = self.main_prefix();
        let items: String = strings
            .iter()
            .map(|s| format!("<{p}si><{p}t>{}</{p}t></{p}si>", escape(s)))
            .collect();
        format!(
            r#"{XML_DECL}
<{p}sst {} count="{n}" uniqueCount="{n}">{items}</{p}sst>"#,
            self.main_xmlns(),
            n = strings.len()
        )
    }
}

fn part(name: &str, body: String) -> (String, Vec<u8>, CompressionMethod) {
    (name.to_string(), body.into_bytes(), CompressionMethod::Deflated)
}

fn is_text(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_err()
}

/// 1-based column number to letters.
pub fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        col -= 1;
        letters.push(char::from(b'A' + (col % 26) as u8));
        col /= 26;
    }
    letters.iter().rev().collect()
}

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1></a:clrScheme></a:themeElements></a:theme>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellXfs></styleSheet>"#;
