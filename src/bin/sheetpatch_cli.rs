//! CLI tool for sheetpatch - dumps sheet grids of an XLSX file as JSON
//!
//! Usage:
//!   sheetpatch_cli <input.xlsx>           # Every sheet, in declaration order
//!   sheetpatch_cli <input.xlsx> Sheet1    # One sheet by name
//!   sheetpatch_cli <input.xlsx> 0         # One sheet by zero-based index
//!
//! Opening a workbook without a shared string part adds one to the file.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::io::{self, Write};

use serde::Serialize;
use sheetpatch::{Grid, SheetId, Workbook};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetDump {
    name: String,
    rows: Grid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkbookDump {
    modified: Option<String>,
    version: Option<String>,
    sheets: Vec<SheetDump>,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: sheetpatch_cli <input.xlsx> [sheet name or index]");
        std::process::exit(1);
    }

    let input_path = &args[1];

    let mut workbook = match Workbook::open(input_path) {
        Ok(wb) => wb,
        Err(e) => {
            eprintln!("Error opening {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let names: Vec<String> = match args.get(2) {
        Some(arg) => {
            let id = match arg.parse::<usize>() {
                Ok(index) => SheetId::Index(index),
                Err(_) => SheetId::Name(arg),
            };
            match workbook.resolve(id) {
                Ok(name) => vec![name],
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => workbook.sheet_names().into_iter().map(String::from).collect(),
    };

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        match workbook.read_sheet(&name, None) {
            Ok(rows) => sheets.push(SheetDump { name, rows }),
            Err(e) => {
                eprintln!("Error reading sheet {}: {}", name, e);
                std::process::exit(1);
            }
        }
    }

    let dump = WorkbookDump {
        modified: workbook.modification_date().map(|d| d.to_rfc3339()),
        version: workbook.version().map(String::from),
        sheets,
    };
    workbook.close();

    let json = match serde_json::to_string_pretty(&dump) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    io::stdout().write_all(json.as_bytes()).unwrap();
    println!();
}
