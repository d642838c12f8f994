//! Conversion between 1-based `(row, column)` pairs and A1-style cell labels.
//!
//! Columns use bijective base-26: `A`..`Z` stand for 1..26, so there is no
//! zero digit and `Z` is followed by `AA`.

use crate::error::{Result, SheetpatchError};

/// Last row of a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;

/// Last column of a worksheet (`XFD`).
pub const MAX_COLS: u32 = 16_384;

/// Convert a 1-based column number into its letter run (1 -> "A", 27 -> "AA").
pub fn col_to_letters(col: u32) -> Result<String> {
    if col == 0 {
        return Err(SheetpatchError::InvalidAddress(
            "column index must be greater than zero (1-based indexing)".to_string(),
        ));
    }

    let mut letters = Vec::new();
    let mut rest = col;
    while rest > 0 {
        rest -= 1;
        let letter = char::from_u32(u32::from(b'A') + rest % 26)
            .ok_or_else(|| SheetpatchError::InvalidAddress(format!("column {col}")))?;
        letters.push(letter);
        rest /= 26;
    }

    Ok(letters.iter().rev().collect())
}

/// Encode a 1-based `(row, col)` pair as a label like `"AB5"`.
pub fn encode(row: u32, col: u32) -> Result<String> {
    if row == 0 || col == 0 {
        return Err(SheetpatchError::InvalidAddress(format!(
            "row and column must be greater than zero (1-based indexing), got ({row}, {col})"
        )));
    }
    Ok(format!("{}{row}", col_to_letters(col)?))
}

/// Decode a label like `"BC23"` into its 1-based `(row, col)` pair.
///
/// The label must be one or more uppercase letters immediately followed by
/// one or more digits. Anything else fails with `InvalidAddress`.
pub fn decode(label: &str) -> Result<(u32, u32)> {
    let invalid = || SheetpatchError::InvalidAddress(label.to_string());

    let split = label
        .find(|c: char| !c.is_ascii_uppercase())
        .ok_or_else(invalid)?;
    let (letters, digits) = label.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut col: u32 = 0;
    for b in letters.bytes() {
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(u32::from(b - b'A') + 1))
            .ok_or_else(invalid)?;
    }

    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }

    Ok((row, col))
}

/// Return the last address of a range attribute (`"A1:C12"` -> `"C12"`).
///
/// A single address is returned as-is.
pub fn range_end(range: &str) -> &str {
    range.rsplit(':').next().unwrap_or(range).trim()
}

/// Build the dimension reference for a grid anchored at `A1`.
///
/// An empty grid collapses to `"A1"`. Grids with rows but no columns are
/// rejected before a dimension is computed.
pub fn dimension_ref(rows: u32, cols: u32) -> Result<String> {
    if rows == 0 || cols == 0 {
        return Ok("A1".to_string());
    }
    Ok(format!("A1:{}", encode(rows, cols)?))
}
