use serde::{Deserialize, Serialize};

/// A value handed to [`crate::Workbook::upload_sheet`].
///
/// The variant decides the cell encoding: `Text` goes through the shared
/// string table, `Literal` is stored verbatim in the cell's value node, and
/// `Empty` produces a cell node without a value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum CellValue {
    Text(String),
    Literal(String),
    #[default]
    Empty,
}

impl CellValue {
    /// The string a read of this cell yields.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Literal(s) => s,
            Self::Empty => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

macro_rules! literal_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(v: $t) -> Self {
                    Self::Literal(v.to_string())
                }
            }
        )*
    };
}

literal_from!(i32, i64, u32, u64, usize, f64, bool);

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

/// A row of cell values, built from anything convertible.
///
/// ```
/// use sheetpatch::{row, CellValue};
/// let r = row!["name", 42, 1.5];
/// assert_eq!(r[1], CellValue::Literal("42".to_string()));
/// ```
#[macro_export]
macro_rules! row {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::CellValue::from($v)),*]
    };
}
