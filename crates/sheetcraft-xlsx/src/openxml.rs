//! Small SpreadsheetML helpers shared by the operation implementations.

use std::fmt::Write as _;

use crate::package::XlsxError;

/// A zero-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1-style reference (`CellRef::new(0, 0)` is `"A1"`).
    pub fn to_a1(self) -> String {
        let mut out = column_letters(self.col);
        let _ = write!(out, "{}", self.row + 1);
        out
    }
}

/// Zero-based column index to spreadsheet letters (0 -> "A", 26 -> "AA").
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Parse the numeric row from a `<row r="...">` attribute (1-based in XML).
pub fn parse_row_number(value: &str) -> Result<u32, XlsxError> {
    value
        .parse::<u32>()
        .map_err(|_| XlsxError::Invalid(format!("invalid row number: {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_cover_multi_letter_columns() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn a1_references_are_one_based() {
        assert_eq!(CellRef::new(0, 0).to_a1(), "A1");
        assert_eq!(CellRef::new(9, 2).to_a1(), "C10");
    }
}
