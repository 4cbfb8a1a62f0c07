// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A1 notation: column letters and `Title!A2:B` range expressions.

/// Zero-based column index to letters: 0 -> A, 25 -> Z, 26 -> AA, 701 -> ZZ.
pub fn index_to_letter(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Letters to zero-based column index; case-insensitive, surrounding whitespace ignored.
///
/// Returns `None` for an empty string or any non-letter character.
pub fn letter_to_index(letters: &str) -> Option<usize> {
    let s = letters.trim();
    if s.is_empty() {
        return None;
    }
    let mut n = 0usize;
    for c in s.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// One end of a range: optional column, optional 1-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: Option<usize>,
    pub row: Option<usize>,
}

/// A parsed `Title!start:end` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub sheet: String,
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl RangeRef {
    pub fn parse(expr: &str) -> Option<Self> {
        let (sheet, cells) = expr.rsplit_once('!')?;
        let sheet = sheet.trim_matches('\'').to_string();
        let (start, end) = match cells.split_once(':') {
            Some((s, e)) => (parse_cell(s)?, Some(parse_cell(e)?)),
            None => (parse_cell(cells)?, None),
        };
        Some(Self { sheet, start, end })
    }
}

fn parse_cell(cell: &str) -> Option<CellRef> {
    let cell = cell.trim();
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let column = if letters.is_empty() {
        None
    } else {
        Some(letter_to_index(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().ok()?)
    };
    if column.is_none() && row.is_none() {
        return None;
    }
    Some(CellRef { column, row })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_letters() {
        assert_eq!(index_to_letter(0), "A");
        assert_eq!(index_to_letter(25), "Z");
        assert_eq!(index_to_letter(26), "AA");
        assert_eq!(index_to_letter(27), "AB");
        assert_eq!(index_to_letter(701), "ZZ");
        assert_eq!(index_to_letter(702), "AAA");
        assert_eq!(letter_to_index("zz"), Some(701));
        assert_eq!(letter_to_index(" C "), Some(2));
    }

    #[test]
    fn test_round_trip_two_letter_space() {
        for i in 0..=701 {
            assert_eq!(letter_to_index(&index_to_letter(i)), Some(i), "index {i}");
        }
    }

    #[test]
    fn test_invalid_letters() {
        assert_eq!(letter_to_index(""), None);
        assert_eq!(letter_to_index("A1"), None);
    }

    #[test]
    fn test_parse_ranges() {
        let r = RangeRef::parse("Reportes!C2:C").expect("range");
        assert_eq!(r.sheet, "Reportes");
        assert_eq!(r.start, CellRef { column: Some(2), row: Some(2) });
        assert_eq!(r.end, Some(CellRef { column: Some(2), row: None }));

        let r = RangeRef::parse("'Mis Clientes'!A1:ZZ1").expect("range");
        assert_eq!(r.sheet, "Mis Clientes");
        assert_eq!(r.end, Some(CellRef { column: Some(701), row: Some(1) }));

        assert!(RangeRef::parse("no-bang").is_none());
        assert!(RangeRef::parse("Reportes!:").is_none());
    }
}
