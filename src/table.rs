//! In-memory output tables and legacy cell encoding
//!
//! The legacy dump was produced by a writer that prints absent values as
//! empty fields, booleans as `1`/`0`, and floats in their shortest
//! round-trip form (`1000.0`, `0.01`, `1e-05`, `1.5e+16`). `Cell::render`
//! reproduces that encoding exactly.

use std::borrow::Cow;

use serde_json::Number;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed(""),
            Cell::Int(v) => Cow::Owned(v.to_string()),
            Cell::Float(v) => Cow::Owned(format_float(*v)),
            Cell::Text(s) => Cow::Borrowed(s),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&Number> for Cell {
    fn from(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            Cell::Int(i)
        } else if n.is_u64() {
            // Beyond i64; keep the exact digits
            Cell::Text(n.to_string())
        } else {
            n.as_f64().map_or(Cell::Null, Cell::Float)
        }
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

/// Format a float the way the legacy writer did: shortest round-trip
/// digits, fixed notation for exponents in `-4..16`, otherwise scientific
/// with a signed, at-least-two-digit exponent.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.2345e3",
    // but breaks a tie between two candidates upward. Re-rounding the exact
    // value to the same length rounds half to even.
    let shortest = format!("{:e}", v);
    let precision = shortest.split_once('e').map_or(0, |(m, _)| {
        m.chars().filter(|c| c.is_ascii_digit()).count().saturating_sub(1)
    });
    let sci = format!("{:.*e}", precision, v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if mantissa.starts_with('-') { "-" } else { "" };
    let digits: String = mantissa
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        if point <= 0 {
            format!("{sign}0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else {
            let point = point as usize;
            if point >= digits.len() {
                format!("{sign}{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{sign}{}.{}", &digits[..point], &digits[point..])
            }
        }
    } else {
        let mantissa = if digits.len() == 1 {
            digits
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exp.unsigned_abs())
    }
}

/// A fully materialised output table
#[derive(Debug, Clone)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(
            row.len(),
            self.columns.len(),
            "row width does not match {} header",
            self.name
        );
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, by header name
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.columns.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_match_legacy_repr() {
        assert_eq!(format_float(1000.0), "1000.0");
        assert_eq!(format_float(0.01), "0.01");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(-12.75), "-12.75");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(0.000015), "1.5e-05");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(123456789012345.0), "123456789012345.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn seventeen_digit_ties_round_to_even() {
        // Exactly ...891.25: both ...891.2 and ...891.3 round-trip
        assert_eq!(format_float(-1786878193756891.25), "-1786878193756891.2");
        assert_eq!(format_float(1786878193756891.75), "1786878193756891.8");
        assert_eq!(format_float(1786878193756891.5), "1786878193756891.5");
    }

    #[test]
    fn cells_render_absent_and_boolean_values() {
        assert_eq!(Cell::from(None::<i64>).render(), "");
        assert_eq!(Cell::from(Some(true)).render(), "1");
        assert_eq!(Cell::from(false).render(), "0");
        assert_eq!(Cell::from("Tritanium").render(), "Tritanium");
    }

    #[test]
    fn numbers_keep_integer_or_float_shape() {
        let int: Number = serde_json::from_str("1000").unwrap();
        let float: Number = serde_json::from_str("1000.0").unwrap();
        let exp: Number = serde_json::from_str("1e3").unwrap();
        assert_eq!(Cell::from(&int).render(), "1000");
        assert_eq!(Cell::from(&float).render(), "1000.0");
        assert_eq!(Cell::from(&exp).render(), "1000.0");
    }

    #[test]
    fn column_lookup_by_header() {
        let mut table = Table::new("t", &["a", "b"]);
        table.push(vec![Cell::Int(1), Cell::Int(2)]);
        table.push(vec![Cell::Int(3), Cell::Null]);
        let b = table.column("b").unwrap();
        assert_eq!(b, vec![&Cell::Int(2), &Cell::Null]);
        assert!(table.column("c").is_none());
    }
}
