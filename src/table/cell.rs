//! table::cell
//!
//! Typed cell values exchanged with a worksheet.
//!
//! # Mapping
//!
//! | Sheet kind                 | `CellValue`          |
//! |----------------------------|----------------------|
//! | string                     | `String`             |
//! | numeric, date-formatted    | `Date`               |
//! | numeric                    | `Number`             |
//! | boolean                    | `Boolean`            |
//! | formula                    | `Formula` (verbatim) |
//! | anything else / absent     | `Blank`              |
//!
//! Formulas are carried as their source text and never evaluated.
//!
//! # Text
//!
//! Rule names and header lookups read cells as text. Numbers render the way
//! Java's `Double.toString` does, which is how Drools tooling reads numeric
//! cells: `18.0` is `"18.0"`, `0.5` is `"0.5"` and `1e7` is `"1.0E7"`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Empty cell.
    #[default]
    Blank,
    /// Plain text.
    String(String),
    /// Plain numeric value.
    Number(f64),
    /// Numeric value displayed with a date format.
    Date(NaiveDateTime),
    /// Boolean value.
    Boolean(bool),
    /// Formula source text, without the leading `=`.
    Formula(String),
}

impl CellValue {
    /// Build a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::String(s.into())
    }

    /// Check whether the cell holds no value.
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Render the cell the way header and name lookups see it.
    ///
    /// Returns `None` for blank cells. Integral numbers keep a trailing
    /// `.0`, so `1.0` renders as `"1.0"`.
    ///
    /// # Example
    ///
    /// ```
    /// use ruledesk::table::CellValue;
    ///
    /// assert_eq!(CellValue::text("NAME").as_text().as_deref(), Some("NAME"));
    /// assert_eq!(CellValue::Boolean(true).as_text().as_deref(), Some("true"));
    /// assert_eq!(CellValue::Number(18.0).as_text().as_deref(), Some("18.0"));
    /// assert_eq!(CellValue::Blank.as_text(), None);
    /// ```
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Blank => None,
            CellValue::String(s) => Some(s.clone()),
            CellValue::Number(n) => Some(number_text(*n)),
            CellValue::Date(d) => Some(d.to_string()),
            CellValue::Boolean(b) => Some(b.to_string()),
            CellValue::Formula(f) => Some(f.clone()),
        }
    }

    /// Text of the cell if it is non-blank after trimming whitespace.
    pub fn non_blank_text(&self) -> Option<String> {
        self.as_text().filter(|s| !s.trim().is_empty())
    }
}

fn number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    if (1e-3..1e7).contains(&n.abs()) {
        let text = n.to_string();
        return if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        };
    }

    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => text,
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}
