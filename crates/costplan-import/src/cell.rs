//! Spreadsheet cell values
//!
//! `SheetCell` is the reader-independent view of a cell. Numeric reads
//! never fail: formulas yield their cached result, text is normalized
//! (`,` → `.`, `%` stripped), and anything else reads as 0.

use costplan_core::numeric::{parse_number, try_parse_number};

/// A single cell value
#[derive(Clone, Debug, PartialEq)]
pub enum SheetCell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// A formula with its cached result
    Formula { formula: String, result: Box<SheetCell> },
}

impl SheetCell {
    /// Attach a formula to an already read value
    pub fn with_formula(self, formula: impl Into<String>) -> Self {
        SheetCell::Formula {
            formula: formula.into(),
            result: Box::new(self),
        }
    }

    /// The value itself, looking through formulas
    pub fn value(&self) -> &SheetCell {
        match self {
            SheetCell::Formula { result, .. } => result.value(),
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.value() {
            SheetCell::Empty => true,
            SheetCell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text content; numbers are formatted, empty cells give ""
    pub fn text(&self) -> String {
        match self.value() {
            SheetCell::Text(text) => text.trim().to_string(),
            SheetCell::Number(n) => n.to_string(),
            SheetCell::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Non-empty text content
    pub fn opt_text(&self) -> Option<String> {
        Some(self.text()).filter(|t| !t.is_empty())
    }

    /// Numeric value; unparsable content reads as 0
    pub fn number(&self) -> f64 {
        self.opt_number().unwrap_or(0.0)
    }

    /// Numeric value, `None` when the cell holds nothing numeric
    pub fn opt_number(&self) -> Option<f64> {
        match self.value() {
            SheetCell::Number(n) if n.is_finite() => Some(*n),
            SheetCell::Text(text) => try_parse_number(text),
            _ => None,
        }
    }

    /// Read a ratio cell as a percentage (0-100).
    ///
    /// Numeric cells hold a fraction (`0.2` → 20). Text ending in `%`
    /// holds a percentage (`"12,5%"` → 12.5); other text is a fraction.
    pub fn percentage(&self) -> f64 {
        match self.value() {
            SheetCell::Number(n) if n.is_finite() => fraction_to_percent(*n),
            SheetCell::Text(text) if text.trim_end().ends_with('%') => parse_number(text),
            SheetCell::Text(text) => fraction_to_percent(parse_number(text)),
            _ => 0.0,
        }
    }

    /// Boolean reading; "no", "false", "0" and "inactive" are false, empty is `default`
    pub fn flag(&self, default: bool) -> bool {
        match self.value() {
            SheetCell::Bool(b) => *b,
            SheetCell::Number(n) => *n != 0.0,
            SheetCell::Text(text) => {
                let t = text.trim().to_ascii_lowercase();
                if t.is_empty() {
                    default
                } else {
                    !matches!(t.as_str(), "no" | "n" | "false" | "0" | "inactive")
                }
            }
            _ => default,
        }
    }
}

/// `fraction * 100`, rounded to 9 decimals so that `0.07` reads back as `7`
fn fraction_to_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 1e9).round() / 1e9
}

impl From<&calamine::Data> for SheetCell {
    fn from(data: &calamine::Data) -> Self {
        use calamine::Data;
        match data {
            Data::Empty | Data::Error(_) => SheetCell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => SheetCell::Text(s.clone()),
            Data::Int(n) => SheetCell::Number(*n as f64),
            Data::Float(f) => SheetCell::Number(*f),
            Data::Bool(b) => SheetCell::Bool(*b),
            Data::DateTime(dt) => SheetCell::Number(dt.as_f64()),
        }
    }
}
