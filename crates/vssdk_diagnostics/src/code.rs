//! Rule codes with category prefixes, such as `VSSDK001` or `SYN002`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The family a diagnostic code belongs to, determining its prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Analyzer rules over extension code, prefixed with `VSSDK`.
    Vssdk,
    /// Lexer and parser errors from the C# front end, prefixed with `SYN`.
    Syntax,
}

impl Category {
    /// Returns the textual prefix for this category.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Vssdk => "VSSDK",
            Category::Syntax => "SYN",
        }
    }
}

/// A structured diagnostic code combining a category prefix and a number.
///
/// Displayed as the prefix followed by a zero-padded 3-digit number, which
/// is also the rule id used in configuration files and documentation links.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// Shorthand for a `VSSDK` rule code.
    pub const fn vssdk(number: u16) -> Self {
        Self::new(Category::Vssdk, number)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

/// Error returned when a string is not a well-formed rule code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule id '{input}'")]
pub struct ParseCodeError {
    /// The text that failed to parse.
    pub input: String,
}

impl FromStr for DiagnosticCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCodeError {
            input: s.to_string(),
        };
        let (category, digits) = if let Some(rest) = s.strip_prefix("VSSDK") {
            (Category::Vssdk, rest)
        } else if let Some(rest) = s.strip_prefix("SYN") {
            (Category::Syntax, rest)
        } else {
            return Err(err());
        };
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let number = digits.parse().map_err(|_| err())?;
        Ok(Self::new(category, number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(DiagnosticCode::vssdk(1).to_string(), "VSSDK001");
        assert_eq!(DiagnosticCode::vssdk(8).to_string(), "VSSDK008");
        assert_eq!(
            DiagnosticCode::new(Category::Syntax, 12).to_string(),
            "SYN012"
        );
    }

    #[test]
    fn parse_roundtrip() {
        let code: DiagnosticCode = "VSSDK006".parse().unwrap();
        assert_eq!(code, DiagnosticCode::vssdk(6));
        let syn: DiagnosticCode = "SYN001".parse().unwrap();
        assert_eq!(syn.category, Category::Syntax);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("VSSDK1".parse::<DiagnosticCode>().is_err());
        assert!("VSSDK0001".parse::<DiagnosticCode>().is_err());
        assert!("CA2007".parse::<DiagnosticCode>().is_err());
        assert!("VSSDKabc".parse::<DiagnosticCode>().is_err());
    }

    #[test]
    fn ordering_groups_by_category() {
        assert!(DiagnosticCode::vssdk(8) < DiagnosticCode::new(Category::Syntax, 1));
        assert!(DiagnosticCode::vssdk(1) < DiagnosticCode::vssdk(2));
    }
}
