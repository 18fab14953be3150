//! Lookup keys and operation kinds.
//!
//! A [`LookupKey`] is the immutable input of one resolution: either a
//! numeric product code (UPC/EAN/GTIN) or a free-text name with an
//! optional brand. The key shape decides the [`OperationKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Code lengths accepted as UPC-E/EAN-8, UPC-A, EAN-13 and GTIN-14.
const CODE_LENGTHS: [usize; 4] = [8, 12, 13, 14];

// ============================================================================
// Operation Kind
// ============================================================================

/// The kind of vendor operation a key requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Lookup by product code.
    Lookup,
    /// Search by product name.
    Search,
}

impl OperationKind {
    /// Both operation kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Lookup, Self::Search];

    /// Returns the wire name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lookup" | "code" => Ok(Self::Lookup),
            "search" | "name" => Ok(Self::Search),
            other => Err(CoreError::UnknownOperation(other.to_string())),
        }
    }
}

// ============================================================================
// Lookup Key
// ============================================================================

/// Input to one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupKey {
    /// A UPC/EAN/GTIN digit string.
    Code {
        /// Normalized digits.
        code: String,
    },
    /// A product name with an optional brand.
    Name {
        /// Product name as typed.
        name: String,
        /// Optional brand to narrow the search.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
    },
}

impl LookupKey {
    /// Creates a code key, stripping spaces and dashes.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidKey` if the code contains anything other
    /// than digits or has a length other than 8, 12, 13 or 14.
    pub fn code(raw: &str) -> Result<Self, CoreError> {
        let code = strip_separators(raw);
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidKey(format!(
                "product code must contain only digits: '{raw}'"
            )));
        }
        if !CODE_LENGTHS.contains(&code.len()) {
            return Err(CoreError::InvalidKey(format!(
                "product code must have 8, 12, 13 or 14 digits, got {}",
                code.len()
            )));
        }
        Ok(Self::Code { code })
    }

    /// Creates a name key. Blank brands are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidKey` if the name is blank.
    pub fn name(name: &str, brand: Option<&str>) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidKey("product name must not be empty".to_string()));
        }
        let brand = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(ToString::to_string);
        Ok(Self::Name {
            name: name.to_string(),
            brand,
        })
    }

    /// Classifies free input: digit strings of a valid code length become
    /// codes, everything else a name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidKey` if the input is blank.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let stripped = strip_separators(input);
        if !stripped.is_empty()
            && stripped.bytes().all(|b| b.is_ascii_digit())
            && CODE_LENGTHS.contains(&stripped.len())
        {
            return Ok(Self::Code { code: stripped });
        }
        Self::name(input, None)
    }

    /// Returns the operation kind this key requires.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Code { .. } => OperationKind::Lookup,
            Self::Name { .. } => OperationKind::Search,
        }
    }

    /// Returns the code, if this is a code key.
    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Code { code } => Some(code),
            Self::Name { .. } => None,
        }
    }

    /// Returns true if this is a code key whose last digit is a valid GS1
    /// check digit. Name keys return false.
    pub fn has_valid_check_digit(&self) -> bool {
        self.as_code().is_some_and(gtin_check_digit_ok)
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code { code } => write!(f, "code {code}"),
            Self::Name { name, brand: Some(brand) } => write!(f, "name '{name}' ({brand})"),
            Self::Name { name, brand: None } => write!(f, "name '{name}'"),
        }
    }
}

fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

/// GS1 mod-10: weights 3,1,3,... from the rightmost payload digit.
fn gtin_check_digit_ok(code: &str) -> bool {
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
    let Some((&check, payload)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == check
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strips_separators() {
        let key = LookupKey::code("8 89698-572705").unwrap();
        assert_eq!(key.as_code(), Some("889698572705"));
        assert_eq!(key.kind(), OperationKind::Lookup);
    }

    #[test]
    fn test_code_rejects_letters_and_bad_length() {
        assert!(LookupKey::code("88969857270A").is_err());
        assert!(LookupKey::code("12345").is_err());
        assert!(LookupKey::code("").is_err());
    }

    #[test]
    fn test_parse_classifies_input() {
        assert_eq!(
            LookupKey::parse("000000000000").unwrap().kind(),
            OperationKind::Lookup
        );
        assert_eq!(
            LookupKey::parse("Funko Pop Wonder Woman").unwrap().kind(),
            OperationKind::Search
        );
        // Wrong-length digit strings are searched, not looked up.
        assert_eq!(LookupKey::parse("12345").unwrap().kind(), OperationKind::Search);
        assert!(LookupKey::parse("   ").is_err());
    }

    #[test]
    fn test_name_drops_blank_brand() {
        let key = LookupKey::name(" Wonder Woman ", Some("  ")).unwrap();
        assert_eq!(
            key,
            LookupKey::Name {
                name: "Wonder Woman".to_string(),
                brand: None
            }
        );
    }

    #[test]
    fn test_check_digit() {
        assert!(LookupKey::code("889698572705").unwrap().has_valid_check_digit());
        assert!(LookupKey::code("000000000000").unwrap().has_valid_check_digit());
        assert!(LookupKey::code("4006381333931").unwrap().has_valid_check_digit());
        assert!(!LookupKey::code("889698572706").unwrap().has_valid_check_digit());
    }

    #[test]
    fn test_operation_kind_from_str() {
        assert_eq!("LOOKUP".parse::<OperationKind>().unwrap(), OperationKind::Lookup);
        assert_eq!("search".parse::<OperationKind>().unwrap(), OperationKind::Search);
        assert!("browse".parse::<OperationKind>().is_err());
    }
}
