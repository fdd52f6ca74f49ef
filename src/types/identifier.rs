use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Checks that a table or field name is a bare identifier that can be
/// interpolated into a statement as-is.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["shirts", "_tmp", "Shirt_Sizes2"] {
            assert_eq!(validate_identifier(name).unwrap(), name);
        }
    }

    #[test]
    fn test_rejects_injection_attempts() {
        for name in ["", "2shirts", "shirts; DROP TABLE x", "a.b", "na me", "x'--"] {
            match validate_identifier(name) {
                Err(Error::InvalidIdentifier(n)) => assert_eq!(n, name),
                other => panic!("Expected InvalidIdentifier, got {:?}", other),
            }
        }
    }
}
