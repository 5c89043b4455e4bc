//! Password-shape rules and their validation.

use crate::constants;
use crate::core::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

/// Constraints a secret must satisfy while restrictions are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRules {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_min_digits")]
    pub min_digits: usize,
    #[serde(default = "default_min_special")]
    pub min_special: usize,
}

/// A single rule a candidate secret failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFailure {
    TooShort { min: usize, actual: usize },
    TooLong { max: usize, actual: usize },
    TooFewDigits { min: usize, actual: usize },
    TooFewSpecial { min: usize, actual: usize },
}

impl PolicyRules {
    /// Build a rule set, rejecting bounds that no secret could satisfy.
    pub fn new(
        min_length: usize,
        max_length: usize,
        min_digits: usize,
        min_special: usize,
    ) -> Result<Self, PolicyError> {
        let rules = Self {
            min_length,
            max_length,
            min_digits,
            min_special,
        };
        rules.ensure_consistent()?;
        Ok(rules)
    }

    /// Check bounds of a rule set that did not come through [`PolicyRules::new`],
    /// e.g. one deserialized from the config file.
    pub fn ensure_consistent(&self) -> Result<(), PolicyError> {
        if self.max_length < self.min_length {
            return Err(PolicyError::InvalidRules(format!(
                "max length {} is below min length {}",
                self.max_length, self.min_length
            )));
        }
        if self.min_digits > self.max_length {
            return Err(PolicyError::InvalidRules(format!(
                "min digits {} exceeds max length {}",
                self.min_digits, self.max_length
            )));
        }
        if self.min_special > self.max_length {
            return Err(PolicyError::InvalidRules(format!(
                "min special characters {} exceeds max length {}",
                self.min_special, self.max_length
            )));
        }
        Ok(())
    }

    /// Every rule `secret` violates, in declaration order.
    pub fn check(&self, secret: &str) -> Vec<PolicyFailure> {
        let length = secret.chars().count();
        let digits = secret.chars().filter(|&c| is_decimal_digit(c)).count();
        let special = secret
            .chars()
            .filter(|&c| !(is_letter(c) || is_decimal_digit(c)))
            .count();

        let mut failures = Vec::new();
        if length < self.min_length {
            failures.push(PolicyFailure::TooShort {
                min: self.min_length,
                actual: length,
            });
        }
        if length > self.max_length {
            failures.push(PolicyFailure::TooLong {
                max: self.max_length,
                actual: length,
            });
        }
        if digits < self.min_digits {
            failures.push(PolicyFailure::TooFewDigits {
                min: self.min_digits,
                actual: digits,
            });
        }
        if special < self.min_special {
            failures.push(PolicyFailure::TooFewSpecial {
                min: self.min_special,
                actual: special,
            });
        }
        failures
    }

    pub fn validate(&self, secret: &str) -> bool {
        self.check(secret).is_empty()
    }

    /// Short human-readable summary, e.g. `6-12 chars, >=2 digits, >=2 special`.
    pub fn describe(&self) -> String {
        format!(
            "{}-{} chars, >={} digits, >={} special",
            self.min_length, self.max_length, self.min_digits, self.min_special
        )
    }
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            min_digits: default_min_digits(),
            min_special: default_min_special(),
        }
    }
}

impl fmt::Display for PolicyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyFailure::TooShort { min, actual } => {
                write!(f, "must be at least {} characters (got {})", min, actual)
            }
            PolicyFailure::TooLong { max, actual } => {
                write!(f, "must be at most {} characters (got {})", max, actual)
            }
            PolicyFailure::TooFewDigits { min, actual } => {
                write!(f, "needs at least {} digits (got {})", min, actual)
            }
            PolicyFailure::TooFewSpecial { min, actual } => write!(
                f,
                "needs at least {} characters that are neither letters nor digits (got {})",
                min, actual
            ),
        }
    }
}

fn is_letter(c: char) -> bool {
    c.general_category_group() == GeneralCategoryGroup::Letter
}

/// Decimal digits only (`Nd`); other numerals such as `½` or `Ⅻ` are special.
fn is_decimal_digit(c: char) -> bool {
    c.general_category() == GeneralCategory::DecimalNumber
}

fn default_min_length() -> usize {
    constants::DEFAULT_MIN_LENGTH
}

fn default_max_length() -> usize {
    constants::DEFAULT_MAX_LENGTH
}

fn default_min_digits() -> usize {
    constants::DEFAULT_MIN_DIGITS
}

fn default_min_special() -> usize {
    constants::DEFAULT_MIN_SPECIAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = PolicyRules::default();
        assert_eq!(rules.min_length, 6);
        assert_eq!(rules.max_length, 12);
        assert_eq!(rules.min_digits, 2);
        assert_eq!(rules.min_special, 2);
    }

    #[test]
    fn test_validate_accepts_compliant_secret() {
        let rules = PolicyRules::default();
        assert!(rules.validate("ab12!?"));
        assert!(rules.validate("pass12##word"));
    }

    #[test]
    fn test_validate_length_bounds() {
        let rules = PolicyRules::default();
        assert!(!rules.validate("a1!2?"));
        assert!(!rules.validate("abcdefghij12!?"));
    }

    #[test]
    fn test_validate_counts_digits_and_special() {
        let rules = PolicyRules::default();
        assert!(!rules.validate("abcd1!?x"));
        assert!(!rules.validate("abcd12!x"));
    }

    #[test]
    fn test_whitespace_counts_as_special() {
        let rules = PolicyRules::default();
        assert!(rules.validate("ab 12 cd"));
    }

    #[test]
    fn test_unicode_classification() {
        let rules = PolicyRules::default();
        // Cyrillic letters are letters, Arabic-Indic digits are digits.
        assert!(rules.validate("пароль٣٤!!"));
        assert_eq!(
            rules.check("пароль٣٤"),
            vec![PolicyFailure::TooFewSpecial { min: 2, actual: 0 }]
        );
    }

    #[test]
    fn test_non_decimal_numerals_are_special() {
        let rules = PolicyRules::default();
        assert_eq!(
            rules.check("ab½Ⅻ!!"),
            vec![PolicyFailure::TooFewDigits { min: 2, actual: 0 }]
        );
        assert!(!rules.validate("ab½Ⅻ!!"));
        assert!(rules.validate("ab12½Ⅻ"));

        let special_only = PolicyRules::new(0, 12, 0, 2).unwrap();
        assert!(special_only.validate("ab12½¼"));
        assert_eq!(
            special_only.check("ab12½"),
            vec![PolicyFailure::TooFewSpecial { min: 2, actual: 1 }]
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let rules = PolicyRules::new(0, 4, 0, 0).unwrap();
        assert!(rules.validate("ёёёё"));
        assert!(!rules.validate("ёёёёё"));
    }

    #[test]
    fn test_check_reports_all_failures() {
        let rules = PolicyRules::default();
        let failures = rules.check("abc");
        assert_eq!(
            failures,
            vec![
                PolicyFailure::TooShort { min: 6, actual: 3 },
                PolicyFailure::TooFewDigits { min: 2, actual: 0 },
                PolicyFailure::TooFewSpecial { min: 2, actual: 0 },
            ]
        );
    }

    #[test]
    fn test_loosening_bounds_keeps_valid_secrets_valid() {
        let strict = PolicyRules::default();
        let candidates = ["ab12!?", "12!?12!?", "xy99$$zz", "a1b2#c$d"];
        let looser = [
            PolicyRules::new(4, 12, 2, 2).unwrap(),
            PolicyRules::new(6, 20, 2, 2).unwrap(),
            PolicyRules::new(6, 12, 0, 2).unwrap(),
            PolicyRules::new(6, 12, 2, 1).unwrap(),
            PolicyRules::new(0, 64, 0, 0).unwrap(),
        ];
        for secret in candidates {
            assert!(strict.validate(secret), "{} should pass default rules", secret);
            for rules in &looser {
                assert!(rules.validate(secret), "{} rejected by {:?}", secret, rules);
            }
        }
    }

    #[test]
    fn test_new_rejects_inconsistent_bounds() {
        assert!(PolicyRules::new(8, 4, 0, 0).is_err());
        assert!(PolicyRules::new(0, 4, 5, 0).is_err());
        assert!(PolicyRules::new(0, 4, 0, 5).is_err());
        assert!(PolicyRules::new(4, 4, 4, 4).is_ok());
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            PolicyRules::default().describe(),
            "6-12 chars, >=2 digits, >=2 special"
        );
    }
}
