// src/auth/validators.rs

use regex::Regex;
use std::sync::LazyLock;

use crate::common::{ValidationResult, Validator};

pub const USERNAME_MAX_LENGTH: usize = 20;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._-]+$").expect("username pattern is a valid regex"));

/// Usernames: 1 to 20 characters of `a-z`, `0-9`, `.`, `_` and `-`
pub struct UsernameValidator;

impl Validator<String> for UsernameValidator {
    fn validate(&self, data: &String) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.is_empty() {
            result.add_error("username", "Username is required");
        } else if data.chars().count() > USERNAME_MAX_LENGTH {
            result.add_error("username", "Username must be at most 20 characters");
        } else if !USERNAME_RE.is_match(data) {
            result.add_error(
                "username",
                "Username may only contain lowercase letters, digits, '.', '_' and '-'",
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(username: &str) -> ValidationResult {
        UsernameValidator.validate(&username.to_string())
    }

    #[test]
    fn test_valid_usernames() {
        for name in ["alice", "a", "bob.smith", "x_y-z", "user42", "aaaaaaaaaaaaaaaaaaaa"] {
            assert!(check(name).is_valid, "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_usernames() {
        for name in ["", "Alice", "has space", "emoji😀", "semi;colon", "aaaaaaaaaaaaaaaaaaaaa"] {
            assert!(!check(name).is_valid, "{:?} should be invalid", name);
        }
    }

    #[test]
    fn test_error_names_the_constraint() {
        let result = check("aaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("20 characters"));
    }
}
