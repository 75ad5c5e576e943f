// src/pastes/validators.rs

use std::str::FromStr;

use super::models::{ExpiresIn, PasteCreateInfo};
use crate::common::{ValidationResult, Validator};

pub const TITLE_MAX_LENGTH: usize = 128;
pub const PASTY_TITLE_MAX_LENGTH: usize = 50;

// ============================================================================
// Paste Validators
// ============================================================================

pub struct PasteCreateValidator;

impl Validator<PasteCreateInfo> for PasteCreateValidator {
    fn validate(&self, data: &PasteCreateInfo) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.chars().count() > TITLE_MAX_LENGTH {
            result.add_error("title", "Title must be at most 128 characters");
        }

        if data.pasties.is_empty() {
            result.add_error("pasties", "A paste needs at least one pasty");
        }

        for (i, pasty) in data.pasties.iter().enumerate() {
            if pasty.title.chars().count() > PASTY_TITLE_MAX_LENGTH {
                result.add_error(
                    &format!("pasties[{}].title", i),
                    "Pasty title must be at most 50 characters",
                );
            }
        }

        if ExpiresIn::from_str(&data.expires_in).is_err() {
            result.add_error("expiresIn", "Unknown expiry");
        }

        if data.private && data.anonymous {
            result.add_error("anonymous", "A private paste can't be anonymous");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pastes::models::PastyCreateInfo;

    fn info() -> PasteCreateInfo {
        PasteCreateInfo {
            title: "t".to_string(),
            pasties: vec![PastyCreateInfo {
                content: "a\nb".to_string(),
                ..Default::default()
            }],
            expires_in: "1h".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_paste() {
        assert!(PasteCreateValidator.validate(&info()).is_valid);

        let mut never = info();
        never.expires_in = String::new();
        assert!(PasteCreateValidator.validate(&never).is_valid);
    }

    #[test]
    fn test_title_too_long() {
        let mut data = info();
        data.title = "x".repeat(129);
        let result = PasteCreateValidator.validate(&data);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "title");

        data.title = "x".repeat(128);
        assert!(PasteCreateValidator.validate(&data).is_valid);
    }

    #[test]
    fn test_no_pasties() {
        let mut data = info();
        data.pasties.clear();
        assert!(!PasteCreateValidator.validate(&data).is_valid);
    }

    #[test]
    fn test_pasty_title_too_long() {
        let mut data = info();
        data.pasties[0].title = "x".repeat(51);
        let result = PasteCreateValidator.validate(&data);
        assert_eq!(result.errors[0].field, "pasties[0].title");
    }

    #[test]
    fn test_unknown_expiry() {
        let mut data = info();
        data.expires_in = "3h".to_string();
        assert!(!PasteCreateValidator.validate(&data).is_valid);
    }

    #[test]
    fn test_private_and_anonymous() {
        let mut data = info();
        data.private = true;
        data.anonymous = true;
        assert!(!PasteCreateValidator.validate(&data).is_valid);
    }
}
