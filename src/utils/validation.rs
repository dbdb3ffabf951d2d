use crate::errors::{AppError, Result};
use chrono::NaiveDate;
use regex::Regex;

pub struct Validator;

impl Validator {
    pub fn validate_email(email: &str) -> Result<()> {
        let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .map_err(|e| AppError::InternalError(format!("Regex error: {}", e)))?;

        if !email_regex.is_match(email) {
            return Err(AppError::ValidationError("Invalid email format".to_string()));
        }

        if email.len() > 254 {
            return Err(AppError::ValidationError("Email too long".to_string()));
        }

        Ok(())
    }

    pub fn validate_holder_name(name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Holder name cannot be empty".to_string()));
        }

        if name.chars().count() > 200 {
            return Err(AppError::ValidationError("Holder name must be at most 200 characters".to_string()));
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(AppError::ValidationError("Holder name contains control characters".to_string()));
        }

        Ok(())
    }

    /// ISO 3166 alpha-2 or alpha-3 code.
    pub fn validate_country_code(country: &str) -> Result<()> {
        let country_regex = Regex::new(r"^[A-Za-z]{2,3}$")
            .map_err(|e| AppError::InternalError(format!("Regex error: {}", e)))?;

        if !country_regex.is_match(country.trim()) {
            return Err(AppError::ValidationError(format!(
                "Invalid issuing country '{}': use a 2 or 3 letter country code",
                country
            )));
        }
        Ok(())
    }

    pub fn validate_document_number(number: &str) -> Result<()> {
        let number_regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 /-]{0,39}$")
            .map_err(|e| AppError::InternalError(format!("Regex error: {}", e)))?;

        if !number_regex.is_match(number.trim()) {
            return Err(AppError::ValidationError(
                "Document number must be 1-40 letters, digits, spaces, dashes or slashes".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parse_expiry_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::ValidationError(format!("Invalid expiry date '{}': expected YYYY-MM-DD", value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(Validator::validate_email("dave@example.com").is_ok());
        assert!(Validator::validate_email("dave.brown+kyc@mail.example.org").is_ok());
        assert!(Validator::validate_email("not-an-email").is_err());
        assert!(Validator::validate_email("a@b").is_err());
    }

    #[test]
    fn test_holder_name_validation() {
        assert!(Validator::validate_holder_name("Dave Brown").is_ok());
        assert!(Validator::validate_holder_name("   ").is_err());
        assert!(Validator::validate_holder_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_country_code_validation() {
        assert!(Validator::validate_country_code("US").is_ok());
        assert!(Validator::validate_country_code("deu").is_ok());
        assert!(Validator::validate_country_code("U").is_err());
        assert!(Validator::validate_country_code("USA1").is_err());
    }

    #[test]
    fn test_document_number_validation() {
        assert!(Validator::validate_document_number("P123456").is_ok());
        assert!(Validator::validate_document_number("DL 789-22").is_ok());
        assert!(Validator::validate_document_number("").is_err());
        assert!(Validator::validate_document_number("-leading").is_err());
    }

    #[test]
    fn test_expiry_parsing() {
        assert_eq!(
            Validator::parse_expiry_date("2030-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
        );
        assert!(Validator::parse_expiry_date("01/01/2030").is_err());
    }
}
