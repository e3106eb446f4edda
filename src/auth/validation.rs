use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^03\d{9}$").unwrap();
    static ref PASSWORD_SPECIAL_RE: Regex = Regex::new(r"[!@#$%^&*()]").unwrap();
}

/// Phone numbers are `03` followed by 9 digits, 11 digits total.
pub fn validate_phone(phone: &str) -> Result<(), ApiError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Phone must start with 03 and be 11 digits".into(),
        ))
    }
}

pub fn validate_semester(semester: i32) -> Result<(), ApiError> {
    if (1..=8).contains(&semester) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Semester must be an integer between 1 and 8".into(),
        ))
    }
}

/// Applies to signup and every password-set path, including resets.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if PASSWORD_SPECIAL_RE.is_match(password) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Password must include at least one special character: ! @ # $ % ^ & * ( )".into(),
        ))
    }
}
