//! Common validation rules shared across request payloads.

use validator::ValidateEmail;

/// Passwords that appear in every breach corpus; rejected outright.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "qwerty123",
    "letmein123",
    "admin123",
    "iloveyou",
    "welcome1",
    "sunshine1",
    "monkey123",
];

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Itemized password strength failures; empty when the password is acceptable.
///
/// Policy: at least 8 characters, one uppercase, one lowercase, one digit,
/// one special character, no whitespace, not a common password.
pub fn password_strength_errors(password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.len() < 8 {
        errors.push("password must be at least 8 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password must contain a digit".to_string());
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        errors.push("password must contain a special character".to_string());
    }
    if password.chars().any(char::is_whitespace) {
        errors.push("password must not contain whitespace".to_string());
    }
    if COMMON_PASSWORDS.contains(&password.to_ascii_lowercase().as_str()) {
        errors.push("password is too common".to_string());
    }

    errors
}
