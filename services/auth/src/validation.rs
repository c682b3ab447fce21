//! Input validation utilities

/// Validate email
///
/// The only rule is the presence of an `@`; the message is deliberately the
/// same one login uses for bad credentials.
pub fn validate_email(email: &str) -> Result<(), String> {
    if !email.contains('@') {
        return Err("Invalid credentials".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 3 {
        return Err("Password too short".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("@").is_ok());
        assert_eq!(
            validate_email("example.com"),
            Err("Invalid credentials".to_string())
        );
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abc").is_ok());
        assert!(validate_password("äöü").is_ok());
        assert_eq!(validate_password("ab"), Err("Password too short".to_string()));
        assert!(validate_password("").is_err());
    }
}
