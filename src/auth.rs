use crate::error::{Error, Result};

/// Check a presented token against the configured one
pub fn validate_token(expected: &str, presented: Option<&str>) -> Result<()> {
    match presented {
        Some(token) if !token.is_empty() && token == expected => Ok(()),
        _ => Err(Error::validation("Invalid token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_match() {
        assert!(validate_token("s3cret", Some("s3cret")).is_ok());
    }

    #[test]
    fn rejects_mismatch_missing_and_empty() {
        for presented in [Some("S3CRET"), Some("s3cret "), Some(""), None] {
            let err = validate_token("s3cret", presented).unwrap_err();
            assert_eq!(err.to_string(), "Invalid token");
        }
    }

    #[test]
    fn empty_configured_token_never_matches() {
        assert!(validate_token("", Some("")).is_err());
        assert!(validate_token("", None).is_err());
    }
}
