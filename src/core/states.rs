use crate::error::{NaipError, Result};

/// USPS abbreviations for the 50 states covered by the NAIP program.
pub const STATE_CODES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// Normalize a listing label to a known state code, or `None` if it is not
/// one. Used when scanning listings, where unrecognized folder names are
/// skipped rather than rejected.
pub fn normalize(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.len() != 2 {
        return None;
    }
    let upper = trimmed.to_ascii_uppercase();
    STATE_CODES.contains(&upper.as_str()).then_some(upper)
}

/// Validate a user-supplied state abbreviation, rejecting anything outside
/// the known set.
pub fn validate(code: &str) -> Result<String> {
    normalize(code).ok_or_else(|| NaipError::InvalidState {
        code: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_known_codes() {
        assert_eq!(normalize("NC"), Some("NC".to_string()));
        assert_eq!(normalize("nc"), Some("NC".to_string()));
        assert_eq!(normalize(" ms "), Some("MS".to_string()));
    }

    #[test]
    fn test_normalize_rejects_unknown_labels() {
        assert_eq!(normalize("ZZ"), None);
        assert_eq!(normalize("NAIP"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("N"), None);
    }

    #[test]
    fn test_validate_errors_on_unknown_code() {
        assert_eq!(validate("wv").unwrap(), "WV");
        assert!(matches!(
            validate("XX").unwrap_err(),
            crate::error::NaipError::InvalidState { .. }
        ));
    }

}
