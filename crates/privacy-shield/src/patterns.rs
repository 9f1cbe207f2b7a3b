//! Sensitive data patterns.
//!
//! Nine pattern classes cover the data the shield refuses to let
//! through unblurred: credential keywords, one-time codes, card and
//! SSN shapes, contact details, and API credentials.

use once_cell::sync::Lazy;
use regex::Regex;

pub static PASSWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)password|pwd|pass|secret").unwrap());
pub static OTP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)otp|code|verification|2fa|mfa").unwrap());
pub static CREDIT_CARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}").unwrap());
pub static CVV: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)cvv|cvc|security code").unwrap());
pub static SSN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{3}[-\s]?\d{2}[-\s]?\d{4}").unwrap());
pub static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
pub static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d{1,3}?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
pub static API_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)api[_-]?key|token|secret[_-]?key").unwrap());
pub static ACCOUNT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)account.*\d{8,}").unwrap());

static ALL: Lazy<Vec<&'static Lazy<Regex>>> = Lazy::new(|| {
    vec![
        &PASSWORD,
        &OTP,
        &CREDIT_CARD,
        &CVV,
        &SSN,
        &EMAIL,
        &PHONE,
        &API_KEY,
        &ACCOUNT_NUMBER,
    ]
});

/// Labels whose adjacent input field is assumed to hold sensitive data.
pub const SENSITIVE_LABELS: &[&str] = &[
    "password", "email", "card", "cvv", "ssn", "otp", "code", "pin",
];

const SENSITIVE_FIELD_KEYWORDS: &[&str] = &[
    "password", "pwd", "pass", "secret", "otp", "code", "2fa", "mfa", "card", "cvv", "cvc",
    "ssn", "social", "pin", "token", "key",
];

/// Whether any pattern class matches the text.
pub fn is_sensitive_text(text: &str) -> bool {
    ALL.iter().any(|re| re.is_match(text))
}

/// Whether the text looks like a label for a sensitive input field.
pub fn is_sensitive_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    SENSITIVE_LABELS.iter().any(|label| lower.contains(label))
}

/// Whether a form field name indicates sensitive data.
pub fn is_sensitive_field(field_name: &str) -> bool {
    let lower = field_name.to_lowercase();
    SENSITIVE_FIELD_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_shapes_match() {
        assert!(is_sensitive_text("4111 1111 1111 1111"));
        assert!(is_sensitive_text("4111-1111-1111-1111"));
        assert!(is_sensitive_text("4111111111111111"));
    }

    #[test]
    fn keyword_classes_are_case_insensitive() {
        assert!(is_sensitive_text("Enter PASSWORD"));
        assert!(is_sensitive_text("Verification Code"));
        assert!(is_sensitive_text("api_key"));
    }

    #[test]
    fn plain_prose_passes() {
        assert!(!is_sensitive_text("Welcome to the dashboard"));
    }

    #[test]
    fn field_names() {
        assert!(is_sensitive_field("user_password"));
        assert!(is_sensitive_field("cardNumber"));
        assert!(is_sensitive_field("SSN"));
        assert!(!is_sensitive_field("first_name"));
    }
}
