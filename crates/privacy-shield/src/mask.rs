//! Textual masking for values headed to storage or logs.

use crate::patterns;

/// Kind of field a value came from, driving the masking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Password,
    Pin,
    Cvv,
    Email,
    Card,
    Phone,
    General,
}

impl FieldType {
    /// Classify a field by its name, for callers that only have one.
    pub fn from_field_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("password") || lower.contains("pwd") || lower.contains("pass") {
            FieldType::Password
        } else if lower.contains("pin") {
            FieldType::Pin
        } else if lower.contains("cvv") || lower.contains("cvc") {
            FieldType::Cvv
        } else if lower.contains("email") {
            FieldType::Email
        } else if lower.contains("card") {
            FieldType::Card
        } else if lower.contains("phone") {
            FieldType::Phone
        } else {
            FieldType::General
        }
    }
}

/// Mask a sensitive value before it is persisted.
///
/// Secrets are fully replaced; identifying values keep just enough to
/// be recognizable (last four digits, first two letters of an email
/// local part).
pub fn mask_for_storage(value: &str, field_type: FieldType) -> String {
    if value.is_empty() {
        return String::new();
    }
    match field_type {
        FieldType::Password | FieldType::Pin | FieldType::Cvv => "*".repeat(value.chars().count()),
        FieldType::Email => match value.split_once('@') {
            Some((local, domain)) => {
                let prefix: String = local.chars().take(2).collect();
                format!("{}***@{}", prefix, domain)
            }
            None => value.to_string(),
        },
        FieldType::Card => {
            let digits: Vec<char> = value.chars().collect();
            if digits.len() >= 4 {
                let last4: String = digits[digits.len() - 4..].iter().collect();
                format!("****-****-****-{}", last4)
            } else {
                value.to_string()
            }
        }
        FieldType::Phone => {
            let chars: Vec<char> = value.chars().collect();
            if chars.len() >= 4 {
                let last4: String = chars[chars.len() - 4..].iter().collect();
                format!("***-***-{}", last4)
            } else {
                value.to_string()
            }
        }
        FieldType::General => value.to_string(),
    }
}

/// Replace recognizable sensitive values in free text with markers.
pub fn sanitize_text(text: &str) -> String {
    let sanitized = patterns::CREDIT_CARD.replace_all(text, "[CARD REDACTED]");
    let sanitized = patterns::SSN.replace_all(&sanitized, "[SSN REDACTED]");
    let sanitized = patterns::EMAIL.replace_all(&sanitized, "[EMAIL REDACTED]");
    let sanitized = patterns::PHONE.replace_all(&sanitized, "[PHONE REDACTED]");
    sanitized.into_owned()
}
