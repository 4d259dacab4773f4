//! Personal-data redaction for logs and metrics
//!
//! Redaction runs strictly before anything is logged or stored in a request
//! trace. It is never applied to the prompt sent to the model; the model
//! may legitimately need the user's contact details to answer.

use regex::Regex;

pub const EMAIL_REDACTED: &str = "[EMAIL_REDACTED]";
pub const PHONE_REDACTED: &str = "[PHONE_REDACTED]";
pub const ID_REDACTED: &str = "[ID_REDACTED]";

/// Replaces recognizable personal-data patterns with fixed tokens.
pub struct PiiRedactor {
    email: Regex,
    phone: Regex,
    national_id: Regex,
}

impl PiiRedactor {
    pub fn new() -> Self {
        Self {
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("email pattern is valid"),
            phone: Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("phone pattern is valid"),
            // National-id-like sequences, e.g. 12.345.678-9.
            national_id: Regex::new(r"\b\d{1,2}\.\d{3}\.\d{3}-[0-9kK]\b")
                .expect("national id pattern is valid"),
        }
    }

    /// Replace every recognized personal-data pattern with its token.
    pub fn redact(&self, text: &str) -> String {
        let redacted = self.email.replace_all(text, EMAIL_REDACTED);
        let redacted = self.phone.replace_all(&redacted, PHONE_REDACTED);
        self.national_id
            .replace_all(&redacted, ID_REDACTED)
            .into_owned()
    }
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_emails() {
        let redactor = PiiRedactor::new();
        let out = redactor.redact("contact me at a@b.com please");
        assert!(out.contains(EMAIL_REDACTED));
        assert!(!out.contains("a@b.com"));
    }

    #[test]
    fn redacts_phone_numbers() {
        let redactor = PiiRedactor::new();
        for input in ["call 555-123-4567", "call 555.123.4567", "call 5551234567"] {
            let out = redactor.redact(input);
            assert!(out.contains(PHONE_REDACTED), "not redacted: {input}");
        }
    }

    #[test]
    fn redacts_national_ids() {
        let redactor = PiiRedactor::new();
        let out = redactor.redact("my id is 12.345.678-9");
        assert!(out.contains(ID_REDACTED));
        assert!(!out.contains("12.345.678-9"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        let redactor = PiiRedactor::new();
        let input = "Do you have Clean Code by Robert C. Martin?";
        assert_eq!(redactor.redact(input), input);
    }
}
