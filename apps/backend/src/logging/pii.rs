//! Redaction for values that may reach the logs.
//!
//! Session tokens are bearer credentials and display names are personal
//! data; raw database errors can echo either back.

use std::fmt;

use lazy_regex::{regex, Captures};

/// Masks opaque tokens and email addresses inside free text.
///
/// - emails keep the first character of the local part and the domain
/// - base64/base64url runs and hex runs of 16+ chars become `[REDACTED_TOKEN]`
pub fn redact(input: &str) -> String {
    let email = regex!(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b");
    let token = regex!(r"[A-Za-z0-9+/_-]{16,}={0,2}");

    let email_redacted = email.replace_all(input, |caps: &Captures| {
        let full = &caps[0];
        match full.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                let first: String = local.chars().take(1).collect();
                format!("{first}***@{domain}")
            }
            _ => full.to_string(),
        }
    });

    token
        .replace_all(&email_redacted, "[REDACTED_TOKEN]")
        .into_owned()
}

/// Display names are logged as first character plus length.
pub fn mask_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{first}***({})", name.chars().count()),
        None => String::new(),
    }
}

/// Wrapper that redacts when formatted with `%` or `?`.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_masked() {
        // 43-char base64url token as issued on join
        let token = "Qm9vdHN0cmFwLXRva2VuLWZvci10ZXN0aW5nLW9ubHk";
        assert_eq!(redact(token), "[REDACTED_TOKEN]");
        assert_eq!(
            redact(&format!("bearer {token} rejected")),
            "bearer [REDACTED_TOKEN] rejected"
        );
    }

    #[test]
    fn session_hashes_are_masked() {
        let hash = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert_eq!(redact(hash), "[REDACTED_TOKEN]");
    }

    #[test]
    fn emails_keep_first_char_and_domain() {
        assert_eq!(redact("fan@tempo.example"), "f***@tempo.example");
    }

    #[test]
    fn ordinary_text_is_untouched() {
        assert_eq!(redact("UNIQUE constraint failed: rooms.code"), "UNIQUE constraint failed: rooms.code");
        assert_eq!(redact(""), "");
    }

    #[test]
    fn names_are_masked() {
        assert_eq!(mask_name("Jordan"), "J***(6)");
        assert_eq!(mask_name(""), "");
    }

    #[test]
    fn wrapper_redacts_in_both_formats() {
        let r = Redacted("x@y.z");
        assert_eq!(format!("{r}"), "x***@y.z");
        assert_eq!(format!("{r:?}"), "x***@y.z");
    }
}
