//! Owner email shape check

use std::sync::OnceLock;

use regex::Regex;

/// `local-part@domain`, no TLD or length rules beyond the character classes
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Check an owner email against the accepted shape
///
/// Blank input is rejected. The pattern is matched against the raw value,
/// so surrounding whitespace also fails.
pub fn is_valid_email(email: &str) -> bool {
    if email.trim().is_empty() {
        return false;
    }
    email_regex().is_match(email)
}
