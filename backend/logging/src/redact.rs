//! Log Redaction
//!
//! Masks phone numbers before they reach a log line.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{2}[-.\s]?\d{2}")
        .expect("telephone pattern is valid")
});

/// Number of trailing digits left readable in a redacted destination.
const VISIBLE_DIGITS: usize = 2;

/// Mask a contact destination for logging.
///
/// Every digit except the last two becomes `*`; separators and other
/// characters are kept so the shape stays recognisable
/// (`+7 (999) 123-45-67` → `+* (***) ***-**-67`).
pub fn redact_destination(destination: &str) -> String {
    let digits = destination.chars().filter(char::is_ascii_digit).count();
    let mut to_mask = digits.saturating_sub(VISIBLE_DIGITS);
    destination
        .chars()
        .map(|c| {
            if c.is_ascii_digit() && to_mask > 0 {
                to_mask -= 1;
                '*'
            } else {
                c
            }
        })
        .collect()
}

/// Replace phone numbers anywhere in free text, such as a contact name
/// that has a number pasted into it.
pub fn redact_phone_numbers(input: &str) -> String {
    TELEPHONE_RE
        .replace_all(input, "[REDACTED_PHONE]")
        .into_owned()
}
