//! Rating extraction for sensitivity analysis.
//!
//! The model answers in free text, so the rating is scraped rather than
//! parsed against a schema: the first run of ASCII digits wins, whatever it
//! is attached to.

use super::analysis::MAX_SENSITIVITY_LEVEL;

/// Extract the sensitivity level from a free-form model response.
///
/// # Return Value
///
/// - The first integer in the response, clamped to 0-100
/// - 0 if the response contains no digits
///
/// # Examples
///
/// ```
/// use promptline_domain::sensitivity::parsing::parse_sensitivity_level;
///
/// assert_eq!(parse_sensitivity_level("15 — this text is entirely benign."), 15);
/// assert_eq!(parse_sensitivity_level("Rating: 72/100"), 72);
/// assert_eq!(parse_sensitivity_level("No numbers here"), 0); // fallback
/// ```
pub fn parse_sensitivity_level(response: &str) -> u8 {
    let Some(start) = response.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };

    let rest = &response[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    // A run too long for u64 is certainly above the scale.
    match digits.parse::<u64>() {
        Ok(value) => value.min(u64::from(MAX_SENSITIVITY_LEVEL)) as u8,
        Err(_) => MAX_SENSITIVITY_LEVEL,
    }
}
