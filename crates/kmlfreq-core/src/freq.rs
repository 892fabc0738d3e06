//! Frequency extraction and canonical key rounding

use once_cell::sync::Lazy;
use regex::Regex;

/// Decimal frequency immediately followed by its unit marker, e.g. "146.520MHz"
static FREQ_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+)MHz").expect("frequency pattern compiles"));

/// Extract the frequency substring from a display name.
///
/// Returns the first `\d+\.\d+` immediately followed by `MHz`, or `None` when
/// the label carries no frequency. Folders without a frequency label pass
/// through aggregation untouched.
#[must_use = "the extracted frequency should be canonicalized"]
pub fn extract_frequency(label: &str) -> Option<&str> {
    FREQ_RE
        .captures(label)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Round a frequency string to a fixed number of decimal places.
///
/// Rounds half away from zero on `value * 10^decimals` and formats with
/// exactly `decimals` fractional digits, so `"146.535"` at one decimal place
/// becomes `"146.5"` and `"100.05"` becomes `"100.1"`. The same function keys
/// both folder labels and exclusion rows, which is what makes their keys
/// compare equal.
///
/// Non-numeric input is returned unchanged: a malformed label or exclusion
/// row becomes a literal key instead of aborting the run.
#[must_use = "the canonical key should be used for grouping or membership tests"]
pub fn canonicalize(raw: &str, decimals: u32) -> String {
    match raw.trim().parse::<f64>() {
        Ok(value) => {
            let scale = 10f64.powi(decimals as i32);
            let rounded = (value * scale).round() / scale;
            let prec = decimals as usize;
            format!("{rounded:.prec$}")
        }
        Err(_) => raw.to_string(),
    }
}
