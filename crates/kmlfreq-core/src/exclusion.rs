//! Exclusion table support
//!
//! The optional second input is a CSV whose first column lists frequencies to
//! drop from the output. Values are canonicalized with the same precision as
//! the grouping keys, so membership tests compare like with like.

use std::collections::HashSet;

use crate::error::Result;
use crate::freq::canonicalize;

/// Read an exclusion CSV into a set of canonical frequency keys.
///
/// The first row is treated as a header and discarded. A non-numeric first
/// column falls back to the literal string (the canonicalizer's passthrough
/// policy), so a malformed row simply never matches a real key instead of
/// aborting the filter. Rows with an empty first column are skipped.
///
/// # Errors
///
/// Returns [`crate::KmlFreqError::Csv`] if a record cannot be read at all.
#[must_use = "this function returns the exclusion set that should be applied"]
pub fn read_exclusion_csv(bytes: &[u8], decimals: u32) -> Result<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut keys = HashSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(field) = record.get(0) {
            if !field.trim().is_empty() {
                keys.insert(canonicalize(field, decimals));
            }
        }
    }
    log::debug!("exclusion table holds {} frequencies", keys.len());
    Ok(keys)
}
