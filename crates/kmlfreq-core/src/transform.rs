//! The transformation entry point: bytes in, bytes out
//!
//! Each call parses its own tree, runs the grouping pass, the removal sweep,
//! the optional exclusion filter and the serializer, and discards everything
//! but the output bytes and the report. No state is shared across calls.

use std::collections::{HashMap, HashSet};

use crate::dom::{self, XmlElement};
use crate::error::{KmlFreqError, Result};
use crate::exclusion::read_exclusion_csv;
use crate::grouping::{group_folders, sweep};
use crate::report::{Event, Report};

/// Result of a successful transformation
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Re-serialized KML with duplicates merged and exclusions removed
    pub kml: Vec<u8>,
    /// Ordered diagnostics and summary counts
    pub report: Report,
}

/// Merge duplicate frequency folders in a KML document and optionally drop
/// folders listed in a CSV exclusion table.
///
/// `decimals` is the rounding precision for frequency keys. The calling
/// surface is expected to keep it in `0..=10`; the core accepts any value.
///
/// # Errors
///
/// Returns [`KmlFreqError::Xml`] if the document cannot be parsed,
/// [`KmlFreqError::InvalidStructure`] if it has no `Document` container, and
/// [`KmlFreqError::Csv`] if the exclusion table cannot be read. Per-label
/// anomalies (missing or malformed frequency text) never abort the run.
#[must_use = "this function returns the transformed document that should be delivered"]
pub fn transform(kml: &[u8], decimals: u32, exclusion_csv: Option<&[u8]>) -> Result<Transformed> {
    let mut root = dom::parse(kml)?;
    log::debug!("root element: {}", root.name);

    let container = document_container_mut(&mut root)?;

    let outcome = group_folders(container, decimals);
    let unique_frequencies = outcome.registry.len();
    let mut events = outcome.events;

    // first sweep: duplicates merged during grouping
    let remap = sweep(container, &outcome.removed);

    // canonical folders are never marked during grouping, so every registry
    // entry survives the sweep; carry it across with remapped indices
    let registry: HashMap<String, usize> = outcome
        .registry
        .into_iter()
        .filter_map(|(key, index)| remap.get(&index).map(|&new| (key, new)))
        .collect();

    match exclusion_csv {
        Some(bytes) => {
            let excluded = read_exclusion_csv(bytes, decimals)?;
            let mut marked = HashSet::new();

            // document order keeps the event stream deterministic
            let mut entries: Vec<(String, usize)> = registry.into_iter().collect();
            entries.sort_by_key(|&(_, index)| index);
            for (key, index) in entries {
                if excluded.contains(&key) {
                    log::debug!("marked for removal (CSV match): {key} MHz");
                    marked.insert(index);
                    events.push(Event::GroupExcluded { key });
                }
            }

            // second sweep: exclusion matches
            sweep(container, &marked);
        }
        None => {
            log::debug!("no exclusion table provided; skipping filter pass");
            events.push(Event::ExclusionSkipped);
        }
    }

    log::info!("grouped into {unique_frequencies} unique frequencies");
    let kml = dom::serialize(&root)?;
    Ok(Transformed {
        kml,
        report: Report::new(events, unique_frequencies),
    })
}

/// The `Document` element holding the frequency folders.
///
/// KML nests it directly under the root `kml` element; a root that itself is
/// a `Document` (no `kml` wrapper) is accepted as well.
fn document_container_mut(root: &mut XmlElement) -> Result<&mut XmlElement> {
    if root.name == "Document" {
        Ok(root)
    } else {
        root.child_mut("Document").ok_or_else(|| {
            KmlFreqError::InvalidStructure("no Document element found".to_string())
        })
    }
}
