//! Run diagnostics
//!
//! The transformation returns an ordered event stream instead of printing
//! progress itself; callers render, log or serialize the events as they see
//! fit.

use serde::{Deserialize, Serialize};

/// One diagnostic event emitted during a transformation, in occurrence order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A folder became the canonical holder for a rounded frequency key
    GroupCreated {
        /// Canonical frequency key
        key: String,
    },
    /// A later folder with the same key was merged into the canonical holder
    GroupMerged {
        /// Canonical frequency key
        key: String,
        /// Number of LOB children relocated to the canonical holder
        moved_lobs: usize,
    },
    /// A canonical folder matched the exclusion table and was dropped
    GroupExcluded {
        /// Canonical frequency key
        key: String,
    },
    /// No exclusion table was supplied; the filter pass was skipped
    ExclusionSkipped,
}

/// Summary of one transformation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Diagnostics in the order they occurred
    pub events: Vec<Event>,
    /// Unique rounded frequencies after grouping
    pub unique_frequencies: usize,
    /// Duplicate folders merged away
    pub merged: usize,
    /// Canonical folders dropped by the exclusion table
    pub excluded: usize,
}

impl Report {
    /// Build a report from the event stream, deriving the summary counts
    pub fn new(events: Vec<Event>, unique_frequencies: usize) -> Self {
        let merged = events
            .iter()
            .filter(|e| matches!(e, Event::GroupMerged { .. }))
            .count();
        let excluded = events
            .iter()
            .filter(|e| matches!(e, Event::GroupExcluded { .. }))
            .count();
        Self {
            events,
            unique_frequencies,
            merged,
            excluded,
        }
    }
}
