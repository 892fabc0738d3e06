//! # kmlfreq-core
//!
//! Frequency folder aggregation for KML documents.
//!
//! Direction-finding rover sessions export one KML folder per logged radio
//! frequency, labelled like `146.520MHz`, each holding placemarks and a
//! `LOBs` subfolder of bearing lines. Logging resolution is finer than
//! channel spacing, so the same channel shows up as many near-identical
//! folders. This crate rounds each folder's frequency to a configurable
//! number of decimal places, merges folders that round to the same value,
//! and can drop frequencies listed in a CSV exclusion table.
//!
//! ## Pipeline
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Parse | [`dom`] | KML bytes -> owned XML tree |
//! | Group | [`grouping`] | merge duplicate frequency folders, first seen wins |
//! | Exclude | [`exclusion`] | drop folders listed in the CSV table (optional) |
//! | Serialize | [`dom`] | tree -> KML bytes with UTF-8 declaration |
//!
//! ## Quick Start
//!
//! ```no_run
//! use kmlfreq_core::transform;
//!
//! let kml = std::fs::read("rover_sites.kml")?;
//! let result = transform(&kml, 1, None)?;
//!
//! println!("{} unique frequencies", result.report.unique_frequencies);
//! std::fs::write("rover_sites_processed.kml", result.kml)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! With an exclusion table (first column = frequency, header row skipped):
//!
//! ```no_run
//! use kmlfreq_core::transform;
//!
//! let kml = std::fs::read("rover_sites.kml")?;
//! let csv = std::fs::read("known_repeaters.csv")?;
//! let result = transform(&kml, 1, Some(&csv))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Merge semantics
//!
//! - The first folder in document order for a rounded key is the canonical
//!   holder; its labels (and its direct children's) are rewritten to the key.
//! - Later folders for the same key move the children of their `LOBs`
//!   subfolder into the canonical holder's `LOBs` subfolder (created on
//!   demand), then disappear. Relocation is a move, never a copy, and keeps
//!   arrival order across merges.
//! - Folders whose label carries no `\d+\.\d+MHz` pattern pass through
//!   unmodified.
//! - Removal is two-phase: duplicates and exclusion matches are marked
//!   during a read-only scan and physically detached afterwards.
//!
//! ## Error Handling
//!
//! Structural problems (unparsable XML, missing `Document` container) abort
//! the call with [`KmlFreqError`]; per-label anomalies (no frequency in a
//! name, non-numeric exclusion rows) degrade gracefully and never abort.

pub mod dom;
pub mod error;
pub mod exclusion;
pub mod freq;
pub mod grouping;
pub mod report;
pub mod transform;

pub use error::{KmlFreqError, Result};
pub use report::{Event, Report};
pub use transform::{transform, Transformed};
