//! Data layer for the engagement report.
//!
//! This crate owns everything between raw CSV exports on disk and the
//! finished [`analysis::AnalysisReport`]:
//!
//! - [`reader`]: discovers CSV files and cleans rows into session records
//! - [`aggregator`]: pure reductions from records to report tables
//! - [`analysis`]: the pipeline tying loading and aggregation together

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use engage_core as core;
