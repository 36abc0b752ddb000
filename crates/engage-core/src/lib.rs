//! Core domain layer for the engagement report.
//!
//! Holds the cleaned session record model, the tolerant field parsers,
//! duration bucketing and weekday assignment, numeric formatting helpers,
//! the error taxonomy and CLI settings.

pub mod bucketize;
pub mod error;
pub mod formatting;
pub mod models;
pub mod parsers;
pub mod settings;

pub use error::{EngageError, Result};
