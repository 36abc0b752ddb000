//! Top-level analysis pipeline.
//!
//! Loads session records from a data path, resolves the duration bucket
//! boundaries, runs every aggregation, and packages the results together with
//! run metadata into a single [`AnalysisReport`].

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use engage_core::bucketize::DurationBuckets;
use engage_core::models::SessionRecord;
use engage_core::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::{
    BucketBugImpact, CustomerSessions, DistributionBin, EngagementAggregator, EngagementRates,
    WeekdayUsage,
};
use crate::reader::load_session_records;

// ── Bucket selection ──────────────────────────────────────────────────────────

/// How the duration bucket boundaries are chosen for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketSelection {
    /// The historical fixed boundaries.
    Legacy,
    /// Boundaries derived from the loaded durations (min, P25, P50, P75, max).
    FromData,
    /// Explicit user-supplied boundaries.
    Explicit([f64; 5]),
}

impl BucketSelection {
    /// Derive the selection from CLI settings.
    ///
    /// Explicit `--bucket-bounds` wins over `--buckets data`, which wins over
    /// the legacy default. Malformed bounds fail here, before any data is
    /// loaded.
    pub fn from_settings(settings: &engage_core::settings::Settings) -> Result<Self> {
        if let Some(raw) = &settings.bucket_bounds {
            let buckets = DurationBuckets::parse_bounds(raw)?;
            return Ok(BucketSelection::Explicit(buckets.bounds()));
        }
        Ok(match settings.buckets.as_str() {
            "data" => BucketSelection::FromData,
            _ => BucketSelection::Legacy,
        })
    }
}

// ── Report types ──────────────────────────────────────────────────────────────

/// Bookkeeping about an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp of when the report was generated.
    pub generated_at: String,
    pub files_read: usize,
    pub rows_read: u64,
    pub rows_dropped: u64,
    pub records_analyzed: usize,
    pub distinct_customers: u64,
    pub load_time_seconds: f64,
    pub aggregate_time_seconds: f64,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// The boundaries the bug-impact table was bucketed with.
    pub bucket_bounds: [f64; 5],
    pub session_counts: Vec<CustomerSessions>,
    pub session_distribution: Vec<DistributionBin>,
    pub engagement: EngagementRates,
    pub bug_impact: Vec<BucketBugImpact>,
    pub weekday_usage: Vec<WeekdayUsage>,
    pub metadata: AnalysisMetadata,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the full analysis over `data_path`.
///
/// Load-level failures (missing path, no CSV files, malformed files, invalid
/// bucket boundaries) abort the run; rows dropped during cleaning only show
/// up in the metadata counters.
pub fn analyze_sessions(data_path: &Path, selection: &BucketSelection) -> Result<AnalysisReport> {
    info!("Starting analysis of {}", data_path.display());

    // ── Step 1: Load and clean ────────────────────────────────────────────
    let load_start = Instant::now();
    let loaded = load_session_records(data_path)?;
    let load_time = load_start.elapsed().as_secs_f64();
    debug!(
        "Step 1: loaded {} records in {:.3}s",
        loaded.records.len(),
        load_time
    );

    // ── Step 2: Resolve bucket boundaries ─────────────────────────────────
    let buckets = resolve_buckets(selection, &loaded.records)?;
    debug!("Step 2: bucket bounds {:?}", buckets.bounds());

    // ── Step 3: Aggregate ─────────────────────────────────────────────────
    let aggregate_start = Instant::now();
    let session_counts = EngagementAggregator::session_counts(&loaded.records);
    let session_distribution = EngagementAggregator::session_count_distribution(&session_counts);
    let engagement = EngagementAggregator::engagement_rates(&loaded.records);
    let bug_impact = EngagementAggregator::bug_impact(&loaded.records, &buckets);
    let weekday_usage = EngagementAggregator::weekday_usage(&loaded.records);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();
    debug!("Step 3: aggregated in {:.3}s", aggregate_time);

    // ── Step 4: Package the report ────────────────────────────────────────
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        files_read: loaded.files_read,
        rows_read: loaded.rows_read,
        rows_dropped: loaded.rows_dropped,
        records_analyzed: loaded.records.len(),
        distinct_customers: EngagementAggregator::distinct_customers(&loaded.records),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };

    info!(
        "Analysis complete: {} records, {} customers",
        metadata.records_analyzed, metadata.distinct_customers
    );

    Ok(AnalysisReport {
        bucket_bounds: buckets.bounds(),
        session_counts,
        session_distribution,
        engagement,
        bug_impact,
        weekday_usage,
        metadata,
    })
}

/// Turn a [`BucketSelection`] into concrete boundaries.
fn resolve_buckets(
    selection: &BucketSelection,
    records: &[SessionRecord],
) -> Result<DurationBuckets> {
    match selection {
        BucketSelection::Legacy => Ok(DurationBuckets::legacy()),
        BucketSelection::FromData => {
            let durations: Vec<f64> = records.iter().map(|r| r.session_duration).collect();
            DurationBuckets::from_durations(&durations)
        }
        BucketSelection::Explicit(bounds) => DurationBuckets::new(*bounds),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
