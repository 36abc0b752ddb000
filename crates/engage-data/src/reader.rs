//! CSV discovery and loading for the engagement report.
//!
//! Reads session rows from CSV exports and converts them into
//! [`SessionRecord`] structs for downstream aggregation. Incomplete rows are
//! dropped here; a record that survives loading is complete.

use std::path::{Path, PathBuf};

use engage_core::error::{EngageError, Result};
use engage_core::models::{SessionRecord, REQUIRED_COLUMNS};
use engage_core::parsers::FieldParser;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// The outcome of loading one data path: cleaned records plus row accounting.
///
/// Records keep their input order (per file, files visited in path order).
#[derive(Debug, Clone, Default)]
pub struct LoadedSessions {
    /// Cleaned session records, every field present and parseable.
    pub records: Vec<SessionRecord>,
    /// Number of CSV files read.
    pub files_read: usize,
    /// Data rows seen across all files (header rows excluded).
    pub rows_read: u64,
    /// Rows dropped for a missing or unparseable field.
    pub rows_dropped: u64,
}

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load and clean session rows from `data_path`.
///
/// `data_path` may be a single CSV file or a directory that is scanned
/// recursively. Load-level problems (missing path, no CSV files, unreadable
/// file, missing header columns, a malformed CSV stream) are fatal; a row
/// with a missing or unparseable field is silently dropped and only shows up
/// in [`LoadedSessions::rows_dropped`].
pub fn load_session_records(data_path: &Path) -> Result<LoadedSessions> {
    if !data_path.exists() {
        return Err(EngageError::DataPathNotFound(data_path.to_path_buf()));
    }

    let files = if data_path.is_file() {
        vec![data_path.to_path_buf()]
    } else {
        find_csv_files(data_path)
    };
    if files.is_empty() {
        return Err(EngageError::NoDataFiles(data_path.to_path_buf()));
    }

    let mut loaded = LoadedSessions::default();

    for file_path in &files {
        read_single_file(file_path, &mut loaded)?;
    }

    debug!(
        "Loaded {} records from {} files ({} rows dropped)",
        loaded.records.len(),
        loaded.files_read,
        loaded.rows_dropped
    );

    Ok(loaded)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Positions of the required columns within one file's header row.
///
/// Files may order (and intersperse) columns freely; lookups are resolved
/// once per file.
struct ColumnIndex {
    customer_id: usize,
    session_id: usize,
    session_duration: usize,
    likes_given: usize,
    comment_given: usize,
    projects_added: usize,
    bug_occured: usize,
    bugs_in_session: usize,
    login_date: usize,
}

/// Resolve the required column positions from a header row.
///
/// Header matching ignores case and surrounding whitespace. All missing
/// columns are reported together rather than one at a time.
fn resolve_columns(path: &Path, headers: &csv::StringRecord) -> Result<ColumnIndex> {
    let mut positions = [0_usize; 9];
    let mut missing: Vec<String> = Vec::new();

    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
        {
            Some(i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(EngageError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    Ok(ColumnIndex {
        customer_id: positions[0],
        session_id: positions[1],
        session_duration: positions[2],
        likes_given: positions[3],
        comment_given: positions[4],
        projects_added: positions[5],
        bug_occured: positions[6],
        bugs_in_session: positions[7],
        login_date: positions[8],
    })
}

/// Read one CSV file into `loaded`, accumulating row counters.
fn read_single_file(file_path: &Path, loaded: &mut LoadedSessions) -> Result<()> {
    let file = std::fs::File::open(file_path).map_err(|e| EngageError::FileRead {
        path: file_path.to_path_buf(),
        source: e,
    })?;

    // `flexible` keeps short rows readable; their missing fields make the
    // row incomplete and it is dropped below rather than aborting the load.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| EngageError::Csv {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    let columns = resolve_columns(file_path, headers)?;

    let mut rows_read = 0_u64;
    let mut rows_dropped = 0_u64;

    for result in reader.records() {
        let record = result.map_err(|e| EngageError::Csv {
            path: file_path.to_path_buf(),
            source: e,
        })?;
        rows_read += 1;

        match map_to_session_record(&record, &columns) {
            Some(session) => loaded.records.push(session),
            None => rows_dropped += 1,
        }
    }

    debug!(
        "File {}: {} rows read, {} dropped, {} kept",
        file_path.display(),
        rows_read,
        rows_dropped,
        rows_read - rows_dropped,
    );

    loaded.files_read += 1;
    loaded.rows_read += rows_read;
    loaded.rows_dropped += rows_dropped;

    Ok(())
}

/// Map one CSV row to a [`SessionRecord`], returning `None` when any field is
/// missing, blank or unparseable.
///
/// The one exception is `login_date`: it must be non-empty but does not have
/// to parse as a date here. Rows whose date text later fails to parse fall
/// into the `Unknown` weekday category instead of being lost.
fn map_to_session_record(record: &csv::StringRecord, cols: &ColumnIndex) -> Option<SessionRecord> {
    let customer_id = non_blank(record.get(cols.customer_id)?)?;
    let session_id = non_blank(record.get(cols.session_id)?)?;
    let session_duration = FieldParser::parse_duration(record.get(cols.session_duration)?)?;
    let likes_given = FieldParser::parse_flag(record.get(cols.likes_given)?)?;
    let comment_given = FieldParser::parse_flag(record.get(cols.comment_given)?)?;
    let projects_added = FieldParser::parse_flag(record.get(cols.projects_added)?)?;
    let bug_occured = FieldParser::parse_flag(record.get(cols.bug_occured)?)?;
    let bugs_in_session = FieldParser::parse_count(record.get(cols.bugs_in_session)?)?;
    let login_date = non_blank(record.get(cols.login_date)?)?;

    Some(SessionRecord {
        customer_id: customer_id.to_string(),
        session_id: session_id.to_string(),
        session_duration,
        likes_given,
        comment_given,
        projects_added,
        bug_occured,
        bugs_in_session,
        login_date: login_date.to_string(),
    })
}

/// Trim a raw field and reject blank values.
fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
