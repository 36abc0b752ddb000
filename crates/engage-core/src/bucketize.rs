use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{EngageError, Result};
use crate::parsers::DateParser;

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation (the same algorithm used by NumPy's `percentile` function).
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

// ── DurationBucket ────────────────────────────────────────────────────────────

/// The duration group a session falls into.
///
/// Sessions outside the configured boundaries (including negative or
/// non-finite durations) land in [`DurationBucket::Unknown`]; every record
/// maps to exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationBucket {
    #[serde(rename = "First Quartile")]
    First,
    #[serde(rename = "Second Quartile")]
    Second,
    #[serde(rename = "Third Quartile")]
    Third,
    #[serde(rename = "Fourth Quartile")]
    Fourth,
    Unknown,
}

impl DurationBucket {
    /// All buckets in report order.
    pub const ALL: [DurationBucket; 5] = [
        DurationBucket::First,
        DurationBucket::Second,
        DurationBucket::Third,
        DurationBucket::Fourth,
        DurationBucket::Unknown,
    ];

    /// Human-readable group label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::First => "First Quartile",
            DurationBucket::Second => "Second Quartile",
            DurationBucket::Third => "Third Quartile",
            DurationBucket::Fourth => "Fourth Quartile",
            DurationBucket::Unknown => "Unknown",
        }
    }
}

// ── DurationBuckets ───────────────────────────────────────────────────────────

/// Boundaries historically used for this dataset. They were true quartiles of
/// the data they were derived from; for any other dataset prefer
/// [`DurationBuckets::from_durations`] or explicit bounds.
pub const LEGACY_BOUNDS: [f64; 5] = [0.0, 611.0, 1152.0, 1778.0, 2395.0];

/// Five ascending duration boundaries defining the four quartile buckets.
///
/// A duration `d` is assigned `First` when `bounds[0] <= d <= bounds[1]` and
/// the `k`-th bucket when `bounds[k-1] < d <= bounds[k]`; anything outside
/// `[bounds[0], bounds[4]]` is `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBuckets {
    bounds: [f64; 5],
}

impl DurationBuckets {
    /// Build buckets from explicit boundaries.
    ///
    /// Boundaries must be finite and strictly ascending.
    pub fn new(bounds: [f64; 5]) -> Result<Self> {
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(EngageError::InvalidBounds(
                "bounds must be finite numbers".to_string(),
            ));
        }
        if !bounds.windows(2).all(|w| w[0] < w[1]) {
            return Err(EngageError::InvalidBounds(format!(
                "bounds must be strictly ascending, got {:?}",
                bounds
            )));
        }
        Ok(Self { bounds })
    }

    /// The historical fixed boundaries (see [`LEGACY_BOUNDS`]).
    pub fn legacy() -> Self {
        Self {
            bounds: LEGACY_BOUNDS,
        }
    }

    /// Derive boundaries from the data itself: minimum, P25, P50, P75 and
    /// maximum of the finite durations.
    ///
    /// Fails when no finite durations exist or when the computed boundaries
    /// tie (heavily skewed data), since tied boundaries would make a bucket
    /// unreachable.
    pub fn from_durations(durations: &[f64]) -> Result<Self> {
        let mut sorted: Vec<f64> = durations.iter().copied().filter(|d| d.is_finite()).collect();
        if sorted.is_empty() {
            return Err(EngageError::InvalidBounds(
                "no finite durations to derive bounds from".to_string(),
            ));
        }
        sorted.sort_by(f64::total_cmp);

        let bounds = [
            sorted[0],
            percentile(&sorted, 25.0),
            percentile(&sorted, 50.0),
            percentile(&sorted, 75.0),
            sorted[sorted.len() - 1],
        ];
        Self::new(bounds)
    }

    /// Parse boundaries from a comma-separated string such as
    /// `"0,611,1152,1778,2395"`.
    pub fn parse_bounds(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 5 {
            return Err(EngageError::InvalidBounds(format!(
                "expected 5 comma-separated values, got {}",
                parts.len()
            )));
        }
        let mut bounds = [0.0_f64; 5];
        for (slot, part) in bounds.iter_mut().zip(&parts) {
            *slot = part.parse::<f64>().map_err(|_| {
                EngageError::InvalidBounds(format!("\"{}\" is not a number", part))
            })?;
        }
        Self::new(bounds)
    }

    /// The five boundaries in ascending order.
    pub fn bounds(&self) -> [f64; 5] {
        self.bounds
    }

    /// Assign a session duration to its bucket.
    ///
    /// The first bucket is closed at both ends so the lowest boundary value
    /// itself is kept; the rest are half-open `(lo, hi]`. Durations below the
    /// first boundary, above the last, or non-finite map to
    /// [`DurationBucket::Unknown`].
    pub fn bucket_for(&self, duration: f64) -> DurationBucket {
        let [lo, b1, b2, b3, hi] = self.bounds;
        if !duration.is_finite() || duration < lo || duration > hi {
            return DurationBucket::Unknown;
        }
        if duration <= b1 {
            DurationBucket::First
        } else if duration <= b2 {
            DurationBucket::Second
        } else if duration <= b3 {
            DurationBucket::Third
        } else {
            DurationBucket::Fourth
        }
    }
}

impl Default for DurationBuckets {
    fn default() -> Self {
        Self::legacy()
    }
}

// ── DayOfWeek ─────────────────────────────────────────────────────────────────

/// Weekday labels indexed by ISO weekday number (0 = Monday).
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Day of the week a session's login date falls on.
///
/// `Unknown` is its own category for rows whose login date failed to parse;
/// those rows are never folded into Monday. Variant order doubles as report
/// order, so sorting puts `Unknown` after Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
    Unknown,
}

impl DayOfWeek {
    /// The seven real weekdays, Monday first.
    pub const WEEK: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    /// Parse a raw login-date string and return the weekday it falls on, or
    /// `Unknown` when the date cannot be parsed.
    pub fn from_login_date(raw: &str) -> DayOfWeek {
        match DateParser::parse(raw) {
            Some(date) => Self::WEEK[date.weekday().num_days_from_monday() as usize],
            None => DayOfWeek::Unknown,
        }
    }

    /// ISO weekday index: 0 = Monday ... 6 = Sunday, 7 = Unknown.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short weekday label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            DayOfWeek::Unknown => "Unknown",
            _ => DAY_LABELS[self.index()],
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
