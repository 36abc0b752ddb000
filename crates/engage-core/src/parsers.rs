use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

// ── FieldParser ───────────────────────────────────────────────────────────────

/// Parses individual CSV field values from the variety of spellings found in
/// session exports.
pub struct FieldParser;

impl FieldParser {
    /// Parse a boolean flag column.
    ///
    /// Accepts `true`/`false`, `t`/`f`, `yes`/`no`, `y`/`n`, `1`/`0` and the
    /// float spellings `1.0`/`0.0`, all case-insensitive. Anything else is
    /// treated as missing.
    pub fn parse_flag(raw: &str) -> Option<bool> {
        match raw.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
            "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
            _ => None,
        }
    }

    /// Parse a non-negative integer count column.
    ///
    /// Spreadsheet exports frequently render integer columns as floats
    /// (`"3.0"`); those are accepted as long as the value is integral.
    pub fn parse_count(raw: &str) -> Option<u32> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(n) = s.parse::<u32>() {
            return Some(n);
        }
        let f = s.parse::<f64>().ok()?;
        if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
            return Some(f as u32);
        }
        None
    }

    /// Parse a duration column as finite seconds.
    ///
    /// Negative values are kept; they fall outside every duration bucket and
    /// end up in the `Unknown` group downstream.
    pub fn parse_duration(raw: &str) -> Option<f64> {
        let f = raw.trim().parse::<f64>().ok()?;
        f.is_finite().then_some(f)
    }
}

// ── DateParser ────────────────────────────────────────────────────────────────

/// Parses login dates from the handful of formats seen in session exports.
pub struct DateParser;

/// Date-only patterns, tried first. Year-first formats come before the
/// ambiguous US month-first ones; all require four-digit years.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Date-time patterns; the time component is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

impl DateParser {
    /// Attempt to parse a raw login-date string into a [`NaiveDate`].
    ///
    /// Returns `None` for blank or unrecognised values; unparseable dates are
    /// an expected path (they map to the `Unknown` weekday downstream), so
    /// failures are only logged at debug level.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }

        debug!("DateParser: could not parse login date \"{}\"", s);
        None
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
