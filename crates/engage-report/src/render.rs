//! Plain-text rendering of an [`AnalysisReport`].
//!
//! Each report section renders as a small column-aligned table. JSON output
//! does not live here; the binary serialises the report directly.

use engage_core::formatting::{format_count, format_duration_secs, format_number};
use engage_data::analysis::AnalysisReport;

/// Render the requested view of the report as plain text.
///
/// `view` is one of `counts`, `engagement`, `bugs`, `weekdays`; anything else
/// renders the full report.
pub fn render_text(report: &AnalysisReport, view: &str) -> String {
    match view {
        "counts" => render_counts(report),
        "engagement" => render_engagement(report),
        "bugs" => render_bugs(report),
        "weekdays" => render_weekdays(report),
        _ => render_full(report),
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_full(report: &AnalysisReport) -> String {
    let sections = [
        render_header(report),
        render_counts(report),
        render_engagement(report),
        render_bugs(report),
        render_weekdays(report),
        format!(
            "Timing: load {:.3}s, aggregate {:.3}s",
            report.metadata.load_time_seconds, report.metadata.aggregate_time_seconds
        ),
    ];
    sections.join("\n\n")
}

fn render_header(report: &AnalysisReport) -> String {
    let meta = &report.metadata;
    let generated = chrono::DateTime::parse_from_rfc3339(&meta.generated_at)
        .map(|dt| {
            dt.with_timezone(&chrono::Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
        })
        .unwrap_or_else(|_| meta.generated_at.clone());

    [
        "Engagement Report".to_string(),
        format!("Generated: {}", generated),
        format!(
            "Data: {} file(s), {} rows read, {} dropped, {} analyzed, {} customers",
            meta.files_read,
            format_count(meta.rows_read),
            format_count(meta.rows_dropped),
            format_count(meta.records_analyzed as u64),
            format_count(meta.distinct_customers),
        ),
    ]
    .join("\n")
}

fn render_counts(report: &AnalysisReport) -> String {
    let width = report
        .session_counts
        .iter()
        .map(|c| c.customer_id.len())
        .max()
        .unwrap_or(0)
        .max("Customer".len());

    let mut lines = vec![
        section_title("Sessions per customer"),
        format!("{:<width$}  {:>8}", "Customer", "Sessions"),
    ];
    for row in &report.session_counts {
        lines.push(format!(
            "{:<width$}  {:>8}",
            row.customer_id,
            format_count(row.sessions),
        ));
    }

    lines.push(String::new());
    lines.push(section_title("Customers by session count"));
    lines.push(format!("{:>8}  {:>9}", "Sessions", "Customers"));
    for bin in &report.session_distribution {
        lines.push(format!(
            "{:>8}  {:>9}",
            format_count(bin.sessions),
            format_count(bin.customers),
        ));
    }

    lines.join("\n")
}

fn render_engagement(report: &AnalysisReport) -> String {
    let rates = &report.engagement;
    let rows = [
        ("Likes", rates.likes_pct),
        ("Comments", rates.comments_pct),
        ("Projects added", rates.projects_pct),
        ("All three", rates.combined_pct),
    ];

    let mut lines = vec![
        section_title("Engagement rates"),
        format!("{:<16}  {:>8}", "Action", "Share"),
    ];
    for (label, rate) in rows {
        lines.push(format!(
            "{:<16}  {:>7}%",
            label,
            format_number(rate, 2),
        ));
    }
    lines.join("\n")
}

fn render_bugs(report: &AnalysisReport) -> String {
    let bounds = report.bucket_bounds;
    let range_for = |i: usize| -> String {
        match i {
            0..=3 => format!(
                "{} to {}",
                format_duration_secs(bounds[i]),
                format_duration_secs(bounds[i + 1]),
            ),
            _ => "outside bounds".to_string(),
        }
    };
    let ranges: Vec<String> = (0..report.bug_impact.len()).map(range_for).collect();
    let range_width = ranges
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("Range".len());

    let mut lines = vec![
        section_title("Bug impact by duration bucket"),
        format!(
            "{:<16}  {:<range_width$}  {:>6}  {:>9}  {:>9}  {:>12}",
            "Bucket", "Range", "Bugs", "Customers", "With bugs", "Without bugs",
        ),
    ];
    for (row, range) in report.bug_impact.iter().zip(&ranges) {
        lines.push(format!(
            "{:<16}  {:<range_width$}  {:>6}  {:>9}  {:>9}  {:>12}",
            row.bucket.label(),
            range,
            format_count(row.bugs_total),
            format_count(row.customers),
            format_count(row.customers_with_bugs),
            format_count(row.customers_without_bugs),
        ));
    }
    lines.join("\n")
}

fn render_weekdays(report: &AnalysisReport) -> String {
    let mut lines = vec![
        section_title("Usage by weekday"),
        format!("{:<7}  {:>9}  {:>8}", "Day", "Customers", "Sessions"),
    ];
    for row in &report.weekday_usage {
        lines.push(format!(
            "{:<7}  {:>9}  {:>8}",
            row.day.label(),
            format_count(row.customers),
            format_count(row.sessions),
        ));
    }
    lines.join("\n")
}

fn section_title(title: &str) -> String {
    format!("{}\n{}", title, "-".repeat(title.len()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
