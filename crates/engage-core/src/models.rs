use serde::{Deserialize, Serialize};

/// Column names a session CSV must provide, in the order the fields appear
/// on [`SessionRecord`]. Files may order their columns differently; the
/// loader resolves positions from the header row.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "customer_id",
    "session_id",
    "session_duration",
    "likes_given",
    "comment_given",
    "projects_added",
    "bug_occured",
    "bugs_in_session",
    "login_date",
];

/// A single cleaned session row.
///
/// Records are immutable once built: derived values (duration bucket,
/// weekday, combined engagement) are computed at aggregation time and never
/// written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Customer identifier; repeats across rows (one row per session event).
    pub customer_id: String,
    /// Session identifier; may repeat across rows and customers.
    pub session_id: String,
    /// Session length in seconds.
    pub session_duration: f64,
    /// Whether the user gave at least one like during the session.
    pub likes_given: bool,
    /// Whether the user left at least one comment during the session.
    pub comment_given: bool,
    /// Whether the user added at least one project during the session.
    pub projects_added: bool,
    /// Whether a bug occurred during the session (source column spelling).
    pub bug_occured: bool,
    /// Number of bugs encountered during the session.
    pub bugs_in_session: u32,
    /// Raw login date text as it appeared in the CSV; parsed downstream.
    pub login_date: String,
}

impl SessionRecord {
    /// True when all three interaction flags are set; this is the combined
    /// engagement indicator (a session only counts as fully engaged when the
    /// user liked, commented and added a project).
    pub fn fully_engaged(&self) -> bool {
        self.likes_given && self.comment_given && self.projects_added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(likes: bool, comments: bool, projects: bool) -> SessionRecord {
        SessionRecord {
            customer_id: "cust-1".to_string(),
            session_id: "sess-1".to_string(),
            session_duration: 800.0,
            likes_given: likes,
            comment_given: comments,
            projects_added: projects,
            bug_occured: false,
            bugs_in_session: 0,
            login_date: "2021-03-01".to_string(),
        }
    }

    #[test]
    fn test_fully_engaged_all_flags_set() {
        assert!(make_record(true, true, true).fully_engaged());
    }

    #[test]
    fn test_fully_engaged_requires_every_flag() {
        assert!(!make_record(false, true, true).fully_engaged());
        assert!(!make_record(true, false, true).fully_engaged());
        assert!(!make_record(true, true, false).fully_engaged());
        assert!(!make_record(false, false, false).fully_engaged());
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = make_record(true, false, true);
        let json = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_required_columns_cover_every_field() {
        // One column per SessionRecord field.
        assert_eq!(REQUIRED_COLUMNS.len(), 9);
        assert!(REQUIRED_COLUMNS.contains(&"bug_occured"));
        assert!(REQUIRED_COLUMNS.contains(&"login_date"));
    }
}
