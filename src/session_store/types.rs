use chrono::NaiveDateTime;

/// Canonical timestamp rendering used for stored times and session ids.
/// Matches the default `Connected Since` format of the status feed.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derived session state. Not stored as its own column: a session is
/// active exactly when it has no end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Closed,
}

/// One row of the session log.
///
/// Identity is the `(user, start_time)` pair, flattened into `session_id`.
/// Two connections from the same user with the same start timestamp are
/// indistinguishable and collapse to a single record; that granularity
/// limit is accepted rather than worked around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub user: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub duration_seconds: Option<i64>,
}

impl SessionRecord {
    pub fn new_active(user: &str, start_time: NaiveDateTime) -> Self {
        Self {
            session_id: Self::session_id_for(user, start_time),
            user: user.to_string(),
            start_time,
            end_time: None,
            duration_seconds: None,
        }
    }

    /// Deterministic id for a `(user, start_time)` pair. Stable across
    /// runs because the timestamp is rendered canonically.
    pub fn session_id_for(user: &str, start_time: NaiveDateTime) -> String {
        format!("{}|{}", user, start_time.format(TIME_FORMAT))
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_active() {
            SessionStatus::Active
        } else {
            SessionStatus::Closed
        }
    }
}
