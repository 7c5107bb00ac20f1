use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error_handling::types::StoreError;
use crate::session_store::types::{SessionRecord, TIME_FORMAT};

/// Fixed store schema. Downstream consumers (dashboard, export) depend
/// on this exact column order.
pub const STORE_HEADER: &str = "session_id,user,start_time,end_time,duration_seconds";

const COLUMN_COUNT: usize = 5;

/// CSV-backed session log.
///
/// The whole collection is loaded at the start of a run and rewritten
/// wholesale at the end; there is no line-by-line patching. Writes go to
/// a temporary file in the store's directory and replace the prior store
/// atomically, so an interrupted save leaves the old log intact.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every recorded session, in file order.
    ///
    /// A missing store is the first-run state and yields an empty
    /// collection. A store that exists but does not match the schema is
    /// a hard error; silently dropping history would be worse than
    /// stopping.
    pub fn load(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Session log {} not found, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::IoError(e)),
        };

        let mut lines = text.lines();
        match lines.next() {
            Some(header) if header == STORE_HEADER => {}
            Some(header) => {
                return Err(StoreError::Corrupt(format!(
                    "unexpected header: {}",
                    header
                )))
            }
            None => return Err(StoreError::Corrupt("empty file, missing header".into())),
        }

        let mut sessions = Vec::new();
        let mut seen_ids = HashSet::new();
        for (idx, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let session = parse_row(line, idx + 2)?;
            if !seen_ids.insert(session.session_id.clone()) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate session id {} at line {}",
                    session.session_id,
                    idx + 2
                )));
            }
            sessions.push(session);
        }
        debug!(
            "Loaded {} session(s) from {}",
            sessions.len(),
            self.path.display()
        );
        Ok(sessions)
    }

    /// Persist the full collection, replacing any prior content.
    ///
    /// Serializes everything first, then renames a fully-written
    /// temporary file over the old store.
    pub fn save(&self, sessions: &[SessionRecord]) -> Result<(), StoreError> {
        let mut contents = String::with_capacity(64 * (sessions.len() + 1));
        contents.push_str(STORE_HEADER);
        contents.push('\n');
        for session in sessions {
            contents.push_str(&format_row(session));
            contents.push('\n');
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::IoError(e.error))?;

        debug!(
            "Saved {} session(s) to {}",
            sessions.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Remove one row by id. Store-level administration, meant to run
    /// between reconciliation runs. Returns whether the id existed.
    pub fn delete_session(&self, session_id: &str) -> Result<bool, StoreError> {
        let mut sessions = self.load()?;
        let before = sessions.len();
        sessions.retain(|s| s.session_id != session_id);
        if sessions.len() == before {
            return Ok(false);
        }
        self.save(&sessions)?;
        info!("Deleted session {} from {}", session_id, self.path.display());
        Ok(true)
    }

    /// Clear the log back to a header-only file.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.save(&[])?;
        info!("Reset session log {}", self.path.display());
        Ok(())
    }
}

fn parse_row(line: &str, line_no: usize) -> Result<SessionRecord, StoreError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != COLUMN_COUNT {
        return Err(StoreError::Corrupt(format!(
            "line {}: expected {} columns, found {}",
            line_no,
            COLUMN_COUNT,
            fields.len()
        )));
    }

    let session_id = fields[0].to_string();
    if session_id.is_empty() {
        return Err(StoreError::Corrupt(format!("line {}: empty session id", line_no)));
    }
    let user = fields[1].to_string();
    let start_time = parse_stored_time(fields[2], "start_time", line_no)?;

    let end_time = match fields[3] {
        "" => None,
        s => Some(parse_stored_time(s, "end_time", line_no)?),
    };
    let duration_seconds = match fields[4] {
        "" => None,
        s => Some(s.parse::<i64>().map_err(|_| {
            StoreError::Corrupt(format!("line {}: invalid duration_seconds: {}", line_no, s))
        })?),
    };

    // Closure fields are set together or not at all.
    if end_time.is_some() != duration_seconds.is_some() {
        return Err(StoreError::Corrupt(format!(
            "line {}: end_time and duration_seconds must both be set or both empty",
            line_no
        )));
    }

    Ok(SessionRecord {
        session_id,
        user,
        start_time,
        end_time,
        duration_seconds,
    })
}

fn parse_stored_time(
    s: &str,
    column: &str,
    line_no: usize,
) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT).map_err(|_| {
        StoreError::Corrupt(format!("line {}: invalid {}: {}", line_no, column, s))
    })
}

fn format_row(session: &SessionRecord) -> String {
    let end = session
        .end_time
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default();
    let duration = session
        .duration_seconds
        .map(|d| d.to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{}",
        session.session_id,
        session.user,
        session.start_time.format(TIME_FORMAT),
        end,
        duration
    )
}
