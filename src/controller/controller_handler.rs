use log::{info, warn};

use crate::configuration::config::Config;
use crate::error_handling::types::{RunError, StoreError};
use crate::reconciliation::clock::{Clock, SystemClock};
use crate::reconciliation::engine::{reconcile, ReconcileSummary};
use crate::session_store::csv_store::CsvStore;
use crate::session_store::types::SessionRecord;
use crate::status_feed;
use crate::status_feed::types::ConnectionRecord;

/// Drives one batch operation against the configured paths.
///
/// A `record` run is the whole lifecycle the scheduler triggers: read
/// the feed, load the store, reconcile, save the store. Everything else
/// here is a thin read-only or administrative wrapper for the CLI.
pub struct Controller {
    config: Config,
    store: CsvStore,
    clock: Box<dyn Clock>,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> Self {
        let store = CsvStore::new(&config.session_log);
        Self {
            config,
            store,
            clock,
        }
    }

    /// One reconciliation run. Fails before any write if the store is
    /// unreadable or corrupt; a failed save leaves the prior store
    /// intact (atomic replace never committed).
    pub fn record(&self) -> Result<ReconcileSummary, RunError> {
        let snapshot = status_feed::parser::read_snapshot(&self.config.status_log)?;
        let prior = self.store.load()?;
        let now = self.clock.now();

        let (next, summary) = reconcile(prior, &snapshot, now);
        self.store.save(&next)?;

        info!(
            "Reconciled {}: {} new, {} closed, {} still active, {} total",
            self.config.session_log.display(),
            summary.created,
            summary.closed,
            summary.unchanged,
            next.len()
        );
        if summary.reappeared > 0 {
            warn!(
                "{} closed session(s) reappeared in the snapshot",
                summary.reappeared
            );
        }
        Ok(summary)
    }

    /// Currently-connected clients, straight from the status feed.
    pub fn live(&self) -> Result<Vec<ConnectionRecord>, RunError> {
        Ok(status_feed::parser::read_snapshot(&self.config.status_log)?)
    }

    /// Recorded history as stored. Durations are read back verbatim,
    /// never recomputed.
    pub fn history(&self) -> Result<Vec<SessionRecord>, RunError> {
        Ok(self.store.load()?)
    }

    pub fn delete_session(&self, session_id: &str) -> Result<bool, StoreError> {
        self.store.delete_session(session_id)
    }

    pub fn reset(&self) -> Result<(), StoreError> {
        self.store.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::clock::FixedClock;
    use crate::session_store::types::TIME_FORMAT;
    use chrono::NaiveDateTime;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const FEED_ALICE: &str = "\
TITLE,OpenVPN 2.5.1 x86_64-pc-linux-gnu
CLIENT_LIST,alice,203.0.113.7:51172,10.8.0.2,,3342,9031,2023-02-07 11:02:17,1675767737,alice,0,0
END
";

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIME_FORMAT).unwrap()
    }

    fn controller_at(dir: &Path, now: &str) -> Controller {
        let config = Config {
            status_log: dir.join("openvpn-status.log"),
            session_log: dir.join("openvpn-sessions.csv"),
        };
        Controller::with_clock(config, Box::new(FixedClock(ts(now))))
    }

    #[test]
    fn test_full_run_records_and_closes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("openvpn-status.log"), FEED_ALICE).unwrap();

        // First run: alice appears, recorded active
        let controller = controller_at(dir.path(), "2023-02-07 12:00:00");
        let summary = controller.record().unwrap();
        assert_eq!(summary.created, 1);
        let history = controller.history().unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_active());

        // Feed goes away: alice is closed at the run clock
        fs::remove_file(dir.path().join("openvpn-status.log")).unwrap();
        let controller = controller_at(dir.path(), "2023-02-07 12:05:00");
        let summary = controller.record().unwrap();
        assert_eq!(summary.closed, 1);
        let history = controller.history().unwrap();
        assert_eq!(history[0].end_time, Some(ts("2023-02-07 12:05:00")));
        assert_eq!(history[0].duration_seconds, Some(3763));
    }

    #[test]
    fn test_rerun_with_unchanged_snapshot_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("openvpn-status.log"), FEED_ALICE).unwrap();
        let log_path = dir.path().join("openvpn-sessions.csv");

        controller_at(dir.path(), "2023-02-07 12:00:00")
            .record()
            .unwrap();
        let first = fs::read(&log_path).unwrap();

        // Later run, same snapshot: no new rows, no re-closure, no drift
        controller_at(dir.path(), "2023-02-07 12:01:00")
            .record()
            .unwrap();
        let second = fs::read(&log_path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_store_aborts_before_any_write() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("openvpn-status.log"), FEED_ALICE).unwrap();
        let log_path = dir.path().join("openvpn-sessions.csv");
        fs::write(&log_path, "not,a,session,log\n").unwrap();

        let controller = controller_at(dir.path(), "2023-02-07 12:00:00");
        let result = controller.record();
        assert!(matches!(
            result,
            Err(RunError::StoreError(StoreError::Corrupt(_)))
        ));
        // The broken file was not overwritten
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "not,a,session,log\n");
    }

    #[test]
    fn test_missing_feed_closes_nothing_on_first_run() {
        let dir = TempDir::new().unwrap();
        let controller = controller_at(dir.path(), "2023-02-07 12:00:00");
        let summary = controller.record().unwrap();
        assert_eq!(summary, ReconcileSummary::default());
        // Store now exists, header only
        assert!(controller.history().unwrap().is_empty());
    }

    #[test]
    fn test_live_reads_the_feed_without_touching_the_store() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("openvpn-status.log"), FEED_ALICE).unwrap();
        let controller = controller_at(dir.path(), "2023-02-07 12:00:00");

        let live = controller.live().unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].user, "alice");
        assert!(!dir.path().join("openvpn-sessions.csv").exists());
    }

    #[test]
    fn test_delete_and_reset_between_runs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("openvpn-status.log"), FEED_ALICE).unwrap();
        let controller = controller_at(dir.path(), "2023-02-07 12:00:00");
        controller.record().unwrap();

        let id = controller.history().unwrap()[0].session_id.clone();
        assert!(controller.delete_session(&id).unwrap());
        assert!(controller.history().unwrap().is_empty());

        controller.record().unwrap();
        assert_eq!(controller.history().unwrap().len(), 1);
        controller.reset().unwrap();
        assert!(controller.history().unwrap().is_empty());
    }
}
