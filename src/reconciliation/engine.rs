use std::collections::HashSet;

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::session_store::types::SessionRecord;
use crate::status_feed::types::ConnectionRecord;

/// Per-run counters, surfaced to the log by the controller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Sessions first observed in this snapshot.
    pub created: usize,
    /// Active sessions absent from this snapshot, closed at `now`.
    pub closed: usize,
    /// Active sessions re-observed and left untouched.
    pub unchanged: usize,
    /// Closed sessions whose `(user, start_time)` pair reappeared in the
    /// snapshot. The prior row stays closed; see DESIGN.md.
    pub reappeared: usize,
    /// Closures whose computed duration came out negative and was
    /// clamped to zero.
    pub clamped: usize,
}

/// Merge one snapshot into the session history.
///
/// Prior sessions keep their position; new sessions are appended in
/// snapshot order. Every prior session survives the run, possibly
/// closed, never removed. Running twice in a row with the same snapshot
/// changes nothing the second time.
pub fn reconcile(
    prior: Vec<SessionRecord>,
    snapshot: &[ConnectionRecord],
    now: NaiveDateTime,
) -> (Vec<SessionRecord>, ReconcileSummary) {
    let mut summary = ReconcileSummary::default();

    let snapshot_ids: HashSet<String> = snapshot
        .iter()
        .map(|c| SessionRecord::session_id_for(&c.user, c.connected_since))
        .collect();
    let mut known_ids: HashSet<String> =
        prior.iter().map(|s| s.session_id.clone()).collect();

    let mut next = Vec::with_capacity(prior.len() + snapshot.len());
    for mut session in prior {
        if session.is_active() {
            if snapshot_ids.contains(&session.session_id) {
                summary.unchanged += 1;
            } else {
                close_session(&mut session, now, &mut summary);
                summary.closed += 1;
            }
        } else if snapshot_ids.contains(&session.session_id) {
            // Same (user, start_time) pair after closure. Identity
            // granularity does not let us tell a stale feed entry from a
            // genuine reconnect, so the closed row stands as-is.
            warn!(
                "Closed session {} reappeared in snapshot, keeping closed record",
                session.session_id
            );
            summary.reappeared += 1;
        }
        next.push(session);
    }

    for conn in snapshot {
        let session_id = SessionRecord::session_id_for(&conn.user, conn.connected_since);
        if known_ids.insert(session_id.clone()) {
            debug!("New session {}", session_id);
            next.push(SessionRecord::new_active(&conn.user, conn.connected_since));
            summary.created += 1;
        }
    }

    (next, summary)
}

fn close_session(session: &mut SessionRecord, now: NaiveDateTime, summary: &mut ReconcileSummary) {
    let mut duration = (now - session.start_time).num_seconds();
    if duration < 0 {
        warn!(
            "Session {} closes before it starts ({} -> {}), clamping duration to 0",
            session.session_id, session.start_time, now
        );
        duration = 0;
        summary.clamped += 1;
    }
    debug!("Closing session {} after {}s", session.session_id, duration);
    session.end_time = Some(now);
    session.duration_seconds = Some(duration);
}
