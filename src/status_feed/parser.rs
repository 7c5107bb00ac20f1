use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;

use crate::status_feed::types::ConnectionRecord;

/// First field of a status-log line describing a connected client.
/// Header, routing-table and stats lines carry other markers and are
/// skipped.
const CLIENT_LIST_MARKER: &str = "CLIENT_LIST";

/// Timestamp formats the status log is known to emit. The first is the
/// usual ISO-like form, the second the locale form some builds use
/// (e.g. `Mon Feb  7 12:34:56 2023`).
const FEED_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%a %b %e %H:%M:%S %Y"];

/// Parse a feed timestamp, trying each known format in turn.
pub fn parse_feed_time(s: &str) -> Option<NaiveDateTime> {
    FEED_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Read the status log at `path` and return the current snapshot.
///
/// A missing or empty file is the routine "nothing connected" state and
/// yields an empty snapshot; any other IO failure propagates.
pub fn read_snapshot(path: &Path) -> Result<Vec<ConnectionRecord>, io::Error> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_status_feed(&text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Status log {} not found, empty snapshot", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Extract the connected clients from raw status-log text, in feed order.
///
/// Only `CLIENT_LIST` lines are significant. A malformed line is dropped
/// on its own; it never aborts parsing of the rest of the feed.
pub fn parse_status_feed(text: &str) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with(CLIENT_LIST_MARKER) {
            continue;
        }
        match parse_client_line(line) {
            Some(record) => records.push(record),
            None => debug!("Skipping malformed client line: {}", line),
        }
    }
    records
}

/// Parse one `CLIENT_LIST` line. Positional fields, per the status v2
/// layout: [1] common name, [2] real address (`ip:port`), [3] virtual
/// address, [5] bytes received, [6] bytes sent, [7] connected since.
fn parse_client_line(line: &str) -> Option<ConnectionRecord> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 8 || parts[0] != CLIENT_LIST_MARKER {
        return None;
    }
    let user = parts[1].trim();
    if user.is_empty() {
        return None;
    }
    let public_ip = parts[2].split(':').next().unwrap_or("").to_string();
    let tunnel_ip = parts[3].trim().to_string();
    let bytes_received = parts[5].trim().parse::<u64>().ok()?;
    let bytes_sent = parts[6].trim().parse::<u64>().ok()?;
    let connected_since = parse_feed_time(parts[7].trim())?;

    Some(ConnectionRecord {
        user: user.to_string(),
        public_ip,
        tunnel_ip,
        bytes_received,
        bytes_sent,
        connected_since,
    })
}
