use chrono::NaiveDateTime;

/// One currently-connected client, as reported by a single snapshot of
/// the status feed. Rebuilt from scratch on every read; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub user: String,
    /// Client's public address with the port stripped.
    pub public_ip: String,
    /// Address assigned inside the tunnel.
    pub tunnel_ip: String,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub connected_since: NaiveDateTime,
}
