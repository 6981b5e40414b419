//! Node statistics snapshot.

use serde::Deserialize;

/// A snapshot of one node's standing, as reported by the stats endpoint.
///
/// Snapshots are immutable once received; each poll produces a new one that
/// replaces the previous for display. Reward fields are absent until the
/// node has accrued anything, so they stay optional rather than defaulting
/// to zero.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NodeStats {
    #[serde(default)]
    pub has_node: bool,
    #[serde(default)]
    pub node_address: String,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub pending_rewards: Option<f64>,
    #[serde(default)]
    pub total_distributed: Option<f64>,
    /// Unix timestamp (seconds) of the last accepted check-in.
    #[serde(default)]
    pub last_checkin_time: Option<i64>,
    #[serde(default)]
    pub card_count: u64,
}
