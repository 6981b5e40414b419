//! Display collaborator for per-account output.
//!
//! The core never renders anything itself; it hands log lines, stats
//! snapshots, and countdown text to a [`Dashboard`] and moves on. Calls are
//! fire-and-forget and must not block the calling pipeline. Output from
//! different accounts interleaves freely - there is no cross-account
//! ordering.

use tracing::{debug, info};

use crate::models::NodeStats;
use crate::utils::format::format_checkin_time;

/// Write-only sink for everything an account pipeline wants shown.
/// The `account` argument is the 0-based account index.
pub trait Dashboard: Send + Sync {
    fn log(&self, account: usize, message: &str);
    fn publish_stats(&self, account: usize, stats: &NodeStats);
    fn publish_countdown(&self, account: usize, remaining: &str);
}

/// Renders account activity as structured log lines.
///
/// Accounts are labelled 1-based, matching how operators number their
/// wallets in the accounts file.
pub struct TracingDashboard;

impl Dashboard for TracingDashboard {
    fn log(&self, account: usize, message: &str) {
        info!(account = account + 1, "{message}");
    }

    fn publish_stats(&self, account: usize, stats: &NodeStats) {
        info!(
            account = account + 1,
            has_node = stats.has_node,
            node_address = %stats.node_address,
            points = stats.points,
            pending_rewards = ?stats.pending_rewards,
            total_distributed = ?stats.total_distributed,
            last_checkin = %format_checkin_time(stats.last_checkin_time),
            card_count = stats.card_count,
            "Node stats updated"
        );
    }

    fn publish_countdown(&self, account: usize, remaining: &str) {
        // One line per account per second; keep it below info.
        debug!(account = account + 1, "Next check-in: {remaining}");
    }
}
