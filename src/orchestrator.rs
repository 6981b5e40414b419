//! Fleet orchestration: one independent pipeline per account.
//!
//! Every account gets its own signer, session, and scheduler; the only
//! thing pipelines share is the read-only API client and the write-only
//! dashboard. Pipelines interleave on one event loop and a failure in any
//! of them is contained to its own account.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::NodeApi;
use crate::config::{AccountCredential, ConfigError};
use crate::display::Dashboard;
use crate::scheduler::RoutineScheduler;
use crate::wallet::WalletSigner;

/// Start every account pipeline, wait for all startups to settle, then keep
/// the fleet running.
///
/// "Settled" means each pipeline either reached its running phase or failed
/// its startup; after that the pipelines cycle independently with no further
/// join point. Healthy pipelines never return, so this call parks until the
/// process is terminated. Fails fast only on an empty roster, before any
/// pipeline starts.
pub async fn run<A>(
    api: Arc<A>,
    accounts: Vec<AccountCredential>,
    dashboard: Arc<dyn Dashboard>,
) -> Result<(), ConfigError>
where
    A: NodeApi + 'static,
{
    if accounts.is_empty() {
        return Err(ConfigError::NoAccounts);
    }

    let mut startups = Vec::new();
    let mut pipelines: Vec<JoinHandle<()>> = Vec::new();

    for (account, credential) in accounts.iter().enumerate() {
        // A malformed key is fatal for this account only.
        let signer = match WalletSigner::new(credential.private_key()) {
            Ok(signer) => signer,
            Err(e) => {
                dashboard.log(account, &format!("Initialization failed: {e}"));
                warn!(account = account + 1, error = %e, "Account skipped, signing key rejected");
                continue;
            }
        };

        let (tx, rx) = oneshot::channel();
        let mut scheduler =
            RoutineScheduler::new(api.clone(), signer, account, dashboard.clone());
        scheduler.notify_on_running(tx);
        startups.push(rx);

        let dashboard = dashboard.clone();
        pipelines.push(tokio::spawn(async move {
            dashboard.log(account, "Starting Parasail node keeper");
            if let Err(e) = scheduler.run().await {
                error!(account = account + 1, error = %e, "Account pipeline halted");
            }
        }));
    }

    // A dropped sender means that pipeline failed before reaching Running.
    let settled = join_all(startups).await;
    let up = settled.iter().filter(|outcome| outcome.is_ok()).count();
    info!(
        up,
        total = accounts.len(),
        "All account startups settled"
    );

    join_all(pipelines).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::mock::MockApi;
    use crate::display::testkit::RecordingDashboard;
    use crate::models::NodeStats;

    // Well-known local development keys (anvil accounts 0-2).
    const DEV_KEYS: [&str; 3] = [
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    ];

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_secs(n: u64) {
        for _ in 0..n {
            tokio::time::advance(Duration::from_secs(1)).await;
            settle().await;
        }
    }

    #[tokio::test]
    async fn test_empty_roster_fails_fast() {
        let api = Arc::new(MockApi::new());
        let dashboard = Arc::new(RecordingDashboard::new());

        let result = run(api, Vec::new(), dashboard).await;
        assert!(matches!(result, Err(ConfigError::NoAccounts)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_account_does_not_stop_the_others() {
        let api = Arc::new(MockApi::new());
        let dashboard = Arc::new(RecordingDashboard::new());

        // Account 2 (index 1) can never verify.
        let rejected = WalletSigner::new(DEV_KEYS[1]).expect("valid key");
        api.reject_verifications_for(rejected.address());

        let accounts: Vec<AccountCredential> = DEV_KEYS
            .iter()
            .map(|key| AccountCredential::new(*key))
            .collect();

        tokio::spawn(run(api.clone(), accounts, dashboard.clone()));
        settle().await;
        advance_secs(2).await;

        // Accounts 1 and 3 are counting down; account 2 never got there.
        assert!(!dashboard.countdowns_for(0).is_empty());
        assert!(!dashboard.countdowns_for(2).is_empty());
        assert!(dashboard.countdowns_for(1).is_empty());

        let failed_logs = dashboard.logs_for(1);
        assert!(failed_logs.iter().any(|l| l.contains("Initialization failed")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_key_only_skips_that_account() {
        let api = Arc::new(MockApi::new());
        let dashboard = Arc::new(RecordingDashboard::new());

        let accounts = vec![
            AccountCredential::new(DEV_KEYS[0]),
            AccountCredential::new("not a key"),
        ];

        tokio::spawn(run(api.clone(), accounts, dashboard.clone()));
        settle().await;
        advance_secs(2).await;

        assert!(!dashboard.countdowns_for(0).is_empty());
        assert!(dashboard.countdowns_for(1).is_empty());
        let logs = dashboard.logs_for(1);
        assert!(logs.iter().any(|l| l.contains("Initialization failed")));
        // The bad key text itself never reaches the dashboard.
        assert!(!logs.iter().any(|l| l.contains("not a key")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_account_end_to_end() {
        let api = Arc::new(MockApi::new().with_token("T"));
        let dashboard = Arc::new(RecordingDashboard::new());

        let expected = NodeStats {
            has_node: true,
            node_address: "0xABC".into(),
            points: 10.0,
            card_count: 1,
            ..NodeStats::default()
        };
        api.push_stats(Ok(expected.clone()));

        let accounts = vec![AccountCredential::new(DEV_KEYS[0])];
        tokio::spawn(run(api.clone(), accounts, dashboard.clone()));
        settle().await;
        advance_secs(3).await;

        // The published snapshot is exactly what the remote returned.
        assert_eq!(dashboard.stats_for(0), vec![expected]);

        // Countdown started from the full 24h budget and fell one second
        // per tick.
        let countdowns = dashboard.countdowns_for(0);
        let first: Vec<&str> = countdowns.iter().take(3).map(String::as_str).collect();
        assert_eq!(first, vec!["23:59:59", "23:59:58", "23:59:57"]);

        let logs = dashboard.logs_for(0);
        assert!(logs.iter().any(|l| l.contains("User verification successful")));
        assert!(logs.iter().any(|l| l.contains("Node onboarding successful")));
        assert!(logs.iter().any(|l| l.contains("Node check-in successful")));
    }
}
