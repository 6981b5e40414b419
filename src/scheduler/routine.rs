//! Per-account routine cycle.
//!
//! One full cycle is: onboard the node, check in, publish a fresh stats
//! snapshot, then hold a 24-hour countdown while polling stats every
//! minute. When the countdown reaches zero the cycle repeats from
//! onboarding. The cycle is infinite; only a failed phase or process
//! termination ends it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{self, Instant, Interval};

use crate::api::NodeApi;
use crate::auth::AuthManager;
use crate::display::Dashboard;
use crate::models::NodeStats;
use crate::utils::format::format_countdown;
use crate::wallet::WalletSigner;

use super::retry::with_auth;
use super::SessionError;

/// Seconds in one full check-in cycle.
/// The countdown restarts at the full budget every cycle, with no
/// correction for however long the onboard/check-in/stats sequence took.
const CYCLE_SECONDS: u64 = 24 * 60 * 60;

/// How often the stats poll fires while a cycle is running.
const STATS_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Where an account pipeline currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutinePhase {
    Idle,
    Onboarding,
    CheckingIn,
    FetchingStats,
    Running,
    CycleComplete,
}

/// The remaining budget plus the two timers held while a cycle runs.
///
/// Built when a cycle enters the running phase and dropped when the
/// countdown completes (or the pipeline is torn down), which releases both
/// interval handles - nothing fires after the owner is gone.
struct ScheduleState {
    remaining_seconds: u64,
    countdown: Interval,
    stats_poll: Interval,
}

impl ScheduleState {
    fn new(cycle_seconds: u64, stats_poll_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            remaining_seconds: cycle_seconds,
            countdown: time::interval_at(now + Duration::from_secs(1), Duration::from_secs(1)),
            stats_poll: time::interval_at(now + stats_poll_interval, stats_poll_interval),
        }
    }
}

/// Drives the routine cycle for one account.
pub struct RoutineScheduler<A> {
    api: Arc<A>,
    auth: AuthManager<A>,
    account: usize,
    dashboard: Arc<dyn Dashboard>,
    phase: RoutinePhase,
    started: Option<oneshot::Sender<()>>,
    cycle_seconds: u64,
    stats_poll_interval: Duration,
}

impl<A: NodeApi> RoutineScheduler<A> {
    pub fn new(
        api: Arc<A>,
        signer: WalletSigner,
        account: usize,
        dashboard: Arc<dyn Dashboard>,
    ) -> Self {
        let auth = AuthManager::new(api.clone(), signer, account, dashboard.clone());
        Self {
            api,
            auth,
            account,
            dashboard,
            phase: RoutinePhase::Idle,
            started: None,
            cycle_seconds: CYCLE_SECONDS,
            stats_poll_interval: STATS_POLL_INTERVAL,
        }
    }

    /// Register a signal fired the first time this pipeline reaches the
    /// running phase. Dropping the scheduler before that point drops the
    /// sender, which the other side sees as a failed startup.
    pub fn notify_on_running(&mut self, tx: oneshot::Sender<()>) {
        self.started = Some(tx);
    }

    pub fn phase(&self) -> RoutinePhase {
        self.phase
    }

    #[cfg(test)]
    fn with_timing(mut self, cycle_seconds: u64, stats_poll_interval: Duration) -> Self {
        self.cycle_seconds = cycle_seconds;
        self.stats_poll_interval = stats_poll_interval;
        self
    }

    /// Run the pipeline until a phase fails. Returns only on error; a
    /// healthy pipeline cycles until the process exits.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        if !self.auth.is_authenticated() {
            if let Err(e) = self.auth.authenticate().await {
                self.phase = RoutinePhase::Idle;
                let err = SessionError::from(e);
                self.dashboard
                    .log(self.account, &format!("Initialization failed: {err}"));
                return Err(err);
            }
        }
        if let Some(address) = self.auth.session().wallet_address() {
            self.dashboard
                .log(self.account, &format!("Wallet Address: {address}"));
        }

        let mut first = true;
        loop {
            if let Err(e) = self.run_cycle().await {
                if first {
                    self.phase = RoutinePhase::Idle;
                    self.dashboard
                        .log(self.account, &format!("Initialization failed: {e}"));
                } else {
                    self.dashboard
                        .log(self.account, &format!("Routine tasks failed: {e}"));
                }
                return Err(e);
            }
            first = false;
        }
    }

    /// One onboard -> check-in -> stats -> countdown pass.
    ///
    /// Onboarding runs every cycle; the remote side treats re-onboarding an
    /// already-onboarded node as a normal success, so no state is kept about
    /// whether it already happened.
    async fn run_cycle(&mut self) -> Result<(), SessionError> {
        self.phase = RoutinePhase::Onboarding;
        self.onboard().await?;
        self.dashboard.log(self.account, "Node onboarding successful");

        self.phase = RoutinePhase::CheckingIn;
        self.check_in().await?;
        self.dashboard.log(self.account, "Node check-in successful");

        self.phase = RoutinePhase::FetchingStats;
        let stats = self.fetch_stats().await?;
        self.dashboard.publish_stats(self.account, &stats);

        self.phase = RoutinePhase::Running;
        if let Some(tx) = self.started.take() {
            let _ = tx.send(());
        }
        self.hold_countdown().await;

        self.phase = RoutinePhase::CycleComplete;
        self.dashboard.log(self.account, "Time to check in!");
        Ok(())
    }

    /// Tick the countdown once per second and the stats poll once per
    /// minute until the budget runs out. A failed stats poll is logged and
    /// the poll keeps its schedule; the countdown is never affected.
    async fn hold_countdown(&mut self) {
        let mut schedule = ScheduleState::new(self.cycle_seconds, self.stats_poll_interval);
        loop {
            tokio::select! {
                _ = schedule.countdown.tick() => {
                    schedule.remaining_seconds = schedule.remaining_seconds.saturating_sub(1);
                    self.dashboard.publish_countdown(
                        self.account,
                        &format_countdown(schedule.remaining_seconds),
                    );
                    if schedule.remaining_seconds == 0 {
                        break;
                    }
                }
                _ = schedule.stats_poll.tick() => {
                    match self.fetch_stats().await {
                        Ok(stats) => self.dashboard.publish_stats(self.account, &stats),
                        Err(e) => self
                            .dashboard
                            .log(self.account, &format!("Stats update failed: {e}")),
                    }
                }
            }
        }
    }

    async fn onboard(&mut self) -> Result<(), SessionError> {
        let api = self.api.clone();
        with_auth(&mut self.auth, move |address, token| {
            let api = api.clone();
            async move { api.onboard(&address, &token).await }
        })
        .await
    }

    async fn check_in(&mut self) -> Result<(), SessionError> {
        let api = self.api.clone();
        with_auth(&mut self.auth, move |address, token| {
            let api = api.clone();
            async move { api.check_in(&address, &token).await }
        })
        .await
    }

    async fn fetch_stats(&mut self) -> Result<NodeStats, SessionError> {
        let api = self.api.clone();
        with_auth(&mut self.auth, move |address, token| {
            let api = api.clone();
            async move { api.node_stats(&address, &token).await }
        })
        .await
    }
}
