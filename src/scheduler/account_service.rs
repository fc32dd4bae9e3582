//! Energy-gated fishing loop for a single account

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{sleep, Instant};

use crate::error::Result;
use crate::fish::{FailureReason, RangeCosts, RangeTier, SessionResult};
use crate::inventory::{Inventory, InventoryClient};
use crate::session::{SessionService, WsConnector};
use crate::utils::bot_state::AccountActivity;

use super::account::{Account, EnergyStatus};
use super::tier::{select_range_tier, TierPolicy};

/// The two remote operations a scheduler depends on
pub trait FishingBackend: Send + Sync {
    fn fetch_inventory(&self, token: &str) -> impl Future<Output = Result<Inventory>> + Send;

    fn run_session(
        &self,
        token: &str,
        range: RangeTier,
    ) -> impl Future<Output = SessionResult> + Send;
}

/// HTTP inventory polling plus WebSocket sessions
pub struct LiveBackend {
    inventory: InventoryClient,
    sessions: SessionService<WsConnector>,
}

impl LiveBackend {
    pub fn new(inventory: InventoryClient, sessions: SessionService<WsConnector>) -> Self {
        Self {
            inventory,
            sessions,
        }
    }
}

impl FishingBackend for LiveBackend {
    async fn fetch_inventory(&self, token: &str) -> Result<Inventory> {
        self.inventory.fetch_inventory(token).await
    }

    async fn run_session(&self, token: &str, range: RangeTier) -> SessionResult {
        self.sessions.run(token, range).await
    }
}

/// Timing and tier tunables shared by every account
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub range_costs: RangeCosts,
    pub tier_policy: TierPolicy,
    pub fishing_range: RangeTier,
    pub delay_between_fishing: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub energy_refresh_window: Duration,
    pub countdown_tick: Duration,
    pub post_refresh_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            range_costs: RangeCosts::default(),
            tier_policy: TierPolicy::default(),
            fishing_range: RangeTier::Mid,
            delay_between_fishing: Duration::from_secs(5),
            retry_delay: Duration::from_secs(30),
            max_retries: 5,
            energy_refresh_window: Duration::from_secs(24 * 60 * 60),
            countdown_tick: Duration::from_secs(1),
            post_refresh_delay: Duration::from_secs(5),
        }
    }
}

/// What one pass of the loop did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Caught,
    Missed(FailureReason),
    PollFailed,
    /// Waited out an energy refresh
    Refreshed,
    NoTier,
}

/// Format a remaining duration as `HH:MM:SS`
pub fn format_time_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

pub struct AccountScheduler<B> {
    account: Account,
    backend: Arc<B>,
    config: Arc<SchedulerConfig>,
    rng: StdRng,
}

impl<B: FishingBackend> AccountScheduler<B> {
    pub fn new(account: Account, backend: Arc<B>, config: Arc<SchedulerConfig>) -> Self {
        Self {
            account,
            backend,
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed for tier selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Loop forever; every failure is folded into backoff
    pub async fn run(mut self) {
        tracing::info!(token = %self.account.masked_token(), "Starting fishing loop");
        loop {
            self.run_cycle().await;
        }
    }

    /// Poll, fish once (or wait for energy), then apply the resulting delay
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.account.set_activity(AccountActivity::CheckingInventory);
        let inventory = match self.backend.fetch_inventory(self.account.token()).await {
            Ok(inventory) => inventory,
            Err(e) => {
                let failures = self.account.retry.record_failure();
                let wait = self.current_backoff();
                tracing::warn!(
                    "[{}] Failed to check inventory: {}. Retry {}/{}. Waiting {} seconds...",
                    e.kind(),
                    e,
                    failures,
                    self.config.max_retries,
                    wait.as_secs()
                );
                self.pause(AccountActivity::BackingOff, wait).await;
                return CycleOutcome::PollFailed;
            }
        };

        let status = self.account.energy.observe(
            inventory.energy,
            Instant::now(),
            self.config.energy_refresh_window,
        );
        let energy = match status {
            EnergyStatus::Available(energy) => energy,
            EnergyStatus::Depleted { refresh_at } => {
                tracing::warn!(
                    "Out of energy ({}). Waiting for energy to refresh...",
                    inventory.energy
                );
                self.wait_for_refresh(refresh_at).await;
                return CycleOutcome::Refreshed;
            }
        };

        let config = self.config.clone();
        let Some(range) = select_range_tier(
            energy,
            &config.range_costs,
            config.tier_policy,
            config.fishing_range,
            &mut self.rng,
        ) else {
            tracing::warn!("No range tier affordable with {} energy", energy);
            self.pause(AccountActivity::BackingOff, config.retry_delay).await;
            return CycleOutcome::NoTier;
        };

        tracing::info!(
            "Starting fishing attempt with {}... (Energy cost: {}, energy: {})",
            range,
            config.range_costs.cost(range),
            energy
        );
        self.account.set_activity(AccountActivity::Fishing);
        let result = self.backend.run_session(self.account.token(), range).await;

        match result {
            SessionResult::Success { reward } => {
                self.account.retry.record_success();
                self.account.stats.increment_catch(reward.as_ref());
                match &reward {
                    Some(reward) => tracing::info!("Successfully caught {}", reward),
                    None => tracing::info!("Successfully caught a fish"),
                }
                tracing::info!(
                    "Fishing attempt completed successfully. Waiting {} seconds... [{}]",
                    config.delay_between_fishing.as_secs(),
                    self.account.stats
                );
                self.pause(AccountActivity::CoolingDown, config.delay_between_fishing)
                    .await;
                CycleOutcome::Caught
            }
            SessionResult::Failure(reason) => {
                let failures = self.account.retry.record_failure();
                self.account.stats.increment_miss();
                let wait = self.current_backoff();
                tracing::warn!(
                    "[{}] Fishing attempt failed: {}. Retry {}/{}. Waiting {} seconds...",
                    reason.class(),
                    reason.description(),
                    failures,
                    config.max_retries,
                    wait.as_secs()
                );
                self.pause(AccountActivity::BackingOff, wait).await;
                CycleOutcome::Missed(reason)
            }
        }
    }

    fn current_backoff(&self) -> Duration {
        self.account
            .retry
            .backoff(self.config.retry_delay, self.config.max_retries)
    }

    async fn pause(&mut self, activity: AccountActivity, wait: Duration) {
        self.account.set_activity(activity);
        sleep(wait).await;
    }

    /// Sleep until `refresh_at`, reporting the countdown as it goes
    async fn wait_for_refresh(&mut self, refresh_at: Instant) {
        self.account.set_activity(AccountActivity::WaitingForEnergy);

        let remaining = refresh_at.saturating_duration_since(Instant::now());
        let wall_clock = chrono::Duration::from_std(remaining)
            .ok()
            .map(|d| (chrono::Local::now() + d).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(
            "Energy will refresh in: {} (at {})",
            format_time_remaining(remaining),
            wall_clock
        );

        loop {
            let now = Instant::now();
            if now >= refresh_at {
                break;
            }
            let remaining = refresh_at - now;
            tracing::debug!("Energy will refresh in: {}", format_time_remaining(remaining));
            sleep(remaining.min(self.config.countdown_tick)).await;
        }

        self.account.energy.clear_if_expired(Instant::now());
        tracing::info!("Energy should be refreshed now!");
        sleep(self.config.post_refresh_delay).await;
    }
}
