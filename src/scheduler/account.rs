//! Per-account state owned by its scheduler task

use std::time::Duration;

use tokio::time::Instant;

use crate::utils::bot_state::{AccountActivity, SessionStats};

/// Result of folding one inventory observation into `EnergyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyStatus {
    Available(u32),
    Depleted { refresh_at: Instant },
}

/// Upper bound on a refresh window that does not fit the clock
pub const MAX_REFRESH_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Last observed energy and, while depleted, when it is expected back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnergyState {
    current: u32,
    refresh_at: Option<Instant>,
}

impl EnergyState {
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn refresh_at(&self) -> Option<Instant> {
        self.refresh_at
    }

    /// Record a polled balance
    ///
    /// A zero balance is depleted: the refresh deadline is set on the first
    /// such observation and kept until it has passed. Any positive balance
    /// clears it, even one too small for the cheapest tier.
    pub fn observe(&mut self, energy: u32, now: Instant, window: Duration) -> EnergyStatus {
        self.current = energy;

        if energy > 0 {
            self.refresh_at = None;
            return EnergyStatus::Available(energy);
        }

        self.clear_if_expired(now);
        let refresh_at = *self
            .refresh_at
            .get_or_insert_with(|| now.checked_add(window).unwrap_or(now + MAX_REFRESH_WINDOW));
        EnergyStatus::Depleted { refresh_at }
    }

    /// Drop the deadline once real time has passed it
    pub fn clear_if_expired(&mut self, now: Instant) -> bool {
        match self.refresh_at {
            Some(deadline) if now >= deadline => {
                self.refresh_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Consecutive failed attempts of one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    consecutive_failures: u32,
}

/// Backoff multiplier once `max_retries` is exceeded
pub const EXTENDED_BACKOFF_FACTOR: u32 = 3;

impl RetryState {
    pub fn failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Wait before the next attempt after the current run of failures
    pub fn backoff(&self, retry_delay: Duration, max_retries: u32) -> Duration {
        if self.consecutive_failures > max_retries {
            retry_delay.saturating_mul(EXTENDED_BACKOFF_FACTOR)
        } else {
            retry_delay
        }
    }
}

/// One configured credential and everything its task tracks about it
#[derive(Debug, Clone)]
pub struct Account {
    index: usize,
    token: String,
    pub energy: EnergyState,
    pub retry: RetryState,
    pub stats: SessionStats,
    activity: AccountActivity,
}

impl Account {
    pub fn new(index: usize, token: impl Into<String>) -> Self {
        Self {
            index,
            token: token.into(),
            energy: EnergyState::default(),
            retry: RetryState::default(),
            stats: SessionStats::default(),
            activity: AccountActivity::Idle,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based label used in log spans
    pub fn label(&self) -> String {
        format!("account-{}", self.index + 1)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Token shortened for display; short tokens are fully hidden
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }

    pub fn activity(&self) -> AccountActivity {
        self.activity
    }

    pub fn set_activity(&mut self, activity: AccountActivity) {
        if self.activity != activity {
            tracing::trace!("{} -> {}", self.activity, activity);
            self.activity = activity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn test_zero_energy_sets_deadline_once() {
        let mut energy = EnergyState::default();
        let t0 = Instant::now();

        assert_eq!(
            energy.observe(0, t0, DAY),
            EnergyStatus::Depleted { refresh_at: t0 + DAY }
        );

        // later zero readings keep the original deadline
        let t1 = t0 + Duration::from_secs(3600);
        assert_eq!(
            energy.observe(0, t1, DAY),
            EnergyStatus::Depleted { refresh_at: t0 + DAY }
        );
        assert_eq!(energy.refresh_at(), Some(t0 + DAY));
    }

    #[test]
    fn test_deadline_cleared_after_it_passes() {
        let mut energy = EnergyState::default();
        let t0 = Instant::now();
        energy.observe(0, t0, DAY);

        assert!(!energy.clear_if_expired(t0 + Duration::from_secs(60)));
        assert!(energy.clear_if_expired(t0 + DAY));
        assert_eq!(energy.refresh_at(), None);
    }

    #[test]
    fn test_first_post_deadline_poll() {
        let mut energy = EnergyState::default();
        let t0 = Instant::now();
        energy.observe(0, t0, DAY);

        // still empty after the window: a fresh window starts from now
        let late = t0 + DAY + Duration::from_secs(5);
        assert_eq!(
            energy.observe(0, late, DAY),
            EnergyStatus::Depleted { refresh_at: late + DAY }
        );
    }

    #[test]
    fn test_positive_energy_clears_deadline() {
        let mut energy = EnergyState::default();
        let t0 = Instant::now();
        energy.observe(0, t0, DAY);

        assert_eq!(
            energy.observe(4, t0 + DAY, DAY),
            EnergyStatus::Available(4)
        );
        assert_eq!(energy.refresh_at(), None);
        assert_eq!(energy.current(), 4);
    }

    #[test]
    fn test_small_positive_balance_is_not_depleted() {
        let mut energy = EnergyState::default();
        let t0 = Instant::now();
        assert_eq!(energy.observe(1, t0, DAY), EnergyStatus::Available(1));
        assert_eq!(energy.refresh_at(), None);
    }

    #[test]
    fn test_oversized_window_does_not_overflow() {
        let mut energy = EnergyState::default();
        let t0 = Instant::now();
        assert_eq!(
            energy.observe(0, t0, Duration::MAX),
            EnergyStatus::Depleted { refresh_at: t0 + MAX_REFRESH_WINDOW }
        );
    }

    #[test]
    fn test_retry_backoff() {
        let base = Duration::from_secs(30);
        let mut retry = RetryState::default();

        let mut last = 0;
        for _ in 0..5 {
            let n = retry.record_failure();
            assert!(n > last);
            last = n;
            assert_eq!(retry.backoff(base, 5), base);
        }

        retry.record_failure();
        assert_eq!(retry.failures(), 6);
        assert_eq!(retry.backoff(base, 5), base * 3);

        retry.record_success();
        assert_eq!(retry.failures(), 0);
        assert_eq!(retry.backoff(base, 5), base);
    }

    #[test]
    fn test_extended_backoff_saturates() {
        let mut retry = RetryState::default();
        retry.record_failure();
        assert_eq!(retry.backoff(Duration::MAX, 0), Duration::MAX);
    }

    #[test]
    fn test_masked_token() {
        let account = Account::new(0, "eyJhbGciOiJIUzI1NiJ9.payload.sig");
        assert_eq!(account.masked_token(), "eyJhbG....sig");
        assert_eq!(account.label(), "account-1");

        let short = Account::new(1, "abc");
        assert_eq!(short.masked_token(), "***");
    }
}
