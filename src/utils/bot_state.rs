//! Per-account activity and session statistics

use crate::fish::CatchReward;

/// What an account task is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountActivity {
    Idle,
    CheckingInventory,
    Fishing,
    CoolingDown,
    BackingOff,
    WaitingForEnergy,
}

impl AccountActivity {
    /// Get human-readable description of the activity
    pub fn description(&self) -> &'static str {
        match self {
            AccountActivity::Idle => "Idle",
            AccountActivity::CheckingInventory => "Checking inventory...",
            AccountActivity::Fishing => "Fishing...",
            AccountActivity::CoolingDown => "Waiting before next cast",
            AccountActivity::BackingOff => "Backing off after failure",
            AccountActivity::WaitingForEnergy => "Waiting for energy to refresh",
        }
    }
}

impl std::fmt::Display for AccountActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Running totals for one account, kept in memory only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub catches: u32,
    pub misses: u32,
    pub gold: f64,
    pub exp: f64,
    pub rate: f64,
}

impl SessionStats {
    pub fn increment_catch(&mut self, reward: Option<&CatchReward>) {
        self.catches += 1;
        if let Some(reward) = reward {
            self.exp += reward.exp_gain;
            self.gold = reward.gold;
        }
        self.update_rate();
    }

    pub fn increment_miss(&mut self) {
        self.misses += 1;
        self.update_rate();
    }

    fn update_rate(&mut self) {
        let total = self.catches + self.misses;
        self.rate = if total > 0 {
            (self.catches as f64 / total as f64) * 100.0
        } else {
            0.0
        };
    }
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} caught, {} missed ({:.2}%), +{} exp, gold {}",
            self.catches, self.misses, self.rate, self.exp, self.gold
        )
    }
}
