//! Base types for fishing sessions

use serde::{Deserialize, Serialize};

use crate::error::ErrorClass;

/// Screen origin the upstream validator expects positions to be offset from
pub const BASE_X: i64 = 450;
pub const BASE_Y: i64 = 426;

/// Casting distance, chosen per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeTier {
    #[serde(rename = "short_range")]
    Short,
    #[serde(rename = "mid_range")]
    Mid,
    #[serde(rename = "long_range")]
    Long,
}

impl RangeTier {
    pub const ALL: [RangeTier; 3] = [RangeTier::Short, RangeTier::Mid, RangeTier::Long];

    /// Wire name used in the `prepare` command
    pub fn value(&self) -> &'static str {
        match self {
            RangeTier::Short => "short_range",
            RangeTier::Mid => "mid_range",
            RangeTier::Long => "long_range",
        }
    }
}

impl std::fmt::Display for RangeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Energy cost of each range tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeCosts {
    pub short_range: u32,
    pub mid_range: u32,
    pub long_range: u32,
}

impl Default for RangeCosts {
    fn default() -> Self {
        Self {
            short_range: 1,
            mid_range: 2,
            long_range: 3,
        }
    }
}

impl RangeCosts {
    pub fn cost(&self, tier: RangeTier) -> u32 {
        match tier {
            RangeTier::Short => self.short_range,
            RangeTier::Mid => self.mid_range,
            RangeTier::Long => self.long_range,
        }
    }

    /// Cheapest tier cost; below this no session can be started
    pub fn min_cost(&self) -> u32 {
        RangeTier::ALL
            .iter()
            .map(|t| self.cost(*t))
            .min()
            .unwrap_or(0)
    }

    /// Tiers whose cost fits in `energy`, in declaration order
    pub fn affordable(&self, energy: u32) -> Vec<RangeTier> {
        RangeTier::ALL
            .into_iter()
            .filter(|t| self.cost(*t) <= energy)
            .collect()
    }
}

/// One `gameState` observation pushed by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTick {
    pub frame: i64,
    pub direction: i64,
}

impl GameTick {
    pub fn new(frame: i64, direction: i64) -> Self {
        Self { frame, direction }
    }

    /// Screen position of the tick, computed in `f64` for any frame value
    pub fn position(&self) -> Position {
        let (frame, direction) = (self.frame as f64, self.direction as f64);
        Position {
            x: BASE_X as f64 + frame * 2.0 + direction * 5.0,
            y: BASE_Y as f64 + frame * 2.0 - direction * 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Catch details reported in a successful `gameOver`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchReward {
    pub fish_name: String,
    pub quality: i64,
    pub sell_price: f64,
    pub exp_gain: f64,
    pub current_exp: f64,
    pub exp_to_next_level: f64,
    pub energy: i64,
    pub gold: f64,
    pub fish_point: f64,
}

impl std::fmt::Display for CatchReward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (quality: {}, exp: +{}, gold: {}, energy left: {})",
            self.fish_name, self.quality, self.exp_gain, self.gold, self.energy
        )
    }
}

/// Why a session did not end in a catch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    ServerDeclared,
    Timeout,
    ClosedBeforeStart,
    ConnectionLost,
    Transport(String),
}

impl FailureReason {
    /// Classification hint shown next to the failure in logs
    pub fn class(&self) -> ErrorClass {
        match self {
            FailureReason::ServerDeclared => ErrorClass::ServerDeclared,
            FailureReason::Timeout => ErrorClass::Timeout,
            FailureReason::ClosedBeforeStart | FailureReason::ConnectionLost => ErrorClass::Protocol,
            FailureReason::Transport(_) => ErrorClass::TransientNetwork,
        }
    }

    pub fn description(&self) -> String {
        match self {
            FailureReason::ServerDeclared => "server reported a failed catch".to_string(),
            FailureReason::Timeout => "session timed out".to_string(),
            FailureReason::ClosedBeforeStart => {
                "connection closed before fishing started".to_string()
            }
            FailureReason::ConnectionLost => "connection closed mid-game".to_string(),
            FailureReason::Transport(msg) => format!("transport error: {}", msg),
        }
    }
}

/// Terminal result of one fishing session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResult {
    Success { reward: Option<CatchReward> },
    Failure(FailureReason),
}

impl SessionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SessionResult::Success { .. })
    }
}
