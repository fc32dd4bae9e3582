//! Bot settings loaded from `config/settings.json`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FishingError, Result};
use crate::fish::{CoordinatePrecision, RangeCosts, RangeTier, SynthesisOptions};
use crate::scheduler::account::{EXTENDED_BACKOFF_FACTOR, MAX_REFRESH_WINDOW};
use crate::scheduler::{SchedulerConfig, TierPolicy};
use crate::session::SessionConfig;
use crate::utils::path::get_data_dir;

/// Settings structure; every field falls back to its default when omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub ws_url: String,
    pub fishing_range: RangeTier,
    pub tier_policy: TierPolicy,
    pub is_5x: bool,
    pub range_costs: RangeCosts,
    pub delay_between_fishing_secs: u64,
    pub retry_delay_secs: u64,
    pub max_retries: u32,
    pub energy_refresh_hours: u64,
    pub countdown_tick_secs: u64,
    pub post_refresh_delay_secs: u64,
    pub required_ticks: usize,
    pub interpolation_steps: u32,
    pub coordinate_precision: CoordinatePrecision,
    pub session_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub restart_delay_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.fishingfrenzy.co".to_string(),
            ws_url: "wss://api.fishingfrenzy.co".to_string(),
            fishing_range: RangeTier::Mid,
            tier_policy: TierPolicy::Random,
            is_5x: false,
            range_costs: RangeCosts::default(),
            delay_between_fishing_secs: 5,
            retry_delay_secs: 30,
            max_retries: 5,
            energy_refresh_hours: 24,
            countdown_tick_secs: 1,
            post_refresh_delay_secs: 5,
            required_ticks: 10,
            interpolation_steps: 30,
            coordinate_precision: CoordinatePrecision::Float,
            session_timeout_secs: 60,
            http_timeout_secs: 20,
            restart_delay_secs: 60,
        }
    }
}

/// Get settings file path
pub fn get_settings_path() -> PathBuf {
    get_data_dir().join("config").join("settings.json")
}

/// Load settings from `path`; a missing file means defaults
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::info!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| FishingError::config(format!("cannot read {}: {}", path.display(), e)))?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| FishingError::config(format!("invalid {}: {}", path.display(), e)))?;

    settings.validate()?;
    tracing::info!("Settings loaded from {:?}", path);
    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.required_ticks == 0 {
            return Err(FishingError::config("required_ticks must be at least 1"));
        }
        if self.interpolation_steps == 0 {
            return Err(FishingError::config("interpolation_steps must be at least 1"));
        }
        if self.range_costs.min_cost() == 0 {
            return Err(FishingError::config("range costs must be at least 1"));
        }
        if self.session_timeout_secs == 0 || self.http_timeout_secs == 0 {
            return Err(FishingError::config("timeouts must be non-zero"));
        }
        if self.countdown_tick_secs == 0 {
            return Err(FishingError::config("countdown_tick_secs must be at least 1"));
        }
        let refresh_secs = self.energy_refresh_hours.checked_mul(60 * 60);
        if refresh_secs.map_or(true, |secs| secs > MAX_REFRESH_WINDOW.as_secs()) {
            return Err(FishingError::config(format!(
                "energy_refresh_hours must be at most {}",
                MAX_REFRESH_WINDOW.as_secs() / 3600
            )));
        }
        if self
            .retry_delay_secs
            .checked_mul(u64::from(EXTENDED_BACKOFF_FACTOR))
            .is_none()
        {
            return Err(FishingError::config("retry_delay_secs is too large"));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            is_5x: self.is_5x,
            required_ticks: self.required_ticks,
            synthesis: SynthesisOptions {
                interpolation_steps: self.interpolation_steps,
                precision: self.coordinate_precision,
            },
            timeout: Duration::from_secs(self.session_timeout_secs),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            range_costs: self.range_costs,
            tier_policy: self.tier_policy,
            fishing_range: self.fishing_range,
            delay_between_fishing: Duration::from_secs(self.delay_between_fishing_secs),
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            max_retries: self.max_retries,
            energy_refresh_window: Duration::from_secs(
                self.energy_refresh_hours.saturating_mul(60 * 60),
            ),
            countdown_tick: Duration::from_secs(self.countdown_tick_secs),
            post_refresh_delay: Duration::from_secs(self.post_refresh_delay_secs),
        }
    }
}
