//! Per-account scheduling: energy tracking, tier choice and the fishing loop

pub mod account;
pub mod account_service;
pub mod tier;

pub use account::{Account, EnergyState, EnergyStatus, RetryState};
pub use account_service::{
    format_time_remaining, AccountScheduler, CycleOutcome, FishingBackend, LiveBackend,
    SchedulerConfig,
};
pub use tier::{select_range_tier, TierPolicy};
