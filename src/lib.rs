//! Frenzy Angler - headless auto fishing bot for Fishing Frenzy
//!
//! Polls each account's energy over HTTP and, while energy lasts, plays the
//! fishing minigame over its WebSocket protocol by replaying a trace
//! synthesized from the game ticks the server broadcasts. Every account runs
//! in its own supervised task.

pub mod error;
pub mod fish;
pub mod inventory;
pub mod scheduler;
pub mod session;
pub mod supervisor;
pub mod utils;

// Re-exports for convenience
pub use error::{ErrorClass, FishingError, Result};
pub use fish::{GameTick, RangeTier, SessionResult};
pub use inventory::{Inventory, InventoryClient};
pub use scheduler::{AccountScheduler, FishingBackend, LiveBackend, SchedulerConfig};
pub use session::{SessionConfig, SessionService, WsConnector};
pub use supervisor::Supervisor;
pub use utils::{load_settings, load_tokens, Settings};
