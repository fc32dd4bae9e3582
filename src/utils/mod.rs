//! Utility modules for the fishing bot

pub mod bot_state;
pub mod logging;
pub mod path;
pub mod settings;
pub mod tokens;

pub use bot_state::{AccountActivity, SessionStats};
pub use settings::{load_settings, Settings};
pub use tokens::load_tokens;
