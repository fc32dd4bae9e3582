//! WebSocket fishing sessions

pub mod protocol;
pub mod session_service;
pub mod state_machine;
pub mod transport;

pub use protocol::{ClientCommand, ServerMessage};
pub use session_service::{SessionConfig, SessionService};
pub use state_machine::{FishingSession, Reaction, SessionParams, SessionPhase};
pub use transport::{Connector, FrameTransport, Inbound, WsConnector, WsTransport};
