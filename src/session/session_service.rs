//! Drives one fishing session over a transport, bounded by a wall-clock deadline

use std::time::Duration;

use tokio::time::{timeout, timeout_at, Instant};

use crate::error::FishingError;
use crate::fish::{RangeTier, SessionResult, SynthesisOptions};

use super::protocol::ClientCommand;
use super::state_machine::{FishingSession, Reaction, SessionParams};
use super::transport::{Connector, FrameTransport, Inbound};

/// Grace period for the closing handshake once a verdict is in
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Per-session settings shared by every attempt of an account
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub is_5x: bool,
    pub required_ticks: usize,
    pub synthesis: SynthesisOptions,
    /// Budget from opening the connection to the `gameOver` verdict
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            is_5x: false,
            required_ticks: 10,
            synthesis: SynthesisOptions::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct SessionService<C> {
    connector: C,
    config: SessionConfig,
}

impl<C: Connector> SessionService<C> {
    pub fn new(connector: C, config: SessionConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn params(&self, range: RangeTier) -> SessionParams {
        SessionParams {
            range,
            is_5x: self.config.is_5x,
            required_ticks: self.config.required_ticks,
            synthesis: self.config.synthesis,
        }
    }

    /// Run one attempt to completion
    ///
    /// Never returns an error: connect failures, transport errors, early
    /// closes and the deadline all resolve to `SessionResult::Failure`.
    pub async fn run(&self, token: &str, range: RangeTier) -> SessionResult {
        let deadline = Instant::now() + self.config.timeout;
        let mut session = FishingSession::new(self.params(range));

        let mut transport = match timeout_at(deadline, self.connector.connect(token)).await {
            Ok(Ok(transport)) => transport,
            Ok(Err(e)) => return session.on_transport_error(e),
            Err(_) => return session.on_timeout(),
        };

        let result = drive(&mut session, &mut transport, deadline).await;

        // the engine always closes; dropping the transport covers a stuck handshake
        if timeout(CLOSE_GRACE, transport.close()).await.is_err() {
            tracing::trace!("Close handshake did not finish in {:?}", CLOSE_GRACE);
        }
        tracing::debug!("Session finished in phase {:?}", session.phase());
        result
    }
}

async fn drive<T: FrameTransport>(
    session: &mut FishingSession,
    transport: &mut T,
    deadline: Instant,
) -> SessionResult {
    let prepare = session.on_open();
    if let Err(result) = send(session, transport, &prepare, deadline).await {
        return result;
    }

    loop {
        let text = match timeout_at(deadline, transport.recv()).await {
            Ok(Ok(Inbound::Text(text))) => text,
            Ok(Ok(Inbound::Closed)) => return session.on_closed(),
            Ok(Err(e)) => return session.on_transport_error(e),
            Err(_) => return session.on_timeout(),
        };

        match session.on_text(&text) {
            Reaction::Continue => {}
            Reaction::Send(command) => {
                if let Err(result) = send(session, transport, &command, deadline).await {
                    return result;
                }
            }
            Reaction::Finish(result) => return result,
        }
    }
}

async fn send<T: FrameTransport>(
    session: &mut FishingSession,
    transport: &mut T,
    command: &ClientCommand,
    deadline: Instant,
) -> Result<(), SessionResult> {
    let json = command
        .to_json()
        .map_err(|e| session.on_transport_error(FishingError::Protocol(e.to_string())))?;

    tracing::trace!("-> {}", command.name());
    match timeout_at(deadline, transport.send_text(json)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(session.on_transport_error(e)),
        Err(_) => Err(session.on_timeout()),
    }
}
