//! Pure state machine for a single fishing attempt
//!
//! `FishingSession` owns everything one attempt needs (tick buffer, end latch,
//! phase) and reacts to transport events by returning what the driver should
//! do next. It performs no I/O, which keeps every transition unit-testable.

use crate::fish::{synthesize, FailureReason, GameTick, RangeTier, SessionResult, SynthesisOptions};

use super::protocol::{parse_reward, ClientCommand, ServerMessage};

/// Lifecycle phase of one attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Connecting,
    Prepared,
    Playing,
    Ending,
    Done(bool),
    Aborted,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Done(_) | SessionPhase::Aborted)
    }
}

/// What the driver has to do after feeding an event in
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Nothing to send, keep reading
    Continue,
    Send(ClientCommand),
    /// Terminal: close the connection and report this result
    Finish(SessionResult),
}

/// Tunables for one attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    pub range: RangeTier,
    pub is_5x: bool,
    /// Ticks to collect before the `end` command goes out
    pub required_ticks: usize,
    pub synthesis: SynthesisOptions,
}

impl SessionParams {
    pub fn new(range: RangeTier) -> Self {
        Self {
            range,
            is_5x: false,
            required_ticks: 10,
            synthesis: SynthesisOptions::default(),
        }
    }
}

#[derive(Debug)]
pub struct FishingSession {
    params: SessionParams,
    phase: SessionPhase,
    ticks: Vec<GameTick>,
    game_started: bool,
    end_sent: bool,
}

impl FishingSession {
    pub fn new(params: SessionParams) -> Self {
        Self {
            ticks: Vec::with_capacity(params.required_ticks),
            params,
            phase: SessionPhase::Connecting,
            game_started: false,
            end_sent: false,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn ticks(&self) -> &[GameTick] {
        &self.ticks
    }

    pub fn end_sent(&self) -> bool {
        self.end_sent
    }

    /// The connection is open: ask the server to prepare a game
    pub fn on_open(&mut self) -> ClientCommand {
        tracing::debug!(range = %self.params.range, is_5x = self.params.is_5x, "Sending prepare");
        ClientCommand::Prepare {
            range: self.params.range,
            is_5x: self.params.is_5x,
        }
    }

    /// Feed one raw text frame
    ///
    /// Frames that are not valid JSON are logged and skipped.
    pub fn on_text(&mut self, text: &str) -> Reaction {
        match ServerMessage::parse(text) {
            Ok(message) => self.on_message(message),
            Err(e) => {
                tracing::warn!("[protocol] Skipping unparseable message: {}", e);
                Reaction::Continue
            }
        }
    }

    pub fn on_message(&mut self, message: ServerMessage) -> Reaction {
        if self.phase.is_terminal() {
            return Reaction::Continue;
        }

        match message {
            ServerMessage::InitGame => self.on_init_game(),
            ServerMessage::GameState { frame, dir } => self.on_game_state(GameTick::new(frame, dir)),
            ServerMessage::GameOver {
                success,
                catched_fish,
            } => self.on_game_over(success, catched_fish),
            ServerMessage::Other => Reaction::Continue,
        }
    }

    fn on_init_game(&mut self) -> Reaction {
        if self.phase != SessionPhase::Connecting {
            tracing::debug!("Ignoring repeated initGame in {:?}", self.phase);
            return Reaction::Continue;
        }

        self.game_started = true;
        self.phase = SessionPhase::Prepared;
        tracing::debug!("Game initialised, starting");
        self.phase = SessionPhase::Playing;
        Reaction::Send(ClientCommand::Start)
    }

    fn on_game_state(&mut self, tick: GameTick) -> Reaction {
        if self.phase != SessionPhase::Playing {
            tracing::trace!("Ignoring tick {:?} in {:?}", tick, self.phase);
            return Reaction::Continue;
        }

        self.ticks.push(tick);
        if self.ticks.len() < self.params.required_ticks || self.end_sent {
            return Reaction::Continue;
        }

        let trace = synthesize(&self.ticks, &self.params.synthesis);
        tracing::debug!(
            ticks = self.ticks.len(),
            points = trace.len(),
            "Submitting replay"
        );
        self.end_sent = true;
        self.phase = SessionPhase::Ending;
        Reaction::Send(ClientCommand::end(trace))
    }

    fn on_game_over(&mut self, success: bool, catched_fish: Option<serde_json::Value>) -> Reaction {
        if !matches!(
            self.phase,
            SessionPhase::Prepared | SessionPhase::Playing | SessionPhase::Ending
        ) {
            tracing::debug!("Ignoring gameOver in {:?}", self.phase);
            return Reaction::Continue;
        }

        self.phase = SessionPhase::Done(success);

        if success {
            let reward = catched_fish.as_ref().and_then(parse_reward);
            Reaction::Finish(SessionResult::Success { reward })
        } else {
            Reaction::Finish(SessionResult::Failure(FailureReason::ServerDeclared))
        }
    }

    /// The session deadline elapsed before a verdict arrived
    pub fn on_timeout(&mut self) -> SessionResult {
        self.abort(FailureReason::Timeout)
    }

    /// The server closed the connection (or the stream ended)
    pub fn on_closed(&mut self) -> SessionResult {
        if self.game_started {
            self.abort(FailureReason::ConnectionLost)
        } else {
            self.abort(FailureReason::ClosedBeforeStart)
        }
    }

    pub fn on_transport_error(&mut self, error: impl std::fmt::Display) -> SessionResult {
        self.abort(FailureReason::Transport(error.to_string()))
    }

    fn abort(&mut self, reason: FailureReason) -> SessionResult {
        self.phase = SessionPhase::Aborted;
        SessionResult::Failure(reason)
    }
}
