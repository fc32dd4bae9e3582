//! Fishing domain types and replay path synthesis

pub mod base;
pub mod synth;

pub use base::{
    CatchReward, FailureReason, GameTick, Position, RangeCosts, RangeTier, SessionResult,
};
pub use synth::{synthesize, CoordinatePrecision, InputTrace, SynthesisOptions, TracePoint};
