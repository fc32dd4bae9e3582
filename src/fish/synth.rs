//! Input trace synthesis from server-reported game ticks
//!
//! The `end` command expects a client-authored cursor path. It is rebuilt here
//! from the ticks the server already broadcast: every tick becomes a keyframe
//! and consecutive keyframes are joined by evenly spaced intermediate points.

use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use super::base::{GameTick, Position};

/// How interpolated coordinates are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatePrecision {
    /// Sub-pixel floats, as produced by plain linear interpolation
    #[default]
    Float,
    /// Nearest integer pixel
    Rounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub interpolation_steps: u32,
    pub precision: CoordinatePrecision,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            interpolation_steps: 30,
            precision: CoordinatePrecision::Float,
        }
    }
}

/// One entry of the replayed path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TracePoint {
    /// `[x, y]`
    Plain(f64, f64),
    /// `[x, y, frame, direction]`, used for keyframes with a non-zero direction
    Tagged(f64, f64, i64, i64),
}

impl TracePoint {
    pub fn position(&self) -> Position {
        match *self {
            TracePoint::Plain(x, y) | TracePoint::Tagged(x, y, _, _) => Position::new(x, y),
        }
    }

    fn keyframe(tick: &GameTick) -> Self {
        let p = tick.position();
        if tick.direction != 0 {
            TracePoint::Tagged(p.x, p.y, tick.frame, tick.direction)
        } else {
            TracePoint::Plain(p.x, p.y)
        }
    }
}

impl Serialize for TracePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            TracePoint::Plain(x, y) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&Coord(x))?;
                seq.serialize_element(&Coord(y))?;
                seq.end()
            }
            TracePoint::Tagged(x, y, frame, direction) => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element(&Coord(x))?;
                seq.serialize_element(&Coord(y))?;
                seq.serialize_element(&frame)?;
                seq.serialize_element(&direction)?;
                seq.end()
            }
        }
    }
}

/// Whole-valued coordinates go on the wire as integers (`451`, not `451.0`)
struct Coord(f64);

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

pub type InputTrace = Vec<TracePoint>;

/// Linear interpolation between two positions, exact at both ends
pub fn interpolate(start: Position, end: Position, t: f64) -> Position {
    if t <= 0.0 {
        return start;
    }
    if t >= 1.0 {
        return end;
    }
    Position::new(
        start.x + t * (end.x - start.x),
        start.y + t * (end.y - start.y),
    )
}

/// Points strictly between `start` and `end` (`steps - 1` of them)
fn between(
    start: Position,
    end: Position,
    options: &SynthesisOptions,
) -> impl Iterator<Item = TracePoint> + '_ {
    let steps = options.interpolation_steps.max(1);
    (1..steps).map(move |k| {
        let p = interpolate(start, end, k as f64 / steps as f64);
        match options.precision {
            CoordinatePrecision::Float => TracePoint::Plain(p.x, p.y),
            CoordinatePrecision::Rounded => TracePoint::Plain(p.x.round(), p.y.round()),
        }
    })
}

/// Build the dense replay path for `ticks`
///
/// The result starts at the first keyframe and contains `1 + (n - 1) * steps`
/// points for `n` ticks. An empty tick list yields an empty trace.
pub fn synthesize(ticks: &[GameTick], options: &SynthesisOptions) -> InputTrace {
    let Some(first) = ticks.first() else {
        return Vec::new();
    };

    let steps = options.interpolation_steps.max(1) as usize;
    let mut trace = Vec::with_capacity(1 + (ticks.len() - 1) * steps);
    trace.push(TracePoint::keyframe(first));

    for pair in ticks.windows(2) {
        let (prev, curr) = (pair[0].position(), pair[1].position());
        trace.extend(between(prev, curr, options));
        trace.push(TracePoint::keyframe(&pair[1]));
    }

    trace
}
