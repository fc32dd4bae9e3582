//! JSON messages exchanged over the fishing WebSocket

use serde::{Deserialize, Serialize};

use crate::fish::{CatchReward, GameTick, InputTrace, RangeTier};

/// Replay metadata the server expects alongside the trace
pub const FRAME_SAMPLE_RATE: u32 = 100;
pub const NOMINAL_SAMPLE_RATE: u32 = 200;
pub const REPLAY_FPS: u32 = 20;

/// Commands sent by the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum ClientCommand {
    Prepare {
        range: RangeTier,
        #[serde(rename = "is5x")]
        is_5x: bool,
    },
    Start,
    End {
        rep: Replay,
        en: u8,
    },
}

impl ClientCommand {
    pub fn end(trace: InputTrace) -> Self {
        ClientCommand::End {
            rep: Replay {
                fs: FRAME_SAMPLE_RATE,
                ns: NOMINAL_SAMPLE_RATE,
                fps: REPLAY_FPS,
                frs: trace,
            },
            en: 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::Prepare { .. } => "prepare",
            ClientCommand::Start => "start",
            ClientCommand::End { .. } => "end",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    pub fs: u32,
    pub ns: u32,
    pub fps: u32,
    pub frs: InputTrace,
}

/// Messages pushed by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    InitGame,
    GameState {
        #[serde(default, deserialize_with = "null_as_zero")]
        frame: i64,
        #[serde(default, deserialize_with = "null_as_zero")]
        dir: i64,
    },
    GameOver {
        #[serde(default)]
        success: bool,
        #[serde(default, rename = "catchedFish")]
        catched_fish: Option<serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

/// Missing and `null` tick fields both read as 0
fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

impl ServerMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn tick(&self) -> Option<GameTick> {
        match *self {
            ServerMessage::GameState { frame, dir } => Some(GameTick::new(frame, dir)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatchedFish {
    #[serde(default)]
    fish_info: FishInfo,
    #[serde(default)]
    current_exp: f64,
    #[serde(default)]
    exp_to_next_level: f64,
    #[serde(default)]
    energy: i64,
    #[serde(default)]
    gold: f64,
    #[serde(default)]
    fish_point: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FishInfo {
    fish_name: String,
    quality: i64,
    sell_price: f64,
    exp_gain: f64,
}

/// Extract the reward block of a `gameOver`; unexpected shapes yield `None`
pub fn parse_reward(catched_fish: &serde_json::Value) -> Option<CatchReward> {
    let fish: CatchedFish = match serde_json::from_value(catched_fish.clone()) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!("Unrecognised catchedFish payload: {}", e);
            return None;
        }
    };

    Some(CatchReward {
        fish_name: fish.fish_info.fish_name,
        quality: fish.fish_info.quality,
        sell_price: fish.fish_info.sell_price,
        exp_gain: fish.fish_info.exp_gain,
        current_exp: fish.current_exp,
        exp_to_next_level: fish.exp_to_next_level,
        energy: fish.energy,
        gold: fish.gold,
        fish_point: fish.fish_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::TracePoint;
    use serde_json::json;

    #[test]
    fn test_prepare_shape() {
        let cmd = ClientCommand::Prepare {
            range: RangeTier::Long,
            is_5x: false,
        };
        let value: serde_json::Value = serde_json::from_str(&cmd.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"cmd": "prepare", "range": "long_range", "is5x": false})
        );
    }

    #[test]
    fn test_start_and_end_shape() {
        let value: serde_json::Value =
            serde_json::from_str(&ClientCommand::Start.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"cmd": "start"}));

        let end = ClientCommand::end(vec![TracePoint::Plain(450.0, 426.0)]);
        let value: serde_json::Value = serde_json::from_str(&end.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"cmd": "end", "rep": {"fs": 100, "ns": 200, "fps": 20, "frs": [[450, 426]]}, "en": 1})
        );
    }

    #[test]
    fn test_parse_server_messages() {
        assert_eq!(
            ServerMessage::parse(r#"{"type":"initGame","data":{"x":1}}"#).unwrap(),
            ServerMessage::InitGame
        );

        let msg = ServerMessage::parse(r#"{"type":"gameState","frame":12,"dir":-1}"#).unwrap();
        assert_eq!(msg.tick(), Some(GameTick::new(12, -1)));

        let msg = ServerMessage::parse(r#"{"type":"gameState"}"#).unwrap();
        assert_eq!(msg.tick(), Some(GameTick::new(0, 0)));

        let msg = ServerMessage::parse(r#"{"type":"gameState","frame":null,"dir":null}"#).unwrap();
        assert_eq!(msg.tick(), Some(GameTick::new(0, 0)));

        assert_eq!(
            ServerMessage::parse(r#"{"type":"heartbeat"}"#).unwrap(),
            ServerMessage::Other
        );
        assert!(ServerMessage::parse("not json").is_err());
    }

    #[test]
    fn test_parse_game_over_reward() {
        let msg = ServerMessage::parse(
            r#"{"type":"gameOver","success":true,"catchedFish":{
                "fishInfo":{"fishName":"Pufferfish","quality":3,"sellPrice":40,"expGain":25},
                "currentExp":125,"expToNextLevel":400,"energy":9,"gold":1040,"fishPoint":77}}"#,
        )
        .unwrap();

        let ServerMessage::GameOver {
            success,
            catched_fish,
        } = msg
        else {
            panic!("expected gameOver");
        };
        assert!(success);

        let reward = parse_reward(&catched_fish.unwrap()).unwrap();
        assert_eq!(reward.fish_name, "Pufferfish");
        assert_eq!(reward.quality, 3);
        assert_eq!(reward.energy, 9);
        assert_eq!(reward.gold, 1040.0);
    }

    #[test]
    fn test_parse_game_over_without_fish() {
        let msg = ServerMessage::parse(r#"{"type":"gameOver","success":false}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::GameOver {
                success: false,
                catched_fish: None
            }
        );
        assert!(parse_reward(&json!("oops")).is_none());
    }
}
