//! Wire protocol: one JSON object per line, discriminated by `type`

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{OwnerId, UnitId};
use crate::orchestrator::clock::Timers;
use crate::orchestrator::session::PlayerView;
use crate::simulation::{Phase, SimulationSnapshot};

/// Board coordinates as sent by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRef {
    pub row: i32,
    pub col: i32,
}

/// Client -> server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Ready {
        #[serde(default)]
        ready: bool,
    },
    Spawn {
        unit_type: String,
    },
    PlaceUnit {
        unit_id: UnitId,
        tile: TileRef,
    },
    BenchUnit {
        unit_id: UnitId,
    },
    SellUnit {
        unit_id: UnitId,
    },
    EnterGame,
    SetName {
        name: String,
    },
    ForceStart,
}

/// Full engine state plus the session-level fields clients render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    #[serde(flatten)]
    pub snapshot: SimulationSnapshot,
    pub players: Vec<PlayerView>,
    pub timers: Timers,
    pub round: u32,
}

/// Server -> client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Welcome {
        player_id: OwnerId,
    },
    State(Box<StatePayload>),
    Lobby {
        players: Vec<PlayerView>,
        phase: Phase,
        timers: Timers,
        round: u32,
    },
    Error {
        message: String,
    },
}

impl ServerMsg {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMsg::Error {
            message: message.into(),
        }
    }
}

/// Parse one line from a client
pub fn decode_line(line: &str) -> Result<ClientMsg> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Serialize a message as one newline-terminated line
pub fn encode_line(msg: &ServerMsg) -> Result<String> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}
