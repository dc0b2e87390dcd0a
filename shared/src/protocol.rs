//! Wire messages exchanged over the real-time channel.
//!
//! Browser clients speak JSON text frames; native clients may use bincode
//! binary frames. Both encodings share the same message types, and event names
//! in JSON are camelCase (`basicAttack`, `playerHealthUpdate`, ...).

use crate::entities::{AssassinStab, MeleeSwing, Player, PlayerId, Projectile};
use crate::MAX_NICKNAME_LEN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed JSON message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed binary message: {0}")]
    Binary(#[from] bincode::Error),
    #[error("non-finite value in field '{0}'")]
    NonFinite(&'static str),
}

/// Messages sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Init {
        #[serde(default)]
        nickname: Option<String>,
        #[serde(default)]
        role: Option<String>,
    },
    Movement {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
    },
    BasicAttack {
        direction_x: f32,
        direction_y: f32,
        angle: f32,
    },
    UseSkill1 {
        target_x: f32,
        target_y: f32,
        angle: f32,
    },
    UseSkill2 {
        target_x: f32,
        target_y: f32,
        angle: f32,
    },
}

impl ClientMessage {
    /// Rejects values the simulation cannot handle and normalises the nickname.
    pub fn validate(mut self) -> Result<Self, ProtocolError> {
        match &mut self {
            ClientMessage::Init { nickname, .. } => {
                if let Some(name) = nickname {
                    let trimmed: String = name.trim().chars().take(MAX_NICKNAME_LEN).collect();
                    *nickname = Some(trimmed).filter(|n| !n.is_empty());
                }
            }
            ClientMessage::Movement { .. } => {}
            ClientMessage::BasicAttack {
                direction_x,
                direction_y,
                angle,
            } => {
                ensure_finite("directionX", *direction_x)?;
                ensure_finite("directionY", *direction_y)?;
                ensure_finite("angle", *angle)?;
            }
            ClientMessage::UseSkill1 {
                target_x,
                target_y,
                angle,
            }
            | ClientMessage::UseSkill2 {
                target_x,
                target_y,
                angle,
            } => {
                ensure_finite("targetX", *target_x)?;
                ensure_finite("targetY", *target_y)?;
                ensure_finite("angle", *angle)?;
            }
        }
        Ok(self)
    }
}

fn ensure_finite(field: &'static str, value: f32) -> Result<(), ProtocolError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProtocolError::NonFinite(field))
    }
}

/// Per-tick snapshot of everything a client needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub tick: u64,
    pub players: BTreeMap<PlayerId, Player>,
    pub projectiles: Vec<Projectile>,
    pub melee_attacks: Vec<MeleeSwing>,
    pub assassin_stabs: Vec<AssassinStab>,
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// First message on every connection; tells the client its identifier.
    Connected { id: PlayerId },
    ServerFull,
    CurrentPlayers {
        players: BTreeMap<PlayerId, Player>,
    },
    NewPlayer { player: Player },
    PlayerDisconnected { id: PlayerId },
    GameState(GameSnapshot),
    PlayerHealthUpdate { id: PlayerId, health: f32 },
    PlayerDashed {
        id: PlayerId,
        target_x: f32,
        target_y: f32,
        duration: u32,
    },
    PlayerShielded { id: PlayerId, duration: u32 },
    PlayerEnhancedAttack { id: PlayerId, duration: u32 },
    PlayerPiercingShotMode { id: PlayerId, duration: u32 },
    PlayerInvisible { id: PlayerId, duration: u32 },
    PlayerTeleported { id: PlayerId, x: f32, y: f32 },
    ExplosionEffect { x: f32, y: f32 },
    PlayerDefeated {
        id: PlayerId,
        by: Option<PlayerId>,
    },
    PlayerRespawned { id: PlayerId, x: f32, y: f32 },
}

pub fn decode_json(text: &str) -> Result<ClientMessage, ProtocolError> {
    let message: ClientMessage = serde_json::from_str(text)?;
    message.validate()
}

pub fn decode_binary(bytes: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let message: ClientMessage = bincode::deserialize(bytes)?;
    message.validate()
}

pub fn encode_json(message: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

pub fn encode_binary(message: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(message)?)
}
