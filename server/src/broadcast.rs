//! Snapshot assembly and per-format message encoding.

use crate::game::GameState;
use shared::protocol::{encode_binary, encode_json};
use shared::{GameSnapshot, ProtocolError, ServerMessage};
use tokio_tungstenite::tungstenite::Message;

/// Encoding a client speaks. Decided by the frame type of its first message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Json,
    Binary,
}

impl WireFormat {
    pub fn encode(self, message: &ServerMessage) -> Result<Message, ProtocolError> {
        match self {
            WireFormat::Json => Ok(Message::text(encode_json(message)?)),
            WireFormat::Binary => Ok(Message::binary(encode_binary(message)?)),
        }
    }
}

/// Builds the per-tick snapshot.
///
/// Swing and stab visuals are handed to clients exactly once, so they are
/// moved out of the state rather than cloned.
pub fn snapshot(state: &mut GameState) -> ServerMessage {
    ServerMessage::GameState(GameSnapshot {
        tick: state.tick,
        players: state.players.clone(),
        projectiles: state.projectiles.clone(),
        melee_attacks: std::mem::take(&mut state.melee_attacks),
        assassin_stabs: std::mem::take(&mut state.assassin_stabs),
    })
}

/// A server message encoded lazily, at most once per wire format.
pub struct Outgoing<'a> {
    message: &'a ServerMessage,
    json: Option<Message>,
    binary: Option<Message>,
}

impl<'a> Outgoing<'a> {
    pub fn new(message: &'a ServerMessage) -> Self {
        Self {
            message,
            json: None,
            binary: None,
        }
    }

    pub fn frame(&mut self, format: WireFormat) -> Result<Message, ProtocolError> {
        let slot = match format {
            WireFormat::Json => &mut self.json,
            WireFormat::Binary => &mut self.binary,
        };
        if let Some(frame) = slot {
            return Ok(frame.clone());
        }
        let frame = format.encode(self.message)?;
        *slot = Some(frame.clone());
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{handle_basic_attack, AttackInput};
    use shared::{MeleeSwing, Player, Role, Vector2};

    #[test]
    fn test_snapshot_contains_world() {
        let mut state = GameState::with_seed(3);
        state.add_player(Player::new(1, "a".into(), Role::Ranged, Vector2::new(100.0, 100.0)));
        handle_basic_attack(
            &mut state,
            1,
            AttackInput {
                direction: Vector2::new(1.0, 0.0),
                angle: 0.0,
            },
        );
        state.tick = 9;

        match snapshot(&mut state) {
            ServerMessage::GameState(snapshot) => {
                assert_eq!(snapshot.tick, 9);
                assert_eq!(snapshot.players.len(), 1);
                assert_eq!(snapshot.projectiles.len(), 1);
            }
            other => panic!("unexpected message {:?}", other),
        }
        // Projectiles persist between snapshots.
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_visual_events_sent_once() {
        let mut state = GameState::with_seed(3);
        state.melee_attacks.push(MeleeSwing {
            id: 1,
            owner_id: 1,
            position: Vector2::new(10.0, 10.0),
            angle: 0.0,
            radius: 60.0,
            duration: 5,
        });

        let ServerMessage::GameState(first) = snapshot(&mut state) else {
            panic!("expected a snapshot");
        };
        let ServerMessage::GameState(second) = snapshot(&mut state) else {
            panic!("expected a snapshot");
        };
        assert_eq!(first.melee_attacks.len(), 1);
        assert!(second.melee_attacks.is_empty());
    }

    #[test]
    fn test_json_frames_are_text() {
        let message = ServerMessage::Connected { id: 4 };
        let frame = WireFormat::Json.encode(&message).unwrap();
        assert_eq!(frame.to_text().unwrap(), r#"{"connected":{"id":4}}"#);
    }

    #[test]
    fn test_binary_frames_decode() {
        let message = ServerMessage::PlayerDisconnected { id: 2 };
        let frame = WireFormat::Binary.encode(&message).unwrap();
        assert!(frame.is_binary());
        let decoded: ServerMessage = bincode::deserialize(&frame.into_data()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_outgoing_reuses_encoding() {
        let message = ServerMessage::ExplosionEffect { x: 1.0, y: 2.0 };
        let mut outgoing = Outgoing::new(&message);
        let a = outgoing.frame(WireFormat::Json).unwrap();
        let b = outgoing.frame(WireFormat::Json).unwrap();
        let c = outgoing.frame(WireFormat::Binary).unwrap();
        assert_eq!(a, b);
        assert!(a.is_text());
        assert!(c.is_binary());
    }
}
