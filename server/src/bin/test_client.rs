//! Headless bot that joins the arena, wanders around and attacks.
//!
//! Useful for load and smoke testing a running server:
//! `cargo run --bin test_client -- --role ranged --duration 30`

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use shared::protocol::encode_json;
use shared::{ClientMessage, ServerMessage};
use std::time::Duration;
use tokio::time::{interval, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:3000")]
    url: String,

    #[arg(short, long, default_value = "bot")]
    nickname: String,

    /// melee, ranged, assassin, healer or support
    #[arg(short, long, default_value = "melee")]
    role: String,

    /// Seconds to stay connected
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Send bincode frames instead of JSON
    #[arg(long)]
    binary: bool,
}

fn frame(message: &ClientMessage, binary: bool) -> Result<Message, Box<dyn std::error::Error>> {
    if binary {
        Ok(Message::binary(bincode::serialize(message)?))
    } else {
        Ok(Message::text(serde_json::to_string(message)?))
    }
}

fn decode(frame: Message) -> Option<ServerMessage> {
    match frame {
        Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
        Message::Binary(data) => bincode::deserialize(&data).ok(),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    info!("Connected to {}", args.url);
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let init = ClientMessage::Init {
        nickname: Some(args.nickname.clone()),
        role: Some(args.role.clone()),
    };
    ws_sender.send(frame(&init, args.binary)?).await?;

    let started = Instant::now();
    let mut actions = interval(Duration::from_millis(100));
    let mut step: u32 = 0;
    let mut my_id = None;
    let mut snapshots = 0u64;

    while started.elapsed() < Duration::from_secs(args.duration) {
        tokio::select! {
            _ = actions.tick() => {
                step += 1;
                let angle = step as f32 * 0.3;
                let movement = ClientMessage::Movement {
                    up: step % 40 < 10,
                    down: (20..30).contains(&(step % 40)),
                    left: (10..20).contains(&(step % 40)),
                    right: step % 40 >= 30,
                };
                ws_sender.send(frame(&movement, args.binary)?).await?;

                let action = match step % 10 {
                    3 => ClientMessage::UseSkill1 {
                        target_x: 400.0 + 200.0 * angle.cos(),
                        target_y: 300.0 + 200.0 * angle.sin(),
                        angle,
                    },
                    7 => ClientMessage::UseSkill2 {
                        target_x: 400.0,
                        target_y: 300.0,
                        angle,
                    },
                    _ => ClientMessage::BasicAttack {
                        direction_x: angle.cos(),
                        direction_y: angle.sin(),
                        angle,
                    },
                };
                ws_sender.send(frame(&action, args.binary)?).await?;
            }

            incoming = ws_receiver.next() => {
                let Some(incoming) = incoming else {
                    warn!("Server closed the connection");
                    break;
                };
                match decode(incoming?) {
                    Some(ServerMessage::Connected { id }) => {
                        info!("Assigned id {}", id);
                        my_id = Some(id);
                    }
                    Some(ServerMessage::ServerFull) => {
                        warn!("Server is full");
                        break;
                    }
                    Some(ServerMessage::GameState(snapshot)) => {
                        snapshots += 1;
                        if snapshots % 60 == 0 {
                            if let Some(me) = my_id.and_then(|id| snapshot.players.get(&id)) {
                                println!(
                                    "tick {}: pos=({:.0}, {:.0}) hp={:.0}/{:.0} mana={:.0} players={} projectiles={}",
                                    snapshot.tick,
                                    me.position.x,
                                    me.position.y,
                                    me.health,
                                    me.max_health,
                                    me.mana,
                                    snapshot.players.len(),
                                    snapshot.projectiles.len()
                                );
                            }
                        }
                    }
                    Some(other) => {
                        if let Ok(text) = encode_json(&other) {
                            info!("Event: {}", text);
                        }
                    }
                    None => {}
                }
            }
        }
    }

    let _ = ws_sender.close().await;
    info!("Bot finished after {} snapshots", snapshots);
    Ok(())
}
