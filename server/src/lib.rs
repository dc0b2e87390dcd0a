//! # Arena Server Library
//!
//! This library provides the authoritative server for the multiplayer arena.
//! It owns the canonical game state, applies client actions against role
//! rules, advances the world on a fixed tick and broadcasts the result to
//! every connected client.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Positions, health, mana, cooldowns and timed effects only ever change on
//! the server. Clients send intents (movement keys, attack directions, skill
//! targets) and render whatever the server reports back.
//!
//! ### Client Management
//! Handles the lifecycle of client connections:
//! - WebSocket upgrade and client id assignment
//! - Capacity limits with an explicit `serverFull` rejection
//! - Player creation on the `init` event
//! - Idempotent cleanup on disconnect
//!
//! ### State Broadcasting
//! Every tick a full snapshot of players, projectiles and the tick's visual
//! events is sent to all clients. Damage and skill activations are also
//! announced immediately as individual events.
//!
//! ## Architecture Design
//!
//! ### Single Authoritative Loop
//! One task owns the `GameState`. Connection tasks decode frames and forward
//! them over a channel; the loop applies each input as soon as it arrives and
//! runs ticks in between, so no two mutations ever overlap.
//!
//! ### WebSocket Transport
//! Browser clients exchange JSON text frames. Native clients may send bincode
//! binary frames instead; each client is answered in the format of the last
//! frame it sent.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The entity store: players keyed by id, live projectiles, visual events,
//! identifier allocation, damage and respawn.
//!
//! ### Input Module (`input`)
//! Validates actions against cooldowns and mana and applies each role's
//! basic attack and two skills.
//!
//! ### Simulation Module (`simulation`)
//! The fixed-tick update: mana regeneration, cooldowns, dashes, effect
//! expiry, piercing volleys, projectile movement and collisions.
//!
//! ### Broadcast Module (`broadcast`)
//! Snapshot assembly and JSON/bincode frame encoding.
//!
//! ### Client Manager Module (`client_manager`)
//! Connection registry with per-client outbound queues.
//!
//! ### Network Module (`network`)
//! Listener, per-connection reader/writer tasks and the main server loop.
//!
//! ### Scheduler Module (`scheduler`)
//! Fixed-period tick timer that skips missed ticks instead of bursting.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 60Hz, at most 32 clients, random spawn points
//!     let mut server = Server::new("127.0.0.1:3000", ServerConfig::default()).await?;
//!
//!     // Accepts connections, applies inputs, ticks and broadcasts until shutdown
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod client_manager;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod scheduler;
pub mod simulation;
