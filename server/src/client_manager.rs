//! Connected client registry for the arena server
//!
//! This module tracks every open WebSocket connection, including:
//! - Connection lifecycle (accept, disconnect) and capacity limits
//! - The wire format each client speaks
//! - The outbound queue feeding each connection's writer task
//!
//! Players are created separately, when a client sends its init event; the
//! manager only knows about transport-level connections.

use crate::broadcast::{Outgoing, WireFormat};
use log::{info, warn};
use shared::{PlayerId, ServerMessage};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

/// Frames a client may have queued before it is dropped as stalled.
pub const OUTBOUND_QUEUE_LIMIT: usize = 256;

/// A connected client and the queue to its writer task
#[derive(Debug)]
pub struct Client {
    /// Identifier assigned on connect, shared with the client's player
    pub id: PlayerId,
    pub addr: SocketAddr,
    pub format: WireFormat,
    pub connected_at: Instant,
    sender: mpsc::Sender<Message>,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr, sender: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            addr,
            format: WireFormat::default(),
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a frame for the writer task without waiting.
    ///
    /// Returns false when the queue is full or the writer has gone away.
    pub fn send_frame(&self, frame: Message) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Client {} outbound queue is full", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Manages all connected clients and their outbound queues
///
/// Iteration is in identifier order, so every client observes broadcasts in
/// the same order they were produced.
pub struct ClientManager {
    clients: BTreeMap<PlayerId, Client>,
    next_client_id: PlayerId,
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: BTreeMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a new connection
    ///
    /// Returns Some(client_id) if successful, None if the server is at
    /// capacity. Identifiers are never reused while the server runs.
    pub fn add_client(
        &mut self,
        addr: SocketAddr,
        sender: mpsc::Sender<Message>,
    ) -> Option<PlayerId> {
        if self.clients.len() >= self.max_clients {
            warn!("Rejecting {}: server full ({} clients)", addr, self.max_clients);
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id = self.next_client_id.wrapping_add(1).max(1);

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));
        Some(client_id)
    }

    /// Removes a client. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: PlayerId) -> bool {
        match self.clients.remove(&client_id) {
            Some(client) => {
                info!(
                    "Client {} disconnected after {:.1}s",
                    client.id,
                    client.connected_at.elapsed().as_secs_f32()
                );
                true
            }
            None => false,
        }
    }

    pub fn get(&self, client_id: PlayerId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    pub fn set_format(&mut self, client_id: PlayerId, format: WireFormat) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            if client.format != format {
                info!("Client {} switched to {:?} frames", client_id, format);
                client.format = format;
            }
        }
    }

    /// Sends a message to one client. Returns false if it could not be queued.
    pub fn send(&self, client_id: PlayerId, message: &ServerMessage) -> bool {
        let Some(client) = self.clients.get(&client_id) else {
            return false;
        };
        match client.format.encode(message) {
            Ok(frame) => client.send_frame(frame),
            Err(e) => {
                warn!("Failed to encode message for client {}: {}", client_id, e);
                false
            }
        }
    }

    pub fn broadcast(&self, message: &ServerMessage) -> Vec<PlayerId> {
        self.broadcast_except(message, None)
    }

    /// Sends a message to every client except `exclude`
    ///
    /// The message is encoded at most once per wire format. Returns the
    /// clients whose queue refused the frame.
    pub fn broadcast_except(
        &self,
        message: &ServerMessage,
        exclude: Option<PlayerId>,
    ) -> Vec<PlayerId> {
        let mut outgoing = Outgoing::new(message);
        let mut stalled = Vec::new();
        for client in self.clients.values() {
            if Some(client.id) == exclude {
                continue;
            }
            match outgoing.frame(client.format) {
                Ok(frame) => {
                    if !client.send_frame(frame) {
                        stalled.push(client.id);
                    }
                }
                Err(e) => {
                    warn!("Failed to encode broadcast: {}", e);
                    break;
                }
            }
        }
        stalled
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
