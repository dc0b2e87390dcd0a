//! Server network layer handling WebSocket connections and game loop coordination

use crate::broadcast::{self, WireFormat};
use crate::client_manager::{ClientManager, OUTBOUND_QUEUE_LIMIT};
use crate::error::ServerError;
use crate::game::GameState;
use crate::input::{self, Outcome};
use crate::scheduler::TickScheduler;
use crate::simulation;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::protocol::{decode_binary, decode_json};
use shared::{ClientMessage, PlayerId, ServerMessage, TICK_RATE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Events sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum NetworkEvent {
    Connected {
        addr: SocketAddr,
        sender: mpsc::Sender<Message>,
        /// Receives the assigned client id, or `None` when the server is full.
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    Message {
        client_id: PlayerId,
        message: ClientMessage,
        format: WireFormat,
    },
    Disconnected {
        client_id: PlayerId,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_rate: u32,
    pub max_clients: usize,
    /// Seeds spawn points and piercing-shot targets for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            max_clients: 32,
            seed: None,
        }
    }
}

/// Main server coordinating connections and the game simulation
///
/// The server loop is the only owner of the game state. Connection tasks never
/// touch it; they forward decoded messages through `event_tx` and receive
/// outbound frames through their per-client channel.
pub struct Server {
    listener: Arc<TcpListener>,
    clients: ClientManager,
    game_state: GameState,
    scheduler: TickScheduler,

    event_tx: mpsc::UnboundedSender<NetworkEvent>,
    event_rx: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl Server {
    pub async fn new(addr: &str, config: ServerConfig) -> Result<Self, ServerError> {
        let listener = Arc::new(TcpListener::bind(addr).await?);
        info!("Server listening on {}", listener.local_addr()?);

        let game_state = match config.seed {
            Some(seed) => {
                info!("Using RNG seed {}", seed);
                GameState::with_seed(seed)
            }
            None => GameState::new(),
        };
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            clients: ClientManager::new(config.max_clients),
            game_state,
            scheduler: TickScheduler::new(config.tick_rate),
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Spawns the task that accepts TCP connections and upgrades them
    fn spawn_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let events = self.event_tx.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let events = events.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, events).await {
                                warn!("Connection from {} closed with error: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected {
                addr,
                sender,
                reply,
            } => {
                let client_id = self.clients.add_client(addr, sender);
                if let Some(id) = client_id {
                    self.clients.send(id, &ServerMessage::Connected { id });
                }
                if reply.send(client_id).is_err() {
                    // The connection task is gone and will never report a disconnect.
                    if let Some(id) = client_id {
                        self.clients.remove_client(id);
                    }
                }
            }

            NetworkEvent::Message {
                client_id,
                message,
                format,
            } => {
                if self.clients.get(client_id).is_none() {
                    // Dropped as stalled; the reader has not noticed yet.
                    return;
                }
                self.clients.set_format(client_id, format);
                if let Outcome::Joined(player) =
                    input::handle_message(&mut self.game_state, client_id, message)
                {
                    let current = ServerMessage::CurrentPlayers {
                        players: self.game_state.players.clone(),
                    };
                    if !self.clients.send(client_id, &current) {
                        self.drop_clients(vec![client_id]);
                        return;
                    }
                    self.broadcast(&ServerMessage::NewPlayer { player }, Some(client_id));
                }
                self.flush_notifications();
            }

            NetworkEvent::Disconnected { client_id } => {
                self.drop_clients(vec![client_id]);
            }
        }
    }

    /// Broadcasts a message, dropping every client that cannot keep up
    fn broadcast(&mut self, message: &ServerMessage, exclude: Option<PlayerId>) {
        let stalled = self.clients.broadcast_except(message, exclude);
        self.drop_clients(stalled);
    }

    /// Removes clients and their players, announcing each removed player
    ///
    /// Announcing can stall further clients, so they are dropped in turn.
    fn drop_clients(&mut self, mut pending: Vec<PlayerId>) {
        while let Some(client_id) = pending.pop() {
            self.clients.remove_client(client_id);
            if self.game_state.remove_player(client_id).is_some() {
                let message = ServerMessage::PlayerDisconnected { id: client_id };
                pending.extend(self.clients.broadcast(&message));
            }
        }
    }

    /// Sends every queued gameplay notification to all clients
    fn flush_notifications(&mut self) {
        for notification in self.game_state.drain_notifications() {
            self.broadcast(&notification, None);
        }
    }

    /// Advances the simulation one tick and broadcasts the resulting snapshot
    fn run_tick(&mut self, dt: Duration) {
        simulation::tick(&mut self.game_state);
        self.flush_notifications();

        // Built even without listeners so visual events never pile up.
        let snapshot = broadcast::snapshot(&mut self.game_state);
        if !self.clients.is_empty() {
            self.broadcast(&snapshot, None);
        }

        if self.game_state.tick % 60 == 0 && !self.clients.is_empty() {
            debug!(
                "Tick {}: {} clients, {} players, {} projectiles, {:.1}Hz",
                self.game_state.tick,
                self.clients.len(),
                self.game_state.player_count(),
                self.game_state.projectiles.len(),
                1.0 / dt.as_secs_f32().max(f32::EPSILON)
            );
        }
    }

    /// Main server loop
    ///
    /// Inputs are applied the moment they arrive; ticks run on the fixed
    /// schedule in between.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.spawn_acceptor();
        info!(
            "Server started: {:.1}ms per tick",
            self.scheduler.period().as_secs_f64() * 1000.0
        );

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                dt = self.scheduler.tick() => {
                    self.run_tick(dt);
                },
            }
        }

        Ok(())
    }
}

/// Drives one WebSocket connection until either side closes it
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (sender, mut outbound) = mpsc::channel(OUTBOUND_QUEUE_LIMIT);
    let (reply_tx, reply_rx) = oneshot::channel();
    events
        .send(NetworkEvent::Connected {
            addr,
            sender,
            reply: reply_tx,
        })
        .map_err(|_| ServerError::Internal("server loop stopped".to_string()))?;

    let client_id = match reply_rx.await {
        Ok(Some(id)) => id,
        Ok(None) => {
            let frame = WireFormat::Json.encode(&ServerMessage::ServerFull)?;
            ws_sender
                .send(frame)
                .await
                .map_err(|e| ServerError::Network(e.to_string()))?;
            let _ = ws_sender.close().await;
            return Ok(());
        }
        Err(_) => return Err(ServerError::Internal("server loop stopped".to_string())),
    };

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = ws_sender.send(frame).await {
                debug!("Failed to send to client {}: {}", client_id, e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    loop {
        // The writer ends when the server drops this client or the socket fails.
        let frame = tokio::select! {
            frame = ws_receiver.next() => frame,
            _ = &mut writer => {
                debug!("Writer for client {} stopped", client_id);
                break;
            }
        };
        let Some(frame) = frame else {
            break;
        };

        let decoded = match frame {
            Ok(Message::Text(text)) => {
                decode_json(text.as_str()).map(|message| (message, WireFormat::Json))
            }
            Ok(Message::Binary(data)) => {
                decode_binary(&data).map(|message| (message, WireFormat::Binary))
            }
            Ok(Message::Close(_)) => {
                debug!("Client {} requested close", client_id);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                debug!("WebSocket error for client {}: {}", client_id, e);
                break;
            }
        };

        match decoded {
            Ok((message, format)) => {
                let event = NetworkEvent::Message {
                    client_id,
                    message,
                    format,
                };
                if events.send(event).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Dropping malformed message from client {}: {}", client_id, e),
        }
    }

    let _ = events.send(NetworkEvent::Disconnected { client_id });
    writer.abort();
    Ok(())
}
