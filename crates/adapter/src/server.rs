//! TCP server for the match adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Capacity of the queue between connections and the game loop
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
        }
    }
}

impl ServerConfig {
    /// Create from `MATCH3_HOST`, `MATCH3_PORT` and `MATCH3_MAX_PENDING`.
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("MATCH3_HOST").unwrap_or(defaults.host);
        let port = env::var("MATCH3_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("MATCH3_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<u64>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: u64) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the last one seen
    async fn check_and_update_seq(&self, client_id: u64, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    /// Remove a client; promote the lowest remaining id if it held control
    async fn remove_client(&self, client_id: u64) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;

        if let Some(pos) = clients.iter().position(|c| c.id == client_id) {
            let handle = clients.remove(pos);
            debug!(client_id, addr = %handle.addr, "client removed");
        }
        if *controller != Some(client_id) {
            return;
        }

        let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
        *controller = next_id;
        match next_id {
            Some(new_id) => info!(client_id = new_id, "controller promoted"),
            None => info!(client_id, "controller released"),
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: u64,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Welcome(WelcomeMessage),
    Error(ErrorMessage),
}

/// Bind the listening socket described by `config`.
pub async fn bind_listener(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr = config.socket_addr()?;
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))
}

/// Bind and run the TCP server.
///
/// The bound address is reported on `ready_tx`, which lets callers bind
/// port 0. See [`serve`] for the connection handling.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = bind_listener(&config).await?;
    if let Some(tx) = ready_tx {
        let _ = tx.send(listener.local_addr()?);
    }
    serve(listener, config, command_tx, out_rx).await
}

/// Serve connections on an already bound listener.
///
/// Inbound commands are forwarded on `command_tx` (bounded; a full queue is
/// reported to the client as `backpressure`). Anything the game loop sends on
/// `out_rx` is routed to one client or broadcast to streaming clients.
pub async fn serve(
    listener: TcpListener,
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
) -> anyhow::Result<()> {
    let bound = listener.local_addr()?;
    info!(addr = %bound, "match adapter listening");

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0u64;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Line(line));
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: u64,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    // Writer task: one JSON document per line
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match msg {
                ClientOutbound::Line(line) => {
                    buf.extend_from_slice(line.as_bytes());
                    Ok(())
                }
                ClientOutbound::Welcome(welcome) => serde_json::to_writer(&mut buf, &welcome),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, &err),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => {
                // Invalid UTF-8 or a reset socket ends the session like EOF
                debug!(client_id, error = %e, "read failed");
                break;
            }
        };
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let wanted = major_version(&state.config.protocol_version);
                if major_version(&hello.protocol_version) != wanted {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to hello becomes controller
                let role = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.stream_observations;
                    }
                    match *controller {
                        None => {
                            *controller = Some(client_id);
                            AssignedRole::Controller
                        }
                        Some(id) if id == client_id => AssignedRole::Controller,
                        Some(_) => AssignedRole::Observer,
                    }
                };
                info!(
                    client_id,
                    client = %hello.client.name,
                    role = ?role,
                    "handshake complete"
                );

                let welcome = create_welcome(hello.seq, &state.config.protocol_version, client_id, role);
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.stream_observations {
                    let queued = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::Observe,
                    });
                    if queued.is_err() {
                        warn!(client_id, "command queue full, first observation not queued");
                        send_error(hello.seq, ErrorCode::Backpressure, "Command queue is full");
                    }
                }
            }

            Ok(ParsedMessage::Select(select)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(select.seq, ErrorCode::HandshakeRequired, "Send hello before select");
                    continue;
                }
                if !state.check_and_update_seq(client_id, select.seq).await {
                    send_error(select.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(select.seq, ErrorCode::NotController, "Only controller may select");
                    continue;
                }

                // Backpressure: bounded queue.
                let queued = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: select.seq,
                    payload: InboundPayload::Select {
                        x: select.x,
                        y: select.y,
                    },
                });
                if queued.is_err() {
                    send_error(select.seq, ErrorCode::Backpressure, "Command queue is full");
                }
                // Ack is sent by the game loop after the selection is applied.
            }

            Ok(ParsedMessage::Observe(observe)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(observe.seq, ErrorCode::HandshakeRequired, "Send hello before observe");
                    continue;
                }
                if !state.check_and_update_seq(client_id, observe.seq).await {
                    send_error(observe.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                let queued = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: observe.seq,
                    payload: InboundPayload::Observe,
                });
                if queued.is_err() {
                    send_error(observe.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    send_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    drop(tx);
    // The handle in the client list holds the last sender; drop it before joining the writer.
    state.remove_client(client_id).await;
    let _ = write_task.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.max_pending_commands, 16);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:7878");
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[tokio::test]
    async fn test_controller_promotion_picks_lowest_handshaken_id() {
        let state = ServerState::new(ServerConfig::default());
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        {
            let mut clients = state.clients.write().await;
            for (id, handshaken) in [(1, true), (2, false), (3, true), (4, true)] {
                let (tx, _rx) = mpsc::unbounded_channel();
                clients.push(ClientHandle {
                    id,
                    addr,
                    stream_observations: true,
                    handshaken,
                    last_seq: None,
                    tx,
                });
            }
        }
        *state.controller.write().await = Some(1);

        state.remove_client(1).await;
        assert_eq!(*state.controller.read().await, Some(3));

        state.remove_client(4).await;
        assert_eq!(*state.controller.read().await, Some(3));
    }

    #[tokio::test]
    async fn test_seq_must_increase() {
        let state = ServerState::new(ServerConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        state.clients.write().await.push(ClientHandle {
            id: 7,
            addr: "127.0.0.1:1".parse().unwrap(),
            stream_observations: false,
            handshaken: true,
            last_seq: Some(3),
            tx,
        });
        assert!(!state.check_and_update_seq(7, 3).await);
        assert!(state.check_and_update_seq(7, 4).await);
        assert!(!state.check_and_update_seq(7, 2).await);
    }
}
