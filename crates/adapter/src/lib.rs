//! Adapter module - remote play via TCP socket with JSON protocol
//!
//! This module lets external clients (a UI, a bot, a test harness) drive a
//! match session through a TCP socket connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller;
//!    when it disconnects the lowest remaining client id is promoted
//! 4. **Selecting**: The controller sends `select` with a cell coordinate
//! 5. **Streaming**: Engine events and a fresh observation are broadcast after
//!    every selection
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and protocol version
//! - **select**: Select the cell at `(x, y)`
//! - **observe**: Request the current board
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the assigned client id and role
//! - **ack**: A selection was applied, with its outcome
//! - **event**: One engine notification (highlight, swap, clear, drop, spawn)
//! - **observation**: Full board snapshot with palette, selection and stats
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `MATCH3_HOST`: Bind address (default: "127.0.0.1")
//! - `MATCH3_PORT`: Port number (default: 7878)
//! - `MATCH3_MAX_PENDING`: Inbound command queue capacity (default: 16)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,"role":"controller","game_id":"match3"}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"width":8,"height":8,...}
//! Client -> Server: {"type":"select","seq":2,"ts":1234567892,"x":3,"y":4}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok","outcome":{"kind":"selected"}}
//! Server -> Client: {"type":"event","seq":2,"ts":1234567892,"event":{"name":"highlight_on","x":3,"y":4}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod game;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_types as types;

pub use game::GameLoop;
pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{bind_listener, run_server, serve, ServerConfig, ServerState};
