//! Protocol module - JSON message types for the network adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence number)
//! and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::engine::{EngineStats, MatchEvent, SelectOutcome};
use crate::types::{Coord, Spawn, TileMove};

/// Protocol version spoken by this adapter
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Identifier announced in `welcome`
pub const GAME_ID: &str = "match3";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SelectType {
    #[serde(rename = "select")]
    #[default]
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ObserveType {
    #[serde(rename = "observe")]
    #[default]
    Observe,
}

fn default_true() -> bool {
    true
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    /// Receive events and observations after every turn
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// A selected cell (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: SelectType,
    pub seq: u64,
    pub ts: u64,
    pub x: i32,
    pub y: i32,
}

/// Request a fresh observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserveMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ObserveType,
    pub seq: u64,
    pub ts: u64,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    InvalidCommand,
    OutOfBounds,
    Backpressure,
    CascadeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    pub game_id: String,
}

/// What a select command did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeInfo {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared: Option<usize>,
}

impl From<SelectOutcome> for OutcomeInfo {
    fn from(value: SelectOutcome) -> Self {
        let mut info = OutcomeInfo {
            kind: value.as_str().to_string(),
            reason: None,
            passes: None,
            cleared: None,
        };
        match value {
            SelectOutcome::Rejected { reason, .. } => info.reason = Some(reason.as_str().to_string()),
            SelectOutcome::Accepted {
                passes, cleared, ..
            } => {
                info.passes = Some(passes);
                info.cleared = Some(cleared);
            }
            SelectOutcome::Selected(_) | SelectOutcome::Unchanged => {}
        }
        info
    }
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeInfo>,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordWire {
    pub x: i16,
    pub y: i16,
}

impl From<Coord> for CoordWire {
    fn from(c: Coord) -> Self {
        Self { x: c.x, y: c.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveWire {
    pub id: u32,
    pub from: CoordWire,
    pub to: CoordWire,
}

impl From<TileMove> for MoveWire {
    fn from(m: TileMove) -> Self {
        Self {
            id: m.id.0,
            from: m.from.into(),
            to: m.to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWire {
    pub id: u32,
    pub x: i16,
    pub y: i16,
    pub kind: u8,
}

impl From<Spawn> for SpawnWire {
    fn from(s: Spawn) -> Self {
        Self {
            id: s.id.0,
            x: s.at.x,
            y: s.at.y,
            kind: s.kind.0,
        }
    }
}

/// Engine notification on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum EventPayload {
    HighlightOn {
        x: i16,
        y: i16,
    },
    HighlightOff {
        x: i16,
        y: i16,
    },
    SwapAccepted {
        a: CoordWire,
        b: CoordWire,
    },
    SwapRejected {
        a: CoordWire,
        b: CoordWire,
        reason: String,
    },
    Cleared {
        pass: u32,
        coords: Vec<CoordWire>,
    },
    Dropped {
        pass: u32,
        moves: Vec<MoveWire>,
    },
    Spawned {
        pass: u32,
        tiles: Vec<SpawnWire>,
    },
    Settled {
        passes: u32,
    },
}

impl From<&MatchEvent> for EventPayload {
    fn from(value: &MatchEvent) -> Self {
        match value {
            MatchEvent::HighlightOn(c) => EventPayload::HighlightOn { x: c.x, y: c.y },
            MatchEvent::HighlightOff(c) => EventPayload::HighlightOff { x: c.x, y: c.y },
            MatchEvent::SwapAccepted { a, b } => EventPayload::SwapAccepted {
                a: (*a).into(),
                b: (*b).into(),
            },
            MatchEvent::SwapRejected { a, b, reason } => EventPayload::SwapRejected {
                a: (*a).into(),
                b: (*b).into(),
                reason: reason.as_str().to_string(),
            },
            MatchEvent::Cleared { pass, coords, .. } => EventPayload::Cleared {
                pass: *pass,
                coords: coords.iter().map(|c| (*c).into()).collect(),
            },
            MatchEvent::Dropped { pass, moves } => EventPayload::Dropped {
                pass: *pass,
                moves: moves.iter().map(|m| (*m).into()).collect(),
            },
            MatchEvent::Spawned { pass, tiles } => EventPayload::Spawned {
                pass: *pass,
                tiles: tiles.iter().map(|s| (*s).into()).collect(),
            },
            MatchEvent::Settled { passes } => EventPayload::Settled { passes: *passes },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    pub event: EventPayload,
}

/// Deterministic state hash serialized as 16 lowercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format_args!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub swaps_accepted: u64,
    pub swaps_rejected: u64,
    pub tiles_cleared: u64,
    pub last_cascade_passes: u32,
}

impl From<EngineStats> for StatsSnapshot {
    fn from(s: EngineStats) -> Self {
        Self {
            swaps_accepted: s.swaps_accepted,
            swaps_rejected: s.swaps_rejected,
            tiles_cleared: s.tiles_cleared,
            last_cascade_passes: s.last_cascade_passes,
        }
    }
}

/// Board observation (sent to streaming clients after every turn)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub width: u8,
    pub height: u8,
    pub palette: Vec<String>,
    /// Rows from `y = 0` upward; `-1` is an empty cell, otherwise a palette index
    pub cells: Vec<Vec<i16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<CoordWire>,
    pub state_hash: StateHash,
    pub stats: StatsSnapshot,
}

// ============== Parsing ==============

#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Select(SelectMessage),
    Observe(ObserveMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one inbound line
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "select")]
        Select(SelectMessage),
        #[serde(rename = "observe")]
        Observe(ObserveMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Select(m)) => Ok(ParsedMessage::Select(m)),
        Ok(InboundMessage::Observe(m)) => Ok(ParsedMessage::Observe(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            let msg_type = header.msg_type.as_deref().unwrap_or("unknown");
            if !matches!(msg_type, "hello" | "select" | "observe") {
                return Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                }));
            }
            Err(e)
        }
    }
}

/// Best-effort `seq` extraction for error replies to malformed lines
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        stream_observations: true,
    }
}

/// Create a select message
pub fn create_select(seq: u64, x: i32, y: i32) -> SelectMessage {
    SelectMessage {
        msg_type: SelectType::Select,
        seq,
        ts: current_timestamp_ms(),
        x,
        y,
    }
}

/// Create a welcome message
pub fn create_welcome(seq: u64, protocol_version: &str, client_id: u64, role: AssignedRole) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        game_id: GAME_ID.to_string(),
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64, outcome: Option<OutcomeInfo>) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        outcome,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Create an event message
pub fn create_event(seq: u64, event: &MatchEvent) -> EventMessage {
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event: EventPayload::from(event),
    }
}

/// Major version of a `MAJOR.MINOR.PATCH` string
pub fn major_version(v: &str) -> Option<&str> {
    v.split('.').next().filter(|m| !m.is_empty())
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RejectReason;
    use crate::types::{TileId, TileKind};

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-ui","version":"1.0.0"},"protocol_version":"1.0.0"}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-ui");
                assert!(msg.stream_observations);
            }
            other => panic!("Expected Hello message, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_select() {
        let json = r#"{"type":"select","seq":2,"ts":1,"x":3,"y":-1}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Select(msg) => {
                assert_eq!(msg.x, 3);
                assert_eq!(msg.y, -1);
            }
            other => panic!("Expected Select message, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_not_a_parse_error() {
        let json = r#"{"type":"dance","seq":9}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            other => panic!("Expected Unknown message, got {:?}", other),
        }
    }

    #[test]
    fn test_known_type_with_bad_fields_is_an_error() {
        let json = r#"{"type":"select","seq":2,"ts":1,"x":"left"}"#;
        assert!(parse_message(json).is_err());
        assert_eq!(extract_seq_best_effort(json), Some(2));
    }

    #[test]
    fn test_error_code_wire_names() {
        let err = create_error(4, ErrorCode::OutOfBounds, "nope");
        let v: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "out_of_bounds");
    }

    #[test]
    fn test_event_payload_is_tagged_by_name() {
        let ev = MatchEvent::Spawned {
            pass: 2,
            tiles: vec![Spawn {
                id: TileId(7),
                at: Coord::new(1, 4),
                kind: TileKind(3),
            }],
        };
        let v = serde_json::to_value(create_event(5, &ev)).unwrap();
        assert_eq!(v["type"], "event");
        assert_eq!(v["event"]["name"], "spawned");
        assert_eq!(v["event"]["tiles"][0]["kind"], 3);
        assert_eq!(v["event"]["tiles"][0]["y"], 4);
    }

    #[test]
    fn test_state_hash_hex() {
        let v = serde_json::to_value(StateHash(0xab)).unwrap();
        assert_eq!(v, "00000000000000ab");
        let back: StateHash = serde_json::from_value(v).unwrap();
        assert_eq!(back, StateHash(0xab));
    }

    #[test]
    fn test_outcome_info_from_rejection() {
        let info = OutcomeInfo::from(SelectOutcome::Rejected {
            a: Coord::new(0, 0),
            b: Coord::new(2, 0),
            reason: RejectReason::NotAdjacent,
        });
        assert_eq!(info.kind, "rejected");
        assert_eq!(info.reason.as_deref(), Some("not_adjacent"));
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("1.2.3"), Some("1"));
        assert_eq!(major_version(""), None);
    }
}
