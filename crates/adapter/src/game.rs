//! Game loop glue - applies inbound commands to a session
//!
//! The loop is transport-agnostic: it turns one [`InboundCommand`] into the
//! outbound lines the server should deliver. For a selection that is the
//! reply to the sender (ack or error), every engine event in order, then a
//! fresh observation for streaming clients.

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{EngineError, Session};
use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};
use crate::types::Coord;

pub struct GameLoop {
    session: Session,
    /// Sequence for server-originated messages (events, observations)
    out_seq: u64,
}

impl GameLoop {
    pub fn new(session: Session) -> Self {
        Self { session, out_seq: 0 }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply one command and return what to send, in delivery order
    pub fn apply(&mut self, cmd: InboundCommand) -> Vec<OutboundMessage> {
        match cmd.payload {
            InboundPayload::Select { x, y } => self.apply_select(cmd.client_id, cmd.seq, x, y),
            InboundPayload::Observe => {
                let obs = self.observation();
                encode(&obs)
                    .map(|line| OutboundMessage::ToClient {
                        client_id: cmd.client_id,
                        line,
                    })
                    .into_iter()
                    .collect()
            }
        }
    }

    fn apply_select(&mut self, client_id: u64, seq: u64, x: i32, y: i32) -> Vec<OutboundMessage> {
        let mut out = Vec::new();

        let (Ok(cx), Ok(cy)) = (i16::try_from(x), i16::try_from(y)) else {
            let err = create_error(seq, ErrorCode::OutOfBounds, &format!("({}, {}) is outside the board", x, y));
            out.extend(encode(&err).map(|line| OutboundMessage::ToClient { client_id, line }));
            return out;
        };

        let reply = match self.session.select(Coord::new(cx, cy)) {
            Ok(outcome) => {
                debug!(client_id, seq, outcome = outcome.as_str(), "select applied");
                encode(&create_ack(seq, Some(OutcomeInfo::from(outcome))))
            }
            Err(e) => {
                let code = error_code(&e);
                if code == ErrorCode::CascadeLimit {
                    warn!(client_id, seq, error = %e, "select left an unsettled board");
                }
                encode(&create_error(seq, code, &e.to_string()))
            }
        };
        out.extend(reply.map(|line| OutboundMessage::ToClient { client_id, line }));

        let events = self.session.engine_mut().drain_events();
        if events.is_empty() {
            return out;
        }
        for event in &events {
            self.out_seq += 1;
            let msg = create_event(self.out_seq, event);
            out.extend(encode(&msg).map(|line| OutboundMessage::Broadcast { line }));
        }
        let obs = self.observation();
        out.extend(encode(&obs).map(|line| OutboundMessage::Broadcast { line }));
        out
    }

    /// Current board state as a wire observation
    pub fn observation(&mut self) -> ObservationMessage {
        self.out_seq += 1;
        let engine = self.session.engine();
        let snapshot = engine.board().snapshot();
        ObservationMessage {
            msg_type: ObservationType::Observation,
            seq: self.out_seq,
            ts: current_timestamp_ms(),
            width: snapshot.width,
            height: snapshot.height,
            palette: self.session.palette().names().to_vec(),
            cells: snapshot.rows(),
            selected: engine.selection().first().map(CoordWire::from),
            state_hash: StateHash(snapshot.state_hash()),
            stats: engine.stats().into(),
        }
    }
}

fn error_code(e: &EngineError) -> ErrorCode {
    match e {
        e if e.is_out_of_bounds() => ErrorCode::OutOfBounds,
        EngineError::CascadeLimitExceeded { .. } => ErrorCode::CascadeLimit,
        _ => ErrorCode::InvalidCommand,
    }
}

fn encode<T: Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to encode outbound message");
            None
        }
    }
}
