// src/network/codec.rs

use crate::constants::{CONNECT_PREFIX, REPLICATE_PREFIX};
use crate::replication::record::CandidateTally;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Line did not start with any recognized command prefix.
    #[error("unrecognized command prefix")]
    UnknownPrefix,
    /// Handshake carried something other than a decimal port.
    #[error("malformed handshake port: {0}")]
    BadPort(#[from] std::num::ParseIntError),
    /// Replication payload was not a valid JSON tally array.
    #[error("malformed tally payload: {0}")]
    BadPayload(#[from] serde_json::Error),
}

/// The two control commands of the wire protocol. Frames are single lines;
/// the newline delimiter is added by the writer side and stripped here, so
/// payload size is not bounded by any read-buffer constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `connect <port>` — the sender announces its own listening port.
    Connect { port: u16 },
    /// `recieve data <json-array>` — a batch of tally records to replicate.
    Replicate { records: Vec<CandidateTally> },
}

impl Command {
    /// Decode one received line. A decode failure drops the command only;
    /// the connection it arrived on stays open.
    pub fn decode(line: &str) -> Result<Self, CodecError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = line.strip_prefix(CONNECT_PREFIX) {
            let port = rest.trim().parse::<u16>()?;
            Ok(Command::Connect { port })
        } else if let Some(rest) = line.strip_prefix(REPLICATE_PREFIX) {
            let records: Vec<CandidateTally> = serde_json::from_str(rest)?;
            Ok(Command::Replicate { records })
        } else {
            Err(CodecError::UnknownPrefix)
        }
    }

    /// Encode the wire line, without the trailing newline.
    pub fn encode(&self) -> String {
        match self {
            Command::Connect { port } => format!("{}{}", CONNECT_PREFIX, port),
            Command::Replicate { records } => format!(
                "{}{}",
                REPLICATE_PREFIX,
                serde_json::to_string(records).unwrap_or_else(|_| "[]".into())
            ),
        }
    }
}
