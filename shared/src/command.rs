//! Command classifier for inbound datagrams
//!
//! Commands carry no framing: the kind is decided by a trailing sentinel or by
//! matching a fixed literal. This module is the only place that knows the
//! scheme, in both directions.

use thiserror::Error;

use crate::limits;
use crate::literals::{EXECUTE_SENTINEL, HANDSHAKE, SIZE_SEPARATOR, STATUS_PING, UPLOAD_SENTINEL};

/// A decoded client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check, answered with the fixed ack
    StatusPing,
    /// Catalog request followed by a connected confirmation
    Handshake,
    /// Announces a package body arriving in the next datagram
    Upload { file_name: String, declared_size: u64 },
    /// Launch a stored package
    Execute { file_name: String },
}

/// Errors raised while classifying a payload.
///
/// The text is what the client sees after the upload failure prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Matches none of the command patterns; dropped without a reply
    #[error("comando no reconocido")]
    Unrecognized,

    #[error("falta el separador '{sep}' en {0:?}", sep = SIZE_SEPARATOR)]
    MissingSizeSeparator(String),

    #[error("tamano declarado invalido {0:?}")]
    InvalidSize(String),

    /// Upload request with a size but no name
    #[error("nombre de archivo vacio")]
    EmptyUploadName { declared_size: u64 },

    /// Execute request with no name
    #[error("nombre de archivo vacio")]
    EmptyFileName,
}

impl ProtocolError {
    /// Whether the client should be told about this error
    pub fn is_reportable(&self) -> bool {
        !matches!(self, ProtocolError::Unrecognized)
    }

    /// Receive buffer for the body that follows a rejected upload request.
    ///
    /// Every payload ending in the upload sentinel is followed by one body
    /// datagram, so the host has to take it off the socket even when the
    /// request itself is unusable. `None` for errors with no pending body.
    pub fn pending_body_len(&self) -> Option<usize> {
        match self {
            ProtocolError::MissingSizeSeparator(_) | ProtocolError::InvalidSize(_) => {
                Some(limits::MAX_UDP_PAYLOAD)
            }
            ProtocolError::EmptyUploadName { declared_size } => {
                Some(limits::upload_buffer_len(*declared_size))
            }
            ProtocolError::Unrecognized | ProtocolError::EmptyFileName => None,
        }
    }
}

impl Command {
    /// Classify a decoded payload.
    ///
    /// Order matters: upload sentinel, execute sentinel, then the two literals.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        if let Some(body) = text.strip_suffix(UPLOAD_SENTINEL) {
            return parse_upload(body);
        }

        if let Some(file_name) = text.strip_suffix(EXECUTE_SENTINEL) {
            if file_name.is_empty() {
                return Err(ProtocolError::EmptyFileName);
            }
            return Ok(Command::Execute {
                file_name: file_name.to_string(),
            });
        }

        match text {
            STATUS_PING => Ok(Command::StatusPing),
            HANDSHAKE => Ok(Command::Handshake),
            _ => Err(ProtocolError::Unrecognized),
        }
    }

    /// Decode raw datagram bytes, replacing invalid UTF-8
    pub fn from_datagram(data: &[u8]) -> Result<Self, ProtocolError> {
        Self::parse(&String::from_utf8_lossy(data))
    }

    /// Wire text for this command, as a client sends it
    pub fn encode(&self) -> String {
        match self {
            Command::StatusPing => STATUS_PING.to_string(),
            Command::Handshake => HANDSHAKE.to_string(),
            Command::Upload {
                file_name,
                declared_size,
            } => format!("{file_name}{SIZE_SEPARATOR}{declared_size}{UPLOAD_SENTINEL}"),
            Command::Execute { file_name } => format!("{file_name}{EXECUTE_SENTINEL}"),
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Command::StatusPing => "status_ping",
            Command::Handshake => "handshake",
            Command::Upload { .. } => "upload",
            Command::Execute { .. } => "execute",
        }
    }
}

/// Split `name&size` on the last separator
fn parse_upload(body: &str) -> Result<Command, ProtocolError> {
    let (file_name, size) = body
        .rsplit_once(SIZE_SEPARATOR)
        .ok_or_else(|| ProtocolError::MissingSizeSeparator(body.to_string()))?;

    let declared_size = size
        .parse::<u64>()
        .map_err(|_| ProtocolError::InvalidSize(size.to_string()))?;

    if file_name.is_empty() {
        return Err(ProtocolError::EmptyUploadName { declared_size });
    }

    Ok(Command::Upload {
        file_name: file_name.to_string(),
        declared_size,
    })
}
