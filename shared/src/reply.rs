//! Text status messages sent to the client's message port

use crate::literals::ERROR_MARKER;

/// A status line, either informational or an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    Info(String),
    Error(String),
}

impl StatusReply {
    /// Parse a received status datagram
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        match text.strip_prefix(ERROR_MARKER) {
            Some(rest) => StatusReply::Error(rest.to_string()),
            None => StatusReply::Info(text.into_owned()),
        }
    }

    /// Wire text, with the error marker where needed
    pub fn render(&self) -> String {
        match self {
            StatusReply::Info(text) => text.clone(),
            StatusReply::Error(text) => format!("{ERROR_MARKER}{text}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusReply::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            StatusReply::Info(text) | StatusReply::Error(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_marker() {
        let reply = StatusReply::parse(b"#No se ha ejecutado el archivo.");
        assert!(reply.is_error());
        assert_eq!(reply.text(), "No se ha ejecutado el archivo.");
        assert_eq!(reply.render(), "#No se ha ejecutado el archivo.");
    }

    #[test]
    fn test_info() {
        let reply = StatusReply::parse(b"Conectado.");
        assert_eq!(reply, StatusReply::Info("Conectado.".into()));
        assert!(!reply.is_error());
    }
}
