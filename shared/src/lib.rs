//! JarNet Shared Protocol Types
//!
//! This crate provides the wire constants, command classifier and catalog codec
//! shared between the package host and its remote client.

pub mod codec;
pub mod command;
pub mod reply;
pub mod state_machine;

pub use codec::{decode_catalog, encode_catalog, Catalog, CodecError};
pub use command::{Command, ProtocolError};
pub use reply::StatusReply;
pub use state_machine::{Lifecycle, LifecycleEvent, ServerState, TransitionResult};

/// Fixed UDP ports of the protocol
pub mod ports {
    /// Port the host listens on for commands
    pub const HOST_COMMAND_PORT: u16 = 4213;

    /// Client port receiving acks and catalogs
    pub const CLIENT_DATA_PORT: u16 = 3198;

    /// Client port receiving text status messages
    pub const CLIENT_MESSAGE_PORT: u16 = 108;

    /// Host port accepting the out-of-band restart signal
    pub const CONTROL_PORT: u16 = 5431;
}

/// Size limits for datagrams
pub mod limits {
    /// Receive buffer for command datagrams; longer payloads are truncated
    pub const MAX_COMMAND_DATAGRAM: usize = 1024;

    /// Largest payload a single UDP/IPv4 datagram can carry
    pub const MAX_UDP_PAYLOAD: usize = 65_507;

    /// Receive buffer for an upload body announced with `declared_size` bytes
    pub fn upload_buffer_len(declared_size: u64) -> usize {
        declared_size.min(MAX_UDP_PAYLOAD as u64) as usize
    }
}

/// Literal payloads and sentinels of the wire protocol
pub mod literals {
    /// Liveness check sent by the client
    pub const STATUS_PING: &str = "Estado conexion";

    /// Handshake sent by the client to fetch the catalog
    pub const HANDSHAKE: &str = "Establecer conexion";

    /// 8-byte acknowledgment for the liveness check
    pub const STATUS_ACK: &[u8; 8] = b"recibido";

    /// Confirmation sent after the handshake catalog
    pub const CONNECTED: &str = "Conectado.";

    /// Control-port payload that restarts the server instance
    pub const RESTART: &str = "Reiniciar";

    /// Trailing character of an upload request
    pub const UPLOAD_SENTINEL: char = ':';

    /// Trailing character of an execute request
    pub const EXECUTE_SENTINEL: char = '|';

    /// Separates file name and declared size in an upload request
    pub const SIZE_SEPARATOR: char = '&';

    /// Leading character of an error status message
    pub const ERROR_MARKER: char = '#';

    /// Extension a file needs to show up in the catalog
    pub const PACKAGE_EXTENSION: &str = ".jar";

    /// Store directory name, relative to the working directory
    pub const STORE_DIR: &str = "jars";
}

/// Status texts shown by the client
pub mod messages {
    pub const UPLOAD_STORED: &str = "Jar recibido y guardado con exito :=).";
    pub const UPLOAD_FAILED: &str = "Ha ocurrido un error guardar el archivo";
    pub const EXECUTE_FAILED: &str = "No se ha ejecutado el archivo.";
    pub const STORE_CREATE_FAILED: &str = "Ha ocurrido un error al intentar crear la carpeta oculta.";
    pub const STORE_LIST_FAILED: &str = "No se ha podido detectar los jars en la carpeta oculta.";
    pub const CATALOG_SEND_FAILED: &str = "No se a podido enviar el paquete de nombres.";

    /// Error text for a rejected or failed upload
    pub fn upload_failed(detail: impl std::fmt::Display) -> String {
        format!("{}: {}", UPLOAD_FAILED, detail)
    }

    /// Success text for a launched package
    pub fn executed(file_name: &str) -> String {
        format!("Se ejecuto \"{}\" correctamente.", file_name)
    }
}
