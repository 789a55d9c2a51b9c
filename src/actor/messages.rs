//! Actor Message Definitions
//!
//! ```text
//! FsActor --Rebuild--> BuildActor --Reload--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use tungstenite::WebSocket;

// =============================================================================
// BuildActor Messages
// =============================================================================

/// Messages to Build Actor
#[derive(Debug)]
pub enum BuildMsg {
    /// Rebuild the whole site. `changed` is informational only: every
    /// rebuild reprocesses every page.
    Rebuild { changed: Vec<PathBuf> },
    /// Shutdown
    Shutdown,
}

impl BuildMsg {
    pub fn rebuild(changed: Vec<PathBuf>) -> Self {
        Self::Rebuild { changed }
    }
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Tell every browser to reload
    Reload { reason: String },
    /// Client whose WebSocket handshake has completed
    AddClient(WebSocket<TcpStream>),
    /// Close every session and stop
    Shutdown,
}
