//! WebSocket Actor - live reload push channel
//!
//! This actor is responsible for:
//! - Owning sessions handed over by `reload::server` after their handshake
//! - Broadcasting `reload` to every session after each rebuild
//! - Probing sessions on a heartbeat and dropping dead ones
//!
//! # Architecture
//!
//! ```text
//! BuildActor --[Reload]--> WsActor --[text "reload"]--> Clients
//!                            |  ^                          |
//!                   heartbeat|  +--------[pong]------------+
//!                            v
//!                          [ping]
//! ```

mod client_io;
mod session;

use session::SessionSet;

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tungstenite::WebSocket;

use super::messages::WsMsg;

/// Text frame that tells the browser to reload.
pub const RELOAD_MESSAGE: &str = "reload";

type Sessions = Arc<Mutex<SessionSet<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages sessions, broadcasts and heartbeats
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Open sessions (shared with the reader thread)
    sessions: Sessions,
    heartbeat: Duration,
}

impl WsActor {
    /// Create a new WsActor
    pub fn new(rx: mpsc::Receiver<WsMsg>, heartbeat: Duration) -> Self {
        Self {
            rx,
            sessions: Arc::new(Mutex::new(SessionSet::new())),
            heartbeat,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        Self::spawn_reader(&self.sessions);

        // First ping one full period after start
        let mut ticker = tokio::time::interval_at(Instant::now() + self.heartbeat, self.heartbeat);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = self.rx.recv() => {
                    let Some(msg) = msg else { break };
                    if !self.handle(msg) {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let dropped = self.sessions.lock().heartbeat();
                    if dropped > 0 {
                        crate::debug!("ws"; "heartbeat dropped {} session(s)", dropped);
                    }
                }
            }
        }

        self.sessions.lock().close_all();
        crate::debug!("ws"; "stopped");
    }

    /// Handle one message. Returns `false` on shutdown.
    fn handle(&self, msg: WsMsg) -> bool {
        match msg {
            WsMsg::Reload { reason } => {
                let mut sessions = self.sessions.lock();
                if sessions.is_empty() {
                    crate::debug!("ws"; "reload ({}) with no sessions", reason);
                    return true;
                }
                let delivered = sessions.broadcast(RELOAD_MESSAGE);
                crate::debug!("ws"; "reload ({}) sent to {} session(s)", reason, delivered);
                true
            }
            WsMsg::AddClient(ws) => {
                self.add_client(ws);
                true
            }
            WsMsg::Shutdown => {
                crate::debug!("ws"; "shutting down");
                false
            }
        }
    }
}
