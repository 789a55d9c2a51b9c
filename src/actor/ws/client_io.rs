use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::session::{Incoming, PushChannel, SessionSet};
use super::{Sessions, WsActor};

/// How often the reader thread drains incoming frames.
const READ_POLL: Duration = Duration::from_millis(100);

impl PushChannel for WebSocket<TcpStream> {
    fn send_text(&mut self, text: &str) -> tungstenite::Result<()> {
        self.send(Message::Text(text.to_owned().into()))
    }

    fn ping(&mut self) -> tungstenite::Result<()> {
        self.send(Message::Ping(Default::default()))
    }

    fn poll_incoming(&mut self) -> tungstenite::Result<Option<Incoming>> {
        match self.read() {
            Ok(Message::Pong(_)) => Ok(Some(Incoming::Pong)),
            Ok(Message::Close(_)) => Ok(Some(Incoming::Close)),
            Ok(_) => Ok(Some(Incoming::Other)),
            Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) {
        let _ = WebSocket::close(self, None);
        let _ = self.flush();
    }
}

impl WsActor {
    /// Register a client that has finished its handshake.
    pub(super) fn add_client(&self, ws: WebSocket<TcpStream>) {
        // The reader thread polls, so sessions must never block
        if let Err(e) = ws.get_ref().set_nonblocking(true) {
            crate::log!("ws"; "dropping client: {}", e);
            return;
        }
        let mut sessions = self.sessions.lock();
        let id = sessions.add(ws);
        crate::debug!("ws"; "session {} connected (total: {})", id, sessions.len());
    }

    /// Background thread draining client frames (pongs, closes).
    ///
    /// Exits once the actor drops its session set.
    pub(super) fn spawn_reader(sessions: &Sessions) {
        let weak: Weak<Mutex<SessionSet<WebSocket<TcpStream>>>> = Arc::downgrade(sessions);
        std::thread::spawn(move || {
            loop {
                std::thread::sleep(READ_POLL);
                let Some(sessions) = weak.upgrade() else {
                    break;
                };
                sessions.lock().poll();
            }
        });
    }
}
