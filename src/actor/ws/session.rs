//! Push-channel sessions and their heartbeat bookkeeping.
//!
//! Every heartbeat tick, a session that has not answered since the
//! previous tick is closed and dropped; every other session is marked
//! not-alive and pinged. A pong marks it alive again, so a session is
//! dropped on the second tick without a pong.

use std::time::Instant;

/// Frames a session cares about when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    Pong,
    Close,
    /// Anything else (text, binary, pings); ignored.
    Other,
}

/// Transport for one session.
pub trait PushChannel: Send {
    fn send_text(&mut self, text: &str) -> tungstenite::Result<()>;

    fn ping(&mut self) -> tungstenite::Result<()>;

    /// Non-blocking read of one frame. `Ok(None)` when nothing is waiting.
    fn poll_incoming(&mut self) -> tungstenite::Result<Option<Incoming>>;

    /// Best-effort close.
    fn close(&mut self);
}

struct Session<C> {
    id: u64,
    channel: C,
    alive: bool,
    last_pong: Instant,
}

/// All open sessions.
pub struct SessionSet<C> {
    sessions: Vec<Session<C>>,
    next_id: u64,
}

impl<C> Default for SessionSet<C> {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            next_id: 0,
        }
    }
}

impl<C: PushChannel> SessionSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session; it starts alive.
    pub fn add(&mut self, channel: C) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.push(Session {
            id,
            channel,
            alive: true,
            last_pong: Instant::now(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: u64) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }

    /// When session `id` last answered a ping.
    #[cfg(test)]
    pub fn last_pong(&self, id: u64) -> Option<Instant> {
        self.sessions.iter().find(|s| s.id == id).map(|s| s.last_pong)
    }

    /// Send `text` to every session, dropping those that fail.
    ///
    /// Returns how many sessions received it.
    pub fn broadcast(&mut self, text: &str) -> usize {
        self.sessions.retain_mut(|session| match session.channel.send_text(text) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "session {} dropped on send: {}", session.id, e);
                false
            }
        });
        self.sessions.len()
    }

    /// One heartbeat tick. Returns how many sessions were dropped.
    pub fn heartbeat(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain_mut(|session| {
            if !session.alive {
                crate::debug!(
                    "ws";
                    "session {} missed heartbeat (last pong {:.1?} ago), closing",
                    session.id,
                    session.last_pong.elapsed()
                );
                session.channel.close();
                return false;
            }
            session.alive = false;
            match session.channel.ping() {
                Ok(()) => true,
                Err(e) => {
                    crate::debug!("ws"; "session {} dropped on ping: {}", session.id, e);
                    false
                }
            }
        });
        before - self.sessions.len()
    }

    /// Drain waiting frames of every session: pongs revive, closes and
    /// read errors drop.
    pub fn poll(&mut self) {
        self.sessions.retain_mut(|session| {
            loop {
                match session.channel.poll_incoming() {
                    Ok(None) => return true,
                    Ok(Some(Incoming::Pong)) => {
                        session.alive = true;
                        session.last_pong = Instant::now();
                    }
                    Ok(Some(Incoming::Other)) => {}
                    Ok(Some(Incoming::Close)) => {
                        crate::debug!("ws"; "session {} closed by client", session.id);
                        return false;
                    }
                    Err(e) => {
                        crate::debug!("ws"; "session {} read error: {}", session.id, e);
                        return false;
                    }
                }
            }
        });
    }

    /// Close and forget every session.
    pub fn close_all(&mut self) {
        for mut session in self.sessions.drain(..) {
            session.channel.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Scripted channel; the recording side stays with the test.
    #[derive(Default)]
    struct Wire {
        sent: Vec<String>,
        pings: usize,
        closed: bool,
        incoming: VecDeque<tungstenite::Result<Incoming>>,
        fail_send: bool,
    }

    struct FakeChannel(Arc<Mutex<Wire>>);

    impl PushChannel for FakeChannel {
        fn send_text(&mut self, text: &str) -> tungstenite::Result<()> {
            let mut wire = self.0.lock();
            if wire.fail_send {
                return Err(tungstenite::Error::ConnectionClosed);
            }
            wire.sent.push(text.to_owned());
            Ok(())
        }

        fn ping(&mut self) -> tungstenite::Result<()> {
            self.0.lock().pings += 1;
            Ok(())
        }

        fn poll_incoming(&mut self) -> tungstenite::Result<Option<Incoming>> {
            self.0.lock().incoming.pop_front().transpose()
        }

        fn close(&mut self) {
            self.0.lock().closed = true;
        }
    }

    fn fake() -> (FakeChannel, Arc<Mutex<Wire>>) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        (FakeChannel(Arc::clone(&wire)), wire)
    }

    #[test]
    fn test_session_missing_two_pings_is_removed() {
        let mut set = SessionSet::new();
        let (channel, wire) = fake();
        let id = set.add(channel);

        // First tick: alive since connect, so only pinged
        assert_eq!(set.heartbeat(), 0);
        assert!(set.contains(id));
        assert_eq!(wire.lock().pings, 1);

        // Second tick without a pong: terminated
        assert_eq!(set.heartbeat(), 1);
        assert!(!set.contains(id));
        assert!(wire.lock().closed);
        assert_eq!(wire.lock().pings, 1);
    }

    #[test]
    fn test_pong_keeps_session() {
        let mut set = SessionSet::new();
        let (channel, wire) = fake();
        let id = set.add(channel);
        let connected_at = set.last_pong(id).unwrap();

        for _ in 0..3 {
            set.heartbeat();
            std::thread::sleep(std::time::Duration::from_millis(2));
            wire.lock().incoming.push_back(Ok(Incoming::Pong));
            set.poll();
        }

        assert!(set.contains(id));
        assert_eq!(wire.lock().pings, 3);
        assert!(set.last_pong(id).unwrap() > connected_at);
    }

    #[test]
    fn test_text_frames_do_not_count_as_pong() {
        let mut set = SessionSet::new();
        let (channel, wire) = fake();
        let id = set.add(channel);

        set.heartbeat();
        wire.lock().incoming.push_back(Ok(Incoming::Other));
        set.poll();
        set.heartbeat();

        assert!(!set.contains(id));
    }

    #[test]
    fn test_broadcast_drops_failed_sessions() {
        let mut set = SessionSet::new();
        let (good, good_wire) = fake();
        let (bad, bad_wire) = fake();
        bad_wire.lock().fail_send = true;
        set.add(good);
        set.add(bad);

        assert_eq!(set.broadcast("reload"), 1);
        assert_eq!(set.len(), 1);
        assert_eq!(good_wire.lock().sent, vec!["reload".to_string()]);
    }

    #[test]
    fn test_close_and_errors_drop_on_poll() {
        let mut set = SessionSet::new();
        let (closing, closing_wire) = fake();
        let (broken, broken_wire) = fake();
        let (quiet, _) = fake();
        closing_wire.lock().incoming.push_back(Ok(Incoming::Close));
        broken_wire
            .lock()
            .incoming
            .push_back(Err(tungstenite::Error::AlreadyClosed));
        set.add(closing);
        set.add(broken);
        let quiet_id = set.add(quiet);

        set.poll();
        assert_eq!(set.len(), 1);
        assert!(set.contains(quiet_id));
    }

    #[test]
    fn test_close_all() {
        let mut set = SessionSet::new();
        let (channel, wire) = fake();
        set.add(channel);

        set.close_all();
        assert!(set.is_empty());
        assert!(wire.lock().closed);
    }
}
