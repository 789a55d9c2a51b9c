//! WebSocket listener for live reload.
//!
//! Accepts TCP connections on a background thread. Each connection gets its
//! own handshake thread; only finished WebSockets reach the WsActor.

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tungstenite::{HandshakeError, WebSocket};

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Upper bound on how long a client may take to send its upgrade request
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind the listener and forward accepted clients to the WsActor.
///
/// Returns the port actually bound, which may be above `base_port` when
/// that one is taken.
pub fn start_ws_server_with_channel(
    interface: IpAddr,
    base_port: u16,
    ws_tx: mpsc::Sender<WsMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let ws_tx = ws_tx.clone();
                    std::thread::spawn(move || match handshake(stream, HANDSHAKE_TIMEOUT) {
                        Ok(ws) => {
                            if ws_tx.blocking_send(WsMsg::AddClient(ws)).is_err() {
                                crate::debug!("reload"; "ws actor gone, dropping {}", addr);
                            }
                        }
                        Err(e) => crate::debug!("reload"; "handshake with {} failed: {}", addr, e),
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Upgrade an accepted connection, giving up after `timeout` of silence.
fn handshake(stream: TcpStream, timeout: Duration) -> Result<WebSocket<TcpStream>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(timeout))?;

    let ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        // A read timeout surfaces as an interrupted handshake
        Err(HandshakeError::Interrupted(_)) => {
            return Err(anyhow!("no upgrade request within {:?}", timeout));
        }
        Err(HandshakeError::Failure(e)) => return Err(e.into()),
    };
    ws.get_ref().set_read_timeout(None)?;
    Ok(ws)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind websocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
