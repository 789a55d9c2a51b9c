//! Live reload transport.
//!
//! - `server` - WebSocket listener feeding clients to the WsActor

pub mod server;
