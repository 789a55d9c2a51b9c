//! Actor System for the Dev Loop
//!
//! Message-passing concurrency for `dev` mode:
//!
//! ```text
//! FsActor --> BuildActor --> WsActor --> Browser
//! (watch)     (rebuild)     (reload)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `builder` - Serialized, coalescing full rebuilds
//! - `ws` - WebSocket sessions, broadcast and heartbeat
//! - `coordinator` - Wires up and runs actors

pub mod builder;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::{Coordinator, actual_ws_port};
