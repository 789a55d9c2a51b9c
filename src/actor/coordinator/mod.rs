//! Actor Coordinator - Wires up the Dev Loop Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Starts the watcher before the initial build
//! - Runs the actors until shutdown

mod runtime;

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::builder::BuildActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::config::SiteConfig;
use crate::core::BuildMode;

const CHANNEL_BUFFER: usize = 32;

/// Port the push channel actually bound (0 until bound).
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Port the push channel is listening on, once bound.
pub fn actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<SiteConfig>,
    shutdown_rx: Option<Receiver<()>>,
    ready_tx: Option<crossbeam::channel::Sender<()>>,
}

impl Coordinator {
    /// Create from Arc<SiteConfig>.
    pub fn with_config(config: Arc<SiteConfig>) -> Self {
        Self {
            config,
            shutdown_rx: None,
            ready_tx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Signal `tx` once the initial build has finished.
    pub fn with_ready_signal(mut self, tx: crossbeam::channel::Sender<()>) -> Self {
        self.ready_tx = Some(tx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);
        let serve = &self.config.serve;

        match crate::reload::server::start_ws_server_with_channel(
            serve.interface,
            serve.ws_port(),
            ws_tx.clone(),
        ) {
            Ok(port) => {
                ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
                crate::debug!("reload"; "ws://{}:{}", serve.interface, port);
            }
            Err(e) => crate::log!("reload"; "websocket server failed: {}", e),
        }

        // Watch first so edits made during the initial build are not lost
        let fs_actor = FsActor::new(self.config.watch_paths(), build_tx.clone(), serve.debounce())
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let build_actor =
            BuildActor::new(build_rx, ws_tx.clone(), Arc::clone(&self.config), BuildMode::DEVELOPMENT);
        build_actor.initial_build().await;
        if let Some(tx) = self.ready_tx.take() {
            let _ = tx.send(());
        }

        let ws_actor = WsActor::new(ws_rx, serve.heartbeat());

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, build_actor, ws_actor, build_tx, ws_tx, shutdown_rx).await?;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
