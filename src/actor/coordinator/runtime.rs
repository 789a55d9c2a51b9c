use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::builder::BuildActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;

/// Grace period for actors to drain after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    build: BuildActor,
    ws: WsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let fs_handle = tokio::spawn(async move { fs.run().await });
    let build_handle = tokio::spawn(async move { build.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });

    let rx = shutdown_rx.unwrap_or_else(crossbeam::channel::never);
    loop {
        if rx.try_recv().is_ok() || crate::core::is_shutdown() {
            crate::debug!("actor"; "shutdown signal received");
            break;
        }
        if build_handle.is_finished() || ws_handle.is_finished() {
            crate::log!("actor"; "an actor stopped unexpectedly");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    fs_handle.abort();
    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, build_handle).await;

    crate::debug!("actor"; "sending shutdown to ws");
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await;

    Ok(())
}
