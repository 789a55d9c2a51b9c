//! Build Actor - serialized, coalescing full rebuilds
//!
//! Runs at most one rebuild at a time. Triggers that queue up while a
//! rebuild runs are drained together and answered by exactly one trailing
//! rebuild, so the last change of a burst is always built.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::messages::{BuildMsg, WsMsg};
use crate::build::{BuildContext, RebuildReport, rebuild};
use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::logger::{status_error, status_success, status_warning};

/// Blocking rebuild entry point; receives the changed paths of the burst.
pub type RebuildFn = dyn Fn(&[PathBuf]) -> Result<RebuildReport> + Send + Sync;

/// Build Actor - owns the rebuild loop
pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    rebuild: Arc<RebuildFn>,
}

impl BuildActor {
    /// Actor running full-site rebuilds for `config`.
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        config: Arc<SiteConfig>,
        mode: BuildMode,
    ) -> Self {
        let rebuild_fn: Arc<RebuildFn> = Arc::new(move |_changed: &[PathBuf]| {
            rebuild(&BuildContext::new(&config, mode))
        });
        Self::with_rebuild_fn(rx, ws_tx, rebuild_fn)
    }

    /// Actor running a custom rebuild function.
    pub fn with_rebuild_fn(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        rebuild: Arc<RebuildFn>,
    ) -> Self {
        Self { rx, ws_tx, rebuild }
    }

    /// Run the startup build before any watch-triggered one.
    pub async fn initial_build(&self) -> bool {
        self.run_rebuild(Vec::new()).await
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            let BuildMsg::Rebuild { mut changed } = msg else {
                break;
            };

            // Coalesce everything already queued into this rebuild
            let mut shutdown = false;
            while let Ok(msg) = self.rx.try_recv() {
                match msg {
                    BuildMsg::Rebuild { changed: more } => changed.extend(more),
                    BuildMsg::Shutdown => {
                        shutdown = true;
                        break;
                    }
                }
            }
            if shutdown {
                break;
            }

            changed.sort();
            changed.dedup();
            self.run_rebuild(changed).await;

            let reason = "rebuild".to_owned();
            if self.ws_tx.send(WsMsg::Reload { reason }).await.is_err() {
                crate::debug!("build"; "ws actor gone");
            }
        }
        crate::debug!("build"; "stopped");
    }

    /// One rebuild on the blocking pool. Returns whether it succeeded.
    async fn run_rebuild(&self, changed: Vec<PathBuf>) -> bool {
        let rebuild = Arc::clone(&self.rebuild);
        let result = tokio::task::spawn_blocking(move || rebuild(&changed)).await;

        match result {
            Ok(Ok(report)) => {
                if report.purge_warnings > 0 {
                    status_warning(&format!(
                        "rebuilt {} ({} stale output paths could not be removed)",
                        report.summary(),
                        report.purge_warnings
                    ));
                } else {
                    status_success(&format!("rebuilt {}", report.summary()));
                }
                true
            }
            Ok(Err(e)) => {
                status_error("rebuild failed", &format!("{e:#}"));
                false
            }
            Err(e) => {
                status_error("rebuild panicked", &e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Rebuild function recording each call; the first call blocks until
    /// the gate opens.
    fn gated_rebuild() -> (
        Arc<RebuildFn>,
        Arc<Mutex<Vec<Vec<PathBuf>>>>,
        std::sync::mpsc::Sender<()>,
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
        let gate_rx = Mutex::new(gate_rx);
        let recorded = Arc::clone(&calls);

        let rebuild: Arc<RebuildFn> = Arc::new(move |changed: &[PathBuf]| -> Result<RebuildReport> {
            let first = {
                let mut calls = recorded.lock();
                calls.push(changed.to_vec());
                calls.len() == 1
            };
            if first {
                let _ = gate_rx.lock().recv();
            }
            Ok(RebuildReport::default())
        });
        (rebuild, calls, gate_tx)
    }

    async fn wait_for_calls(calls: &Mutex<Vec<Vec<PathBuf>>>, n: usize) {
        for _ in 0..200 {
            if calls.lock().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {n} rebuilds, saw {}", calls.lock().len());
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_triggers_during_rebuild_coalesce() {
        let (rebuild, calls, gate) = gated_rebuild();
        let (tx, rx) = mpsc::channel(16);
        let (ws_tx, mut ws_rx) = mpsc::channel(16);
        let handle = tokio::spawn(BuildActor::with_rebuild_fn(rx, ws_tx, rebuild).run());

        tx.send(BuildMsg::rebuild(paths(&["a"]))).await.unwrap();
        wait_for_calls(&calls, 1).await;

        // Arrive while the first rebuild is blocked
        for name in ["c", "b", "c"] {
            tx.send(BuildMsg::rebuild(paths(&[name]))).await.unwrap();
        }
        gate.send(()).unwrap();
        wait_for_calls(&calls, 2).await;

        // Settle, then make sure no third rebuild happened
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(BuildMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], paths(&["a"]));
        assert_eq!(calls[1], paths(&["b", "c"]));

        for _ in 0..2 {
            assert!(matches!(ws_rx.recv().await, Some(WsMsg::Reload { .. })));
        }
    }

    #[tokio::test]
    async fn test_failed_rebuild_still_reloads() {
        let (tx, rx) = mpsc::channel(4);
        let (ws_tx, mut ws_rx) = mpsc::channel(4);
        let rebuild: Arc<RebuildFn> =
            Arc::new(|_: &[PathBuf]| -> Result<RebuildReport> { anyhow::bail!("template missing") });
        let handle = tokio::spawn(BuildActor::with_rebuild_fn(rx, ws_tx, rebuild).run());

        tx.send(BuildMsg::rebuild(vec![])).await.unwrap();
        assert!(matches!(ws_rx.recv().await, Some(WsMsg::Reload { .. })));

        tx.send(BuildMsg::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_initial_build_reports_result() {
        let (_tx, rx) = mpsc::channel(1);
        let (ws_tx, _ws_rx) = mpsc::channel(1);
        let ok: Arc<RebuildFn> =
            Arc::new(|_: &[PathBuf]| -> Result<RebuildReport> { Ok(RebuildReport::default()) });
        assert!(BuildActor::with_rebuild_fn(rx, ws_tx, ok).initial_build().await);

        let (_tx, rx) = mpsc::channel(1);
        let (ws_tx, _ws_rx) = mpsc::channel(1);
        let failing: Arc<RebuildFn> =
            Arc::new(|_: &[PathBuf]| -> Result<RebuildReport> { anyhow::bail!("boom") });
        assert!(!BuildActor::with_rebuild_fn(rx, ws_tx, failing).initial_build().await);
    }
}
