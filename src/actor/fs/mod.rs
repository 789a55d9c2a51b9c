//! FileSystem Actor
//!
//! Watches the source roots and sends one `BuildMsg::Rebuild` per settled
//! burst of changes. Implements the "Watcher-First" pattern: the watcher is
//! attached before the initial build so no event is lost.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (filter + timing) → BuildMsg::Rebuild
//! ```

use std::path::PathBuf;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::BuildMsg;

// Filtering, timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


use debouncer::Debouncer;
use types::DebouncedEvents;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watch-root consistency layer (attach/re-attach root directories)
    watch_roots: WatchRoots,
    /// Channel to send messages to BuildActor
    build_tx: mpsc::Sender<BuildMsg>,
    /// Debouncer state
    debouncer: Debouncer,
}

impl FsActor {
    /// Create a new FsActor with Watcher-First pattern
    ///
    /// The watcher starts immediately, buffering events while the caller
    /// performs the initial build.
    pub fn new(
        paths: Vec<PathBuf>,
        build_tx: mpsc::Sender<BuildMsg>,
        debounce: Duration,
    ) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached once they appear
        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;
        crate::debug!("watch"; "{} roots attached", watch_roots.attached_count());

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(debounce),
        })
    }

    /// Run the actor event loop until the BuildActor goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            build_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Bridge the blocking notify channel into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    let Some(events) = debouncer.take_if_ready() else {
                        continue;
                    };
                    if send_rebuild(&build_tx, events).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Forward a settled burst. Errs once the BuildActor has shut down.
async fn send_rebuild(
    build_tx: &mpsc::Sender<BuildMsg>,
    events: DebouncedEvents,
) -> Result<(), ()> {
    crate::log!("watch"; "{}", events.summary());
    build_tx
        .send(BuildMsg::rebuild(events.paths()))
        .await
        .map_err(|_| ())
}
