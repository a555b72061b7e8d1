//! FileSystem Actor
//!
//! Watches the source tree and sends debounced batches of root-relative
//! paths to the DispatchActor.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → relative paths → DispatchMsg::Changed
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::DispatchMsg;

// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;


use debouncer::Debouncer;
use types::Changes;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    /// Project root; batches are sent relative to it
    root: PathBuf,
    dispatch_tx: mpsc::Sender<DispatchMsg>,
}

impl FsActor {
    /// Start watching `source` recursively.
    ///
    /// The watcher is live as soon as this returns, so edits made while
    /// the initial `copy` runs are buffered rather than lost.
    pub fn new(
        root: &Path,
        source: &Path,
        dispatch_tx: mpsc::Sender<DispatchMsg>,
    ) -> Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;

        watcher
            .watch(source, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", source.display()))?;

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            root: root.to_path_buf(),
            dispatch_tx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let mut debouncer = Debouncer::new();

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify delivers on its own thread; bridge into the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let paths = relative_batch(&self.root, changes);
                    if paths.is_empty() {
                        continue;
                    }
                    if self.dispatch_tx.send(DispatchMsg::Changed(paths)).await.is_err() {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "stopped");
    }
}

/// Sorted root-relative paths of a batch. Paths outside the root are dropped.
fn relative_batch(root: &Path, changes: Changes) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = changes
        .into_keys()
        .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    paths.sort();
    paths
}
