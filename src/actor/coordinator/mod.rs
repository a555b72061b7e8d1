//! Actor Coordinator - Wires up the Watch Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Starts the watcher before anything else, so no edit is missed
//! - Runs the initial `copy` into the staging tree
//! - Wires up actors and runs them until shutdown

mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::dispatch::DispatchActor;
use super::fs::FsActor;
use super::messages::{DispatchMsg, WsMsg};
use super::ws::WsActor;
use crate::reload::ReloadHandle;
use crate::stage::{StageContext, StageId, run_stage};
use crate::watch::WatchTable;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    ctx: Arc<StageContext>,
    ws: Option<(mpsc::Sender<WsMsg>, mpsc::Receiver<WsMsg>)>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(ctx: Arc<StageContext>) -> Self {
        Self {
            ctx,
            ws: None,
            shutdown_rx: None,
        }
    }

    /// Channel the WebSocket acceptor already feeds.
    pub fn with_ws_channel(mut self, tx: mpsc::Sender<WsMsg>, rx: mpsc::Receiver<WsMsg>) -> Self {
        self.ws = Some((tx, rx));
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(self) -> Result<()> {
        let (ws_tx, ws_rx) = self
            .ws
            .unwrap_or_else(|| mpsc::channel::<WsMsg>(CHANNEL_BUFFER));
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<DispatchMsg>(CHANNEL_BUFFER);

        let layout = &self.ctx.layout;
        let fs_actor = FsActor::new(layout.root(), &layout.source(), dispatch_tx.clone())?;

        initial_copy(Arc::clone(&self.ctx)).await?;

        let reload = ReloadHandle::new(ws_tx, layout.staging());
        let dispatch_actor = DispatchActor::new(
            dispatch_rx,
            dispatch_tx.clone(),
            Arc::clone(&self.ctx),
            WatchTable::standard(),
            reload.clone(),
        );
        let ws_actor = WsActor::new(ws_rx);

        crate::log!("watch"; "watching {}", layout.relative(&layout.source()).display());
        runtime::run_actors(
            fs_actor,
            dispatch_actor,
            ws_actor,
            dispatch_tx,
            reload,
            self.shutdown_rx,
        )
        .await;

        crate::debug!("watch"; "stopped");
        Ok(())
    }
}

/// First `copy` of the session. A failure is reported; watching goes on.
async fn initial_copy(ctx: Arc<StageContext>) -> Result<()> {
    let result = tokio::task::spawn_blocking(move || run_stage(StageId::Copy, &ctx))
        .await
        .context("initial copy panicked")?;

    match result {
        Ok(report) => crate::log!("copy"; "{}", report.summary()),
        Err(e) => crate::log!("error"; "copy: {:#}", e),
    }
    Ok(())
}
