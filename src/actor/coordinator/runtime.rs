use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::dispatch::DispatchActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::DispatchMsg;
use crate::actor::ws::WsActor;
use crate::reload::ReloadHandle;

/// Run all actors until a shutdown signal arrives or an actor exits.
pub(super) async fn run_actors(
    fs: FsActor,
    dispatch: DispatchActor,
    ws: WsActor,
    dispatch_tx: mpsc::Sender<DispatchMsg>,
    reload: ReloadHandle,
    shutdown_rx: Option<Receiver<()>>,
) {
    let ws_handle = tokio::spawn(ws.run());
    let fs_handle = tokio::spawn(fs.run());
    let mut dispatch_handle = tokio::spawn(dispatch.run());

    match shutdown_rx {
        Some(rx) => {
            while rx.try_recv().is_err() {
                if dispatch_handle.is_finished() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            crate::debug!("watch"; "shutdown signal received");
        }
        None => {
            tokio::select! {
                _ = fs_handle => {}
                _ = &mut dispatch_handle => {}
            }
        }
    }

    let _ = dispatch_tx.send(DispatchMsg::Shutdown).await;
    reload.shutdown().await;

    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;
}
