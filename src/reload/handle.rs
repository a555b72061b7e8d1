//! Handle for pushing live-reload events to browsers.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Cloneable sender side of the WebSocket actor.
///
/// Passed explicitly to whoever needs to notify browsers; there is no
/// global broadcaster.
#[derive(Clone)]
pub struct ReloadHandle {
    tx: mpsc::Sender<WsMsg>,
    /// Served directory; written paths are mapped to URLs relative to it.
    served_root: PathBuf,
}

impl ReloadHandle {
    pub fn new(tx: mpsc::Sender<WsMsg>, served_root: impl Into<PathBuf>) -> Self {
        Self {
            tx,
            served_root: served_root.into(),
        }
    }

    /// Push written assets. Stylesheets are injected; a written script
    /// makes clients reload. Other files are ignored.
    pub async fn push_assets(&self, written: &[PathBuf]) {
        for path in written {
            let Some(url) = url_path(&self.served_root, path) else {
                continue;
            };
            let msg = match path.extension().and_then(|e| e.to_str()) {
                Some("css") => WsMsg::Css(url),
                Some("js") => WsMsg::Js(url),
                _ => continue,
            };
            self.send(msg).await;
        }
    }

    pub async fn full_reload(&self, reason: impl Into<String>) {
        self.send(WsMsg::Reload {
            reason: reason.into(),
        })
        .await;
    }

    pub async fn error(&self, path: impl Into<String>, error: impl Into<String>) {
        self.send(WsMsg::Error {
            path: path.into(),
            error: error.into(),
        })
        .await;
    }

    pub async fn clear_error(&self) {
        self.send(WsMsg::ClearError).await;
    }

    pub async fn shutdown(&self) {
        self.send(WsMsg::Shutdown).await;
    }

    async fn send(&self, msg: WsMsg) {
        if self.tx.send(msg).await.is_err() {
            crate::debug!("reload"; "ws actor stopped, dropping message");
        }
    }
}

/// URL path of a file under `root`, with forward slashes and a leading `/`.
fn url_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(format!("/{}", parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_path() {
        let root = Path::new("/site/tmp");
        assert_eq!(
            url_path(root, Path::new("/site/tmp/css/style.css")).as_deref(),
            Some("/css/style.css")
        );
        assert_eq!(url_path(root, Path::new("/elsewhere/a.css")), None);
    }

    #[tokio::test]
    async fn test_push_assets_maps_kinds() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = ReloadHandle::new(tx, "/site/tmp");

        handle
            .push_assets(&[
                PathBuf::from("/site/tmp/css/style.css"),
                PathBuf::from("/site/tmp/js/main.js"),
                PathBuf::from("/site/tmp/img/logo.png"),
            ])
            .await;
        handle.clear_error().await;
        drop(handle);

        let mut got = Vec::new();
        while let Some(msg) = rx.recv().await {
            got.push(match msg {
                WsMsg::Css(url) => format!("css {url}"),
                WsMsg::Js(url) => format!("js {url}"),
                WsMsg::ClearError => "clear".to_string(),
                _ => "other".to_string(),
            });
        }
        assert_eq!(got, vec!["css /css/style.css", "js /js/main.js", "clear"]);
    }

    #[tokio::test]
    async fn test_send_after_actor_gone_is_silent() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ReloadHandle::new(tx, "/tmp");
        handle.full_reload("x").await;
    }
}
