//! Development server with live reload support.
//!
//! Serves the staging tree over HTTP. With watching enabled, a WebSocket
//! acceptor is bound next to it and every HTML response carries the
//! live-reload client.

mod content;
mod lifecycle;
mod path;
mod response;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;
use crate::stage::StageContext;
use crate::{debug, log};

/// Worker threads answering HTTP requests
const REQUEST_THREADS: usize = 4;

/// WebSocket port clients connect to; 0 while live reload is off.
static WS_PORT: AtomicU16 = AtomicU16::new(0);

fn set_ws_port(port: u16) {
    WS_PORT.store(port, Ordering::Relaxed);
}

fn ws_port() -> Option<u16> {
    match WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    serve_root: PathBuf,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server on the configured interface, retrying the next
/// ports when the configured one is taken.
pub fn bind_server(ctx: &StageContext) -> Result<BoundServer> {
    let serve = &ctx.config.serve;
    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        serve_root: ctx.layout.staging(),
        shutdown_rx,
    })
}

impl BoundServer {
    /// Serve without watching (blocking until Ctrl+C).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server, &self.serve_root)
    }

    /// Serve, run the initial `copy`, and react to source changes until
    /// Ctrl+C (blocking).
    pub fn run_with_watch(self, ctx: Arc<StageContext>) -> Result<()> {
        let serve = &ctx.config.serve;
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(lifecycle::CHANNEL_BUFFER);

        let port = crate::reload::server::start_ws_server(serve.interface, serve.ws_port, ws_tx.clone())
            .context("live reload server failed to start")?;
        if port != serve.ws_port {
            log!("reload"; "port {} in use, using {} instead", serve.ws_port, port);
        }
        debug!("reload"; "ws://{}:{}", serve.interface, port);
        set_ws_port(port);

        let actors = lifecycle::spawn_actors(ctx, ws_tx, ws_rx, self.shutdown_rx.clone());
        let served = run_request_loop(&self.server, &self.serve_root);
        lifecycle::wait_for_shutdown(actors);
        served
    }
}

fn run_request_loop(server: &Server, serve_root: &Path) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let root = serve_root.to_path_buf();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = ws_port();
    if let Some(port) = ws_port
        && path::strip_query(request.url()) == crate::embed::serve::HOTRELOAD_URL
    {
        return response::respond_hotreload_js(request, port);
    }

    match path::resolve_path(request.url(), serve_root) {
        Some(file) => response::respond_file(request, &file, ws_port),
        None => response::respond_not_found(request, serve_root, ws_port),
    }
}
