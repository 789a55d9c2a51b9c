//! Development server with live reload support.
//!
//! Serves the output directory over HTTP while the actor system rebuilds on
//! change and pushes `reload` to every connected page.

mod browser;
mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    actor::actual_ws_port,
    config::{SiteConfig, cfg},
    log,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Worker threads answering HTTP requests.
const REQUEST_THREADS: usize = 4;

/// Serve the site until Ctrl+C.
pub fn serve_site(config: Arc<SiteConfig>) -> Result<()> {
    let serve = &config.serve;
    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    let (ready_tx, ready_rx) = channel::bounded::<()>(1);
    let actor_handle = lifecycle::spawn_actors(Arc::clone(&config), shutdown_rx, ready_tx);

    // Initial build finishes before the first request is answered
    let _ = ready_rx.recv();

    let url = format!("http://{addr}");
    log!("serve"; "{}", url);
    if serve.open {
        browser::open(&url);
    }

    run_request_loop(&server)?;
    lifecycle::wait_for_shutdown(actor_handle);
    Ok(())
}

fn run_request_loop(server: &Server) -> Result<()> {
    let config = cfg();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = actual_ws_port();
    match path::resolve_path(request.url(), &config.build.output) {
        Some(path) => response::respond_file(request, &path, ws_port),
        None => response::respond_not_found(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    #[test]
    fn test_request_loop_answers_until_unblocked() {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let port = server.server_addr().to_ip().unwrap().port();
        let loop_server = Arc::clone(&server);
        let handle = std::thread::spawn(move || run_request_loop(&loop_server));

        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        stream
            .write_all(b"GET /no-such-page HTTP/1.0\r\nHost: localhost\r\n\r\n")
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1."));

        server.unblock();
        handle.join().unwrap().unwrap();
    }
}
