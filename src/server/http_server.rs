//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::signal;
use log::{debug, info, warn, error};

use crate::parser::{HeaderName, parse_request};
use crate::server::config::ServerConfig;
use crate::server::encoding::ContentEncoding;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::router::{Resolution, Router};

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes. Never mutated once the server exists.
    pub router: Arc<Router>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for (pattern, methods) in self.router.routes() {
            let methods = methods.iter()
                .map(|m| m.to_string())
                .collect::<Vec<String>>()
                .join(", ");
            info!("  {methods} {pattern}");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Spawn the task that serves one accepted connection.
    fn handle_new_connection(
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        router: Arc<Router>,
        read_buffer_size: usize,
        tasks: &mut JoinSet<()>,
    ) {
        tasks.spawn(async move {
            debug!("accepted connection from {addr}");
            match Self::handle_connection(&mut socket, &router, read_buffer_size).await {
                Ok(()) => {}
                Err(Error::ParseError(e)) => warn!("rejected request from {addr}: {e}"),
                Err(e) => error!("closing connection from {addr}: {e}"),
            }
        });
    }

    /// Handle connection errors.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");

        // Wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        // Wait for all tasks to complete (with timeout)
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();

        let listener = self.setup_listener().await?;

        // Create a channel for shutdown signaling
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        // Use JoinSet to keep track of all spawned tasks
        let mut tasks = JoinSet::new();

        Self::setup_ctrl_c_handler(shutdown_tx.clone(), &mut tasks);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                self.router.clone(),
                                self.config.read_buffer_size,
                                &mut tasks,
                            );
                        },
                        Err(e) => Self::handle_accept_error(e).await,
                    }
                }
            }

            // Reap finished connections so the set does not grow unbounded
            while let Some(res) = tasks.try_join_next() {
                if let Err(e) = res {
                    error!("Connection task failed: {e}");
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Handle a single connection: one read, one response, then close.
    ///
    /// Routing misses and handler failures are answered and count as success.
    /// A request that cannot be parsed is answered with 400 and returned as
    /// [`Error::ParseError`]; transport failures are returned as
    /// [`Error::IoError`].
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: &Router,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let mut buf = vec![0; read_buffer_size];

        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(()); // Connection closed
        }

        let request = match parse_request(&buf[..n]) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::BadRequest)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes()).await?;
                socket.shutdown().await?;
                return Err(Error::ParseError(e));
            }
        };
        info!("request: {method} {target}", method = request.method, target = request.target);

        let response = match router.resolve(request.path(), request.method) {
            Resolution::Found(route) => {
                let encoding = if route.compress {
                    ContentEncoding::negotiate(&request)
                } else {
                    None
                };

                match (route.handler)(request).await {
                    Ok(mut resp) => {
                        // Only after the handler has set the final body
                        if let Some(encoding) = encoding {
                            encoding.apply(&mut resp);
                        }
                        resp
                    }
                    Err(e) => {
                        error!("handler failed: {e}");
                        HttpResponse::new(StatusCode::InternalServerError)
                            .with_body_bytes(Vec::new())
                    }
                }
            }
            Resolution::MethodNotAllowed(allowed) => {
                let allowed = allowed.iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<&str>>()
                    .join(", ");

                HttpResponse::new(StatusCode::MethodNotAllowed)
                    .with_header(HeaderName::Allow, allowed)
                    .with_body_bytes(Vec::new())
            }
            Resolution::NotFound => {
                HttpResponse::new(StatusCode::NotFound)
                    .with_body_bytes(Vec::new())
            }
        };

        socket.write_all(&response.to_bytes()).await?;
        socket.shutdown().await?;
        info!(
            "connection closed [{code} {reason}]",
            code = response.status.as_u16(),
            reason = response.status.reason_phrase()
        );

        Ok(())
    }
}
