use std::{
    future::Future,
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};

use hyper_util::rt::{TokioExecutor, TokioIo};
use quecho_config::Server;
use tokio::net::TcpListener;

use crate::core::error::QuechoError;
use crate::core::http::HttpMethod;
use crate::core::router::{Handler, Routes};
use crate::core::service::QuechoService;

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// An HTTP server and the route table it owns.
pub struct Quecho {
    routes: Routes,
}

impl Quecho {
    pub fn new() -> Self {
        Self {
            routes: Routes::new(),
        }
    }

    pub fn add_route(&mut self, method: HttpMethod, path: &str, handler: Handler) -> Result<(), QuechoError> {
        self.routes.add(method, path, Arc::new(handler))
    }

    /// Registers `handler` for every HTTP method on `path`.
    pub fn add_any_route(&mut self, path: &str, handler: Handler) -> Result<(), QuechoError> {
        self.routes.add_any(path, Arc::new(handler))
    }

    /// Handler for requests no route matches. Without one they get a 404.
    pub fn set_fallback(&mut self, handler: Handler) {
        self.routes.set_fallback(Arc::new(handler));
    }

    pub fn into_service(self) -> QuechoService {
        QuechoService::new(Arc::new(self.routes))
    }

    /// Binds `ip:port` from the config and serves until the process exits.
    pub async fn run(self, config: &Server) -> Result<(), QuechoError> {
        let addr: SocketAddr = format!("{}:{}", config.ip, config.port)
            .parse()
            .map_err(|e| QuechoError::internal_server_error(format!("Invalid listen address {}:{}: {e}", config.ip, config.port)))?;
        let listener = TcpListener::bind(addr).await.inspect_err(|e| {
            quecho_log::error!("Failed to bind to address {addr}: {e}");
        })?;

        println!("Listening on localhost:{}", config.port);
        quecho_log::info!("Server listening on {addr}");

        // No shutdown trigger is wired up yet; see `serve`.
        self.serve(listener, std::future::pending()).await;
        Ok(())
    }

    /// Accepts connections on `listener` until `shutdown` resolves. Each
    /// connection gets its own task; connections already accepted are left to
    /// finish on their own.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let service = self.into_service();
        tokio::pin!(shutdown);

        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = &mut shutdown => {
                    quecho_log::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok(s) => s,
                    Err(e) => {
                        quecho_log::error!("Failed to accept connection: {e}");
                        // Accept errors such as EMFILE persist until a descriptor frees up.
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            let io = TokioIo::new(stream);
            let service = service.clone();

            tokio::task::spawn(async move {
                let hyper_service = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
                if let Err(err) = hyper_service.serve_connection_with_upgrades(io, service).await {
                    quecho_log::error!("Error serving connection from {peer_addr}: {err:?}");
                }
            });
        }
    }
}

impl Default for Quecho {
    fn default() -> Self {
        Self::new()
    }
}
