use std::net::SocketAddr;

use log::info;
use warp::Filter;

use super::routes::api;
use super::types::Services;
use crate::error_handling::types::WebError;

/// Web server for the HTTP API and dashboard
pub struct WebServer {
    services: Services,
}

impl WebServer {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Serve until Ctrl-C is received.
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        let routes = api(self.services.clone()).with(warp::log("camara::http"));

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .map_err(|e| WebError::BindFailed(format!("{}: {}", addr, e)))?;

        info!("HTTP server listening on http://{}", bound);
        server.await;
        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Storage};
    use std::net::TcpListener;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_taken_port_is_bind_failed() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let server = WebServer::new(Services::new(storage));

        let err = server.start(addr).await.unwrap_err();
        assert!(matches!(err, WebError::BindFailed(_)));
    }
}
