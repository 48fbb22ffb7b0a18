use crate::api::{create_router, AppState};
use crate::config::Config;
use gitlane_core::Registry;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct GitlaneServer {
    state: AppState,
}

impl GitlaneServer {
    pub fn new(config: &Config) -> Self {
        Self::with_registry(config.build_registry(), config)
    }

    pub fn with_registry(registry: Registry, config: &Config) -> Self {
        Self {
            state: AppState::new(registry, config.layout),
        }
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let app = create_router(self.state.clone());

        let active = self
            .state
            .registry
            .lock()
            .map(|registry| registry.active_name().to_string())
            .unwrap_or_default();

        info!("Server listening on {}", addr);
        info!("Active repository: {}", active);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn registry(&self) -> Arc<Mutex<Registry>> {
        Arc::clone(&self.state.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = GitlaneServer::new(&Config::default());
        let registry = server.registry();
        let registry = registry.lock().unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_name(), "my-project");
    }

    #[tokio::test]
    async fn test_serve_on_ephemeral_port() {
        let server = GitlaneServer::new(&Config::default());
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let handle = tokio::spawn(server.serve(addr));
        tokio::task::yield_now().await;

        assert!(!handle.is_finished());
        handle.abort();
    }
}
