//! Server Module
//!
//! HTTP server exposing radius search and recommendations over JSON.

mod config;
mod handler;
mod response;

pub use config::Config;
pub use handler::{
    router, AppState, HealthReport, RecommendQuery, SearchQuery, RECOMMEND_ROUTE, SEARCH_ROUTE,
};
pub use response::{json_body, to_body};

use crate::cache::{CacheCleaner, ResponseCache};
use crate::data::DataContext;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

/// REALTY HTTP server
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Create a server over already-loaded data
    pub fn new(config: Config, data: Arc<DataContext>) -> Result<Self> {
        let cache = config.cache_enabled.then(|| {
            ResponseCache::new(Duration::from_secs(config.cache_ttl_secs))
                .with_max_entries(config.cache_max_entries)
        });
        let state = AppState::new(data, cache)?;
        Ok(Self { config, state })
    }

    /// Run until interrupted
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;

        info!("REALTY server listening on {}", addr);

        if let Some(cache) = self.state.cache() {
            CacheCleaner::spawn(cache.clone(), self.config.cache_cleaner_interval);
        }

        let metrics = self.state.metrics().clone();
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped. {}", metrics.summary());
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LocationDistanceTable, SimilarityMatrix};

    fn data() -> Arc<DataContext> {
        let table =
            LocationDistanceTable::new(vec!["A".into()], vec!["A".into()], vec![vec![Some(0.0)]])
                .unwrap();
        let m = SimilarityMatrix::from_rows("m", vec![vec![Some(1.0)]]).unwrap();
        Arc::new(DataContext::new(table, [m.clone(), m.clone(), m]).unwrap())
    }

    #[test]
    fn test_cache_follows_config() {
        let server = Server::new(Config::default(), data()).unwrap();
        assert!(server.state().cache().is_some());

        let server = Server::new(Config::default().with_cache_max_entries(7), data()).unwrap();
        assert_eq!(server.state().cache().unwrap().max_entries(), 7);

        let server = Server::new(Config::default().with_cache_ttl(0), data()).unwrap();
        assert!(server.state().cache().is_none());
    }
}
