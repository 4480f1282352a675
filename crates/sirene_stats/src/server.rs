//! The statistics API server.

use crate::auth::IntrospectionConfig;
use crate::error::{Error, Result};
use crate::rest;
use crate::source::SourceConfig;
use crate::state::AppState;

use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Configuration for the `StatsServer`.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// The host address to bind the server to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// If `true`, Cross-Origin Resource Sharing (CORS) headers will be enabled.
    pub cors_enabled: bool,
    /// If `true`, HTTP request tracing will be enabled.
    pub tracing: bool,
    /// Token introspection settings.
    pub introspection: IntrospectionConfig,
    /// Data source and cache settings.
    pub source: SourceConfig,
}

impl Default for StatsConfig {
    /// Returns a default configuration suitable for local development.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3002,
            cors_enabled: true,
            tracing: true,
            introspection: IntrospectionConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl StatsConfig {
    /// Returns a configuration that binds to all network interfaces.
    pub fn public() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            ..Default::default()
        }
    }

    /// Sets the port for the server to listen on.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the host address for the server.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the token introspection settings.
    pub fn with_introspection(mut self, introspection: IntrospectionConfig) -> Self {
        self.introspection = introspection;
        self
    }

    /// Sets the data source settings.
    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }

    /// The socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))
    }
}

/// The statistics API server.
pub struct StatsServer {
    config: StatsConfig,
    state: AppState,
}

impl StatsServer {
    /// Creates a new `StatsServer`, wiring the state from `config`.
    pub fn new(config: StatsConfig) -> Result<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    /// Creates a new `StatsServer` with a pre-existing `AppState`.
    pub fn with_state(config: StatsConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Returns a reference to the shared `AppState`.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the `axum` router, combining all API routes and middleware.
    pub fn build_router(&self) -> Router {
        let app = rest::router(&self.state).with_state(self.state.clone());

        // Layers are applied in reverse order of definition.

        let app = if self.config.cors_enabled {
            app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            app
        };

        if self.config.tracing {
            app.layer(TraceLayer::new_for_http())
        } else {
            app
        }
    }

    /// Runs the server indefinitely.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with a graceful shutdown signal.
    ///
    /// The server will run until the `shutdown_signal` future completes.
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr()?;
        let router = self.build_router();

        info!("Starting statistics API server on http://{}", addr);
        info!(
            "Introspection endpoint: {}",
            self.config.introspection.url
        );
        info!(
            "Data source: {:?} (cache TTL {:?})",
            self.config.source.kind, self.config.source.cache_ttl
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        info!("Statistics API server stopped");
        Ok(())
    }
}
