//! SIRENE activity statistics API server
//!
//! JSON-LD/Hydra statistics over activity codes, protected by OAuth2 introspection.

use clap::Parser;
use sirene_stats::auth::IntrospectionConfig;
use sirene_stats::source::{SourceConfig, SourceKind};
use sirene_stats::{StatsConfig, StatsServer};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// SIRENE activity statistics API
#[derive(Parser, Debug)]
#[command(name = "sirene-stats")]
#[command(version)]
#[command(about = "JSON-LD statistics API over SIRENE activity codes", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3002)]
    port: u16,

    /// Bind to all interfaces (0.0.0.0), overriding --host
    #[arg(long)]
    public: bool,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// OAuth2 token introspection endpoint
    #[arg(
        long,
        env = "OAUTH2_INTROSPECT_URL",
        default_value = "http://oauth2-server:4000/oauth/introspect"
    )]
    introspect_url: String,

    /// Client id presented to the introspection endpoint
    #[arg(long, env = "OAUTH2_CLIENT_ID", default_value = "spark-api-client")]
    client_id: String,

    /// Client secret presented to the introspection endpoint
    #[arg(
        long,
        env = "OAUTH2_CLIENT_SECRET",
        default_value = "spark_api_secret",
        hide_env_values = true
    )]
    client_secret: String,

    /// Introspection timeout in seconds
    #[arg(long, env = "OAUTH2_TIMEOUT_SECS", default_value_t = 10)]
    introspect_timeout: u64,

    /// Data source: spark or placeholder
    #[arg(long, env = "STATS_SOURCE", default_value = "spark")]
    source: SourceKind,

    /// Spark Connect host
    #[arg(long, env = "SPARK_CONNECT_HOST", default_value = "spark")]
    spark_host: String,

    /// Spark Connect port
    #[arg(long, env = "SPARK_CONNECT_PORT", default_value_t = 15002)]
    spark_port: u16,

    /// Spark Connect connection timeout in seconds
    #[arg(long, env = "SPARK_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    spark_timeout: u64,

    /// Snapshot cache time-to-live in seconds
    #[arg(long, env = "STATS_CACHE_TTL_SECS", default_value_t = 300)]
    cache_ttl: u64,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> StatsConfig {
        let host = if self.public {
            "0.0.0.0".to_string()
        } else {
            self.host
        };

        StatsConfig {
            host,
            port: self.port,
            cors_enabled: !self.no_cors,
            tracing: true,
            introspection: IntrospectionConfig {
                url: self.introspect_url,
                client_id: self.client_id,
                client_secret: self.client_secret,
                timeout: Duration::from_secs(self.introspect_timeout),
            },
            source: SourceConfig {
                kind: self.source,
                spark_host: self.spark_host,
                spark_port: self.spark_port,
                connect_timeout: Duration::from_secs(self.spark_timeout),
                cache_ttl: Duration::from_secs(self.cache_ttl),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = match args.verbose {
        0 => "sirene_stats=info,tower_http=debug",
        1 => "sirene_stats=debug,tower_http=debug",
        _ => "sirene_stats=trace,tower_http=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = StatsServer::new(args.into_config())?;

    // Set up graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    server.run_with_shutdown(shutdown_signal).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_listen_on_all_interfaces() {
        let config = Args::try_parse_from(["sirene-stats"]).unwrap().into_config();
        if std::env::var_os("HOST").is_none() {
            assert_eq!(config.host, "0.0.0.0");
        }
        if std::env::var_os("PORT").is_none() {
            assert_eq!(config.port, 3002);
        }
    }

    #[test]
    fn test_flags_map_into_config() {
        let config = Args::try_parse_from([
            "sirene-stats",
            "--host",
            "127.0.0.1",
            "--source",
            "placeholder",
            "--cache-ttl",
            "60",
            "--no-cors",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.source.kind, SourceKind::Placeholder);
        assert_eq!(config.source.cache_ttl, Duration::from_secs(60));
        assert!(!config.cors_enabled);

        let config = Args::try_parse_from(["sirene-stats", "--host", "127.0.0.1", "--public"])
            .unwrap()
            .into_config();
        assert_eq!(config.host, "0.0.0.0");
    }
}
