use hostwatch_core::registry::DEFAULT_HOSTNAME_THRESHOLD;
use hostwatch_core::scheduler::DEFAULT_SAMPLE_INTERVAL;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. `DATABASE_URL`
/// is read separately by the binary since tests supply their own pool.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Maximum pooled database connections (default: `10`).
    pub database_max_connections: u32,
    /// Threshold used when a caller supplies none or an unusable one.
    pub default_threshold: i64,
    /// Seconds between active-host samples (default: `2`).
    pub scheduler_interval_secs: u64,
    /// Start the sampling job at boot (default: `false`).
    pub scheduler_autostart: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                       |
    /// | `DATABASE_MAX_CONNECTIONS`   | `10`                       |
    /// | `DEFAULT_HOSTNAME_THRESHOLD` | `1`                        |
    /// | `SCHEDULER_INTERVAL_SECS`    | `2`                        |
    /// | `SCHEDULER_AUTOSTART`        | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let default_threshold: i64 = std::env::var("DEFAULT_HOSTNAME_THRESHOLD")
            .map(|raw| {
                raw.parse()
                    .expect("DEFAULT_HOSTNAME_THRESHOLD must be a valid i64")
            })
            .unwrap_or(DEFAULT_HOSTNAME_THRESHOLD);
        assert!(
            default_threshold >= 0,
            "DEFAULT_HOSTNAME_THRESHOLD must not be negative"
        );

        let scheduler_interval_secs: u64 = std::env::var("SCHEDULER_INTERVAL_SECS")
            .map(|raw| {
                raw.parse()
                    .expect("SCHEDULER_INTERVAL_SECS must be a valid u64")
            })
            .unwrap_or(DEFAULT_SAMPLE_INTERVAL.as_secs());

        let scheduler_autostart: bool = std::env::var("SCHEDULER_AUTOSTART")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("SCHEDULER_AUTOSTART must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_max_connections,
            default_threshold,
            scheduler_interval_secs,
            scheduler_autostart,
        }
    }
}
