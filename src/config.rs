use clap::Parser;
use serde::Deserialize;

use crate::services::advisor::{ClassifierThresholds, ScoringWeights};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub warehouse: WarehouseConfig,
    pub history: QueryHistoryConfig,
    pub analyzer: AnalyzerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

/// Warehouse connection settings (MySQL wire protocol)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Connection pool size
    pub pool_max: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9030,
            user: "root".to_string(),
            password: String::new(),
            pool_max: 8,
        }
    }
}

/// Query history table location (the upstream telemetry source)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryHistoryConfig {
    /// History database name (default: system)
    pub database: String,
    /// History table name (default: query_history)
    pub table: String,
    /// Optional billing table (database.table) joined for cost-aware ranking.
    /// When absent, priority mode falls back to plain badness ranking.
    pub billing_table: Option<String>,
}

impl Default for QueryHistoryConfig {
    fn default() -> Self {
        Self { database: "system".to_string(), table: "query_history".to_string(), billing_table: None }
    }
}

impl QueryHistoryConfig {
    /// Get the fully qualified table name (database.table)
    pub fn full_table_name(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }
}

/// Analyzer tunables. Scoring weights and classifier thresholds default to
/// the values documented in the advisor module and can be overridden per
/// deployment from the `[analyzer.weights]` / `[analyzer.thresholds]` tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Noise floor: queries with execution_duration_ms at or below this value
    /// are never analyzed (default: 5000)
    pub min_execution_ms: i64,
    /// Minimum badness score a query must exceed to be surfaced (default: 10.0)
    pub min_score: f64,
    /// Default result limit when a request doesn't supply one (default: 10)
    pub default_limit: usize,
    /// Hard cap on the number of history rows fetched per batch (default: 5000)
    pub max_fetch_rows: usize,
    pub weights: ScoringWeights,
    pub thresholds: ClassifierThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_execution_ms: 5_000,
            min_score: 10.0,
            default_limit: 10,
            max_fetch_rows: 5_000,
            weights: ScoringWeights::default(),
            thresholds: ClassifierThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,querylens=debug".to_string(), file: None }
    }
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone)]
#[command(name = "querylens")]
#[command(version, about = "QueryLens - Warehouse Query Performance Advisor")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Server host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub server_host: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Warehouse host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub warehouse_host: Option<String>,

    /// Warehouse MySQL-protocol port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub warehouse_port: Option<u16>,

    /// Warehouse user (overrides config file)
    #[arg(long, value_name = "USER")]
    pub warehouse_user: Option<String>,

    /// Warehouse password (overrides config file)
    #[arg(long, value_name = "PASSWORD")]
    pub warehouse_password: Option<String>,

    /// Query history database name (overrides config file, default: system)
    #[arg(long, value_name = "DATABASE")]
    pub history_database: Option<String>,

    /// Query history table name (overrides config file, default: query_history)
    #[arg(long, value_name = "TABLE")]
    pub history_table: Option<String>,

    /// Analyzer noise floor in milliseconds (overrides config file)
    #[arg(long, value_name = "MS")]
    pub min_execution_ms: Option<i64>,

    /// Minimum badness score to surface (overrides config file)
    #[arg(long, value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// Logging level (overrides config file, e.g., "info,querylens=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load() -> Result<Self, anyhow::Error> {
        let cli_args = CommandLineArgs::parse();
        Self::load_with_args(cli_args)
    }

    /// Load with explicit arguments (used in tests)
    pub fn load_with_args(cli_args: CommandLineArgs) -> Result<Self, anyhow::Error> {
        // 1. Load from config file (use CLI --config if provided, otherwise find default)
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Override with command line arguments (highest priority)
        config.apply_cli_overrides(&cli_args);

        // 4. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_WAREHOUSE_HOST / APP_WAREHOUSE_PORT: Warehouse endpoint
    /// - APP_WAREHOUSE_USER / APP_WAREHOUSE_PASSWORD: Warehouse credentials
    /// - APP_HISTORY_DATABASE / APP_HISTORY_TABLE: Query history table location
    /// - APP_MIN_EXECUTION_MS: Analyzer noise floor in milliseconds
    /// - APP_MIN_SCORE: Minimum badness score to surface
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,querylens=debug")
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Ok(host) = std::env::var("APP_WAREHOUSE_HOST") {
            self.warehouse.host = host;
            tracing::info!("Override warehouse.host from env: {}", self.warehouse.host);
        }

        if let Ok(port) = std::env::var("APP_WAREHOUSE_PORT")
            && let Ok(port) = port.parse()
        {
            self.warehouse.port = port;
            tracing::info!("Override warehouse.port from env: {}", self.warehouse.port);
        }

        if let Ok(user) = std::env::var("APP_WAREHOUSE_USER") {
            self.warehouse.user = user;
            tracing::info!("Override warehouse.user from env");
        }

        if let Ok(password) = std::env::var("APP_WAREHOUSE_PASSWORD") {
            self.warehouse.password = password;
            tracing::info!("Override warehouse.password from env");
        }

        if let Ok(db) = std::env::var("APP_HISTORY_DATABASE") {
            self.history.database = db;
            tracing::info!("Override history.database from env: {}", self.history.database);
        }

        if let Ok(table) = std::env::var("APP_HISTORY_TABLE") {
            self.history.table = table;
            tracing::info!("Override history.table from env: {}", self.history.table);
        }

        if let Ok(floor) = std::env::var("APP_MIN_EXECUTION_MS")
            && let Ok(floor) = floor.parse()
        {
            self.analyzer.min_execution_ms = floor;
            tracing::info!(
                "Override analyzer.min_execution_ms from env: {}",
                self.analyzer.min_execution_ms
            );
        }

        if let Ok(score) = std::env::var("APP_MIN_SCORE")
            && let Ok(score) = score.parse()
        {
            self.analyzer.min_score = score;
            tracing::info!("Override analyzer.min_score from env: {}", self.analyzer.min_score);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(host) = &args.server_host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.server_port {
            self.server.port = port;
        }
        if let Some(host) = &args.warehouse_host {
            self.warehouse.host = host.clone();
        }
        if let Some(port) = args.warehouse_port {
            self.warehouse.port = port;
        }
        if let Some(user) = &args.warehouse_user {
            self.warehouse.user = user.clone();
        }
        if let Some(password) = &args.warehouse_password {
            self.warehouse.password = password.clone();
        }
        if let Some(db) = &args.history_database {
            self.history.database = db.clone();
        }
        if let Some(table) = &args.history_table {
            self.history.table = table.clone();
        }
        if let Some(floor) = args.min_execution_ms {
            self.analyzer.min_execution_ms = floor;
        }
        if let Some(score) = args.min_score {
            self.analyzer.min_score = score;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Search for a config file in the conventional locations
    fn find_config_file() -> Option<String> {
        let candidates = ["conf/config.toml", "config.toml", "/etc/querylens/config.toml"];
        candidates
            .iter()
            .find(|p| Path::new(p).exists())
            .map(|p| p.to_string())
    }

    /// Load configuration from a TOML file
    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path, e))?;
        tracing::info!("Configuration loaded from {}", path);
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }
        if self.warehouse.host.is_empty() {
            anyhow::bail!("warehouse.host must not be empty");
        }
        if self.history.database.is_empty() || self.history.table.is_empty() {
            anyhow::bail!("history.database and history.table must not be empty");
        }
        if self.analyzer.min_execution_ms < 0 {
            anyhow::bail!("analyzer.min_execution_ms must be non-negative");
        }
        if self.analyzer.min_score < 0.0 {
            anyhow::bail!("analyzer.min_score must be non-negative");
        }
        if self.analyzer.max_fetch_rows == 0 {
            anyhow::bail!("analyzer.max_fetch_rows must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.analyzer.min_execution_ms, 5_000);
        assert_eq!(config.analyzer.min_score, 10.0);
        assert_eq!(config.history.full_table_name(), "system.query_history");
    }

    #[test]
    fn test_from_toml_partial() {
        let toml_str = r#"
            [server]
            port = 9090

            [analyzer]
            min_execution_ms = 0
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.analyzer.min_execution_ms, 0);
        // Untouched sections keep defaults
        assert_eq!(config.analyzer.min_score, 10.0);
        assert_eq!(config.history.database, "system");
    }

    #[test]
    fn test_from_toml_nested_tunables() {
        let toml_str = r#"
            [analyzer.weights]
            spill_base = 80.0

            [analyzer.thresholds]
            slow_execution_ms = 600000
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.analyzer.weights.spill_base, 80.0);
        assert_eq!(config.analyzer.thresholds.slow_execution_ms, 600_000);
        // Sibling fields inside an overridden table keep defaults
        assert_eq!(config.analyzer.weights.duration_base, 30.0);
        assert_eq!(config.analyzer.thresholds.cache_hit_floor, 0.3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.analyzer.min_execution_ms = -1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.warehouse.host.clear();
        assert!(config.validate().is_err());
    }
}
