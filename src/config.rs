use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cluster: ClusterConfig,
    pub logging: LoggingConfig,
    pub ui_state: UiStateConfig,
    pub overview: OverviewPageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Endpoints of the monitored cluster.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// PD client URL, e.g. http://127.0.0.1:2379
    pub pd_endpoint: String,
    /// Prometheus base URL, e.g. http://127.0.0.1:9090
    pub prometheus_endpoint: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Where persisted widget state (table selections) lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiStateConfig {
    pub file: String,
}

/// Operator-tunable knobs of the Overview page configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverviewPageConfig {
    /// Whether the UI may point metrics queries at a custom Prometheus address.
    pub promql_addr_configurable: bool,
    pub show_view_more_metrics: bool,
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone)]
#[command(name = "meridian")]
#[command(version, about = "Meridian - TiDB cluster console backend")]
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

    /// PD endpoint URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub pd_endpoint: Option<String>,

    /// Prometheus endpoint URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub prometheus_endpoint: Option<String>,

    /// Logging level (overrides config file, e.g., "info,tidb_console=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// UI state file path (overrides config file)
    #[arg(long, value_name = "PATH")]
    pub ui_state_file: Option<String>,
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
        Self::load_with_args(&cli_args)
    }

    fn load_with_args(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 12333)
    /// - APP_PD_ENDPOINT: PD client URL
    /// - APP_PROMETHEUS_ENDPOINT: Prometheus base URL
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,tidb_console=debug")
    /// - APP_UI_STATE_FILE: UI state file path
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
                tracing::info!("Override server.port from env: {}", self.server.port);
            }
        }

        if let Ok(endpoint) = std::env::var("APP_PD_ENDPOINT") {
            self.cluster.pd_endpoint = endpoint;
            tracing::info!("Override cluster.pd_endpoint from env: {}", self.cluster.pd_endpoint);
        }

        if let Ok(endpoint) = std::env::var("APP_PROMETHEUS_ENDPOINT") {
            self.cluster.prometheus_endpoint = endpoint;
            tracing::info!(
                "Override cluster.prometheus_endpoint from env: {}",
                self.cluster.prometheus_endpoint
            );
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(file) = std::env::var("APP_UI_STATE_FILE") {
            self.ui_state.file = file;
            tracing::info!("Override ui_state.file from env: {}", self.ui_state.file);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(host) = &args.server_host {
            self.server.host = host.clone();
            tracing::info!("Override server.host from CLI: {}", self.server.host);
        }

        if let Some(port) = args.server_port {
            self.server.port = port;
            tracing::info!("Override server.port from CLI: {}", self.server.port);
        }

        if let Some(endpoint) = &args.pd_endpoint {
            self.cluster.pd_endpoint = endpoint.clone();
            tracing::info!("Override cluster.pd_endpoint from CLI: {}", self.cluster.pd_endpoint);
        }

        if let Some(endpoint) = &args.prometheus_endpoint {
            self.cluster.prometheus_endpoint = endpoint.clone();
            tracing::info!(
                "Override cluster.prometheus_endpoint from CLI: {}",
                self.cluster.prometheus_endpoint
            );
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }

        if let Some(file) = &args.ui_state_file {
            self.ui_state.file = file.clone();
            tracing::info!("Override ui_state.file from CLI: {}", self.ui_state.file);
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.cluster.pd_endpoint.is_empty() {
            anyhow::bail!("PD endpoint cannot be empty");
        }
        if !self.cluster.pd_endpoint.starts_with("http://")
            && !self.cluster.pd_endpoint.starts_with("https://")
        {
            anyhow::bail!("PD endpoint must be an http(s) URL");
        }

        if self.cluster.prometheus_endpoint.is_empty() {
            anyhow::bail!("Prometheus endpoint cannot be empty");
        }

        if self.cluster.request_timeout_secs == 0 {
            anyhow::bail!("cluster.request_timeout_secs must be > 0");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 12333 }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            pd_endpoint: "http://127.0.0.1:2379".to_string(),
            prometheus_endpoint: "http://127.0.0.1:9090".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,tidb_console=debug".to_string(),
            file: Some("logs/meridian.log".to_string()),
        }
    }
}

impl Default for UiStateConfig {
    fn default() -> Self {
        Self { file: "data/ui_state.json".to_string() }
    }
}

impl Default for OverviewPageConfig {
    fn default() -> Self {
        Self { promql_addr_configurable: false, show_view_more_metrics: true }
    }
}
