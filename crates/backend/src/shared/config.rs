use contracts::system::users::UserRole;
use serde::Deserialize;

use crate::shared::time_range::{BusinessTimezone, DEFAULT_OFFSET_HOURS};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Pharmacy REST API the dashboard reads from.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_timezone_offset_hours")]
    pub timezone_offset_hours: i32,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
    /// Role used by the startup cycle and the refresh timer until a client triggers one.
    #[serde(default)]
    pub default_role: UserRole,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            timezone_offset_hours: default_timezone_offset_hours(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
            default_role: UserRole::default(),
        }
    }
}

impl DashboardConfig {
    pub fn timezone(&self) -> anyhow::Result<BusinessTimezone> {
        BusinessTimezone::from_offset_hours(self.timezone_offset_hours)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_timezone_offset_hours() -> i32 {
    DEFAULT_OFFSET_HOURS
}

fn default_refresh_interval_seconds() -> u64 {
    300
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[api]
base_url = "http://localhost:8000/api"
timeout_seconds = 30

[dashboard]
timezone_offset_hours = 3
refresh_interval_seconds = 300
default_role = "staff"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> anyhow::Result<()> {
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if config.api.timeout_seconds == 0 {
        anyhow::bail!("api.timeout_seconds must be greater than 0");
    }
    if config.dashboard.refresh_interval_seconds == 0 {
        anyhow::bail!("dashboard.refresh_interval_seconds must be greater than 0");
    }
    config.dashboard.timezone()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(config.api.token.is_none());
        assert_eq!(config.dashboard.timezone_offset_hours, 3);
        assert_eq!(config.dashboard.default_role, UserRole::Staff);
    }

    #[test]
    fn test_dashboard_section_is_optional() {
        let config = parse_config(
            r#"
            [server]
            port = 8080

            [api]
            base_url = "https://pharmacy.example/api"
            token = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.dashboard.refresh_interval_seconds, 300);
    }

    #[test]
    fn test_manager_role() {
        let config = parse_config(
            r#"
            [server]
            [api]
            base_url = "http://localhost/api"
            [dashboard]
            default_role = "manager"
            "#,
        )
        .unwrap();
        assert!(config.dashboard.default_role.is_privileged());
    }

    #[test]
    fn test_rejects_zero_refresh_interval() {
        let err = parse_config(
            r#"
            [server]
            [api]
            base_url = "http://localhost/api"
            [dashboard]
            refresh_interval_seconds = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("refresh_interval_seconds"));
    }

    #[test]
    fn test_rejects_out_of_range_offset() {
        let result = parse_config(
            r#"
            [server]
            [api]
            base_url = "http://localhost/api"
            [dashboard]
            timezone_offset_hours = 30
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_base_url() {
        let result = parse_config(
            r#"
            [server]
            [api]
            base_url = "  "
            "#,
        );
        assert!(result.is_err());
    }
}
