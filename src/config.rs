use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the trigger relay
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    /// GitHub configuration
    pub github: GitHubConfig,
    /// Inbound HTTP server settings
    pub server: ServerConfig,
    /// Trigger sequence settings
    pub trigger: TriggerSettings,
    /// Device info collection settings
    pub device: DeviceConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// GitHub API token (can be set via env var)
    pub token: Option<String>,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// API base URL, overridable so tests can point at a mock server
    pub api_base: String,
    /// Workflow name the status check filters on
    pub workflow_name: String,
    /// repository_dispatch event type
    pub event_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerSettings {
    /// Delay before re-checking that a dispatched run actually started
    pub confirm_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Collect caller metadata and forward it as dispatch client payload
    pub enabled: bool,
    /// Public IP lookup endpoint
    pub ip_lookup_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig {
                token: None, // Will be read from env var
                owner: "chiang881".to_string(),
                repo: "instaBOT".to_string(),
                api_base: "https://api.github.com".to_string(),
                workflow_name: "Instagram Bot".to_string(),
                event_type: "trigger-bot".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            trigger: TriggerSettings {
                confirm_delay_ms: 2000,
            },
            device: DeviceConfig {
                enabled: true,
                ip_lookup_url: "https://api.ipify.org?format=json".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl TriggerConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (instabot-trigger.toml)
    /// 3. Environment variables (prefixed with INSTABOT_)
    pub fn load() -> Result<Self> {
        Self::load_with_file(Path::new("instabot-trigger.toml"))
    }

    /// Load with an explicit configuration file path (used by tests)
    pub fn load_with_file(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&TriggerConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Override with environment variables. The key separator is "__" so
        // underscored field names survive: INSTABOT_GITHUB__API_BASE maps to
        // github.api_base.
        builder = builder.add_source(
            Environment::with_prefix("INSTABOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut trigger_config: TriggerConfig = config.try_deserialize()?;

        // Special handling for the GitHub token - the two original deployment
        // variants named their secret differently, so both are honored
        if trigger_config.github.token.is_none() {
            if let Ok(token) = std::env::var("HUB_TOKEN") {
                trigger_config.github.token = Some(token);
            } else if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                trigger_config.github.token = Some(token);
            }
        }

        Ok(trigger_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TriggerConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = TriggerConfig::load_env_file();
        TriggerConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TriggerConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Token resolution reads process-wide env vars, so these tests serialize
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_token_env() {
        std::env::remove_var("HUB_TOKEN");
        std::env::remove_var("GITHUB_TOKEN");
    }

    fn clear_instabot_env() {
        let instabot_vars: Vec<String> = std::env::vars()
            .map(|(name, _)| name)
            .filter(|name| name.starts_with("INSTABOT_"))
            .collect();
        for name in instabot_vars {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn defaults_without_file_or_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_token_env();
        clear_instabot_env();

        let config = TriggerConfig::load_with_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.github.owner, "chiang881");
        assert_eq!(config.github.workflow_name, "Instagram Bot");
        assert_eq!(config.github.event_type, "trigger-bot");
        assert_eq!(config.trigger.confirm_delay_ms, 2000);
        assert!(config.device.enabled);
        assert!(config.github.token.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_token_env();
        clear_instabot_env();

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[github]
owner = "someone"
repo = "elsewhere"

[trigger]
confirm_delay_ms = 50
"#
        )
        .unwrap();

        let config = TriggerConfig::load_with_file(file.path()).unwrap();
        assert_eq!(config.github.owner, "someone");
        assert_eq!(config.github.repo, "elsewhere");
        assert_eq!(config.trigger.confirm_delay_ms, 50);
        // Untouched sections keep their defaults
        assert_eq!(config.github.api_base, "https://api.github.com");
    }

    #[test]
    fn env_overrides_underscored_keys() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_token_env();
        clear_instabot_env();
        std::env::set_var("INSTABOT_GITHUB__API_BASE", "http://127.0.0.1:9999");
        std::env::set_var("INSTABOT_TRIGGER__CONFIRM_DELAY_MS", "25");

        let config = TriggerConfig::load_with_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.github.api_base, "http://127.0.0.1:9999");
        assert_eq!(config.trigger.confirm_delay_ms, 25);
        clear_instabot_env();
    }

    #[test]
    fn env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_token_env();
        clear_instabot_env();

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[github]
owner = "file-owner"
workflow_name = "File Workflow"
"#
        )
        .unwrap();

        std::env::set_var("INSTABOT_GITHUB__OWNER", "env-owner");

        let config = TriggerConfig::load_with_file(file.path()).unwrap();
        assert_eq!(config.github.owner, "env-owner");
        // Keys the environment leaves alone still come from the file
        assert_eq!(config.github.workflow_name, "File Workflow");
        clear_instabot_env();
    }

    #[test]
    fn hub_token_beats_github_token() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("HUB_TOKEN", "hub-secret");
        std::env::set_var("GITHUB_TOKEN", "gh-secret");

        let config = TriggerConfig::load_with_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("hub-secret"));
        clear_token_env();
    }

    #[test]
    fn github_token_used_as_fallback() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_token_env();
        std::env::set_var("GITHUB_TOKEN", "gh-secret");

        let config = TriggerConfig::load_with_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("gh-secret"));
        clear_token_env();
    }
}
