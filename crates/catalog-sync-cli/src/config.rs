use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_sync::{OrchestratorConfig, SyncPhase, SyncPlan};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `auth_token` from the file.
pub const TOKEN_ENV: &str = "CATALOG_SYNC_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("the sync plan must name at least one phase")]
    EmptyPlan,

    #[error("no endpoint configured; set `endpoint` in the config file or pass --endpoint")]
    MissingEndpoint,
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
    pub plan: Vec<String>,
    pub animation_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_token: None,
            plan: SyncPlan::default()
                .phases()
                .iter()
                .map(|phase| phase.as_str().to_owned())
                .collect(),
            animation_interval_ms: 500,
        }
    }
}

impl AppConfig {
    /// Phases of a full sync, in order.
    pub fn sync_plan(&self) -> Result<SyncPlan, ConfigError> {
        parse_plan(&self.plan)
    }

    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig, ConfigError> {
        Ok(OrchestratorConfig {
            plan: self.sync_plan()?,
            animation_interval: Duration::from_millis(self.animation_interval_ms),
        })
    }

    /// The endpoint to use, preferring the command-line value.
    pub fn endpoint(&self, cli_override: Option<&str>) -> Result<String, ConfigError> {
        cli_override
            .or(self.endpoint.as_deref())
            .filter(|endpoint| !endpoint.trim().is_empty())
            .map(str::to_owned)
            .ok_or(ConfigError::MissingEndpoint)
    }

    /// Replace the file's token with `env_token` when one is set.
    pub fn with_token_override(mut self, env_token: Option<String>) -> Self {
        if let Some(token) = env_token.filter(|t| !t.is_empty()) {
            self.auth_token = Some(token);
        }
        self
    }
}

pub fn parse_plan<S: AsRef<str>>(phases: &[S]) -> Result<SyncPlan, ConfigError> {
    SyncPlan::new(
        phases
            .iter()
            .map(|phase| SyncPhase::parse(phase.as_ref()))
            .collect(),
    )
    .ok_or(ConfigError::EmptyPlan)
}

/// Config file path: `~/.config/catalog-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("catalog-sync").join("config.toml"))
}

/// Load config from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults; an unreadable or malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        return Ok(AppConfig::default());
    };

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}
