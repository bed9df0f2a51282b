use crate::{
    Args,
    error::{Error, Result},
    metrics::{
        Status,
        config::{record_config_load, record_config_served},
    },
    report::CommandSpec,
};
use serde::Deserialize;
use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::sync::RwLock;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Slack incoming webhook URL
    pub slack: String,
    /// Shared secret for both the webhook and the agent endpoint
    pub token: String,
    /// Commands to run per alert name
    #[serde(default)]
    pub alerts: HashMap<String, Vec<CommandSpec>>,
    /// Instance label (or alias) to address overrides
    #[serde(default)]
    pub hosts: HashMap<String, String>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from {}", path.display());

        let config = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;

        Self::parse(&config)
    }

    /// Parse configuration from a JSON or YAML document
    pub fn parse(document: &str) -> Result<Self> {
        serde_norway::from_str(document).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Commands configured for an alert; unknown alerts have none
    pub fn commands_for(&self, alert_name: &str) -> &[CommandSpec] {
        self.alerts
            .get(alert_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Settings taken from the command line
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub agent_port: u16,
    pub request_timeout: Duration,
    pub unit_timeout: Duration,
    pub command_timeout: Duration,
    pub max_concurrency: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 5050),
            agent_port: 5050,
            request_timeout: Duration::from_secs(30),
            unit_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(30),
            max_concurrency: None,
        }
    }
}

impl From<&Args> for Settings {
    fn from(args: &Args) -> Self {
        Self {
            listen: SocketAddr::new(args.host, args.port),
            agent_port: args.agent_port,
            request_timeout: Duration::from_secs(args.request_timeout),
            unit_timeout: Duration::from_secs(args.unit_timeout),
            command_timeout: Duration::from_secs(args.command_timeout),
            max_concurrency: args.max_concurrency.filter(|limit| *limit > 0),
        }
    }
}

/// Holds the loaded configuration; handlers take a snapshot per request
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<Config>>,
}

impl ConfigStore {
    /// Load the config file once; fails if it can't be read or parsed
    pub fn load(path: PathBuf) -> Result<Self> {
        let config = read(&path)?;

        Ok(Self {
            path: Some(path),
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// Wrap an already built config, which can't be reloaded
    pub fn fixed(config: Config) -> Self {
        record_config_served(&config);

        Self {
            path: None,
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub async fn current(&self) -> Arc<Config> {
        self.current.read().await.clone()
    }

    /// Re-read the config file, keeping the old config on failure
    pub async fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Err(Error::Configuration(
                "config was not loaded from a file".to_string(),
            ));
        };

        let config = read(path)?;
        *self.current.write().await = Arc::new(config);

        tracing::info!("Config reloaded from {}", path.display());

        Ok(())
    }
}

/// Read the config file and record how it went
fn read(path: &Path) -> Result<Config> {
    match Config::from_file(path) {
        Ok(config) => {
            record_config_load(Status::Success);
            record_config_served(&config);
            Ok(config)
        }
        Err(e) => {
            record_config_load(Status::Failure);
            Err(e)
        }
    }
}
