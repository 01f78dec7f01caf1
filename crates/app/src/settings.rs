//! Runtime configuration, read from `washpoint.toml` (or the file named by
//! `WASHPOINT_CONFIG`) with `WASHPOINT__`-prefixed environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter (`error`, `warn`, `info`, `debug`,
    /// `trace`).
    pub level: String,
}

/// Database selection for the server.
///
/// In TOML either `database = "memory"` or `database = { sqlite = "path" }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("WASHPOINT_CONFIG").unwrap_or_else(|_| "washpoint.toml".to_string());

        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(&config_path).required(false))
            .add_source(Environment::with_prefix("WASHPOINT").separator("__"))
            .build()?
            .try_deserialize()
    }
}
