use std::path::Path;

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "trivia.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Defaults, then the TOML file (optional), then `TRIVIA__*` environment variables.
pub fn load_settings(file: Option<&Path>) -> Result<Settings, config::ConfigError> {
    dotenv::dotenv().ok();
    let file_source = match file {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("database.max_connections", 5)?
        .add_source(file_source)
        .add_source(config::Environment::with_prefix("TRIVIA").separator("__"))
        .build()?
        .try_deserialize()
}
