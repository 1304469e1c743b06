//! Server configuration loaded from environment variables.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// `PORT`
    #[serde(default = "default_port")]
    pub port: u16,

    /// `HOST`
    #[serde(default = "default_host")]
    pub host: String,

    /// `ENVIRONMENT`, a free-form label such as "development" or "production".
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            environment: default_environment(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// `host:port`, suitable for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
