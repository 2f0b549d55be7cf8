use std::env;

use log::info;

pub struct Config {
    pub port: u16,
    /// SQLite URL. When unset the server runs on the in-memory demo store.
    pub database_url: Option<String>,
    pub ping_message: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let ping_message = env::var("PING_MESSAGE").unwrap_or_else(|_| "ping".to_string());

        info!(
            "Config loaded: port={} database={}",
            port,
            if database_url.is_some() { "sqlite" } else { "in-memory demo" }
        );

        Self {
            port,
            database_url,
            ping_message,
        }
    }
}
