//! Process configuration read from the environment.

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = std::env::var("PORT")
            .ok()
            .map(|p| p.parse())
            .transpose()
            .context("PORT must be a valid port number")?
            .unwrap_or(8084);
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .map(|n| n.parse())
            .transpose()
            .context("DB_MAX_CONNECTIONS must be a number")?
            .unwrap_or(10);
        Ok(Self { database_url, port, db_max_connections })
    }
}
