use std::env;
use std::path::PathBuf;

use anyhow::Context;

/// Process configuration, read from the environment once at startup and
/// handed to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("ECHO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env::var("ECHO_PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .context("invalid ECHO_PORT")?;
        let db_path = PathBuf::from(env::var("ECHO_DB_PATH").unwrap_or_else(|_| "echo.db".into()));
        let jwt_secret =
            env::var("ECHO_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let default_page_size = env::var("ECHO_DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .context("invalid ECHO_DEFAULT_PAGE_SIZE")?;
        let max_page_size = env::var("ECHO_MAX_PAGE_SIZE")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .context("invalid ECHO_MAX_PAGE_SIZE")?;

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            default_page_size,
            max_page_size,
        })
    }
}
