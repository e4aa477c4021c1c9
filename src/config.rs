use std::{env, path::PathBuf};

use anyhow::{Context, Result};

/// Process-wide configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub storage_root: PathBuf,
    pub port: u16,
    producao: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL env var is missing")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET env var is missing")?;

        let storage_root = env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("storage"));

        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let producao = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt_secret,
            storage_root,
            port,
            producao,
        })
    }

    /// Request throttling only guards the externally reachable deployment.
    pub fn rate_limit_enabled(&self) -> bool {
        self.producao
    }

    /// The destructive demo seed never runs in production.
    pub fn seed_enabled(&self) -> bool {
        !self.producao
    }
}
