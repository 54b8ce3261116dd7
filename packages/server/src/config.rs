use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::competitions::duplicate_guard::NameMatch;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub db_max_connections: u32,
    pub name_match: NameMatch,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "competitions".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            name_match: env::var("COMPETITION_NAME_MATCH")
                .unwrap_or_else(|_| NameMatch::default().to_string())
                .parse()
                .context("COMPETITION_NAME_MATCH must be `prefix` or `exact`")?,
        })
    }
}
