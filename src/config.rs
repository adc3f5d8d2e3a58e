use anyhow::{Context, bail};
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "rideshare.db";
const DEFAULT_JWT_EXPIRY_SECS: i64 = 3600;

/// Server configuration.
///
/// | Env Var             | Default        |
/// |---------------------|----------------|
/// | `HOST`              | `0.0.0.0`      |
/// | `PORT`              | `8080`         |
/// | `RIDESHARE_DB_PATH` | `rideshare.db` |
/// | `JWT_SECRET`        | required       |
/// | `JWT_EXPIRY_SECS`   | `3600`         |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt: JwtConfig,
}

impl Config {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let db_path = lookup("RIDESHARE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) else {
            bail!("JWT_SECRET must be set and non-empty");
        };
        let expiry_secs = parse_or(&lookup, "JWT_EXPIRY_SECS", DEFAULT_JWT_EXPIRY_SECS)?;
        if expiry_secs <= 0 {
            bail!("JWT_EXPIRY_SECS must be positive");
        }

        Ok(Self {
            host,
            port,
            db_path,
            jwt: JwtConfig {
                secret,
                expiry_secs,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.db_path, PathBuf::from("rideshare.db"));
        assert_eq!(config.jwt.expiry_secs, 3600);
    }

    #[test]
    fn overrides_apply() {
        let config = config(&[
            ("JWT_SECRET", "s3cret"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("RIDESHARE_DB_PATH", "/tmp/rides"),
            ("JWT_EXPIRY_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.db_path, PathBuf::from("/tmp/rides"));
        assert_eq!(config.jwt.expiry_secs, 60);
    }

    #[test]
    fn secret_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn malformed_numbers_are_errors() {
        assert!(config(&[("JWT_SECRET", "s"), ("PORT", "eighty")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_EXPIRY_SECS", "-5")]).is_err());
    }
}
