use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url.parse().context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .port(self.port))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let parsed = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let port = match lookup("POSTGRES_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("POSTGRES_PORT is not a valid port: {v}"))?,
            None => 5432,
        };

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL"),
            host: or("POSTGRES_HOST", "localhost"),
            user: or("POSTGRES_USER", "postgres"),
            password: or("POSTGRES_PASSWORD", ""),
            database: or("POSTGRES_DATABASE", "postgres"),
            port,
            max_connections: parsed("DB_MAX_CONNECTIONS", 10) as u32,
            connect_timeout_secs: parsed("DB_CONNECT_TIMEOUT_SECS", 5),
            idle_timeout_secs: parsed("DB_IDLE_TIMEOUT_SECS", 10),
        };

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: or("JWT_ISSUER", "pointmap"),
            audience: or("JWT_AUDIENCE", "pointmap-users"),
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };

        let cors_origins = or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let cookie_secure = matches!(
            lookup("COOKIE_SECURE").as_deref(),
            Some("true") | Some("1")
        );

        Ok(Self {
            database,
            jwt,
            cors_origins,
            cookie_secure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.database.port, 5432);
        assert_eq!(cfg.database.password, "");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.jwt.issuer, "pointmap");
        assert_eq!(cfg.jwt.ttl_minutes, 1440);
        assert_eq!(cfg.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert!(!cfg.cookie_secure);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = config_from(&[("JWT_SECRET", "x"), ("POSTGRES_PORT", "abc")]).unwrap_err();
        assert!(err.to_string().contains("POSTGRES_PORT"));
    }

    #[test]
    fn discrete_postgres_settings_are_read() {
        let cfg = config_from(&[
            ("JWT_SECRET", "x"),
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_USER", "maps"),
            ("POSTGRES_PASSWORD", "pw"),
            ("POSTGRES_DATABASE", "points"),
            ("POSTGRES_PORT", "6543"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("COOKIE_SECURE", "true"),
        ])
        .unwrap();
        assert_eq!(cfg.database.host, "db.internal");
        assert_eq!(cfg.database.user, "maps");
        assert_eq!(cfg.database.database, "points");
        assert_eq!(cfg.database.port, 6543);
        assert!(cfg.database.url.is_none());
        assert!(cfg.database.connect_options().is_ok());
        assert_eq!(cfg.cors_origins.len(), 2);
        assert!(cfg.cookie_secure);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let cfg = config_from(&[
            ("JWT_SECRET", "x"),
            ("JWT_TTL_MINUTES", "soon"),
            ("DB_IDLE_TIMEOUT_SECS", "-1"),
        ])
        .unwrap();
        assert_eq!(cfg.jwt.ttl_minutes, 1440);
        assert_eq!(cfg.database.idle_timeout(), Duration::from_secs(10));
    }
}
