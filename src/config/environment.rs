//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Todas las variables
//! tienen un valor por defecto; un valor presente pero mal formado es error.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEV_JWT_SECRET: &str = "fleet-ops-dev-secret";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub log_level: tracing::Level,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 5000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 1,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration: 86_400,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_origins: vec!["*".to_string()],
            log_level: tracing::Level::DEBUG,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde el entorno (llamar después de `dotenv()`)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        let default_level = if environment == "development" {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            log_level: parse_var("LOG_LEVEL", default_level)?,
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Obtener la dirección de escucha del servidor
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_split() {
        let origins = parse_origins(" http://a.test , http://b.test,, ");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn defaults_describe_a_development_setup() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.uses_default_jwt_secret());
        assert!(config.allows_any_origin());
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }
}
