use jsonwebtoken::Algorithm;
use rand::{distributions::Alphanumeric, Rng};
use tracing::warn;

const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    /// `None` selects the in-memory store (development only).
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match var("APP_ENV").as_deref() {
            None | Some("production") => Environment::Production,
            Some("development") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "APP_ENV",
                    value: other.into(),
                })
            }
        };
        let production = environment == Environment::Production;

        let database_url = var("DATABASE_URL");
        if database_url.is_none() && production {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let secret = match var("JWT_SECRET") {
            Some(s) => s,
            None if production => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                warn!("JWT_SECRET not set; using a random secret, tokens will not survive a restart");
                rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(48)
                    .map(char::from)
                    .collect()
            }
        };

        let algorithm = match var("JWT_ALGORITHM").as_deref().unwrap_or("HS256") {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(ConfigError::Invalid {
                    name: "JWT_ALGORITHM",
                    value: other.into(),
                })
            }
        };

        let ttl_minutes = parse_or(&var, "JWT_TTL_MINUTES", DEFAULT_TTL_MINUTES)?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            });
        }

        Ok(Self {
            environment,
            database_url,
            jwt: JwtConfig {
                secret,
                algorithm,
                ttl_minutes,
            },
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "APP_PORT", 8080)?,
        })
    }
}

fn parse_or<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn production_refuses_to_start_without_secret() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/imasu")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn production_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn development_generates_secret_and_uses_memory_store() {
        let cfg = AppConfig::from_lookup(lookup(&[("APP_ENV", "development")])).unwrap();
        assert_eq!(cfg.environment, Environment::Development);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.jwt.secret.len(), 48);
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/imasu"),
            ("JWT_SECRET", "s"),
        ]))
        .unwrap();
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS256);
        assert_eq!(cfg.jwt.ttl_minutes, 43_200);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
    }

    #[test]
    fn only_hmac_algorithms_are_accepted() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")];
        let mut vars = base.to_vec();
        vars.push(("JWT_ALGORITHM", "HS512"));
        assert_eq!(
            AppConfig::from_lookup(lookup(&vars)).unwrap().jwt.algorithm,
            Algorithm::HS512
        );

        let mut vars = base.to_vec();
        vars.push(("JWT_ALGORITHM", "RS256"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        let vars = [
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "s"),
            ("APP_PORT", "http"),
        ];
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "APP_PORT", .. })
        ));
    }
}
