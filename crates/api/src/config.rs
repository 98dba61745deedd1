//! Process configuration read from the environment.

use std::net::SocketAddr;

use anyhow::{Context, bail};

use bazaar_infra::ServiceConfig;
use bazaar_observability::LogFormat;
use bazaar_orders::{PlatformFee, TransitionPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Which storage backend the services run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
        run_migrations: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub services: ServiceConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store: StoreConfig::InMemory,
            services: ServiceConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but unparsable keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let use_persistent = parse_flag(&lookup, "USE_PERSISTENT_STORES", false)?;
        let store = if use_persistent {
            let Some(database_url) = lookup("DATABASE_URL") else {
                bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
            };
            let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse::<u32>()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            StoreConfig::Postgres {
                database_url,
                max_connections,
                run_migrations: parse_flag(&lookup, "RUN_MIGRATIONS", true)?,
            }
        } else {
            StoreConfig::InMemory
        };

        let platform_fee = match lookup("PLATFORM_FEE") {
            Some(raw) => PlatformFee::new(
                raw.trim()
                    .parse::<u64>()
                    .context("PLATFORM_FEE must be a non-negative integer amount")?,
            ),
            None => PlatformFee::default(),
        };

        let status_policy = match lookup("ORDER_STATUS_POLICY") {
            Some(raw) => raw
                .parse::<TransitionPolicy>()
                .map_err(|e| anyhow::anyhow!("ORDER_STATUS_POLICY: {e}"))?,
            None => TransitionPolicy::default(),
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().context("LOG_FORMAT")?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            store,
            services: ServiceConfig {
                platform_fee,
                status_policy,
            },
            log_format,
        })
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> anyhow::Result<bool> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .with_context(|| format!("{key} must be `true` or `false`")),
        None => Ok(default),
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
    fn defaults_to_in_memory_with_default_fee() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.services.platform_fee.amount(), 2_000);
    }

    #[test]
    fn reads_business_knobs() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PLATFORM_FEE", "50"),
            ("ORDER_STATUS_POLICY", "Strict"),
            ("LOG_FORMAT", "pretty"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.services.platform_fee.amount(), 50);
        assert_eq!(config.services.status_policy, TransitionPolicy::Strict);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn persistent_store_requires_database_url() {
        assert!(AppConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).is_err());

        let config = AppConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "TRUE"),
            ("DATABASE_URL", "postgres://localhost/bazaar"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Postgres {
                database_url: "postgres://localhost/bazaar".to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
                run_migrations: false,
            }
        );
    }

    #[test]
    fn malformed_values_are_reported() {
        assert!(AppConfig::from_lookup(lookup(&[("PLATFORM_FEE", "-5")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ORDER_STATUS_POLICY", "lenient")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "yes")])).is_err());
    }
}
