//! Backend registry.
//!
//! Every adapter compiled into the crate is listed in [`Provider`]. Names and
//! default ports come from each adapter's [`Connect`] constants.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::config::ConnectionConfig;
use crate::drivers::{
    ScyllaBackend, TokioPostgresBackend, CASSANDRA_TYPE_MAPPING, POSTGRES_TYPE_MAPPING,
};
use crate::error::{Error, Result};
use crate::traits::{Backend, Connect};
use crate::types::TypeMapping;

/// A storage backend implementation known to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Postgres,
    Cassandra,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Postgres, Provider::Cassandra];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Postgres => TokioPostgresBackend::PROVIDER,
            Provider::Cassandra => ScyllaBackend::PROVIDER,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Provider::Postgres => TokioPostgresBackend::DEFAULT_PORT,
            Provider::Cassandra => ScyllaBackend::DEFAULT_PORT,
        }
    }

    /// Native column types of the provider's adapter.
    pub fn type_mapping(&self) -> &'static TypeMapping {
        match self {
            Provider::Postgres => &POSTGRES_TYPE_MAPPING,
            Provider::Cassandra => &CASSANDRA_TYPE_MAPPING,
        }
    }

    /// Names of every registered provider.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Provider::name).collect()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnsupportedProvider {
                provider: s.to_string(),
                supported: Self::names(),
            })
    }
}

/// Connects to and initializes the backend selected by `config`.
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn Backend>> {
    info!("connecting to {}", config);
    let backend: Arc<dyn Backend> = match config.provider {
        Provider::Postgres => Arc::new(TokioPostgresBackend::connect(config).await?),
        Provider::Cassandra => Arc::new(ScyllaBackend::connect(config).await?),
    };
    backend.initialize().await?;
    info!("{} backend ready", config.provider);
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!("postgres".parse::<Provider>().unwrap(), Provider::Postgres);
        assert_eq!("cassandra".parse::<Provider>().unwrap(), Provider::Cassandra);
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(Provider::Postgres.default_port(), 5432);
        assert_eq!(Provider::Cassandra.default_port(), 9042);
    }

    #[test]
    fn test_unknown_provider() {
        match "mysql".parse::<Provider>() {
            Err(Error::UnsupportedProvider { provider, supported }) => {
                assert_eq!(provider, "mysql");
                assert_eq!(supported, vec!["postgres", "cassandra"]);
            }
            other => panic!("Expected UnsupportedProvider, got {:?}", other),
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names = Provider::names();
        for (i, name) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(name));
        }
    }
}
