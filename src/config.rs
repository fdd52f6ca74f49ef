//! Connection configuration.

use std::fmt;

use crate::registry::Provider;

/// Everything needed to reach one backend. Built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub provider: Provider,
    /// Seed hosts. Single-host backends use the first one.
    pub hosts: Vec<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Creates a config from a comma-separated host list.
    pub fn new(provider: Provider, hosts: &str) -> Self {
        Self {
            provider,
            hosts: hosts
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect(),
            port: None,
            user: None,
            password: None,
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Sets credentials. A password without a user is ignored.
    pub fn with_credentials(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.password = user.as_ref().and(password);
        self.user = user;
        self
    }

    /// Configured port, or the provider's default.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or_else(|| self.provider.default_port())
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} database at {}:{}",
            self.provider,
            self.hosts.join(","),
            self.port_or_default()
        )?;
        if let Some(user) = &self.user {
            write!(f, " as {}", user)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_are_split() {
        let config = ConnectionConfig::new(Provider::Cassandra, "c1, c2,,c3");
        assert_eq!(config.hosts, vec!["c1", "c2", "c3"]);
        assert_eq!(config.port_or_default(), 9042);
    }

    #[test]
    fn test_password_requires_user() {
        let config = ConnectionConfig::new(Provider::Postgres, "db")
            .with_credentials(None, Some("secret".to_string()));
        assert_eq!(config.password, None);

        let config = ConnectionConfig::new(Provider::Postgres, "db")
            .with_credentials(Some("app".to_string()), Some("secret".to_string()));
        assert_eq!(config.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_display_hides_password() {
        let config = ConnectionConfig::new(Provider::Postgres, "db")
            .with_port(Some(6543))
            .with_credentials(Some("app".to_string()), Some("secret".to_string()));
        let shown = config.to_string();
        assert_eq!(shown, "postgres database at db:6543 as app");
        assert!(!shown.contains("secret"));
    }
}
