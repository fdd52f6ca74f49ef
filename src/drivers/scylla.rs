use std::sync::Arc;

use async_trait::async_trait;
use scylla::frame::response::result::CqlValue;
use scylla::{Session, SessionBuilder};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::registry::Provider;
use crate::traits::{Backend, Connect};
use crate::types::{FieldType, RawQueryResult, TypeMapping};

/// Native column types.
pub static TYPE_MAPPING: TypeMapping = TypeMapping::new(&[
    (FieldType::String, "text"),
    (FieldType::Int, "int"),
    (FieldType::Boolean, "boolean"),
]);

/// Keyspace holding every table managed through this service.
pub const KEYSPACE: &str = "httpsql";
const REPLICATION_FACTOR: u32 = 3;

/// Cassandra / ScyllaDB backend using the scylla driver.
///
/// The session pools connections to every node and is safe to share, so it is
/// held in an `Arc` without a lock.
pub struct ScyllaBackend {
    session: Arc<Session>,
}

#[async_trait]
impl Connect for ScyllaBackend {
    const PROVIDER: &'static str = "cassandra";
    const DEFAULT_PORT: u16 = 9042;

    async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let port = config.port_or_default();
        let nodes: Vec<String> = config
            .hosts
            .iter()
            .map(|host| format!("{}:{}", host, port))
            .collect();
        if nodes.is_empty() {
            return Err(Error::ConnectionFailed("no seed hosts configured".to_string()));
        }

        let mut builder = SessionBuilder::new().known_nodes(&nodes);
        if let Some(user) = &config.user {
            builder = builder.user(user, config.password.as_deref().unwrap_or_default());
        }

        let session = builder.build().await.map_err(|e| {
            error!("unable to connect: {}", e);
            Error::ConnectionFailed(e.to_string())
        })?;

        Ok(Self {
            session: Arc::new(session),
        })
    }
}

#[async_trait]
impl Backend for ScyllaBackend {
    fn provider(&self) -> Provider {
        Provider::Cassandra
    }

    fn type_mapping(&self) -> &TypeMapping {
        &TYPE_MAPPING
    }

    /// Creates the keyspace if needed and makes it the session default.
    async fn initialize(&self) -> Result<()> {
        let cql = format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
             {{ 'class': 'SimpleStrategy', 'replication_factor': {} }}",
            KEYSPACE, REPLICATION_FACTOR
        );
        debug!("initializing keyspace with cql: {}", cql);
        self.session
            .query(cql, ())
            .await
            .map_err(|e| Error::ConnectionFailed(format!("unable to create keyspace: {}", e)))?;
        self.session
            .use_keyspace(KEYSPACE, false)
            .await
            .map_err(|e| Error::ConnectionFailed(format!("unable to use keyspace: {}", e)))?;
        info!("using keyspace {}", KEYSPACE);
        Ok(())
    }

    /// Reads are issued on a separate task and joined before returning.
    async fn fetch(&self, statement: &str) -> Result<RawQueryResult> {
        let session = Arc::clone(&self.session);
        let statement = statement.to_string();
        let handle = tokio::spawn(async move { session.query(statement, ()).await });

        let result = handle
            .await
            .map_err(|e| Error::QueryFailed(format!("read task failed: {}", e)))?
            .map_err(|e| Error::QueryFailed(e.to_string()))?;

        let columns = result.col_specs.iter().map(|c| c.name.clone()).collect();
        let rows = result
            .rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.columns.into_iter().map(cql_to_json).collect())
            .collect();

        Ok(RawQueryResult::new(columns, rows))
    }

    /// CQL has no multi-statement batches for DDL, so statements run one at a time.
    async fn apply(&self, statements: &[String]) -> Result<()> {
        for statement in statements {
            self.session
                .query(statement.as_str(), ())
                .await
                .map_err(|e| Error::QueryFailed(format!("{}: {}", statement, e)))?;
        }
        Ok(())
    }

    async fn check_connectivity(&self) -> Result<()> {
        self.session
            .query("SELECT now() FROM system.local", ())
            .await
            .map(|_| ())
            .map_err(|e| Error::ConnectionFailed(e.to_string()))
    }
}

fn cql_to_json(value: Option<CqlValue>) -> Value {
    match value {
        None | Some(CqlValue::Empty) => Value::Null,
        Some(CqlValue::Text(s)) | Some(CqlValue::Ascii(s)) => Value::String(s),
        Some(CqlValue::Int(i)) => Value::from(i),
        Some(CqlValue::BigInt(i)) => Value::from(i),
        Some(CqlValue::SmallInt(i)) => Value::from(i),
        Some(CqlValue::TinyInt(i)) => Value::from(i),
        Some(CqlValue::Boolean(b)) => Value::Bool(b),
        Some(CqlValue::Double(d)) => Value::from(d),
        Some(CqlValue::Float(f)) => Value::from(f),
        Some(CqlValue::List(items)) | Some(CqlValue::Set(items)) => {
            Value::Array(items.into_iter().map(|v| cql_to_json(Some(v))).collect())
        }
        Some(other) => Value::String(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cql_to_json() {
        assert_eq!(cql_to_json(None), Value::Null);
        assert_eq!(cql_to_json(Some(CqlValue::Text("M".into()))), json!("M"));
        assert_eq!(cql_to_json(Some(CqlValue::Int(10))), json!(10));
        assert_eq!(cql_to_json(Some(CqlValue::Boolean(true))), json!(true));
        assert_eq!(
            cql_to_json(Some(CqlValue::List(vec![CqlValue::Int(1), CqlValue::Int(2)]))),
            json!([1, 2])
        );
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(TYPE_MAPPING.native(FieldType::String), Some("text"));
        assert_eq!(TYPE_MAPPING.native(FieldType::Int), Some("int"));
    }
}
