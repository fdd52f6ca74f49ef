use std::error::Error as StdError;

use async_trait::async_trait;
use serde_json::Value;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, error};

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::registry::Provider;
use crate::traits::{Backend, Connect};
use crate::types::{FieldType, RawQueryResult, TypeMapping};

/// Native column types.
pub static TYPE_MAPPING: TypeMapping = TypeMapping::new(&[
    (FieldType::String, "varchar(64)"),
    (FieldType::Int, "int"),
    (FieldType::Boolean, "boolean"),
]);

/// Credentials used when none are configured.
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";

/// PostgreSQL backend using tokio-postgres.
///
/// The client pipelines concurrent requests over its one connection, so it is
/// shared without additional locking.
pub struct TokioPostgresBackend {
    client: Client,
}

#[async_trait]
impl Connect for TokioPostgresBackend {
    const PROVIDER: &'static str = "postgres";
    const DEFAULT_PORT: u16 = 5432;

    async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let host = config
            .hosts
            .first()
            .ok_or_else(|| Error::ConnectionFailed("no host configured".to_string()))?;

        let mut pg = tokio_postgres::Config::new();
        pg.host(host).port(config.port_or_default());
        match &config.user {
            Some(user) => {
                pg.user(user);
                if let Some(password) = &config.password {
                    pg.password(password);
                }
            }
            None => {
                pg.user(DEFAULT_USER).password(DEFAULT_PASSWORD);
            }
        }

        let (client, connection) = pg.connect(NoTls).await.map_err(|e| {
            error!("unable to connect: {}", describe(&e));
            Error::ConnectionFailed(describe(&e))
        })?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", describe(&e));
            }
        });

        check_standard_strings(&client).await.map_err(|e| {
            error!("refusing server: {}", e);
            e
        })?;

        Ok(Self { client })
    }
}

/// Literals escape quotes by doubling them, which only holds while backslashes
/// are ordinary characters.
async fn check_standard_strings(client: &Client) -> Result<()> {
    let messages = client
        .simple_query("SHOW standard_conforming_strings")
        .await
        .map_err(|e| Error::ConnectionFailed(describe(&e)))?;
    let setting = messages.iter().find_map(|message| match message {
        SimpleQueryMessage::Row(row) => row.get(0).map(str::to_string),
        _ => None,
    });
    debug!("standard_conforming_strings = {:?}", setting);
    require_standard_strings(setting.as_deref())
}

fn require_standard_strings(setting: Option<&str>) -> Result<()> {
    match setting {
        Some("on") => Ok(()),
        other => Err(Error::ConnectionFailed(format!(
            "standard_conforming_strings is {}, it must be on",
            other.unwrap_or("unset")
        ))),
    }
}

#[async_trait]
impl Backend for TokioPostgresBackend {
    fn provider(&self) -> Provider {
        Provider::Postgres
    }

    fn type_mapping(&self) -> &TypeMapping {
        &TYPE_MAPPING
    }

    async fn fetch(&self, statement: &str) -> Result<RawQueryResult> {
        let rows = self
            .client
            .query(statement, &[])
            .await
            .map_err(|e| Error::QueryFailed(describe(&e)))?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => Vec::new(),
        };

        let values = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| row_value_to_json(row, i)).collect())
            .collect();

        Ok(RawQueryResult::new(columns, values))
    }

    async fn apply(&self, statements: &[String]) -> Result<()> {
        // The simple query protocol runs a `;`-separated batch in one round trip.
        self.client
            .batch_execute(&statements.join("; "))
            .await
            .map_err(|e| Error::QueryFailed(describe(&e)))
    }

    async fn check_connectivity(&self) -> Result<()> {
        self.client
            .simple_query("SELECT NULL")
            .await
            .map(|_| ())
            .map_err(|e| Error::ConnectionFailed(describe(&e)))
    }
}

/// Prefer the server's message over the driver's generic "db error".
fn describe(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => db.to_string(),
        None => error_chain(e),
    }
}

/// The error followed by each of its sources, e.g.
/// `error connecting to server: Connection refused (os error 111)`.
fn error_chain(e: &dyn StdError) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Decode the cell at `index` into JSON, trying the types the type mapping
/// can produce first.
fn row_value_to_json(row: &tokio_postgres::Row, index: usize) -> Value {
    if let Ok(val) = row.try_get::<_, Option<i32>>(index) {
        return val.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<String>>(index) {
        return val.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<bool>>(index) {
        return val.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<i64>>(index) {
        return val.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<i16>>(index) {
        return val.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(val) = row.try_get::<_, Option<f64>>(index) {
        return val.map(Value::from).unwrap_or(Value::Null);
    }

    Value::String(format!("<unsupported type {}>", row.columns()[index].type_()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("error connecting to server")]
    struct ConnectError(#[source] io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let err = ConnectError(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ));
        assert_eq!(
            error_chain(&err),
            "error connecting to server: Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_error_chain_without_source() {
        let err = io::Error::other("closed");
        assert_eq!(error_chain(&err), "closed");
    }

    #[test]
    fn test_requires_standard_conforming_strings() {
        assert!(require_standard_strings(Some("on")).is_ok());
        match require_standard_strings(Some("off")) {
            Err(Error::ConnectionFailed(msg)) => assert!(msg.contains("off")),
            other => panic!("Expected ConnectionFailed, got {:?}", other),
        }
        assert!(require_standard_strings(None).is_err());
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(TYPE_MAPPING.native(FieldType::String), Some("varchar(64)"));
        assert_eq!(TYPE_MAPPING.native(FieldType::Boolean), Some("boolean"));
    }
}
