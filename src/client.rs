use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use crate::builders::{self, RowData};
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::registry::{self, Provider};
use crate::traits::Backend;
use crate::types::{Command, FieldSchema, Row, SqlValue, TypeMapping};

/// What running a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Dry-run: the command text, not executed.
    Statement(String),
    /// Rows returned by a read.
    Rows(Vec<Row>),
    /// Whether a write succeeded.
    Written(bool),
}

/// Main entry point for httpsql.
/// Holds the backend session and turns operations into executed commands.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
}

impl Database {
    /// Resolve, connect and initialize the backend described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let backend = registry::connect(config).await?;
        Ok(Self::with_backend(backend))
    }

    /// Create a database over an existing backend.
    /// Useful for testing or using alternative backends.
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn provider(&self) -> Provider {
        self.backend.provider()
    }

    pub fn type_mapping(&self) -> &TypeMapping {
        self.backend.type_mapping()
    }

    /// Execute a command against the backend.
    ///
    /// Read failures are returned as [`Error::QueryFailed`]. Write failures
    /// are logged and reported as `Outcome::Written(false)`.
    pub async fn execute(&self, command: &Command) -> Result<Outcome> {
        debug!(provider = %self.provider(), "executing: {}", command.text());
        if command.is_read() {
            match self.backend.fetch(&command.text()).await {
                Ok(raw) => Ok(Outcome::Rows(raw.into_rows())),
                Err(e) => {
                    error!("read failed: {} (statement: {})", e, command.text());
                    Err(e)
                }
            }
        } else {
            match self.backend.apply(command.statements()).await {
                Ok(()) => Ok(Outcome::Written(true)),
                Err(e) => {
                    error!("write failed: {} (statements: {})", e, command.text());
                    Ok(Outcome::Written(false))
                }
            }
        }
    }

    /// Return the command text when `dry_run` is set, execute it otherwise.
    pub async fn run(&self, command: Command, dry_run: bool) -> Result<Outcome> {
        if dry_run {
            return Ok(Outcome::Statement(command.text()));
        }
        self.execute(&command).await
    }

    /// Whether the backend answers a trivial query. Never fails.
    pub async fn check_health(&self) -> bool {
        debug!(provider = %self.provider(), "checking health");
        match self.backend.check_connectivity().await {
            Ok(()) => true,
            Err(e) => {
                error!("health check failed: {}", e);
                false
            }
        }
    }

    /// Validate a table definition and create the table.
    pub async fn create_table(&self, table: &str, definition: &Value, dry_run: bool) -> Result<Outcome> {
        let schema = FieldSchema::validate(definition, self.type_mapping()).map_err(|e| {
            error!("failed schema validation: {}", e);
            e
        })?;
        let command = builders::create_table(table, &schema, self.type_mapping())?;
        self.run(command, dry_run).await
    }

    pub async fn drop_table(&self, table: &str, dry_run: bool) -> Result<Outcome> {
        self.run(builders::drop_table(table)?, dry_run).await
    }

    /// Fetch rows matching every filter.
    pub async fn list_rows(
        &self,
        table: &str,
        filters: &[(String, SqlValue)],
        dry_run: bool,
    ) -> Result<Outcome> {
        self.run(builders::select(table, filters)?, dry_run).await
    }

    pub async fn insert_rows(&self, table: &str, rows: &[RowData], dry_run: bool) -> Result<Outcome> {
        self.run(builders::insert(table, rows)?, dry_run).await
    }

    /// Delete rows where `field_name` equals `field_value`. Both are required.
    pub async fn delete_rows(
        &self,
        table: &str,
        field_name: Option<&str>,
        field_value: Option<&str>,
        dry_run: bool,
    ) -> Result<Outcome> {
        let command = builders::delete(table, field_name, field_value).map_err(|e| {
            if let Error::MissingParameter(msg) = &e {
                error!("{}", msg);
            }
            e
        })?;
        self.run(command, dry_run).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{InMemoryTestBackend, InMemoryTestResponseBuilder};
    use crate::types::CommandKind;
    use serde_json::json;

    fn database(backend: &Arc<InMemoryTestBackend>) -> Database {
        Database::with_backend(Arc::clone(backend) as Arc<dyn Backend>)
    }

    #[tokio::test]
    async fn test_write_success() {
        let backend = Arc::new(InMemoryTestBackend::new());
        let db = database(&backend);

        let outcome = db.drop_table("shirts", false).await.unwrap();

        assert_eq!(outcome, Outcome::Written(true));
        backend.assert_last_statements(&["DROP TABLE shirts"]);
    }

    #[tokio::test]
    async fn test_write_failure_is_reduced_to_false() {
        let backend = Arc::new(InMemoryTestBackend::new().failing("table does not exist"));
        let db = database(&backend);

        let outcome = db.drop_table("shirts", false).await.unwrap();

        assert_eq!(outcome, Outcome::Written(false));
    }

    #[tokio::test]
    async fn test_read_failure_is_surfaced() {
        let backend = Arc::new(InMemoryTestBackend::new().failing("relation \"shirts\" does not exist"));
        let db = database(&backend);

        match db.list_rows("shirts", &[], false).await {
            Err(Error::QueryFailed(msg)) => assert!(msg.contains("does not exist")),
            other => panic!("Expected QueryFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_decodes_rows() {
        let backend = Arc::new(
            InMemoryTestBackend::new().with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["name", "price"])
                    .row(vec![json!("t-shirt"), json!(10)])
                    .build(),
            ),
        );
        let db = database(&backend);

        let outcome = db.list_rows("shirts", &[], false).await.unwrap();
        let Outcome::Rows(rows) = outcome else {
            panic!("Expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("t-shirt")));
        assert_eq!(backend.last().unwrap().kind, CommandKind::Read);
    }

    #[tokio::test]
    async fn test_dry_run_matches_executed_text() {
        let backend = Arc::new(InMemoryTestBackend::new());
        let db = database(&backend);
        let rows = builders::rows_from_json(&json!([
            {"name": "t-shirt", "price": 10, "size": "M"},
            {"name": "hoodie", "price": 30, "size": "L"}
        ]))
        .unwrap();

        let Outcome::Statement(text) = db.insert_rows("shirts", &rows, true).await.unwrap() else {
            panic!("Expected statement text");
        };
        backend.assert_execution_count(0);

        db.insert_rows("shirts", &rows, false).await.unwrap();
        assert_eq!(backend.last().unwrap().statements.join("; "), text);
    }

    #[tokio::test]
    async fn test_schema_errors_skip_the_backend() {
        let backend = Arc::new(InMemoryTestBackend::new());
        let db = database(&backend);

        let result = db
            .create_table("shirts", &json!({"fields": {"name": "uuid"}}), false)
            .await;

        assert!(matches!(result, Err(Error::SchemaValidation(_))));
        backend.assert_execution_count(0);
    }

    #[tokio::test]
    async fn test_health() {
        let backend = Arc::new(InMemoryTestBackend::new());
        let db = database(&backend);

        assert!(db.check_health().await);
        backend.set_healthy(false);
        assert!(!db.check_health().await);
    }
}
