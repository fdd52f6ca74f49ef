//! httpsql - schema-declared tables over HTTP for pluggable storage backends
//!
//! Clients declare a table's fields as `string`, `int` or `boolean`; operations
//! are translated into statements for the configured backend (PostgreSQL or
//! Cassandra) and executed over one long-lived session.
//!
//! # Example
//! ```ignore
//! use httpsql::{ConnectionConfig, Database, Provider};
//! use serde_json::json;
//!
//! let config = ConnectionConfig::new(Provider::Postgres, "localhost");
//! let db = Database::connect(&config).await?;
//!
//! // Returns the statement instead of running it
//! let outcome = db
//!     .create_table(
//!         "shirts",
//!         &json!({"fields": {"name": "string", "price": "int"}, "key": "name"}),
//!         true,
//!     )
//!     .await?;
//! ```

pub mod builders;
pub mod clauses;
pub mod config;
pub mod drivers;
pub mod error;
pub mod http;
pub mod metrics;
pub mod registry;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use clauses::WhereClause;
pub use client::{Database, Outcome};
pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use metrics::RequestMetrics;
pub use registry::Provider;
pub use traits::{Backend, Connect};
pub use types::{Command, CommandKind, FieldSchema, FieldType, RawQueryResult, Row, SqlValue, TypeMapping};
