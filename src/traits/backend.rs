use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::registry::Provider;
use crate::types::{RawQueryResult, TypeMapping};

/// Trait for storage backend adapters.
/// Adapters are responsible for:
/// - Holding one long-lived, thread-safe session
/// - Executing read statements and decoding rows into JSON values
/// - Executing write batches in order
/// - Reporting connectivity
///
/// Errors from the native driver are mapped into [`crate::Error`] here and
/// never escape as panics.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Provider this adapter implements.
    fn provider(&self) -> Provider;

    /// Native column types for each abstract field type.
    fn type_mapping(&self) -> &TypeMapping;

    /// One-time, idempotent setup run right after connecting.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Execute a single read statement.
    async fn fetch(&self, statement: &str) -> Result<RawQueryResult>;

    /// Execute write statements in order, stopping at the first failure.
    /// Statements already applied stay applied.
    async fn apply(&self, statements: &[String]) -> Result<()>;

    /// Issue a trivial query to confirm the session is alive.
    async fn check_connectivity(&self) -> Result<()>;
}

/// Static registration for adapters that can be built from configuration.
#[async_trait]
pub trait Connect: Backend + Sized {
    /// Provider name as selected in configuration.
    const PROVIDER: &'static str;
    /// Port used when none is configured.
    const DEFAULT_PORT: u16;

    /// Establish the session described by `config`.
    async fn connect(config: &ConnectionConfig) -> Result<Self>;
}
