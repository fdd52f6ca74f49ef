use thiserror::Error;

/// Error type for httpsql operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported database provider: {provider}, please choose from: {}", .supported.join(", "))]
    UnsupportedProvider {
        provider: String,
        supported: Vec<&'static str>,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl Error {
    /// Whether the error was caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::SchemaValidation(_)
                | Error::InvalidIdentifier(_)
                | Error::InvalidPayload(_)
                | Error::MissingParameter(_)
                | Error::QueryFailed(_)
        )
    }
}

/// Result type alias for httpsql operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_lists_choices() {
        let err = Error::UnsupportedProvider {
            provider: "mysql".to_string(),
            supported: vec!["postgres", "cassandra"],
        };
        assert_eq!(
            err.to_string(),
            "unsupported database provider: mysql, please choose from: postgres, cassandra"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_read_failures_are_client_errors() {
        assert!(Error::QueryFailed("relation does not exist".into()).is_client_error());
        assert!(!Error::ConnectionFailed("refused".into()).is_client_error());
    }
}
