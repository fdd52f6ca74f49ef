mod scylla;
mod tokio_postgres;

pub use self::in_memory_test::{InMemoryTestBackend, InMemoryTestResponseBuilder, RecordedStatement};
pub use self::scylla::{ScyllaBackend, KEYSPACE, TYPE_MAPPING as CASSANDRA_TYPE_MAPPING};
pub use self::tokio_postgres::{TokioPostgresBackend, TYPE_MAPPING as POSTGRES_TYPE_MAPPING};
