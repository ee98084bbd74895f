//! Error types shared across composition and ingestion.

use thiserror::Error;

use crate::sink::SinkError;
use crate::{GeometryClass, GeometryError, SchemaError, TopicName};

/// Errors raised while composing a theme. All of them are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// A topic's schema contribution was rejected.
    #[error("topic '{topic}' made an invalid schema change: {source}")]
    Schema {
        /// Topic whose contribution failed.
        topic: TopicName,
        /// Underlying registry error.
        #[source]
        source: SchemaError,
    },
    /// The catalog has no topic under this name.
    #[error("unknown topic '{name}'")]
    UnknownTopic {
        /// Requested topic name.
        name: String,
    },
    /// A topic was requested while it was still loading.
    #[error("cyclic topic load: {}", join_chain(.chain))]
    CyclicTopicLoad {
        /// Loading chain, ending with the re-requested topic.
        chain: Vec<TopicName>,
    },
    /// A topic rejected its configuration.
    #[error("invalid configuration for topic '{topic}': {message}")]
    InvalidConfiguration {
        /// Topic being configured.
        topic: TopicName,
        /// Parser or validation message.
        message: String,
    },
    /// Two topics registered different fallbacks for one output key.
    #[error(
        "topic '{topic}' registered fallback '{key}' as [{}] but it is already [{}]",
        .candidates.join(", "),
        .existing.join(", ")
    )]
    ConflictingFallback {
        /// Topic attempting the registration.
        topic: TopicName,
        /// Output key.
        key: String,
        /// Candidate list already registered.
        existing: Vec<String>,
        /// Candidate list being registered.
        candidates: Vec<String>,
    },
    /// A topic name is malformed.
    #[error("invalid topic name '{value}': {reason}")]
    InvalidTopicName {
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

fn join_chain(chain: &[TopicName]) -> String {
    chain
        .iter()
        .map(TopicName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised while running objects through a composed theme.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A geometry accessor was called on an object of another class.
    #[error("object {object} is a {actual} object; {accessor} needs {expected}")]
    GeometryClassMismatch {
        /// Object identifier.
        object: u64,
        /// Accessor or operation that was attempted.
        accessor: &'static str,
        /// Class the accessor supports.
        expected: &'static str,
        /// Class the object actually has.
        actual: GeometryClass,
    },
    /// The ingestion source could not produce the requested geometry.
    #[error("object {object} has no usable geometry for {accessor}")]
    GeometryUnavailable {
        /// Object identifier.
        object: u64,
        /// Accessor that was called.
        accessor: &'static str,
    },
    /// A row targets a table missing from the schema.
    #[error("unknown table '{table}'")]
    UnknownTable {
        /// Requested table name.
        table: String,
    },
    /// A row sets a column the table does not have.
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Offending column.
        column: String,
    },
    /// A row value does not fit its column type.
    #[error("column '{table}.{column}' expects {expected} but got {actual}")]
    ColumnTypeMismatch {
        /// Table name.
        table: String,
        /// Offending column.
        column: String,
        /// Declared column type.
        expected: String,
        /// Type of the supplied value.
        actual: &'static str,
    },
    /// A callback emitted a second row for the same table.
    #[error("object {object} already produced a row for table '{table}' in this callback")]
    DuplicateRow {
        /// Table name.
        table: String,
        /// Object identifier.
        object: u64,
    },
    /// A topic callback failed.
    #[error("callback of topic '{topic}' failed: {source}")]
    Callback {
        /// Topic owning the callback.
        topic: TopicName,
        /// Underlying failure.
        #[source]
        source: Box<IngestError>,
    },
    /// The row sink rejected a row.
    #[error("row sink failed: {source}")]
    Sink {
        /// Sink failure.
        #[from]
        source: SinkError,
    },
}

impl From<GeometryError> for IngestError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::ClassMismatch {
                object,
                accessor,
                expected,
                actual,
            } => Self::GeometryClassMismatch {
                object,
                accessor,
                expected,
                actual,
            },
            GeometryError::Unavailable { object, accessor } => {
                Self::GeometryUnavailable { object, accessor }
            }
        }
    }
}

impl IngestError {
    /// Innermost error, skipping callback wrappers.
    pub fn root(&self) -> &Self {
        match self {
            Self::Callback { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_load_lists_the_whole_chain() {
        let chain = ["a/one", "a/two", "a/one"]
            .into_iter()
            .map(|name| TopicName::new(name).unwrap())
            .collect();
        let err = ComposeError::CyclicTopicLoad { chain };
        assert_eq!(err.to_string(), "cyclic topic load: a/one -> a/two -> a/one");
    }

    #[test]
    fn root_unwraps_nested_callbacks() {
        let inner = IngestError::UnknownTable {
            table: "nowhere".to_owned(),
        };
        let err = IngestError::Callback {
            topic: TopicName::new("x/y").unwrap(),
            source: Box::new(inner),
        };
        assert!(matches!(err.root(), IngestError::UnknownTable { .. }));
        assert!(err.to_string().contains("x/y"));
    }

    #[test]
    fn geometry_errors_map_to_ingest_variants() {
        let err = IngestError::from(GeometryError::Unavailable {
            object: 4,
            accessor: "area",
        });
        assert!(matches!(err, IngestError::GeometryUnavailable { object: 4, .. }));
    }
}
