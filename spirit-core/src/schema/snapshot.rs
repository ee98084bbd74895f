//! Frozen schema handed to sinks and the ingestion pipeline.

use serde::Serialize;

use super::TableDefinition;
use crate::TopicName;

/// A table together with the topic that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaTable {
    owner: TopicName,
    #[serde(flatten)]
    definition: TableDefinition,
}

impl SchemaTable {
    pub(crate) const fn new(owner: TopicName, definition: TableDefinition) -> Self {
        Self { owner, definition }
    }

    /// Topic that declared the table.
    pub const fn owner(&self) -> &TopicName {
        &self.owner
    }

    /// Final table definition.
    pub const fn definition(&self) -> &TableDefinition {
        &self.definition
    }
}

/// Read-only schema produced by a successful composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    tables: Vec<SchemaTable>,
}

impl Schema {
    pub(crate) const fn new(tables: Vec<SchemaTable>) -> Self {
        Self { tables }
    }

    /// Table definitions in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDefinition> {
        self.tables.iter().map(SchemaTable::definition)
    }

    /// Tables with their owners, in declaration order.
    pub fn entries(&self) -> &[SchemaTable] {
        &self.tables
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables()
            .find(|definition| definition.name().as_str() == name)
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
