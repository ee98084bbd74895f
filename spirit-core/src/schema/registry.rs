//! Mutable table registry used during composition.

use std::collections::HashMap;

use log::debug;

use super::{ColumnDefinition, IndexDefinition, Schema, SchemaError, SchemaTable, TableDefinition, TableName};
use crate::TopicName;

/// Opaque reference to a declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableHandle(usize);

#[derive(Debug, Clone)]
struct TableEntry {
    owner: TopicName,
    declared: TableDefinition,
    current: TableDefinition,
}

/// Accumulates table definitions contributed by topics.
///
/// Every mutation names the topic performing it. Only the topic that
/// declared a table may append columns or indexes to it.
///
/// # Examples
/// ```
/// use spirit_core::{GeometryKind, IdKind, IndexDefinition, SchemaError, SchemaRegistry, TableDefinition, TableName, TopicName};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let owner = TopicName::new("shortbread_v1/water")?;
/// let mut registry = SchemaRegistry::default();
/// let water = TableDefinition::new(TableName::new("water")?, IdKind::Area, GeometryKind::MultiPolygon);
/// let handle = registry.declare_table(&owner, water)?;
///
/// let err = registry
///     .add_index(&owner, handle, IndexDefinition::spatial("missing"))
///     .unwrap_err();
/// assert!(matches!(err, SchemaError::UnknownColumn { .. }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: Vec<TableEntry>,
    by_name: HashMap<TableName, usize>,
}

impl SchemaRegistry {
    /// Declare a table on behalf of `owner`.
    ///
    /// Re-declaring a table with exactly the definition it was first declared
    /// with returns the existing handle. Any other clash is a
    /// [`SchemaError::DuplicateTable`].
    pub fn declare_table(
        &mut self,
        owner: &TopicName,
        definition: TableDefinition,
    ) -> Result<TableHandle, SchemaError> {
        definition.validate()?;
        if let Some(&slot) = self.by_name.get(definition.name()) {
            let entry = self.entry(TableHandle(slot))?;
            if entry.declared == definition {
                debug!(
                    "table '{}' re-declared by '{owner}' with an identical definition",
                    definition.name()
                );
                return Ok(TableHandle(slot));
            }
            return Err(SchemaError::DuplicateTable {
                table: definition.name().clone(),
                owner: entry.owner.clone(),
            });
        }
        let slot = self.tables.len();
        debug!("topic '{owner}' declared table '{}'", definition.name());
        self.by_name.insert(definition.name().clone(), slot);
        self.tables.push(TableEntry {
            owner: owner.clone(),
            declared: definition.clone(),
            current: definition,
        });
        Ok(TableHandle(slot))
    }

    /// Append a column to a table owned by `owner`.
    pub fn add_column(
        &mut self,
        owner: &TopicName,
        handle: TableHandle,
        column: ColumnDefinition,
    ) -> Result<(), SchemaError> {
        self.owned_entry(owner, handle)?.current.push_column(column)
    }

    /// Append an index to a table owned by `owner`.
    pub fn add_index(
        &mut self,
        owner: &TopicName,
        handle: TableHandle,
        index: IndexDefinition,
    ) -> Result<(), SchemaError> {
        self.owned_entry(owner, handle)?.current.push_index(index)
    }

    /// Handle of the table called `name`, if declared.
    pub fn handle(&self, name: &str) -> Option<TableHandle> {
        self.by_name.get(name).copied().map(TableHandle)
    }

    /// Current definition of a declared table.
    pub fn table(&self, handle: TableHandle) -> Result<&TableDefinition, SchemaError> {
        self.entry(handle).map(|entry| &entry.current)
    }

    /// Number of declared tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table has been declared.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Freeze the registry into a read-only [`Schema`].
    pub fn freeze(self) -> Schema {
        Schema::new(
            self.tables
                .into_iter()
                .map(|entry| SchemaTable::new(entry.owner, entry.current))
                .collect(),
        )
    }

    fn entry(&self, handle: TableHandle) -> Result<&TableEntry, SchemaError> {
        self.tables
            .get(handle.0)
            .ok_or(SchemaError::UnknownTable { handle: handle.0 })
    }

    fn owned_entry(
        &mut self,
        topic: &TopicName,
        handle: TableHandle,
    ) -> Result<&mut TableEntry, SchemaError> {
        let entry = self
            .tables
            .get_mut(handle.0)
            .ok_or(SchemaError::UnknownTable { handle: handle.0 })?;
        if &entry.owner != topic {
            return Err(SchemaError::TableNotOwned {
                table: entry.current.name().clone(),
                owner: entry.owner.clone(),
                topic: topic.clone(),
            });
        }
        Ok(entry)
    }
}
