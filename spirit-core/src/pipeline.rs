//! Per-geometry-class callback lists and the row emitter callbacks write to.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::{GeometryClass, IngestError, InputObject, Row, RowValues, Schema, TopicName};

/// Callback run for every object of the class it was registered for.
pub type Callback =
    Arc<dyn Fn(&InputObject, &mut PassData, &mut Emitter<'_>) -> Result<(), IngestError> + Send + Sync>;

#[derive(Clone)]
struct PipelineEntry {
    topic: TopicName,
    callback: Callback,
}

/// Ordered callbacks for each geometry class.
///
/// Callbacks run in registration order. Every callback of one pass shares
/// a single [`PassData`].
#[derive(Clone, Default)]
pub struct CallbackPipeline {
    entries: [Vec<PipelineEntry>; 4],
}

impl fmt::Debug for CallbackPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for class in GeometryClass::ALL {
            map.entry(&class, &self.topics(class).collect::<Vec<_>>());
        }
        map.finish()
    }
}

impl CallbackPipeline {
    /// Append `callback` to the list for `class`.
    pub fn register<F>(&mut self, class: GeometryClass, topic: TopicName, callback: F)
    where
        F: Fn(&InputObject, &mut PassData, &mut Emitter<'_>) -> Result<(), IngestError>
            + Send
            + Sync
            + 'static,
    {
        self.push(class, topic, Arc::new(callback));
    }

    pub(crate) fn push(&mut self, class: GeometryClass, topic: TopicName, callback: Callback) {
        log::debug!("topic '{topic}' registered a {class} callback");
        self.entries[class.slot()].push(PipelineEntry { topic, callback });
    }

    /// Owning topics of the callbacks for `class`, in execution order.
    pub fn topics(&self, class: GeometryClass) -> impl Iterator<Item = &TopicName> {
        self.entries[class.slot()].iter().map(|entry| &entry.topic)
    }

    /// Number of callbacks registered for `class`.
    pub fn len(&self, class: GeometryClass) -> usize {
        self.entries[class.slot()].len()
    }

    /// Whether no callback is registered for any class.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Vec::is_empty)
    }

    /// Run every callback for the object's class and collect the rows.
    ///
    /// The first failing callback aborts the pass; its error is wrapped in
    /// [`IngestError::Callback`].
    pub fn run(&self, schema: &Schema, object: &InputObject) -> Result<Vec<Row>, IngestError> {
        let mut pass = PassData::default();
        let mut rows = Vec::new();
        for entry in &self.entries[object.class().slot()] {
            let mut emitter = Emitter::new(schema, object, &entry.topic, &mut rows);
            (entry.callback)(object, &mut pass, &mut emitter).map_err(|source| {
                IngestError::Callback {
                    topic: entry.topic.clone(),
                    source: Box::new(source),
                }
            })?;
        }
        Ok(rows)
    }

    /// Like [`CallbackPipeline::run`], but first check that the object has
    /// the expected class.
    pub fn run_as(
        &self,
        schema: &Schema,
        class: GeometryClass,
        object: &InputObject,
    ) -> Result<Vec<Row>, IngestError> {
        if object.class() != class {
            return Err(IngestError::GeometryClassMismatch {
                object: object.id(),
                accessor: "run_as",
                expected: class.as_str(),
                actual: object.class(),
            });
        }
        self.run(schema, object)
    }
}

/// Side channel shared by the callbacks of one object pass.
///
/// Earlier callbacks leave values or claims that later callbacks read.
/// Claims let one topic tell the rest that it has already handled an
/// aspect of the object, such as its address.
#[derive(Debug, Default)]
pub struct PassData {
    values: HashMap<String, String>,
    claims: HashSet<String>,
}

impl PassData {
    /// Store a value, replacing any earlier one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Stored value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Claim `key`. Returns `false` when it was already claimed.
    pub fn claim(&mut self, key: impl Into<String>) -> bool {
        self.claims.insert(key.into())
    }

    /// Whether `key` has been claimed in this pass.
    pub fn is_claimed(&self, key: &str) -> bool {
        self.claims.contains(key)
    }
}

/// Validating row writer handed to a single callback invocation.
pub struct Emitter<'a> {
    schema: &'a Schema,
    object: &'a InputObject,
    topic: &'a TopicName,
    rows: &'a mut Vec<Row>,
    written: HashSet<String>,
}

impl fmt::Debug for Emitter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("object", &self.object.id())
            .field("topic", self.topic)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl<'a> Emitter<'a> {
    fn new(
        schema: &'a Schema,
        object: &'a InputObject,
        topic: &'a TopicName,
        rows: &'a mut Vec<Row>,
    ) -> Self {
        Self {
            schema,
            object,
            topic,
            rows,
            written: HashSet::new(),
        }
    }

    /// Topic the current callback belongs to.
    pub const fn topic(&self) -> &TopicName {
        self.topic
    }

    /// Append a row for `table`.
    ///
    /// Every value must name a declared column and fit its type. A callback
    /// may write at most one row per table per object.
    pub fn insert(&mut self, table: &str, values: RowValues) -> Result<(), IngestError> {
        let definition = self
            .schema
            .table(table)
            .ok_or_else(|| IngestError::UnknownTable {
                table: table.to_owned(),
            })?;
        for (column, value) in values.iter() {
            let declared = definition
                .column(column)
                .ok_or_else(|| IngestError::UnknownColumn {
                    table: table.to_owned(),
                    column: column.to_owned(),
                })?;
            if !value.matches(declared.column_type()) {
                return Err(IngestError::ColumnTypeMismatch {
                    table: table.to_owned(),
                    column: column.to_owned(),
                    expected: declared.column_type().to_string(),
                    actual: value.type_name(),
                });
            }
        }
        if !self.written.insert(table.to_owned()) {
            return Err(IngestError::DuplicateRow {
                table: table.to_owned(),
                object: self.object.id(),
            });
        }
        self.rows.push(Row::new(
            definition.name().clone(),
            self.object.id(),
            self.topic.clone(),
            values,
        ));
        Ok(())
    }
}
