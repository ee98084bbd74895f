//! `shortbread_v1/ocean`: ocean polygon table.
//!
//! Ocean polygons come from a pre-processed coastline dataset rather than
//! OSM objects, so the topic only declares the table. The `name` option
//! overrides the table name.

use serde::Deserialize;
use spirit_core::{
    ColumnDefinition, ColumnType, ComposeError, GeometryKind, IdKind, IndexDefinition,
    SchemaError, TableDefinition, TableName, TopicConfig, TopicContext, TopicDescriptor,
    TopicName,
};

/// Catalog name of the topic.
pub const NAME: &str = "shortbread_v1/ocean";

/// Default output table.
pub const DEFAULT_TABLE: &str = "ocean";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Options {
    #[serde(default = "default_name")]
    name: String,
}

fn default_name() -> String {
    DEFAULT_TABLE.to_owned()
}

pub(crate) fn descriptor() -> Result<TopicDescriptor, ComposeError> {
    Ok(TopicDescriptor::new(
        TopicName::new(NAME)?,
        "ocean polygons from the coastline dataset",
        init,
    ))
}

fn table(name: String) -> Result<TableDefinition, SchemaError> {
    Ok(
        TableDefinition::new(TableName::new(name)?, IdKind::Area, GeometryKind::MultiPolygon)
            .with_column(ColumnDefinition::new("x", ColumnType::Integer)?)
            .with_column(ColumnDefinition::new("y", ColumnType::Integer)?)
            .with_index(IndexDefinition::spatial("geom")),
    )
}

fn init(ctx: &mut TopicContext<'_>, config: &TopicConfig) -> Result<(), ComposeError> {
    let options: Options = config.parse(ctx.topic())?;
    let definition = table(options.name).map_err(|source| ComposeError::Schema {
        topic: ctx.topic().clone(),
        source,
    })?;
    ctx.declare_table(definition)?;
    Ok(())
}
