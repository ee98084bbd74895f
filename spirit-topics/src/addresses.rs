//! `shortbread_v1/addresses`: standalone address points.
//!
//! Must be loaded after `shortbread_v1/pois`: addresses already written
//! onto a POI row are claimed by that topic and skipped here. Loading it
//! first makes every POI address appear in both tables.

use spirit_core::{
    ColumnDefinition, ComposeError, GeometryClass, GeometryKind, IdKind, IndexDefinition,
    RowValues, TableDefinition, TableName, TopicConfig, TopicContext, TopicDescriptor, TopicName,
};

use crate::pois::{self, ADDRESS_CLAIM};

/// Catalog name of the topic.
pub const NAME: &str = "shortbread_v1/addresses";

/// Output table.
pub const TABLE: &str = "addresses";

pub(crate) fn descriptor() -> Result<TopicDescriptor, ComposeError> {
    Ok(
        TopicDescriptor::new(TopicName::new(NAME)?, "address points", init)
            .with_runs_after(TopicName::new(pois::NAME)?),
    )
}

fn init(ctx: &mut TopicContext<'_>, config: &TopicConfig) -> Result<(), ComposeError> {
    config.require_empty(ctx.topic())?;
    let build = || -> Result<TableDefinition, spirit_core::SchemaError> {
        Ok(TableDefinition::new(TableName::new(TABLE)?, IdKind::Point, GeometryKind::Point)
            .with_column(ColumnDefinition::text("housenumber")?)
            .with_column(ColumnDefinition::text("housename")?)
            .with_index(IndexDefinition::spatial("geom")))
    };
    let table = build().map_err(|source| ComposeError::Schema {
        topic: ctx.topic().clone(),
        source,
    })?;
    ctx.declare_table(table)?;

    ctx.register(GeometryClass::Point, |object, pass, emit| {
        let housenumber = object.tag("addr:housenumber");
        let housename = object.tag("addr:housename");
        if housenumber.is_none() && housename.is_none() {
            return Ok(());
        }
        if !pass.claim(ADDRESS_CLAIM) {
            log::trace!("address of object {} already claimed", object.id());
            return Ok(());
        }
        let values = RowValues::new()
            .set("geom", object.as_point()?)
            .set_opt("housenumber", housenumber)
            .set_opt("housename", housename);
        emit.insert(TABLE, values)
    });
    Ok(())
}
