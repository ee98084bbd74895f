//! `shortbread_v1/pois`: points of interest.
//!
//! A tagged node becomes a POI when it carries an `amenity`, `shop`,
//! `tourism` or `leisure` tag. Its address is written onto the POI row and
//! claimed, so `shortbread_v1/addresses` loaded afterwards skips it.

use spirit_core::{
    ColumnDefinition, ComposeError, GeometryClass, GeometryKind, IdKind, IndexDefinition,
    RowValues, TableDefinition, TableName, TopicConfig, TopicContext, TopicDescriptor, TopicName,
};

use crate::name_fallback::{self, name_columns, name_values};

/// Catalog name of the topic.
pub const NAME: &str = "shortbread_v1/pois";

/// Output table.
pub const TABLE: &str = "pois";

/// Pass-data claim set when an object's address has been written.
pub const ADDRESS_CLAIM: &str = "address";

const KIND_KEYS: [&str; 4] = ["amenity", "shop", "tourism", "leisure"];

pub(crate) fn descriptor() -> Result<TopicDescriptor, ComposeError> {
    Ok(
        TopicDescriptor::new(TopicName::new(NAME)?, "points of interest", init)
            .with_runs_after(TopicName::new(name_fallback::NAME)?),
    )
}

fn init(ctx: &mut TopicContext<'_>, config: &TopicConfig) -> Result<(), ComposeError> {
    config.require_empty(ctx.topic())?;
    let names = name_columns(ctx);
    let columns = KIND_KEYS
        .iter()
        .copied()
        .chain(names.iter().map(String::as_str))
        .chain(["housenumber", "housename"]);
    let mut table = TableDefinition::new(
        TableName::new(TABLE).map_err(|source| schema_error(ctx, source))?,
        IdKind::Point,
        GeometryKind::Point,
    );
    for column in columns {
        let column = ColumnDefinition::text(column).map_err(|source| schema_error(ctx, source))?;
        table = table.with_column(column);
    }
    ctx.declare_table(table.with_index(IndexDefinition::spatial("geom")))?;

    ctx.register(GeometryClass::Point, move |object, pass, emit| {
        if KIND_KEYS.iter().all(|key| object.tag(key).is_none()) {
            return Ok(());
        }
        let mut values = RowValues::new().set("geom", object.as_point()?);
        for key in KIND_KEYS {
            values = values.set_opt(key, object.tag(key));
        }
        let (values, _) = name_values(object, pass, &names, values);
        let housenumber = object.tag("addr:housenumber");
        let housename = object.tag("addr:housename");
        if housenumber.is_some() || housename.is_some() {
            pass.claim(ADDRESS_CLAIM);
        }
        let values = values
            .set_opt("housenumber", housenumber)
            .set_opt("housename", housename);
        emit.insert(TABLE, values)
    });
    Ok(())
}

fn schema_error(ctx: &TopicContext<'_>, source: spirit_core::SchemaError) -> ComposeError {
    ComposeError::Schema {
        topic: ctx.topic().clone(),
        source,
    }
}
