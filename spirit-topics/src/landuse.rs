//! `shortbread_v1/landuse`: land use and natural land cover polygons.
//!
//! Takes no options. Load `core/name-with-fallback` first to get localised
//! name columns; otherwise the table carries a plain `name` column.

use spirit_core::{
    ColumnDefinition, ColumnType, ComposeError, GeometryClass, GeometryKind, IdKind,
    IndexDefinition, RowValues, TableDefinition, TableName, TopicConfig, TopicContext,
    TopicDescriptor, TopicName,
};

use crate::name_fallback::{self, name_columns, name_values};

/// Catalog name of the topic.
pub const NAME: &str = "shortbread_v1/landuse";

/// Output table.
pub const TABLE: &str = "landuse";

const LANDUSE_VALUES: &[&str] = &[
    "allotments",
    "brownfield",
    "cemetery",
    "commercial",
    "construction",
    "farmland",
    "forest",
    "garages",
    "grass",
    "greenfield",
    "industrial",
    "landfill",
    "meadow",
    "orchard",
    "quarry",
    "railway",
    "recreation_ground",
    "religious",
    "residential",
    "retail",
    "village_green",
    "vineyard",
];

const NATURAL_VALUES: &[&str] = &[
    "bare_rock",
    "beach",
    "glacier",
    "grassland",
    "heath",
    "sand",
    "scree",
    "scrub",
    "shingle",
    "wetland",
    "wood",
];

pub(crate) fn descriptor() -> Result<TopicDescriptor, ComposeError> {
    Ok(TopicDescriptor::new(
        TopicName::new(NAME)?,
        "land use and natural land cover areas",
        init,
    )
    .with_runs_after(TopicName::new(name_fallback::NAME)?))
}

fn init(ctx: &mut TopicContext<'_>, config: &TopicConfig) -> Result<(), ComposeError> {
    config.require_empty(ctx.topic())?;
    let schema_error = |source| ComposeError::Schema {
        topic: ctx.topic().clone(),
        source,
    };
    let names = name_columns(ctx);
    let mut table = TableDefinition::new(
        TableName::new(TABLE).map_err(schema_error)?,
        IdKind::Area,
        GeometryKind::MultiPolygon,
    )
    .with_column(ColumnDefinition::text("landuse").map_err(schema_error)?)
    .with_column(ColumnDefinition::text("natural").map_err(schema_error)?);
    for column in &names {
        table = table.with_column(ColumnDefinition::text(column.as_str()).map_err(schema_error)?);
    }
    table = table
        .with_column(ColumnDefinition::new("way_area", ColumnType::Real).map_err(schema_error)?)
        .with_column(
            ColumnDefinition::new("point", ColumnType::Geometry(GeometryKind::Point))
                .map_err(schema_error)?,
        )
        .with_index(IndexDefinition::spatial("geom"))
        .with_index(IndexDefinition::spatial("point"));
    ctx.declare_table(table)?;

    ctx.register(GeometryClass::Area, move |object, pass, emit| {
        let landuse = object
            .tag("landuse")
            .filter(|value| LANDUSE_VALUES.contains(value));
        let natural = object
            .tag("natural")
            .filter(|value| NATURAL_VALUES.contains(value));
        if landuse.is_none() && natural.is_none() {
            return Ok(());
        }
        let values = RowValues::new()
            .set("geom", object.as_polygon()?)
            .set_opt("landuse", landuse)
            .set_opt("natural", natural)
            .set("way_area", object.area()?);
        let (values, named) = name_values(object, pass, &names, values);
        let values = if named {
            values.set("point", object.label_point()?)
        } else {
            values
        };
        emit.insert(TABLE, values)
    });
    Ok(())
}
