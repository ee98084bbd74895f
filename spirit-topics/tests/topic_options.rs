//! Option handling and schema shape of the built-in topics.

use rstest::rstest;
use spirit_core::{
    ColumnType, ComposeError, GeometryClass, GeometryKind, MemorySink, SchemaError, TopicConfig,
    TopicName, TopicRequest, compose,
    test_support::{StaticGeometry, object},
};
use spirit_topics::builtin_catalog;

fn request(name: &str, config: TopicConfig) -> TopicRequest {
    TopicRequest::new(TopicName::new(name).expect("valid topic name")).with_config(config)
}

#[rstest]
#[case("shortbread_v1/landuse")]
#[case("shortbread_v1/pois")]
#[case("shortbread_v1/addresses")]
#[case("shortbread_v1/ocean")]
#[case("core/name-with-fallback")]
fn unknown_options_are_rejected(#[case] topic: &str) {
    let catalog = builtin_catalog().expect("catalog builds");
    let config = TopicConfig::new().with("colour", "blue");
    let err = compose(&catalog, &[request(topic, config)]).expect_err("option rejected");
    assert!(
        matches!(&err, ComposeError::InvalidConfiguration { topic: name, .. } if name.as_str() == topic),
        "unexpected error: {err}"
    );
}

#[test]
fn ocean_rejects_invalid_table_names() {
    let catalog = builtin_catalog().expect("catalog builds");
    let config = TopicConfig::new().with("name", "Open Sea");
    let err = compose(&catalog, &[request("shortbread_v1/ocean", config)]).expect_err("bad name");
    assert!(matches!(
        err,
        ComposeError::Schema {
            source: SchemaError::InvalidIdentifier { .. },
            ..
        }
    ));
}

#[test]
fn ocean_declares_tile_coordinates() {
    let catalog = builtin_catalog().expect("catalog builds");
    let theme = compose(&catalog, &[request("shortbread_v1/ocean", TopicConfig::new())])
        .expect("composes");
    let ocean = theme.schema().table("ocean").expect("ocean table");
    assert_eq!(
        ocean.column("x").map(|column| column.column_type()),
        Some(ColumnType::Integer)
    );
    assert_eq!(ocean.geometry(), GeometryKind::MultiPolygon);
    assert!(theme.pipeline().is_empty());
}

#[test]
fn landuse_without_fallbacks_uses_a_plain_name_column() {
    let catalog = builtin_catalog().expect("catalog builds");
    let theme = compose(&catalog, &[request("shortbread_v1/landuse", TopicConfig::new())])
        .expect("composes");
    let landuse = theme.schema().table("landuse").expect("landuse table");
    let names: Vec<_> = landuse.columns().iter().map(|column| column.name()).collect();
    assert_eq!(names, ["geom", "landuse", "natural", "name", "way_area", "point"]);
}

#[test]
fn landuse_with_default_fallbacks_has_localised_columns() {
    let catalog = builtin_catalog().expect("catalog builds");
    let requests = [
        request("core/name-with-fallback", TopicConfig::new()),
        request("shortbread_v1/landuse", TopicConfig::new()),
    ];
    let theme = compose(&catalog, &requests).expect("composes");
    let landuse = theme.schema().table("landuse").expect("landuse table");
    for column in ["name", "name_de", "name_en"] {
        assert!(landuse.column(column).is_some(), "missing {column}");
    }
}

#[rstest]
#[case(&[("landuse", "forest")], 1)]
#[case(&[("natural", "wood")], 1)]
#[case(&[("landuse", "parking")], 0)]
#[case(&[("building", "yes")], 0)]
fn landuse_qualification(#[case] pairs: &[(&str, &str)], #[case] expected: usize) {
    let catalog = builtin_catalog().expect("catalog builds");
    let theme = compose(&catalog, &[request("shortbread_v1/landuse", TopicConfig::new())])
        .expect("composes");
    let tags = pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let area = spirit_core::InputObject::new(9, GeometryClass::Area, tags, StaticGeometry::square(2.0));
    let mut sink = MemorySink::default();
    assert_eq!(theme.process(&area, &mut sink).expect("processes"), expected);
}

#[test]
fn unnamed_landuse_has_no_label_point() {
    let catalog = builtin_catalog().expect("catalog builds");
    let theme = compose(&catalog, &[request("shortbread_v1/landuse", TopicConfig::new())])
        .expect("composes");
    let area = object(5, GeometryClass::Area, [("landuse", "meadow")], StaticGeometry::square(3.0));
    let mut sink = MemorySink::default();
    theme.process(&area, &mut sink).expect("processes");
    let row = sink.rows().first().expect("one row");
    assert!(row.get("point").is_none());
    assert!(row.get("name").is_none());
}

#[test]
fn landuse_polygon_without_geometry_is_fatal() {
    let catalog = builtin_catalog().expect("catalog builds");
    let theme = compose(&catalog, &[request("shortbread_v1/landuse", TopicConfig::new())])
        .expect("composes");
    let area = object(6, GeometryClass::Area, [("landuse", "meadow")], StaticGeometry::empty());
    let mut sink = MemorySink::default();
    let err = theme.process(&area, &mut sink).expect_err("geometry missing");
    assert!(matches!(
        err.root(),
        spirit_core::IngestError::GeometryUnavailable { object: 6, .. }
    ));
}
