//! Turns OSM elements into [`InputObject`]s.
//!
//! Node coordinates are cached as they stream past so that ways, which
//! follow nodes in a sorted PBF, can resolve their refs in a single pass.
use std::collections::HashMap;

use geo::{Coord, Point};
use log::warn;
use osmpbf::Element;
use spirit_core::{GeometryClass, InputObject};

use super::OsmIngestSummary;
use super::ids::{OsmElementKind, encode_element_id};
use super::tags::{collect_tags, is_area};
use crate::geometry::{ProjectedGeometry, project};

#[derive(Debug, Default)]
pub(super) struct ObjectBuilder {
    summary: OsmIngestSummary,
    nodes: HashMap<i64, Coord<f64>>,
}

impl ObjectBuilder {
    pub(super) fn process_element(&mut self, element: Element<'_>) -> Option<InputObject> {
        match element {
            Element::Node(node) => self.process_node(node.id(), node.lon(), node.lat(), node.tags()),
            Element::DenseNode(node) => {
                self.process_node(node.id(), node.lon(), node.lat(), node.tags())
            }
            Element::Way(way) => {
                let refs: Vec<i64> = way.refs().collect();
                self.process_way(way.id(), &refs, way.tags())
            }
            Element::Relation(relation) => self.process_relation(relation.id(), relation.tags()),
        }
    }

    pub(super) fn process_node<'a, T>(
        &mut self,
        raw_id: i64,
        lon: f64,
        lat: f64,
        tags: T,
    ) -> Option<InputObject>
    where
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.summary.record_node(lon, lat);
        let location = validated_coord(lon, lat).map(|coord| project(coord.x, coord.y))?;
        self.nodes.insert(raw_id, location);

        let tags = collect_tags(tags);
        if tags.is_empty() {
            return None;
        }
        let id = encode_element_id(OsmElementKind::Node, raw_id)?;
        let geometry = ProjectedGeometry::Point(Point::from(location));
        Some(InputObject::new(id, GeometryClass::Point, tags, geometry))
    }

    pub(super) fn process_way<'a, T>(
        &mut self,
        raw_id: i64,
        refs: &[i64],
        tags: T,
    ) -> Option<InputObject>
    where
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.summary.record_way();
        let tags = collect_tags(tags);
        if tags.is_empty() {
            return None;
        }
        let id = encode_element_id(OsmElementKind::Way, raw_id)?;

        let coords: Option<Vec<Coord<f64>>> =
            refs.iter().map(|node| self.nodes.get(node).copied()).collect();
        let Some(coords) = coords else {
            warn!("skipped way {raw_id}: references nodes without coordinates");
            self.summary.skipped += 1;
            return None;
        };

        let area = is_area(&tags, refs);
        let geometry = ProjectedGeometry::from_coords(coords, area);
        if geometry == ProjectedGeometry::Empty {
            warn!("skipped way {raw_id}: too few nodes for its geometry");
            self.summary.skipped += 1;
            return None;
        }
        let class = if area {
            GeometryClass::Area
        } else {
            GeometryClass::Line
        };
        Some(InputObject::new(id, class, tags, geometry))
    }

    pub(super) fn process_relation<'a, T>(&mut self, raw_id: i64, tags: T) -> Option<InputObject>
    where
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.summary.record_relation();
        let tags = collect_tags(tags);
        if tags.is_empty() {
            return None;
        }
        let id = encode_element_id(OsmElementKind::Relation, raw_id)?;
        Some(InputObject::new(
            id,
            GeometryClass::Relation,
            tags,
            ProjectedGeometry::Empty,
        ))
    }

    pub(super) fn record_rows(&mut self, rows: usize) {
        self.summary.objects += 1;
        self.summary.rows += u64::try_from(rows).unwrap_or(u64::MAX);
    }

    pub(super) fn into_summary(self) -> OsmIngestSummary {
        self.summary
    }
}

pub(super) fn validated_coord(lon: f64, lat: f64) -> Option<Coord<f64>> {
    (lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat))
    .then_some(Coord { x: lon, y: lat })
}
