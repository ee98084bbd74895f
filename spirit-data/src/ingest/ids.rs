//! Object identifiers shared by every geometry class.
//!
//! OSM numbers nodes, ways and relations independently, so the top two bits
//! of an object id carry the element type: `00` node, `01` way, `10`
//! relation. The remaining 62 bits hold the raw OSM id.

use log::warn;

const WAY_ID_PREFIX: u64 = 1 << 62;
const REL_ID_PREFIX: u64 = 1 << 63;
const TYPE_ID_MASK: u64 = (1 << 62) - 1;

/// Kind of OSM element an object id was derived from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OsmElementKind {
    /// A node.
    Node,
    /// A way.
    Way,
    /// A relation.
    Relation,
}

/// Encode a raw OSM id, returning `None` for ids outside the 62-bit range.
pub fn encode_element_id(kind: OsmElementKind, raw_id: i64) -> Option<u64> {
    let Ok(base) = u64::try_from(raw_id) else {
        warn!("skipped OSM {kind:?} {raw_id}: negative identifiers are unsupported");
        return None;
    };
    if base > TYPE_ID_MASK {
        warn!("skipped OSM {kind:?} {raw_id}: exceeds supported maximum {TYPE_ID_MASK}");
        return None;
    }
    let prefix = match kind {
        OsmElementKind::Node => 0,
        OsmElementKind::Way => WAY_ID_PREFIX,
        OsmElementKind::Relation => REL_ID_PREFIX,
    };
    Some(prefix | base)
}

/// Split an encoded object id into its element kind and raw OSM id.
///
/// # Examples
/// ```
/// use spirit_data::{OsmElementKind, decode_element_id, encode_element_id};
///
/// let id = encode_element_id(OsmElementKind::Way, 42).expect("in range");
/// assert_eq!(decode_element_id(id), (OsmElementKind::Way, 42));
/// ```
pub fn decode_element_id(id: u64) -> (OsmElementKind, i64) {
    let kind = match id & !TYPE_ID_MASK {
        0 => OsmElementKind::Node,
        WAY_ID_PREFIX => OsmElementKind::Way,
        _ => OsmElementKind::Relation,
    };
    let raw = i64::try_from(id & TYPE_ID_MASK).unwrap_or(i64::MAX);
    (kind, raw)
}

/// Identifier written to the `osm_id` column: nodes and ways keep their raw
/// id, relations are negated so they never collide with ways in area tables.
pub fn storage_id(id: u64) -> i64 {
    match decode_element_id(id) {
        (OsmElementKind::Relation, raw) => -raw,
        (_, raw) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OsmElementKind::Node, 7, 7)]
    #[case(OsmElementKind::Way, 7, 7)]
    #[case(OsmElementKind::Relation, 7, -7)]
    fn storage_ids_keep_the_raw_value(
        #[case] kind: OsmElementKind,
        #[case] raw: i64,
        #[case] expected: i64,
    ) {
        let id = encode_element_id(kind, raw).expect("in range");
        assert_eq!(decode_element_id(id), (kind, raw));
        assert_eq!(storage_id(id), expected);
    }

    #[rstest]
    #[case(-1)]
    #[case(i64::MAX)]
    fn rejects_out_of_range_ids(#[case] raw: i64) {
        assert_eq!(encode_element_id(OsmElementKind::Node, raw), None);
    }

    #[test]
    fn element_kinds_do_not_collide() {
        let node = encode_element_id(OsmElementKind::Node, 1);
        let way = encode_element_id(OsmElementKind::Way, 1);
        let relation = encode_element_id(OsmElementKind::Relation, 1);
        assert_ne!(node, way);
        assert_ne!(way, relation);
    }
}
