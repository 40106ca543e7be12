//! Streaming parser for Overpass XML responses.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::graph::{GeoGraph, OsmMember, OsmNode, OsmRelation, OsmType, OsmWay, Tags};

fn get_attr_value(event: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn required_id(event: &BytesStart<'_>) -> Result<i64> {
    get_attr_value(event, b"id")?
        .and_then(|v| v.parse::<i64>().ok())
        .context("element without a parseable id")
}

/// Parse a raw Overpass XML payload into a [`GeoGraph`].
///
/// Elements missing an id or (for nodes) a coordinate are dropped
/// rather than failing the whole document; Overpass `out skel`
/// sections routinely omit tags but never ids.
pub fn parse_osm(xml: &str) -> Result<GeoGraph> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut graph = GeoGraph::default();
    let mut current_node: Option<OsmNode> = None;
    let mut current_way: Option<OsmWay> = None;
    let mut current_relation: Option<OsmRelation> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                open_element(&e, &mut current_node, &mut current_way, &mut current_relation)?;
            }
            Event::Empty(e) => {
                open_element(&e, &mut current_node, &mut current_way, &mut current_relation)?;
                close_element(
                    e.name().as_ref(),
                    &mut graph,
                    &mut current_node,
                    &mut current_way,
                    &mut current_relation,
                );
            }
            Event::End(e) => {
                close_element(
                    e.name().as_ref(),
                    &mut graph,
                    &mut current_node,
                    &mut current_way,
                    &mut current_relation,
                );
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(graph)
}

fn open_element(
    e: &BytesStart<'_>,
    current_node: &mut Option<OsmNode>,
    current_way: &mut Option<OsmWay>,
    current_relation: &mut Option<OsmRelation>,
) -> Result<()> {
    match e.name().as_ref() {
        b"node" => {
            let id = required_id(e)?;
            let lon = get_attr_value(e, b"lon")?.and_then(|v| v.parse::<f64>().ok());
            let lat = get_attr_value(e, b"lat")?.and_then(|v| v.parse::<f64>().ok());
            if let (Some(lon), Some(lat)) = (lon, lat) {
                *current_node = Some(OsmNode {
                    id,
                    lon,
                    lat,
                    tags: Tags::new(),
                });
            }
        }
        b"way" => {
            *current_way = Some(OsmWay {
                id: required_id(e)?,
                ..OsmWay::default()
            });
        }
        b"relation" => {
            *current_relation = Some(OsmRelation {
                id: required_id(e)?,
                ..OsmRelation::default()
            });
        }
        b"nd" => {
            if let Some(way) = current_way.as_mut() {
                if let Some(r) = get_attr_value(e, b"ref")?.and_then(|v| v.parse::<i64>().ok()) {
                    way.node_refs.push(r);
                }
            }
        }
        b"member" => {
            if let Some(rel) = current_relation.as_mut() {
                let member_type = match get_attr_value(e, b"type")?.as_deref() {
                    Some("node") => Some(OsmType::Node),
                    Some("way") => Some(OsmType::Way),
                    Some("relation") => Some(OsmType::Relation),
                    _ => None,
                };
                let member_ref =
                    get_attr_value(e, b"ref")?.and_then(|v| v.parse::<i64>().ok());
                if let (Some(member_type), Some(member_ref)) = (member_type, member_ref) {
                    rel.members.push(OsmMember {
                        member_type,
                        member_ref,
                        role: get_attr_value(e, b"role")?.unwrap_or_default(),
                    });
                }
            }
        }
        b"tag" => {
            let key = get_attr_value(e, b"k")?;
            let value = get_attr_value(e, b"v")?;
            if let (Some(key), Some(value)) = (key, value) {
                if let Some(node) = current_node.as_mut() {
                    node.tags.insert(key, value);
                } else if let Some(way) = current_way.as_mut() {
                    way.tags.insert(key, value);
                } else if let Some(rel) = current_relation.as_mut() {
                    rel.tags.insert(key, value);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn close_element(
    name: &[u8],
    graph: &mut GeoGraph,
    current_node: &mut Option<OsmNode>,
    current_way: &mut Option<OsmWay>,
    current_relation: &mut Option<OsmRelation>,
) {
    match name {
        b"node" => {
            if let Some(node) = current_node.take() {
                graph.nodes.push(node);
            }
        }
        b"way" => {
            if let Some(way) = current_way.take() {
                graph.ways.push(way);
            }
        }
        b"relation" => {
            if let Some(rel) = current_relation.take() {
                graph.relations.push(rel);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="11" lon="117.30" lat="31.86">
    <tag k="place" v="town"/>
    <tag k="name" v="Mingguang"/>
  </node>
  <node id="12" lon="117.31" lat="31.87"/>
  <way id="21">
    <nd ref="11"/>
    <nd ref="12"/>
    <tag k="highway" v="primary"/>
  </way>
  <relation id="31">
    <member type="node" ref="11" role="admin_centre"/>
    <member type="way" ref="21" role="outer"/>
    <tag k="boundary" v="administrative"/>
    <tag k="name" v="Mingguang"/>
  </relation>
</osm>"#;

    #[test]
    fn test_parse_counts_elements() {
        let graph = parse_osm(SAMPLE).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.ways.len(), 1);
        assert_eq!(graph.relations.len(), 1);
    }

    #[test]
    fn test_parse_node_tags_and_coords() {
        let graph = parse_osm(SAMPLE).unwrap();
        let node = &graph.nodes[0];
        assert_eq!(node.id, 11);
        assert_eq!(node.lon, 117.30);
        assert_eq!(node.lat, 31.86);
        assert_eq!(node.tags.get("name").map(String::as_str), Some("Mingguang"));
        // The skeleton node carries no tags.
        assert!(graph.nodes[1].tags.is_empty());
    }

    #[test]
    fn test_parse_way_refs() {
        let graph = parse_osm(SAMPLE).unwrap();
        let way = &graph.ways[0];
        assert_eq!(way.node_refs, vec![11, 12]);
        assert_eq!(way.tags.get("highway").map(String::as_str), Some("primary"));
    }

    #[test]
    fn test_parse_relation_members() {
        let graph = parse_osm(SAMPLE).unwrap();
        let rel = &graph.relations[0];
        assert_eq!(rel.id, 31);
        assert_eq!(rel.members.len(), 2);
        assert_eq!(rel.members[0].member_type, OsmType::Node);
        assert_eq!(rel.members[0].member_ref, 11);
        assert_eq!(rel.members[0].role, "admin_centre");
    }

    #[test]
    fn test_parse_empty_document() {
        let graph = parse_osm(r#"<osm version="0.6"></osm>"#).unwrap();
        assert!(graph.is_empty());
    }
}
