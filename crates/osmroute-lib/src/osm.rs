//! Readers for raw OpenStreetMap data.
//!
//! Two encodings are accepted and detected from the buffer itself: OSM XML
//! (`.osm`, as exported by the editing API) and OSM PBF (`.osm.pbf`). Both
//! produce the same [`OsmData`] snapshot of node coordinates and ways. Only
//! the way attributes that matter for routing are retained; every other tag
//! is dropped while reading.

use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;

use osmpbf::{Element, ElementReader};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::projection::{GeoBounds, GeoPoint};

/// OpenStreetMap node identifier.
pub type OsmNodeId = i64;

/// OpenStreetMap way identifier.
pub type OsmWayId = i64;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Road classification derived from the `highway` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Unclassified,
    Small,
    Footway,
}

impl RoadClass {
    /// Classify a `highway` tag value. Returns `None` for values that do not
    /// describe a traversable road (`proposed`, `construction`, `platform`, ...).
    pub fn from_highway(value: &str) -> Option<Self> {
        let class = match value {
            "motorway" | "motorway_link" => RoadClass::Motorway,
            "trunk" | "trunk_link" => RoadClass::Trunk,
            "primary" | "primary_link" => RoadClass::Primary,
            "secondary" | "secondary_link" => RoadClass::Secondary,
            "tertiary" | "tertiary_link" => RoadClass::Tertiary,
            "residential" => RoadClass::Residential,
            "service" => RoadClass::Service,
            "unclassified" => RoadClass::Unclassified,
            "living_street" | "road" | "track" => RoadClass::Small,
            "footway" | "path" | "pedestrian" | "steps" | "cycleway" | "bridleway" => {
                RoadClass::Footway
            }
            _ => return None,
        };
        Some(class)
    }
}

/// Direction restriction of a way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OneWay {
    /// Traversable in both directions.
    #[default]
    No,
    /// Traversable only in the order of the way's node list.
    Forward,
    /// Traversable only against the order of the way's node list (`oneway=-1`).
    Backward,
}

/// Way-level attributes relevant to routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WayAttributes {
    /// `None` when the way is not a road (buildings, rivers, railways, ...).
    pub road_class: Option<RoadClass>,
    pub oneway: OneWay,
    /// The first and last node references coincide.
    pub closed: bool,
    /// Tagged `area=yes`; highway areas describe squares, not centre lines.
    pub area: bool,
}

impl WayAttributes {
    /// Attributes of a bidirectional road of the given class.
    pub fn road(class: RoadClass) -> Self {
        Self {
            road_class: Some(class),
            ..Self::default()
        }
    }

    /// Restrict travel to the direction of the node list.
    pub fn one_way(mut self) -> Self {
        self.oneway = OneWay::Forward;
        self
    }

    /// Whether the way contributes edges to the road graph.
    pub fn is_routable(&self) -> bool {
        self.road_class.is_some() && !self.area
    }
}

/// A raw ordered list of node references with its routing attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmWayId,
    pub refs: Vec<OsmNodeId>,
    pub attributes: WayAttributes,
}

impl Way {
    /// Create a way; the `closed` flag is derived from the reference list.
    pub fn new(id: OsmWayId, refs: Vec<OsmNodeId>, mut attributes: WayAttributes) -> Self {
        attributes.closed = is_closed(&refs);
        Self {
            id,
            refs,
            attributes,
        }
    }

    fn from_tags(id: OsmWayId, refs: Vec<OsmNodeId>, tags: RoutingTags) -> Self {
        Self::new(id, refs, tags.into_attributes())
    }
}

fn is_closed(refs: &[OsmNodeId]) -> bool {
    refs.len() >= 3 && refs.first() == refs.last()
}

/// In-memory snapshot of a parsed map buffer.
#[derive(Debug, Clone, Default)]
pub struct OsmData {
    /// Declared extent of the extract, when the source carries one.
    pub bounds: Option<GeoBounds>,
    pub nodes: HashMap<OsmNodeId, GeoPoint>,
    pub ways: Vec<Way>,
}

impl OsmData {
    /// Returns true when the buffer held neither nodes nor ways.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty()
    }

    /// Ways that contribute to the road graph, in source order.
    pub fn routable_ways(&self) -> impl Iterator<Item = &Way> {
        self.ways.iter().filter(|way| way.attributes.is_routable())
    }
}

/// Tags collected while reading a way. Everything else is ignored.
#[derive(Debug, Default)]
struct RoutingTags {
    highway: Option<String>,
    oneway: Option<String>,
    junction: Option<String>,
    area: Option<String>,
}

impl RoutingTags {
    fn record(&mut self, key: &str, value: &str) {
        let slot = match key {
            "highway" => &mut self.highway,
            "oneway" => &mut self.oneway,
            "junction" => &mut self.junction,
            "area" => &mut self.area,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    fn into_attributes(self) -> WayAttributes {
        let road_class = self.highway.as_deref().and_then(RoadClass::from_highway);
        let roundabout = self.junction.as_deref() == Some("roundabout");
        let oneway = match self.oneway.as_deref() {
            Some("yes" | "true" | "1") => OneWay::Forward,
            Some("-1" | "reverse") => OneWay::Backward,
            Some("no" | "false" | "0") => OneWay::No,
            _ if roundabout => OneWay::Forward,
            _ => OneWay::No,
        };

        WayAttributes {
            road_class,
            oneway,
            closed: false,
            area: self.area.as_deref() == Some("yes"),
        }
    }
}

/// Parse a raw map buffer, detecting XML or PBF encoding.
///
/// An empty (or whitespace-only) buffer yields empty [`OsmData`]. Individual
/// records with missing or malformed coordinates are skipped; structural
/// errors in the document are returned.
pub fn parse_osm(data: &[u8]) -> Result<OsmData> {
    let content = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let Some(first) = content.iter().position(|b| !b.is_ascii_whitespace()) else {
        debug!("map buffer is empty");
        return Ok(OsmData::default());
    };

    if content[first] == b'<' {
        parse_xml(content)
    } else {
        parse_pbf(data)
    }
}

struct PendingWay {
    id: OsmWayId,
    refs: Vec<OsmNodeId>,
    tags: RoutingTags,
}

impl PendingWay {
    fn finish(self) -> Way {
        Way::from_tags(self.id, self.refs, self.tags)
    }
}

#[derive(Default)]
struct XmlState {
    data: OsmData,
    saw_root: bool,
    current_way: Option<PendingWay>,
    skipped: usize,
}

/// Parse the OSM XML encoding.
pub fn parse_xml(data: &[u8]) -> Result<OsmData> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut state = XmlState::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => state.open(&element, false)?,
            Event::Empty(element) => state.open(&element, true)?,
            Event::End(element) => {
                if element.name().as_ref() == b"way" {
                    state.close_way();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.saw_root {
        return Err(Error::InvalidMapData {
            message: "missing <osm> root element".to_string(),
        });
    }
    if state.skipped > 0 {
        warn!(
            skipped = state.skipped,
            "skipped map records with missing or malformed attributes"
        );
    }

    debug!(
        nodes = state.data.nodes.len(),
        ways = state.data.ways.len(),
        has_bounds = state.data.bounds.is_some(),
        "parsed OSM XML"
    );
    Ok(state.data)
}

impl XmlState {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        match element.name().as_ref() {
            b"osm" => self.saw_root = true,
            b"bounds" => match read_bounds(element)? {
                Some(bounds) => self.data.bounds = Some(bounds),
                None => self.skipped += 1,
            },
            b"node" => {
                let id = parse_attribute::<OsmNodeId>(element, b"id")?;
                let lat = parse_attribute::<f64>(element, b"lat")?;
                let lon = parse_attribute::<f64>(element, b"lon")?;
                match (id, lat, lon) {
                    (Some(id), Some(lat), Some(lon)) if GeoPoint::new(lat, lon).is_valid() => {
                        self.data.nodes.insert(id, GeoPoint::new(lat, lon));
                    }
                    _ => self.skipped += 1,
                }
            }
            b"way" => {
                let Some(id) = parse_attribute::<OsmWayId>(element, b"id")? else {
                    self.skipped += 1;
                    return Ok(());
                };
                self.current_way = Some(PendingWay {
                    id,
                    refs: Vec::new(),
                    tags: RoutingTags::default(),
                });
                if empty {
                    self.close_way();
                }
            }
            b"nd" => {
                if let Some(way) = self.current_way.as_mut() {
                    match parse_attribute::<OsmNodeId>(element, b"ref")? {
                        Some(node) => way.refs.push(node),
                        None => self.skipped += 1,
                    }
                }
            }
            b"tag" => {
                if let Some(way) = self.current_way.as_mut() {
                    if let (Some(key), Some(value)) =
                        (attribute(element, b"k")?, attribute(element, b"v")?)
                    {
                        way.tags.record(&key, &value);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_way(&mut self) {
        if let Some(way) = self.current_way.take() {
            self.data.ways.push(way.finish());
        }
    }
}

fn read_bounds(element: &BytesStart<'_>) -> Result<Option<GeoBounds>> {
    let min_lat = parse_attribute::<f64>(element, b"minlat")?;
    let min_lon = parse_attribute::<f64>(element, b"minlon")?;
    let max_lat = parse_attribute::<f64>(element, b"maxlat")?;
    let max_lon = parse_attribute::<f64>(element, b"maxlon")?;

    Ok(match (min_lat, min_lon, max_lat, max_lon) {
        (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) => Some(GeoBounds {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }),
        _ => None,
    })
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Read and parse an attribute; `None` when it is absent or not a valid `T`.
fn parse_attribute<T: FromStr>(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<T>> {
    Ok(attribute(element, key)?.and_then(|value| value.trim().parse().ok()))
}

/// Parse the OSM PBF encoding.
pub fn parse_pbf(data: &[u8]) -> Result<OsmData> {
    let reader = ElementReader::new(Cursor::new(data));
    let mut osm = OsmData::default();
    let mut skipped = 0usize;
    let mut insert_node = |id: OsmNodeId, point: GeoPoint| {
        if point.is_valid() {
            osm.nodes.insert(id, point);
        } else {
            skipped += 1;
        }
    };
    let mut ways = Vec::new();

    reader.for_each(|element| match element {
        Element::Node(node) => insert_node(node.id(), GeoPoint::new(node.lat(), node.lon())),
        Element::DenseNode(node) => insert_node(node.id(), GeoPoint::new(node.lat(), node.lon())),
        Element::Way(way) => {
            let mut tags = RoutingTags::default();
            for (key, value) in way.tags() {
                tags.record(key, value);
            }
            ways.push(Way::from_tags(way.id(), way.refs().collect(), tags));
        }
        Element::Relation(_) => {}
    })?;
    osm.ways = ways;

    if skipped > 0 {
        warn!(skipped, "skipped map records with invalid coordinates");
    }
    debug!(
        nodes = osm.nodes.len(),
        ways = osm.ways.len(),
        "parsed OSM PBF"
    );
    Ok(osm)
}
