use crate::error::RouterError;
use crate::model::flags::EdgeFlags;
use crate::model::mode::{ModeSet, StreetMode};
use crate::model::units::Millimeters;
use crate::model::vertex::VertexId;
use crate::request::ProfileRequest;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// dense integer index into [`EdgeStore`]. edges are stored in pairs:
/// indices `2k` and `2k+1` represent the two directions of the same
/// underlying street geometry. flipping direction is `EdgeId(id.0 ^ 1)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// the edge travelling the opposite direction over the same geometry.
    pub fn back(self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    /// `true` for the forward (even) member of a pair; splits always
    /// reference this direction and derive the back edge from it.
    pub fn is_forward(self) -> bool {
        self.0 & 1 == 0
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// default speed assumed for CAR travel when neither the edge nor the
/// request supplies a posted speed, per the specification's numerics
/// section (130 km/h converted to m/s is close enough that 36.11 m/s is
/// kept as the literal default rather than re-derived).
pub const DEFAULT_CAR_SPEED_MPS: f32 = 36.11;

/// one direction of one underlying street segment.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub from_vertex: VertexId,
    pub to_vertex: VertexId,
    pub length_mm: Millimeters,
    pub permissions: ModeSet,
    /// posted speed for CAR travel on this direction; `None` falls back to
    /// the request's car speed, then [`DEFAULT_CAR_SPEED_MPS`]. WALK and
    /// BICYCLE speeds are supplied per-request, not per-edge, since they
    /// model the traveler rather than a posted limit.
    pub car_speed_mps: Option<f32>,
    pub flags: EdgeFlags,
}

impl Edge {
    /// resolves the speed to use for `mode` on this edge under `request`.
    pub fn speed_mps(&self, mode: StreetMode, request: &ProfileRequest) -> f32 {
        match mode {
            StreetMode::Car => self
                .car_speed_mps
                .or(request.car_speed_mps)
                .unwrap_or(DEFAULT_CAR_SPEED_MPS),
            StreetMode::Bicycle => request.bicycle_speed_mps,
            StreetMode::Walk => request.walk_speed_mps,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    from_vertex: u32,
    to_vertex: u32,
    length_m: f64,
    #[serde(default)]
    walk: bool,
    #[serde(default)]
    bicycle: bool,
    #[serde(default)]
    car: bool,
    car_speed_kph: Option<f32>,
    #[serde(default)]
    stairs: bool,
    #[serde(default)]
    linkable: bool,
    #[serde(default)]
    bike_path: bool,
    #[serde(default)]
    sidewalk: bool,
    #[serde(default)]
    crossing: bool,
    #[serde(default)]
    roundabout: bool,
    #[serde(default)]
    platform: bool,
}

/// columnar table of every directed [`Edge`] plus its forward and reverse
/// adjacency indexes. like [`crate::model::vertex::VertexStore`], this is
/// built once and shared read-only across concurrent router instances.
#[derive(Debug, Default)]
pub struct EdgeStore {
    edges: Box<[Edge]>,
    out_edges: Box<[IndexMap<EdgeId, VertexId>]>,
    in_edges: Box<[IndexMap<EdgeId, VertexId>]>,
}

impl EdgeStore {
    pub fn new(edges: Vec<Edge>, n_vertices: usize) -> EdgeStore {
        let mut out_edges = vec![IndexMap::new(); n_vertices];
        let mut in_edges = vec![IndexMap::new(); n_vertices];
        for (idx, edge) in edges.iter().enumerate() {
            let edge_id = EdgeId(idx as u32);
            if let Some(out) = out_edges.get_mut(edge.from_vertex.0 as usize) {
                out.insert(edge_id, edge.to_vertex);
            }
            if let Some(inc) = in_edges.get_mut(edge.to_vertex.0 as usize) {
                inc.insert(edge_id, edge.from_vertex);
            }
        }
        EdgeStore {
            edges: edges.into_boxed_slice(),
            out_edges: out_edges.into_boxed_slice(),
            in_edges: in_edges.into_boxed_slice(),
        }
    }

    pub fn from_csv<P: AsRef<std::path::Path>>(
        path: P,
        n_vertices: usize,
    ) -> Result<EdgeStore, RouterError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut edges = Vec::new();
        for row in reader.deserialize() {
            let record: EdgeRecord = row?;
            let mut permissions = ModeSet::NONE;
            if record.walk {
                permissions = permissions.with(StreetMode::Walk);
            }
            if record.bicycle {
                permissions = permissions.with(StreetMode::Bicycle);
            }
            if record.car {
                permissions = permissions.with(StreetMode::Car);
            }
            let mut flags = EdgeFlags::EMPTY;
            for (present, flag) in [
                (record.stairs, EdgeFlags::STAIRS),
                (record.linkable, EdgeFlags::LINKABLE),
                (record.bike_path, EdgeFlags::BIKE_PATH),
                (record.sidewalk, EdgeFlags::SIDEWALK),
                (record.crossing, EdgeFlags::CROSSING),
                (record.roundabout, EdgeFlags::ROUNDABOUT),
                (record.platform, EdgeFlags::PLATFORM),
            ] {
                if present {
                    flags = flags.set(flag);
                }
            }
            edges.push(Edge {
                from_vertex: VertexId(record.from_vertex),
                to_vertex: VertexId(record.to_vertex),
                length_mm: Millimeters::from_meters(record.length_m),
                permissions,
                car_speed_mps: record.car_speed_kph.map(|kph| kph / 3.6),
                flags,
            });
        }
        Ok(EdgeStore::new(edges, n_vertices))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, id: EdgeId) -> Result<&Edge, RouterError> {
        self.edges.get(id.0 as usize).ok_or(RouterError::EdgeNotFound(id))
    }

    /// the edge reached by flipping direction. defined for every id; the
    /// pairing invariant (`2k`/`2k+1` share geometry) is the caller's
    /// responsibility to uphold when building the store.
    pub fn back_edge(&self, id: EdgeId) -> EdgeId {
        id.back()
    }

    pub fn out_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges
            .get(vertex.0 as usize)
            .into_iter()
            .flat_map(|m| m.keys().copied())
    }

    pub fn in_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.in_edges
            .get(vertex.0 as usize)
            .into_iter()
            .flat_map(|m| m.keys().copied())
    }

    /// incident edges for `vertex` respecting search direction: outgoing for
    /// a forward search, incoming for a reverse search (where traversal
    /// walks the graph "backwards" from a destination).
    pub fn incident_edges(
        &self,
        vertex: VertexId,
        reverse: bool,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        let (fwd, rev): (
            Box<dyn Iterator<Item = EdgeId>>,
            Box<dyn Iterator<Item = EdgeId>>,
        ) = if reverse {
            (Box::new(std::iter::empty()), Box::new(self.in_edges(vertex)))
        } else {
            (Box::new(self.out_edges(vertex)), Box::new(std::iter::empty()))
        };
        fwd.chain(rev)
    }

    /// the vertex a traversal of `edge` arrives at, given search direction:
    /// `to_vertex` forward, `from_vertex` reverse (edges are walked against
    /// their stored direction in a reverse search).
    pub fn terminal_vertex(&self, edge: &Edge, reverse: bool) -> VertexId {
        if reverse {
            edge.from_vertex
        } else {
            edge.to_vertex
        }
    }

    pub fn source_vertex(&self, edge: &Edge, reverse: bool) -> VertexId {
        if reverse {
            edge.to_vertex
        } else {
            edge.from_vertex
        }
    }
}
