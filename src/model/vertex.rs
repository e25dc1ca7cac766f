use crate::error::RouterError;
use crate::model::flags::VertexFlags;
use crate::model::units::{from_fixed_degrees, to_fixed_degrees, FixedDegrees};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// dense integer index into [`VertexStore`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// one row of [`VertexStore`]: a fixed-point coordinate and a capability
/// bitset. vertices carry no adjacency of their own -- that lives in
/// [`crate::model::edge::EdgeStore`] so forward and reverse search share one
/// representation.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub lat_fixed: FixedDegrees,
    pub lon_fixed: FixedDegrees,
    pub flags: VertexFlags,
}

impl Vertex {
    pub fn new(lat: f64, lon: f64, flags: VertexFlags) -> Vertex {
        Vertex {
            lat_fixed: to_fixed_degrees(lat),
            lon_fixed: to_fixed_degrees(lon),
            flags,
        }
    }

    pub fn lat(&self) -> f64 {
        from_fixed_degrees(self.lat_fixed)
    }

    pub fn lon(&self) -> f64 {
        from_fixed_degrees(self.lon_fixed)
    }
}

/// initial compass bearing in degrees `[0, 360)` travelling from `from` to
/// `to`, used to classify turns between consecutive edges (see
/// [`crate::model::turn::classify_turn`]). standard forward-azimuth formula;
/// a planar approximation is not accurate enough here since turn
/// classification only cares about the local direction change, not an
/// absolute distance.
pub fn bearing_degrees(from: &Vertex, to: &Vertex) -> f64 {
    let lat1 = from.lat().to_radians();
    let lat2 = to.lat().to_radians();
    let d_lon = (to.lon() - from.lon()).to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}

/// CSV row shape for reading a vertex list. kept separate from [`Vertex`]
/// because the on-disk representation (plain floating point degrees) differs
/// from the in-memory fixed-point one.
#[derive(Debug, Deserialize)]
struct VertexRecord {
    lat: f64,
    lon: f64,
    #[serde(default)]
    bike_share: bool,
    #[serde(default)]
    park_and_ride: bool,
}

/// columnar table of every [`Vertex`] in the graph, indexed densely by
/// [`VertexId`]. read-only once built; many [`crate::algorithm::router::StreetRouter`]
/// instances may share one `VertexStore` across threads.
#[derive(Debug, Default)]
pub struct VertexStore {
    vertices: Box<[Vertex]>,
}

impl VertexStore {
    pub fn new(vertices: Vec<Vertex>) -> VertexStore {
        VertexStore {
            vertices: vertices.into_boxed_slice(),
        }
    }

    pub fn from_csv<P: AsRef<std::path::Path>>(path: P) -> Result<VertexStore, RouterError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut vertices = Vec::new();
        for row in reader.deserialize() {
            let record: VertexRecord = row?;
            let mut flags = VertexFlags::EMPTY;
            if record.bike_share {
                flags = flags.set(VertexFlags::BIKE_SHARE);
            }
            if record.park_and_ride {
                flags = flags.set(VertexFlags::PARK_AND_RIDE);
            }
            vertices.push(Vertex::new(record.lat, record.lon, flags));
        }
        Ok(VertexStore::new(vertices))
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn get(&self, id: VertexId) -> Result<&Vertex, RouterError> {
        self.vertices
            .get(id.0 as usize)
            .ok_or(RouterError::VertexNotFound(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len() as u32).map(VertexId)
    }

    pub fn with_flag(&self, flag: VertexFlags) -> impl Iterator<Item = VertexId> + '_ {
        self.ids().filter(move |id| self.vertices[id.0 as usize].flags.has(flag))
    }
}
