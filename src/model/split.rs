use crate::model::edge::{EdgeId, EdgeStore};
use crate::model::flags::EdgeFlags;
use crate::model::mode::StreetMode;
use crate::model::units::Millimeters;
use crate::model::vertex::{VertexId, VertexStore};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// meters per degree of latitude, used for a local equirectangular
/// projection when snapping a point to an edge. longitude is additionally
/// scaled by `cos(latitude)` at the point of use.
const METERS_PER_DEGREE_LAT: f64 = crate::model::units::EARTH_CIRCUMFERENCE_METERS / 360.0;

fn to_local_meters(lat: f64, lon: f64, ref_lat_rad: f64) -> (f64, f64) {
    let x = lon * METERS_PER_DEGREE_LAT * ref_lat_rad.cos();
    let y = lat * METERS_PER_DEGREE_LAT;
    (x, y)
}

/// perpendicular distance in meters from `point` (lat, lon) to the segment
/// `a`-`b` (lat, lon each), plus the fraction along the segment (from `a`,
/// clamped to `[0, 1]`) at which the closest point lies.
fn project_point_to_segment(
    point: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
) -> (f64, f64) {
    let ref_lat_rad = point.0.to_radians();
    let (px, py) = to_local_meters(point.0, point.1, ref_lat_rad);
    let (ax, ay) = to_local_meters(a.0, a.1, ref_lat_rad);
    let (bx, by) = to_local_meters(b.0, b.1, ref_lat_rad);

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f64::EPSILON {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
    (dist, t)
}

struct EdgeSegment {
    edge_id: EdgeId,
    a_lat: f64,
    a_lon: f64,
    b_lat: f64,
    b_lon: f64,
}

impl RTreeObject for EdgeSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.a_lon.min(self.b_lon), self.a_lat.min(self.b_lat)],
            [self.a_lon.max(self.b_lon), self.a_lat.max(self.b_lat)],
        )
    }
}

impl PointDistance for EdgeSegment {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (dist, _) = project_point_to_segment(
            (point[1], point[0]),
            (self.a_lat, self.a_lon),
            (self.b_lat, self.b_lon),
        );
        dist * dist
    }
}

/// spatial index over every forward (even-indexed), linkable edge's
/// geometry, used to snap arbitrary origin/destination points onto the
/// street network. an edge lacking the `LINKABLE` flag (e.g. a service road
/// or indoor path not meant to be an access point) never enters the index,
/// matching the specification's "closest linkable edge" requirement.
pub struct LinkIndex {
    tree: RTree<EdgeSegment>,
}

impl LinkIndex {
    pub fn build(vertices: &VertexStore, edges: &EdgeStore) -> LinkIndex {
        let mut segments = Vec::new();
        for idx in 0..edges.len() {
            let edge_id = EdgeId(idx as u32);
            if !edge_id.is_forward() {
                continue;
            }
            let Ok(edge) = edges.get(edge_id) else { continue };
            if !edge.flags.has(EdgeFlags::LINKABLE) {
                continue;
            }
            let (Ok(from), Ok(to)) = (vertices.get(edge.from_vertex), vertices.get(edge.to_vertex))
            else {
                continue;
            };
            segments.push(EdgeSegment {
                edge_id,
                a_lat: from.lat(),
                a_lon: from.lon(),
                b_lat: to.lat(),
                b_lon: to.lon(),
            });
        }
        LinkIndex {
            tree: RTree::bulk_load(segments),
        }
    }
}

/// a point projected onto the street network: which edge pair it lies on and
/// how far along it, plus the partial distance to each endpoint vertex.
/// `edge` always references the forward (even) member of the pair, per the
/// specification; the back edge is `edge.back()`. `forward_permitted` and
/// `back_permitted` record which direction(s) actually allow the mode this
/// split was found for (a one-way street permits only one), independent of
/// which direction the geometry happens to be indexed under.
#[derive(Copy, Clone, Debug)]
pub struct Split {
    pub edge: EdgeId,
    pub fraction: f64,
    pub distance_to_from_vertex_mm: Millimeters,
    pub distance_to_to_vertex_mm: Millimeters,
    pub forward_permitted: bool,
    pub back_permitted: bool,
}

impl Split {
    pub fn from_vertex(&self, edges: &EdgeStore) -> Result<VertexId, crate::error::RouterError> {
        Ok(edges.get(self.edge)?.from_vertex)
    }

    pub fn to_vertex(&self, edges: &EdgeStore) -> Result<VertexId, crate::error::RouterError> {
        Ok(edges.get(self.edge)?.to_vertex)
    }

    /// the geographic point this split represents, linearly interpolated
    /// between the forward edge's endpoints by [`Split::fraction`]. used to
    /// calibrate the A* heuristic against a destination that sits partway
    /// along an edge rather than at one of its vertices.
    pub fn point(
        &self,
        vertices: &crate::model::vertex::VertexStore,
        edges: &EdgeStore,
    ) -> Result<crate::model::vertex::Vertex, crate::error::RouterError> {
        let edge = edges.get(self.edge)?;
        let from = vertices.get(edge.from_vertex)?;
        let to = vertices.get(edge.to_vertex)?;
        let lat = from.lat() + (to.lat() - from.lat()) * self.fraction;
        let lon = from.lon() + (to.lon() - from.lon()) * self.fraction;
        Ok(crate::model::vertex::Vertex::new(lat, lon, crate::model::flags::VertexFlags::EMPTY))
    }
}

/// finds the closest linkable edge pair to `(lat, lon)` with at least one
/// direction permitting `mode`, within `radius_meters`. the returned
/// [`Split::edge`] is always the forward (even) member of the pair --
/// `forward_permitted`/`back_permitted` tell the caller which direction(s)
/// are actually traversable, covering the one-way case where only the back
/// edge allows `mode`.
pub fn find_split(
    index: &LinkIndex,
    edges: &EdgeStore,
    lat: f64,
    lon: f64,
    radius_meters: f64,
    mode: StreetMode,
) -> Option<Split> {
    for segment in index.tree.nearest_neighbor_iter(&[lon, lat]) {
        let (dist_meters, fraction) = project_point_to_segment(
            (lat, lon),
            (segment.a_lat, segment.a_lon),
            (segment.b_lat, segment.b_lon),
        );
        if dist_meters > radius_meters {
            return None;
        }
        let forward = edges.get(segment.edge_id).ok()?;
        let back = edges.get(segment.edge_id.back()).ok()?;

        let forward_permitted = forward.permissions.allows(mode);
        let back_permitted = back.permissions.allows(mode);
        if !forward_permitted && !back_permitted {
            continue;
        }

        let length_meters = forward.length_mm.as_meters();
        return Some(Split {
            edge: segment.edge_id,
            fraction,
            distance_to_from_vertex_mm: Millimeters::from_meters(fraction * length_meters),
            distance_to_to_vertex_mm: Millimeters::from_meters((1.0 - fraction) * length_meters),
            forward_permitted,
            back_permitted,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edge::Edge;
    use crate::model::flags::{EdgeFlags, VertexFlags};
    use crate::model::mode::ModeSet;
    use crate::model::vertex::Vertex;

    fn simple_graph() -> (VertexStore, EdgeStore) {
        let vertices = VertexStore::new(vec![
            Vertex::new(0.0, 0.0, VertexFlags::EMPTY),
            Vertex::new(0.0, 0.001, VertexFlags::EMPTY),
        ]);
        let edges = EdgeStore::new(
            vec![
                Edge {
                    from_vertex: VertexId(0),
                    to_vertex: VertexId(1),
                    length_mm: Millimeters::from_meters(111.0),
                    permissions: ModeSet::ALL,
                    car_speed_mps: None,
                    flags: EdgeFlags::LINKABLE,
                },
                Edge {
                    from_vertex: VertexId(1),
                    to_vertex: VertexId(0),
                    length_mm: Millimeters::from_meters(111.0),
                    permissions: ModeSet::ALL,
                    car_speed_mps: None,
                    flags: EdgeFlags::LINKABLE,
                },
            ],
            2,
        );
        (vertices, edges)
    }

    #[test]
    fn snaps_to_midpoint() {
        let (vertices, edges) = simple_graph();
        let index = LinkIndex::build(&vertices, &edges);
        let split = find_split(&index, &edges, 0.0, 0.0005, 50.0, StreetMode::Walk).unwrap();
        assert!((split.fraction - 0.5).abs() < 0.05);
    }

    #[test]
    fn returns_none_outside_radius() {
        let (vertices, edges) = simple_graph();
        let index = LinkIndex::build(&vertices, &edges);
        assert!(find_split(&index, &edges, 1.0, 1.0, 50.0, StreetMode::Walk).is_none());
    }

    #[test]
    fn non_linkable_edge_is_never_snapped_onto() {
        let (vertices, edges) = {
            let vertices = VertexStore::new(vec![
                Vertex::new(0.0, 0.0, VertexFlags::EMPTY),
                Vertex::new(0.0, 0.001, VertexFlags::EMPTY),
            ]);
            let edges = EdgeStore::new(
                vec![
                    Edge {
                        from_vertex: VertexId(0),
                        to_vertex: VertexId(1),
                        length_mm: Millimeters::from_meters(111.0),
                        permissions: ModeSet::ALL,
                        car_speed_mps: None,
                        flags: EdgeFlags::EMPTY,
                    },
                    Edge {
                        from_vertex: VertexId(1),
                        to_vertex: VertexId(0),
                        length_mm: Millimeters::from_meters(111.0),
                        permissions: ModeSet::ALL,
                        car_speed_mps: None,
                        flags: EdgeFlags::EMPTY,
                    },
                ],
                2,
            );
            (vertices, edges)
        };
        let index = LinkIndex::build(&vertices, &edges);
        assert!(find_split(&index, &edges, 0.0, 0.0005, 50.0, StreetMode::Walk).is_none());
    }

    #[test]
    fn falls_back_to_reverse_direction_for_one_way() {
        let (vertices, _) = simple_graph();
        let edges = EdgeStore::new(
            vec![
                Edge {
                    from_vertex: VertexId(0),
                    to_vertex: VertexId(1),
                    length_mm: Millimeters::from_meters(111.0),
                    permissions: ModeSet::NONE,
                    car_speed_mps: None,
                    flags: EdgeFlags::LINKABLE,
                },
                Edge {
                    from_vertex: VertexId(1),
                    to_vertex: VertexId(0),
                    length_mm: Millimeters::from_meters(111.0),
                    permissions: ModeSet::ALL,
                    car_speed_mps: None,
                    flags: EdgeFlags::LINKABLE,
                },
            ],
            2,
        );
        let index = LinkIndex::build(&vertices, &edges);
        let split = find_split(&index, &edges, 0.0, 0.0005, 50.0, StreetMode::Walk).unwrap();
        // edge always normalizes to the forward (even) id; only the back
        // direction actually permits the mode here.
        assert_eq!(split.edge, EdgeId(0));
        assert!(!split.forward_permitted);
        assert!(split.back_permitted);
    }
}
