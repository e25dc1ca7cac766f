//! Graph fixture builders shared across this crate's test modules, grounded
//! in the teacher's inline `build_mock_graph` test helpers. Kept separate
//! from any one test module so integration tests and unit tests can both
//! build small, hand-checkable graphs without duplicating the wiring.

use crate::model::edge::{Edge, EdgeId, EdgeStore};
use crate::model::flags::{EdgeFlags, VertexFlags};
use crate::model::mode::ModeSet;
use crate::model::split::LinkIndex;
use crate::model::turn::TurnRestrictions;
use crate::model::units::Millimeters;
use crate::model::vertex::{Vertex, VertexId, VertexStore};

/// a small graph plus the spatial index built over it, ready to hand to a
/// [`crate::algorithm::router::StreetRouter`].
pub struct MockGraph {
    pub vertices: VertexStore,
    pub edges: EdgeStore,
    pub turn_restrictions: TurnRestrictions,
    pub link_index: LinkIndex,
}

/// builds a straight line of `n` vertices, 1 degree-thousandth of longitude
/// apart, connected by bidirectional edges of `segment_length_m` meters each
/// permitting every mode. vertex `i` sits at `(0, i * 0.001)`.
pub fn line_graph(n: usize, segment_length_m: f64) -> MockGraph {
    let vertices = VertexStore::new(
        (0..n)
            .map(|i| Vertex::new(0.0, i as f64 * 0.001, VertexFlags::EMPTY))
            .collect(),
    );
    let mut edges = Vec::new();
    for i in 0..n.saturating_sub(1) {
        edges.push(Edge {
            from_vertex: VertexId(i as u32),
            to_vertex: VertexId((i + 1) as u32),
            length_mm: Millimeters::from_meters(segment_length_m),
            permissions: ModeSet::ALL,
            car_speed_mps: None,
            flags: EdgeFlags::LINKABLE,
        });
        edges.push(Edge {
            from_vertex: VertexId((i + 1) as u32),
            to_vertex: VertexId(i as u32),
            length_mm: Millimeters::from_meters(segment_length_m),
            permissions: ModeSet::ALL,
            car_speed_mps: None,
            flags: EdgeFlags::LINKABLE,
        });
    }
    let edges = EdgeStore::new(edges, n);
    let link_index = LinkIndex::build(&vertices, &edges);
    MockGraph { vertices, edges, turn_restrictions: TurnRestrictions::new(vec![]), link_index }
}

/// builds a 2x2 grid of vertices (ids 0..3, laid out `0-1 / 2-3` top to
/// bottom) connected by bidirectional edges of `segment_length_m` meters:
/// 0-1 (east), 2-3 (east), 0-2 (south), 1-3 (south). every edge permits
/// every mode. returns edge ids in insertion order: `(0-1, 2-3, 0-2, 1-3)`,
/// each as a forward/back pair.
pub fn grid_2x2(segment_length_m: f64) -> (MockGraph, [EdgeId; 4]) {
    let vertices = VertexStore::new(vec![
        Vertex::new(0.001, 0.0, VertexFlags::EMPTY),
        Vertex::new(0.001, 0.001, VertexFlags::EMPTY),
        Vertex::new(0.0, 0.0, VertexFlags::EMPTY),
        Vertex::new(0.0, 0.001, VertexFlags::EMPTY),
    ]);
    let mut edges = Vec::new();
    let mut forward_ids = Vec::new();
    for (from, to) in [(0u32, 1u32), (2, 3), (0, 2), (1, 3)] {
        forward_ids.push(EdgeId(edges.len() as u32));
        edges.push(Edge {
            from_vertex: VertexId(from),
            to_vertex: VertexId(to),
            length_mm: Millimeters::from_meters(segment_length_m),
            permissions: ModeSet::ALL,
            car_speed_mps: None,
            flags: EdgeFlags::LINKABLE,
        });
        edges.push(Edge {
            from_vertex: VertexId(to),
            to_vertex: VertexId(from),
            length_mm: Millimeters::from_meters(segment_length_m),
            permissions: ModeSet::ALL,
            car_speed_mps: None,
            flags: EdgeFlags::LINKABLE,
        });
    }
    let edges = EdgeStore::new(edges, 4);
    let link_index = LinkIndex::build(&vertices, &edges);
    let graph = MockGraph { vertices, edges, turn_restrictions: TurnRestrictions::new(vec![]), link_index };
    (graph, forward_ids.try_into().unwrap())
}
