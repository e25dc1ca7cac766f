use crate::model::vertex::VertexId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// dense integer index identifying a transit stop in the upstream timetable
/// layer. opaque to the router -- it is never dereferenced, only carried
/// through [`crate::algorithm::visitor::StopVisitor`] results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransitStopId(pub u32);

impl Display for TransitStopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stop{}", self.0)
    }
}

/// read-only mapping between street vertices and the transit stops that sit
/// at them, built once upstream alongside the rest of the graph. a street
/// vertex may host more than one stop (e.g. a multi-platform station split
/// across several logical stop records); a stop sits at exactly one vertex.
#[derive(Debug, Default)]
pub struct TransitStopIndex {
    stops_at: IndexMap<VertexId, Vec<TransitStopId>>,
    vertex_of: IndexMap<TransitStopId, VertexId>,
}

impl TransitStopIndex {
    pub fn new(pairs: Vec<(TransitStopId, VertexId)>) -> TransitStopIndex {
        let mut stops_at: IndexMap<VertexId, Vec<TransitStopId>> = IndexMap::new();
        let mut vertex_of = IndexMap::new();
        for (stop, vertex) in pairs {
            stops_at.entry(vertex).or_default().push(stop);
            vertex_of.insert(stop, vertex);
        }
        TransitStopIndex { stops_at, vertex_of }
    }

    pub fn stops_at(&self, vertex: VertexId) -> &[TransitStopId] {
        self.stops_at.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vertex_of(&self, stop: TransitStopId) -> Option<VertexId> {
        self.vertex_of.get(&stop).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_of.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_directions() {
        let index = TransitStopIndex::new(vec![
            (TransitStopId(0), VertexId(5)),
            (TransitStopId(1), VertexId(5)),
            (TransitStopId(2), VertexId(9)),
        ]);
        assert_eq!(index.stops_at(VertexId(5)), &[TransitStopId(0), TransitStopId(1)]);
        assert_eq!(index.vertex_of(TransitStopId(2)), Some(VertexId(9)));
        assert!(index.stops_at(VertexId(42)).is_empty());
    }
}
