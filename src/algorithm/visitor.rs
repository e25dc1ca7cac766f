//! Pluggable callbacks that harvest the search's state cloud as it is
//! produced and can request early termination. See specification section
//! 4.8. Both known variants apply the same minimum-travel-time floor so that
//! trivially short walks don't masquerade as a transfer or amenity leg.

use crate::model::dominance::DominanceVariable;
use crate::model::flags::VertexFlags;
use crate::model::state::{State, StateId};
use crate::model::transit::{TransitStopId, TransitStopIndex};
use crate::model::vertex::{VertexId, VertexStore};
use indexmap::IndexMap;
use std::collections::HashSet;

/// receives every popped, non-dominated state and may ask the search loop to
/// stop early. `visit` runs before the destination-split check each pop, so
/// a visitor sees every state the router actually expands.
pub trait RoutingVisitor {
    fn visit(&mut self, state: &State);
    fn should_break_search(&self) -> bool;
}

/// harvests the best state reached at each transit stop, subject to a
/// minimum-travel-time floor and a cap on distinct stops found.
pub struct StopVisitor<'a> {
    transit: &'a TransitStopIndex,
    dominance_variable: DominanceVariable,
    min_travel_time_seconds: i64,
    max_transit_stops: usize,
    best: IndexMap<TransitStopId, (i64, StateId)>,
}

impl<'a> StopVisitor<'a> {
    pub fn new(
        transit: &'a TransitStopIndex,
        dominance_variable: DominanceVariable,
        min_travel_time_seconds: i64,
        max_transit_stops: usize,
    ) -> StopVisitor<'a> {
        StopVisitor {
            transit,
            dominance_variable,
            min_travel_time_seconds,
            max_transit_stops,
            best: IndexMap::new(),
        }
    }

    pub fn into_results(self) -> IndexMap<TransitStopId, StateId> {
        self.best.into_iter().map(|(stop, (_, state))| (stop, state)).collect()
    }
}

impl RoutingVisitor for StopVisitor<'_> {
    fn visit(&mut self, state: &State) {
        if self.best.len() >= self.max_transit_stops {
            return;
        }
        if state.duration_from_origin_seconds.0 < self.min_travel_time_seconds {
            return;
        }
        // A* pops states in non-decreasing order of routing variable, so the
        // first visit for a given stop is already its optimal value.
        for &stop in self.transit.stops_at(state.vertex) {
            self.best.entry(stop).or_insert((state.value(self.dominance_variable), state.id));
        }
    }

    fn should_break_search(&self) -> bool {
        self.best.len() >= self.max_transit_stops
    }
}

/// harvests the best state reached at each vertex bearing a requested
/// capability flag, e.g. PARK_AND_RIDE or BIKE_SHARE. unlike [`StopVisitor`],
/// a vertex seen before the minimum-travel-time floor is blacklisted rather
/// than merely skipped: without this, a later and strictly more expensive
/// arrival at the same vertex would be recorded as if it were optimal, when
/// in fact the true optimum (the early one) was disqualified by the floor.
pub struct VertexFlagVisitor<'a> {
    vertices: &'a VertexStore,
    flag: VertexFlags,
    dominance_variable: DominanceVariable,
    min_travel_time_seconds: i64,
    max_vertices: usize,
    blacklisted: HashSet<VertexId>,
    best: IndexMap<VertexId, (i64, StateId)>,
}

impl<'a> VertexFlagVisitor<'a> {
    pub fn new(
        vertices: &'a VertexStore,
        flag: VertexFlags,
        dominance_variable: DominanceVariable,
        min_travel_time_seconds: i64,
        max_vertices: usize,
    ) -> VertexFlagVisitor<'a> {
        VertexFlagVisitor {
            vertices,
            flag,
            dominance_variable,
            min_travel_time_seconds,
            max_vertices,
            blacklisted: HashSet::new(),
            best: IndexMap::new(),
        }
    }

    pub fn into_results(self) -> IndexMap<VertexId, StateId> {
        self.best.into_iter().map(|(vertex, (_, state))| (vertex, state)).collect()
    }
}

impl RoutingVisitor for VertexFlagVisitor<'_> {
    fn visit(&mut self, state: &State) {
        if self.best.len() >= self.max_vertices {
            return;
        }
        let vertex = state.vertex;
        if self.blacklisted.contains(&vertex) || self.best.contains_key(&vertex) {
            return;
        }
        let Ok(v) = self.vertices.get(vertex) else { return };
        if !v.flags.has(self.flag) {
            return;
        }
        if state.duration_from_origin_seconds.0 < self.min_travel_time_seconds {
            self.blacklisted.insert(vertex);
            return;
        }
        self.best.insert(vertex, (state.value(self.dominance_variable), state.id));
    }

    fn should_break_search(&self) -> bool {
        self.best.len() >= self.max_vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edge::EdgeId;
    use crate::model::mode::StreetMode;
    use crate::model::turn::TurnProgress;
    use crate::model::units::{Millimeters, Seconds, Weight};
    use crate::model::vertex::Vertex;

    fn state(vertex: VertexId, duration: i64) -> State {
        State {
            id: StateId(0),
            vertex,
            back_edge: Some(EdgeId(0)),
            back_state: None,
            duration_seconds: Seconds(duration),
            duration_from_origin_seconds: Seconds(duration),
            distance_mm: Millimeters::ZERO,
            weight: Weight(duration),
            street_mode: StreetMode::Walk,
            is_bike_share: false,
            turn_restrictions: TurnProgress::empty(),
        }
    }

    #[test]
    fn stop_visitor_caps_at_max_and_keeps_first_seen() {
        let transit = TransitStopIndex::new(vec![
            (TransitStopId(0), VertexId(0)),
            (TransitStopId(1), VertexId(1)),
            (TransitStopId(2), VertexId(2)),
        ]);
        let mut visitor = StopVisitor::new(&transit, DominanceVariable::DurationSeconds, 0, 2);
        visitor.visit(&state(VertexId(0), 10));
        assert!(!visitor.should_break_search());
        visitor.visit(&state(VertexId(1), 20));
        assert!(visitor.should_break_search());
        visitor.visit(&state(VertexId(2), 30));
        let results = visitor.into_results();
        assert_eq!(results.len(), 2);
        assert!(results.contains_key(&TransitStopId(0)));
        assert!(results.contains_key(&TransitStopId(1)));
    }

    #[test]
    fn stop_visitor_respects_min_travel_time_floor() {
        let transit = TransitStopIndex::new(vec![(TransitStopId(0), VertexId(0))]);
        let mut visitor = StopVisitor::new(&transit, DominanceVariable::DurationSeconds, 100, 5);
        visitor.visit(&state(VertexId(0), 10));
        assert!(visitor.into_results().is_empty());
    }

    #[test]
    fn vertex_flag_visitor_blacklists_early_arrival() {
        let vertices = VertexStore::new(vec![Vertex::new(0.0, 0.0, VertexFlags::PARK_AND_RIDE)]);
        let mut visitor =
            VertexFlagVisitor::new(&vertices, VertexFlags::PARK_AND_RIDE, DominanceVariable::DurationSeconds, 100, 5);
        visitor.visit(&state(VertexId(0), 10));
        visitor.visit(&state(VertexId(0), 200));
        assert!(visitor.into_results().is_empty());
    }

    #[test]
    fn vertex_flag_visitor_records_vertex_meeting_floor() {
        let vertices = VertexStore::new(vec![Vertex::new(0.0, 0.0, VertexFlags::PARK_AND_RIDE)]);
        let mut visitor =
            VertexFlagVisitor::new(&vertices, VertexFlags::PARK_AND_RIDE, DominanceVariable::DurationSeconds, 100, 5);
        visitor.visit(&state(VertexId(0), 150));
        assert_eq!(visitor.into_results().len(), 1);
    }
}
