//! The A* search loop over a street network: origin/destination management,
//! the main expansion loop, stopping conditions, and result extraction. See
//! specification sections 4.5 through 4.9.

use crate::algorithm::heuristic;
use crate::algorithm::traversal::{can_turn_from, traverse, traverse_partial, TraversalContext};
use crate::algorithm::visitor::{RoutingVisitor, StopVisitor, VertexFlagVisitor};
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::model::dominance::DominanceVariable;
use crate::model::edge::{EdgeId, EdgeStore};
use crate::model::mode::StreetMode;
use crate::model::split::{find_split, LinkIndex, Split};
use crate::model::state::{BestStatesIndex, State, StateArena, StateId};
use crate::model::transit::{TransitStopId, TransitStopIndex};
use crate::model::turn::{TurnCostCalculator, TurnProgress, TurnRestrictions};
use crate::model::units::{Millimeters, Seconds, Weight};
use crate::model::vertex::{VertexId, VertexStore};
use crate::request::ProfileRequest;
use crate::util::debug_dump::DebugDumpWriter;
use indexmap::IndexMap;
use log::warn;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

/// a snapshot of one leg's final state at a vertex, used to seed a follow-on
/// leg of a multi-leg search (e.g. a WALK leg feeding a CAR leg after a
/// park-and-ride). produced by [`StreetRouter::previous_leg_states`].
#[derive(Copy, Clone, Debug)]
pub struct PreviousLegState {
    pub vertex: VertexId,
    pub duration_seconds: Seconds,
    pub duration_from_origin_seconds: Seconds,
    pub distance_mm: Millimeters,
    pub weight: Weight,
}

/// one search over a street network: built against a read-only graph and
/// turn-restriction table, seeded with one or more origins, optionally given
/// a destination and a visitor, then run once with [`StreetRouter::route`].
/// instances are cheap and meant to be constructed per request; the
/// underlying graph may be shared read-only across many concurrent routers.
pub struct StreetRouter<'a> {
    vertices: &'a VertexStore,
    edges: &'a EdgeStore,
    turn_restrictions: &'a TurnRestrictions,
    link_index: &'a LinkIndex,
    transit: Option<&'a TransitStopIndex>,
    pub mode: StreetMode,
    pub request: ProfileRequest,
    pub config: RouterConfig,
    turn_cost_calculator: TurnCostCalculator,
    arena: StateArena,
    best_states: BestStatesIndex,
    queue: PriorityQueue<StateId, Reverse<i64>>,
    origin_seeds: Vec<StateId>,
    destination: Option<Split>,
    best_value_at_destination: Option<i64>,
    best_destination_state: Option<State>,
    debug_dump: Option<DebugDumpWriter>,
    reached_stops: Option<IndexMap<TransitStopId, StateId>>,
    reached_vertices: Option<IndexMap<VertexId, StateId>>,
}

/// the visitor installed for one `route()` call, kept as a concrete enum
/// (rather than `Box<dyn RoutingVisitor>`) so its capped results can be
/// recovered by `into_results` after the search loop ends -- a trait object
/// alone can't expose that without downcasting.
enum ActiveVisitor<'a> {
    Stop(StopVisitor<'a>),
    Flag(VertexFlagVisitor<'a>),
}

impl RoutingVisitor for ActiveVisitor<'_> {
    fn visit(&mut self, state: &State) {
        match self {
            ActiveVisitor::Stop(v) => v.visit(state),
            ActiveVisitor::Flag(v) => v.visit(state),
        }
    }

    fn should_break_search(&self) -> bool {
        match self {
            ActiveVisitor::Stop(v) => v.should_break_search(),
            ActiveVisitor::Flag(v) => v.should_break_search(),
        }
    }
}

impl<'a> StreetRouter<'a> {
    pub fn new(
        vertices: &'a VertexStore,
        edges: &'a EdgeStore,
        turn_restrictions: &'a TurnRestrictions,
        link_index: &'a LinkIndex,
        transit: Option<&'a TransitStopIndex>,
        mode: StreetMode,
        request: ProfileRequest,
        config: RouterConfig,
    ) -> StreetRouter<'a> {
        StreetRouter {
            vertices,
            edges,
            turn_restrictions,
            link_index,
            transit,
            mode,
            request,
            best_states: BestStatesIndex::new(config.dominance_variable),
            config,
            turn_cost_calculator: TurnCostCalculator::new(true),
            arena: StateArena::new(),
            queue: PriorityQueue::new(),
            origin_seeds: Vec::new(),
            destination: None,
            best_value_at_destination: None,
            best_destination_state: None,
            debug_dump: None,
            reached_stops: None,
            reached_vertices: None,
        }
    }

    /// records a `lat,lon,weight` row for every state popped during
    /// [`StreetRouter::route`]. a no-op unless built with the
    /// `debug-csv-dump` feature.
    pub fn enable_debug_dump<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), RouterError> {
        self.debug_dump = Some(DebugDumpWriter::create(path)?);
        Ok(())
    }

    fn reverse(&self) -> bool {
        self.request.reverse_search
    }

    /// builds a [`TraversalContext`] from disjoint fields rather than as a
    /// `&self` method, so the borrow checker can see it doesn't touch
    /// `arena`/`best_states`/`queue` and callers remain free to mutate those
    /// afterward.
    fn traversal_context<'s>(
        vertices: &'s VertexStore,
        edges: &'s EdgeStore,
        turn_restrictions: &'s TurnRestrictions,
        turn_cost_calculator: &'s TurnCostCalculator,
        request: &'s ProfileRequest,
        mode: StreetMode,
        weight_uses_walk_reluctance: bool,
        reverse: bool,
    ) -> TraversalContext<'s> {
        TraversalContext {
            vertices,
            edges,
            turn_restrictions,
            turn_cost_calculator,
            request,
            mode,
            weight_uses_walk_reluctance,
            reverse,
        }
    }

    fn seed(&mut self, state: State) {
        let id = self.arena.push(state);
        if self.best_states.offer(id, &self.arena) {
            let priority = self.priority_of(id);
            self.queue.push(id, priority);
            self.origin_seeds.push(id);
        }
    }

    fn priority_of(&self, id: StateId) -> Reverse<i64> {
        let state = self.arena.get(id);
        let value = state.value(self.config.dominance_variable);
        let h = match &self.destination {
            None => 0,
            Some(split) => split
                .point(self.vertices, self.edges)
                .and_then(|dest| {
                    self.vertices.get(state.vertex).map(|from| {
                        heuristic::estimate(from, &dest, self.mode, self.config.dominance_variable, &self.request)
                    })
                })
                .unwrap_or_default(),
        };
        Reverse(value + h)
    }

    /// snaps `(lat, lon)` to the street network and seeds two initial
    /// states, one per direction of the split edge. logs and leaves the
    /// router unseeded (not an error) if no edge within the configured link
    /// radius permits the active mode.
    pub fn set_origin_latlon(&mut self, lat: f64, lon: f64) -> Result<(), RouterError> {
        let radius = if self.config.link_radius_meters > 0.0 {
            self.config.link_radius_meters
        } else {
            crate::config::DEFAULT_LINK_RADIUS_METERS
        };
        match find_split(self.link_index, self.edges, lat, lon, radius, self.mode) {
            Some(split) => self.seed_from_split(&split),
            None => {
                warn!(
                    "no edge within {radius}m of ({lat}, {lon}) permits mode {:?}; origin not set",
                    self.mode
                );
                Ok(())
            }
        }
    }

    /// seeds from an already-computed [`Split`], e.g. one shared with a
    /// destination lookup to avoid snapping the same point twice.
    pub fn set_origin_split(&mut self, split: Split) -> Result<(), RouterError> {
        self.seed_from_split(&split)
    }

    fn seed_from_split(&mut self, split: &Split) -> Result<(), RouterError> {
        let forward = self.edges.get(split.edge)?;
        let forward_from = forward.from_vertex;
        for edge_id in [split.edge, split.edge.back()] {
            let edge = self.edges.get(edge_id)?;
            if !edge.permissions.allows(self.mode) {
                continue;
            }
            let speed_mps = edge.speed_mps(self.mode, &self.request);
            if speed_mps <= 0.0 {
                continue;
            }
            let terminal = self.edges.terminal_vertex(edge, self.reverse());
            let distance_mm = if terminal == forward_from { split.distance_to_from_vertex_mm } else { split.distance_to_to_vertex_mm };
            let travel_time_s = Seconds::from_travel_time(distance_mm.as_meters() / speed_mps as f64);
            let weight = if self.mode == StreetMode::Walk
                && matches!(self.config.dominance_variable, DominanceVariable::Weight)
            {
                Weight::from_f64(travel_time_s.0 as f64 * self.request.walk_reluctance)
            } else {
                Weight(travel_time_s.0)
            };
            self.seed(State {
                id: StateId(0),
                vertex: terminal,
                back_edge: Some(edge_id),
                back_state: None,
                duration_seconds: travel_time_s,
                duration_from_origin_seconds: travel_time_s,
                distance_mm,
                weight,
                street_mode: self.mode,
                is_bike_share: false,
                turn_restrictions: TurnProgress::empty(),
            });
        }
        Ok(())
    }

    /// seeds a single state at `vertex` with no back edge, as when an origin
    /// is already known to coincide with a graph vertex.
    pub fn set_origin_vertex(&mut self, vertex: VertexId) {
        self.seed(State {
            id: StateId(0),
            vertex,
            back_edge: None,
            back_state: None,
            duration_seconds: Seconds::ZERO,
            duration_from_origin_seconds: Seconds::ZERO,
            distance_mm: Millimeters::ZERO,
            weight: Weight::ZERO,
            street_mode: self.mode,
            is_bike_share: false,
            turn_restrictions: TurnProgress::empty(),
        });
    }

    /// seeds this router from a prior leg's result cloud, for chained
    /// multi-leg searches (e.g. WALK to a bike-share station, then BICYCLE
    /// onward). each seed inherits the predecessor's cumulative values plus
    /// the switch penalties; `is_bike_share_leg` marks a rental pickup.
    pub fn set_origin_from_previous_leg(
        &mut self,
        previous: &[PreviousLegState],
        switch_time: Seconds,
        switch_cost: Weight,
        leg_mode: StreetMode,
        is_bike_share_leg: bool,
    ) {
        for prev in previous {
            self.seed(State {
                id: StateId(0),
                vertex: prev.vertex,
                back_edge: None,
                back_state: None,
                duration_seconds: prev.duration_seconds + switch_time,
                duration_from_origin_seconds: prev.duration_from_origin_seconds + switch_time,
                distance_mm: prev.distance_mm,
                weight: prev.weight + switch_cost,
                street_mode: leg_mode,
                is_bike_share: is_bike_share_leg,
                turn_restrictions: TurnProgress::empty(),
            });
        }
    }

    /// the best known state at every vertex reached so far, suitable for
    /// seeding a follow-on leg via [`StreetRouter::set_origin_from_previous_leg`].
    pub fn previous_leg_states(&self) -> Vec<PreviousLegState> {
        let mut best: IndexMap<VertexId, PreviousLegState> = IndexMap::new();
        for state in self.arena.iter() {
            if self.best_states.is_zombie(state.id, &self.arena) {
                continue;
            }
            let value = state.value(self.config.dominance_variable);
            let candidate = PreviousLegState {
                vertex: state.vertex,
                duration_seconds: state.duration_seconds,
                duration_from_origin_seconds: state.duration_from_origin_seconds,
                distance_mm: state.distance_mm,
                weight: state.weight,
            };
            match best.get(&state.vertex) {
                Some(existing) if value >= existing_value(existing, self.config.dominance_variable) => {}
                _ => {
                    best.insert(state.vertex, candidate);
                }
            }
        }
        best.into_values().collect()
    }

    pub fn set_destination_latlon(&mut self, lat: f64, lon: f64) -> Result<(), RouterError> {
        let radius = if self.config.link_radius_meters > 0.0 {
            self.config.link_radius_meters
        } else {
            crate::config::DEFAULT_LINK_RADIUS_METERS
        };
        match find_split(self.link_index, self.edges, lat, lon, radius, self.mode) {
            Some(split) => {
                self.destination = Some(split);
                Ok(())
            }
            None => {
                warn!(
                    "no edge within {radius}m of ({lat}, {lon}) permits mode {:?}; destination not set",
                    self.mode
                );
                Ok(())
            }
        }
    }

    pub fn set_destination_split(&mut self, split: Split) {
        self.destination = Some(split);
    }

    /// runs the A* search to completion against the active stopping
    /// conditions. a no-op (with a warning) if no origin has been seeded.
    pub fn route(&mut self) -> Result<(), RouterError> {
        if self.origin_seeds.is_empty() {
            warn!("route() called with no origin set; nothing to search");
            return Ok(());
        }
        self.config.validate();

        let mut visitor: Option<ActiveVisitor<'_>> = if self.config.transit_stop_search {
            self.transit.map(|transit| {
                ActiveVisitor::Stop(StopVisitor::new(
                    transit,
                    self.config.dominance_variable,
                    self.request.min_travel_time_seconds,
                    self.config.max_transit_stops,
                ))
            })
        } else if let Some(flag) = self.config.flag_search {
            Some(ActiveVisitor::Flag(VertexFlagVisitor::new(
                self.vertices,
                flag,
                self.config.dominance_variable,
                self.request.min_travel_time_seconds,
                self.config.max_vertices,
            )))
        } else {
            None
        };

        let distance_limit_mm = (self.config.distance_limit_meters > 0.0)
            .then(|| Millimeters::from_meters(self.config.distance_limit_meters));
        let time_limit_s = (self.config.time_limit_seconds > 0).then_some(self.config.time_limit_seconds);

        loop {
            if let Some(best) = self.best_value_at_destination {
                match self.queue.peek() {
                    Some((_, Reverse(top))) if *top > best => break,
                    None => break,
                    _ => {}
                }
            }

            let Some((state_id, _)) = self.queue.pop() else { break };
            if self.best_states.is_zombie(state_id, &self.arena) {
                continue;
            }
            let state = self.arena.get(state_id).clone();

            if let Some(dump) = self.debug_dump.as_mut() {
                if let Ok(vertex) = self.vertices.get(state.vertex) {
                    dump.record(vertex, state.weight)?;
                }
            }

            self.check_destination(&state)?;

            if let Some(v) = visitor.as_mut() {
                v.visit(&state);
                if v.should_break_search() {
                    break;
                }
            }

            if self.config.to_vertex == Some(state.vertex) {
                break;
            }

            let weight_uses_walk_reluctance = matches!(self.config.dominance_variable, DominanceVariable::Weight);
            let reverse = self.reverse();
            let edge_ids: Vec<EdgeId> = self.edges.incident_edges(state.vertex, reverse).collect();
            for edge_id in edge_ids {
                let ctx = Self::traversal_context(
                    self.vertices,
                    self.edges,
                    self.turn_restrictions,
                    &self.turn_cost_calculator,
                    &self.request,
                    self.mode,
                    weight_uses_walk_reluctance,
                    reverse,
                );
                let Some(next) = traverse(&state, edge_id, &ctx) else { continue };
                if let Some(limit) = distance_limit_mm {
                    if next.distance_mm > limit {
                        continue;
                    }
                }
                if let Some(limit) = time_limit_s {
                    if next.duration_seconds.0 > limit {
                        continue;
                    }
                }
                let next_id = self.arena.push(next);
                if self.best_states.offer(next_id, &self.arena) {
                    let priority = self.priority_of(next_id);
                    self.queue.push(next_id, priority);
                }
            }
        }

        match visitor {
            Some(ActiveVisitor::Stop(v)) => self.reached_stops = Some(v.into_results()),
            Some(ActiveVisitor::Flag(v)) => self.reached_vertices = Some(v.into_results()),
            None => {}
        }

        if let Some(dump) = self.debug_dump.as_mut() {
            dump.flush()?;
        }
        Ok(())
    }

    fn check_destination(&mut self, state: &State) -> Result<(), RouterError> {
        let Some(split) = self.destination else { return Ok(()) };
        let forward = self.edges.get(split.edge)?;
        let forward_from = forward.from_vertex;
        for edge_id in [split.edge, split.edge.back()] {
            let edge = self.edges.get(edge_id)?;
            let source_vertex = self.edges.source_vertex(edge, self.reverse());
            if state.vertex != source_vertex {
                continue;
            }
            if !can_turn_from(state, edge_id, self.edges, self.turn_restrictions, self.mode) {
                continue;
            }
            let distance_mm =
                if source_vertex == forward_from { split.distance_to_from_vertex_mm } else { split.distance_to_to_vertex_mm };
            let ctx = Self::traversal_context(
                self.vertices,
                self.edges,
                self.turn_restrictions,
                &self.turn_cost_calculator,
                &self.request,
                self.mode,
                matches!(self.config.dominance_variable, DominanceVariable::Weight),
                self.reverse(),
            );
            if let Some(candidate) = traverse_partial(state, edge_id, distance_mm, &ctx) {
                let value = candidate.value(self.config.dominance_variable);
                let improved = self.best_value_at_destination.is_none_or(|best| value < best);
                if improved {
                    self.best_value_at_destination = Some(value);
                    self.best_destination_state = Some(candidate);
                }
            }
        }
        Ok(())
    }

    /// the best reconstructed state at the destination, if one was set and
    /// reached. see [`StreetRouter::check_destination`] and specification
    /// section 4.7.
    pub fn destination_state(&self) -> Option<&State> {
        self.best_destination_state.as_ref()
    }

    /// the lowest-cost non-dominated state that arrived over `edge_id`.
    pub fn get_state_at_edge(&self, edge_id: EdgeId) -> Option<&State> {
        self.arena
            .iter()
            .filter(|s| s.back_edge == Some(edge_id) && !self.best_states.is_zombie(s.id, &self.arena))
            .min_by_key(|s| s.value(self.config.dominance_variable))
    }

    /// the lowest-cost non-dominated state arriving at `vertex`, over either
    /// an edge or (for origin-seeded states) directly. not suitable for
    /// snapping onto a destination split, which must separately price the
    /// turn onto the split edge; see [`StreetRouter::get_state`].
    pub fn get_state_at_vertex(&self, vertex: VertexId) -> Option<&State> {
        let arriving: Box<dyn Iterator<Item = EdgeId>> = if self.reverse() {
            Box::new(self.edges.out_edges(vertex))
        } else {
            Box::new(self.edges.in_edges(vertex))
        };
        let via_edge = arriving.filter_map(|e| self.get_state_at_edge(e));
        let via_origin = self
            .arena
            .iter()
            .filter(|s| s.back_edge.is_none() && s.vertex == vertex && !self.best_states.is_zombie(s.id, &self.arena));
        via_edge.chain(via_origin).min_by_key(|s| s.value(self.config.dominance_variable))
    }

    /// reconstructs the best state positioned at `split`, by applying the
    /// turn cost and a partial traversal from the best known state at each
    /// adjacent vertex, then returning the better of the two directions.
    pub fn get_state(&self, split: &Split) -> Result<Option<State>, RouterError> {
        let forward = self.edges.get(split.edge)?;
        let forward_from = forward.from_vertex;
        let mut best: Option<State> = None;
        for edge_id in [split.edge, split.edge.back()] {
            let edge = self.edges.get(edge_id)?;
            let source_vertex = self.edges.source_vertex(edge, self.reverse());
            let Some(predecessor) = self.get_state_at_vertex(source_vertex) else { continue };
            if !can_turn_from(predecessor, edge_id, self.edges, self.turn_restrictions, self.mode) {
                continue;
            }
            let distance_mm =
                if source_vertex == forward_from { split.distance_to_from_vertex_mm } else { split.distance_to_to_vertex_mm };
            let ctx = Self::traversal_context(
                self.vertices,
                self.edges,
                self.turn_restrictions,
                &self.turn_cost_calculator,
                &self.request,
                self.mode,
                matches!(self.config.dominance_variable, DominanceVariable::Weight),
                self.reverse(),
            );
            let Some(candidate) = traverse_partial(predecessor, edge_id, distance_mm, &ctx) else { continue };
            best = Some(match best {
                None => candidate,
                Some(existing) => {
                    if candidate.value(self.config.dominance_variable) < existing.value(self.config.dominance_variable) {
                        candidate
                    } else {
                        existing
                    }
                }
            });
        }
        Ok(best)
    }

    /// every transit stop reached, best state per stop. returns the live
    /// [`StopVisitor`]'s capped results when the last `route()` ran one
    /// (the only correct source once `max_transit_stops` has cut the search
    /// short of every stop's optimal state); otherwise sweeps the best-state
    /// index, which is only correct when no stop cap was configured.
    pub fn get_reached_stops(&self) -> IndexMap<TransitStopId, &State> {
        if let Some(results) = &self.reached_stops {
            return results.iter().map(|(&stop, &id)| (stop, self.arena.get(id))).collect();
        }
        let Some(transit) = self.transit else { return IndexMap::new() };
        let mut best: IndexMap<TransitStopId, &State> = IndexMap::new();
        for state in self.arena.iter() {
            if self.best_states.is_zombie(state.id, &self.arena) {
                continue;
            }
            if state.duration_from_origin_seconds.0 < self.request.min_travel_time_seconds {
                continue;
            }
            for &stop in transit.stops_at(state.vertex) {
                best.entry(stop).or_insert(state);
            }
        }
        best
    }

    /// every vertex bearing `flag` reached, best state per vertex. returns
    /// the live [`VertexFlagVisitor`]'s capped results when the last
    /// `route()` ran one against this same flag; otherwise sweeps the graph
    /// for vertices bearing `flag`, which is only correct when no vertex cap
    /// was configured.
    pub fn get_reached_vertices(&self, flag: crate::model::flags::VertexFlags) -> IndexMap<VertexId, &State> {
        if self.config.flag_search == Some(flag) {
            if let Some(results) = &self.reached_vertices {
                return results.iter().map(|(&vertex, &id)| (vertex, self.arena.get(id))).collect();
            }
        }
        let mut best: IndexMap<VertexId, &State> = IndexMap::new();
        for vertex in self.vertices.with_flag(flag) {
            if let Some(state) = self.get_state_at_vertex(vertex) {
                if state.duration_from_origin_seconds.0 >= self.request.min_travel_time_seconds {
                    best.insert(vertex, state);
                }
            }
        }
        best
    }

    /// reverses a terminal state's predecessor chain into head-to-tail
    /// order, recomputing each node's to-vertex from its edge so self-loop
    /// edges are handled correctly. see specification section 4.9.
    pub fn reconstruct_path(&self, state: &State) -> Vec<(Option<EdgeId>, VertexId)> {
        let mut chain = vec![(state.back_edge, state.vertex)];
        let mut back_state = state.back_state;
        while let Some(id) = back_state {
            let predecessor = self.arena.get(id);
            chain.push((predecessor.back_edge, predecessor.vertex));
            back_state = predecessor.back_state;
        }
        chain.reverse();
        chain
    }
}

fn existing_value(state: &PreviousLegState, variable: DominanceVariable) -> i64 {
    match variable {
        DominanceVariable::DurationSeconds => state.duration_seconds.0,
        DominanceVariable::Weight => state.weight.0,
        DominanceVariable::DistanceMillimeters => state.distance_mm.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edge::Edge;
    use crate::model::flags::{EdgeFlags, VertexFlags};
    use crate::model::mode::ModeSet;
    use crate::model::turn::TurnRestriction;
    use crate::model::vertex::Vertex;

    fn line_graph() -> (VertexStore, EdgeStore, TurnRestrictions) {
        let vertices = VertexStore::new(vec![
            Vertex::new(0.0, 0.0, VertexFlags::EMPTY),
            Vertex::new(0.0, 0.001, VertexFlags::EMPTY),
        ]);
        let edges = EdgeStore::new(
            vec![
                Edge {
                    from_vertex: VertexId(0),
                    to_vertex: VertexId(1),
                    length_mm: Millimeters(1000),
                    permissions: ModeSet::ALL,
                    car_speed_mps: None,
                    flags: EdgeFlags::EMPTY,
                },
                Edge {
                    from_vertex: VertexId(1),
                    to_vertex: VertexId(0),
                    length_mm: Millimeters(1000),
                    permissions: ModeSet::ALL,
                    car_speed_mps: None,
                    flags: EdgeFlags::EMPTY,
                },
            ],
            2,
        );
        (vertices, edges, TurnRestrictions::new(vec![]))
    }

    #[test]
    fn single_edge_walk_reaches_target_vertex() {
        let (vertices, edges, turn_restrictions) = line_graph();
        let link_index = LinkIndex::build(&vertices, &edges);
        let request = ProfileRequest { walk_speed_mps: 1.0, ..ProfileRequest::default() };
        let config = RouterConfig { to_vertex: Some(VertexId(1)), ..RouterConfig::default() };
        let mut router = StreetRouter::new(
            &vertices,
            &edges,
            &turn_restrictions,
            &link_index,
            None,
            StreetMode::Walk,
            request,
            config,
        );
        router.set_origin_vertex(VertexId(0));
        router.route().unwrap();
        let state = router.get_state_at_vertex(VertexId(1)).unwrap();
        assert_eq!(state.duration_seconds, Seconds(1));
    }

    #[test]
    fn empty_graph_search_only_reaches_origin() {
        let vertices = VertexStore::new(vec![Vertex::new(0.0, 0.0, VertexFlags::EMPTY)]);
        let edges = EdgeStore::new(vec![], 1);
        let turn_restrictions = TurnRestrictions::new(vec![]);
        let link_index = LinkIndex::build(&vertices, &edges);
        let mut router = StreetRouter::new(
            &vertices,
            &edges,
            &turn_restrictions,
            &link_index,
            None,
            StreetMode::Walk,
            ProfileRequest::default(),
            RouterConfig::default(),
        );
        router.set_origin_vertex(VertexId(0));
        router.route().unwrap();
        assert_eq!(router.get_state_at_vertex(VertexId(0)).unwrap().duration_seconds, Seconds::ZERO);
    }

    #[test]
    fn route_with_no_origin_is_a_noop() {
        let (vertices, edges, turn_restrictions) = line_graph();
        let link_index = LinkIndex::build(&vertices, &edges);
        let mut router = StreetRouter::new(
            &vertices,
            &edges,
            &turn_restrictions,
            &link_index,
            None,
            StreetMode::Walk,
            ProfileRequest::default(),
            RouterConfig::default(),
        );
        router.route().unwrap();
        assert!(router.get_state_at_vertex(VertexId(1)).is_none());
    }

    #[test]
    fn time_limit_prunes_states_beyond_limit() {
        let (vertices, edges, turn_restrictions) = line_graph();
        let link_index = LinkIndex::build(&vertices, &edges);
        let request = ProfileRequest { walk_speed_mps: 1.0, ..ProfileRequest::default() };
        let config = RouterConfig { time_limit_seconds: 1, ..RouterConfig::default() };
        let mut router = StreetRouter::new(
            &vertices,
            &edges,
            &turn_restrictions,
            &link_index,
            None,
            StreetMode::Walk,
            request,
            config,
        );
        router.set_origin_vertex(VertexId(0));
        router.route().unwrap();
        assert!(router.get_state_at_vertex(VertexId(1)).is_some());
        for state in router.arena.iter() {
            assert!(state.duration_seconds.0 <= 1);
        }
    }

    #[test]
    fn turn_restriction_forces_detour_between_destinations() {
        let vertices = VertexStore::new(vec![
            Vertex::new(0.0, 0.0, VertexFlags::EMPTY),
            Vertex::new(0.0, 0.001, VertexFlags::EMPTY),
            Vertex::new(0.001, 0.002, VertexFlags::EMPTY),
            Vertex::new(-0.001, 0.002, VertexFlags::EMPTY),
        ]);
        // 0 -[0/1]- 1 -[2/3]- 2 (direct)
        //           1 -[4/5]- 3 (detour)
        let edges = EdgeStore::new(
            vec![
                Edge { from_vertex: VertexId(0), to_vertex: VertexId(1), length_mm: Millimeters::from_meters(1000.0), permissions: ModeSet::ALL, car_speed_mps: None, flags: EdgeFlags::EMPTY },
                Edge { from_vertex: VertexId(1), to_vertex: VertexId(0), length_mm: Millimeters::from_meters(1000.0), permissions: ModeSet::ALL, car_speed_mps: None, flags: EdgeFlags::EMPTY },
                Edge { from_vertex: VertexId(1), to_vertex: VertexId(2), length_mm: Millimeters::from_meters(1000.0), permissions: ModeSet::ALL, car_speed_mps: None, flags: EdgeFlags::EMPTY },
                Edge { from_vertex: VertexId(2), to_vertex: VertexId(1), length_mm: Millimeters::from_meters(1000.0), permissions: ModeSet::ALL, car_speed_mps: None, flags: EdgeFlags::EMPTY },
                Edge { from_vertex: VertexId(1), to_vertex: VertexId(3), length_mm: Millimeters::from_meters(1000.0), permissions: ModeSet::ALL, car_speed_mps: None, flags: EdgeFlags::EMPTY },
                Edge { from_vertex: VertexId(3), to_vertex: VertexId(1), length_mm: Millimeters::from_meters(1000.0), permissions: ModeSet::ALL, car_speed_mps: None, flags: EdgeFlags::EMPTY },
            ],
            4,
        );
        // forbid edge 0 (0->1) directly into edge 2 (1->2)
        let turn_restrictions = TurnRestrictions::new(vec![TurnRestriction {
            from_edge: EdgeId(0),
            via_edges: vec![],
            to_edge: EdgeId(2),
            only: false,
        }]);
        let link_index = LinkIndex::build(&vertices, &edges);
        let request = ProfileRequest { walk_speed_mps: 1.0, ..ProfileRequest::default() };
        let config = RouterConfig { to_vertex: Some(VertexId(2)), ..RouterConfig::default() };
        let mut router = StreetRouter::new(
            &vertices,
            &edges,
            &turn_restrictions,
            &link_index,
            None,
            StreetMode::Car,
            request,
            config,
        );
        router.set_origin_vertex(VertexId(0));
        router.route().unwrap();
        // direct route (0->1->2) is forbidden, so the only way to reach 2 is
        // the detour through 3 and back, at roughly twice the direct
        // distance plus a U-turn penalty.
        let direct_seconds = (2000.0 / crate::model::edge::DEFAULT_CAR_SPEED_MPS as f64).round() as i64;
        let state = router.get_state_at_vertex(VertexId(2)).unwrap();
        assert!(state.duration_seconds.0 > direct_seconds);
    }

    #[test]
    fn stop_search_cap_limits_reached_stops_to_the_nearest() {
        // star graph: v0 adjacent to v1..v5, each via a 1000m edge, each
        // hosting a transit stop. v0 expands and enqueues all five neighbors
        // before the cap of 3 is reached, so every neighbor ends up in the
        // arena -- get_reached_stops must still report exactly 3, not 5.
        let mut vertices = vec![Vertex::new(0.0, 0.0, VertexFlags::EMPTY)];
        for i in 1..=5 {
            vertices.push(Vertex::new(0.0, i as f64 * 0.001, VertexFlags::EMPTY));
        }
        let vertices = VertexStore::new(vertices);
        let mut edges = Vec::new();
        for i in 1..=5u32 {
            edges.push(Edge {
                from_vertex: VertexId(0),
                to_vertex: VertexId(i),
                length_mm: Millimeters::from_meters(1000.0),
                permissions: ModeSet::ALL,
                car_speed_mps: None,
                flags: EdgeFlags::EMPTY,
            });
            edges.push(Edge {
                from_vertex: VertexId(i),
                to_vertex: VertexId(0),
                length_mm: Millimeters::from_meters(1000.0),
                permissions: ModeSet::ALL,
                car_speed_mps: None,
                flags: EdgeFlags::EMPTY,
            });
        }
        let edges = EdgeStore::new(edges, 6);
        let turn_restrictions = TurnRestrictions::new(vec![]);
        let link_index = LinkIndex::build(&vertices, &edges);
        let transit = TransitStopIndex::new(
            (1..=5u32).map(|i| (TransitStopId(i), VertexId(i))).collect(),
        );
        let request = ProfileRequest { walk_speed_mps: 1.0, ..ProfileRequest::default() };
        let config = RouterConfig { transit_stop_search: true, max_transit_stops: 3, ..RouterConfig::default() };
        let mut router = StreetRouter::new(
            &vertices,
            &edges,
            &turn_restrictions,
            &link_index,
            Some(&transit),
            StreetMode::Walk,
            request,
            config,
        );
        router.set_origin_vertex(VertexId(0));
        router.route().unwrap();
        assert_eq!(router.get_reached_stops().len(), 3);
    }
}
