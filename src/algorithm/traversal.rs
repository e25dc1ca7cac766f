//! The per-edge traversal step: checks mode permission, prices travel time
//! and turn cost, advances turn-restriction progress (aborting the
//! traversal if a required sequence diverges or a forbidden one
//! completes), and produces the successor [`State`]. See specification
//! section 4.1.

use crate::model::edge::{Edge, EdgeStore};
use crate::model::mode::StreetMode;
use crate::model::state::State;
use crate::model::turn::{classify_turn, TurnCostCalculator, TurnProgress, TurnRestrictions};
use crate::model::units::{Millimeters, Seconds, Weight};
use crate::model::vertex::{bearing_degrees, VertexStore};
use crate::request::ProfileRequest;
use log::warn;

/// everything [`traverse`] needs that doesn't change between calls within a
/// single search: the read-only graph and turn tables, the active request,
/// and the mode/direction this leg of the search is running under.
pub struct TraversalContext<'a> {
    pub vertices: &'a VertexStore,
    pub edges: &'a EdgeStore,
    pub turn_restrictions: &'a TurnRestrictions,
    pub turn_cost_calculator: &'a TurnCostCalculator,
    pub request: &'a ProfileRequest,
    pub mode: StreetMode,
    pub weight_uses_walk_reluctance: bool,
    pub reverse: bool,
}

/// the compass bearing of travel along `edge`, accounting for search
/// direction: a reverse search walks an edge from its `to_vertex` back to
/// its `from_vertex`, so the direction of travel is the opposite of the
/// edge's stored geometry.
fn travel_bearing(edge: &Edge, vertices: &VertexStore, reverse: bool) -> Option<f64> {
    let from = vertices.get(edge.from_vertex).ok()?;
    let to = vertices.get(edge.to_vertex).ok()?;
    Some(if reverse {
        bearing_degrees(to, from)
    } else {
        bearing_degrees(from, to)
    })
}

/// advances `predecessor`'s turn-restriction progress across the step onto
/// `next_edge`, given the edge `predecessor` arrived over. returns `None`
/// when the traversal must be aborted: a required (`only`) sequence has
/// diverged, or a forbidden sequence has just been completed.
fn advance_turn_restrictions(
    predecessor_progress: &TurnProgress,
    predecessor_back_edge: Option<crate::model::edge::EdgeId>,
    next_edge: crate::model::edge::EdgeId,
    turn_restrictions: &TurnRestrictions,
) -> Option<TurnProgress> {
    let mut progress = predecessor_progress.clone();

    if let Some(back_edge) = predecessor_back_edge {
        for &id in turn_restrictions.starting_at(back_edge) {
            if progress.edges_consumed(id) == 0 {
                progress = progress.advanced(id, 1);
            }
        }
    }

    for id in progress.clone().tracked_ids().collect::<Vec<_>>() {
        let Ok(restriction) = turn_restrictions.get(id) else { continue };
        let consumed = progress.edges_consumed(id) as usize;
        if consumed == 0 || consumed >= restriction.len() {
            continue;
        }
        let sequence: Vec<_> = restriction.sequence().collect();
        let expected = sequence[consumed];
        if next_edge == expected {
            let new_consumed = consumed + 1;
            if new_consumed == sequence.len() {
                if restriction.only {
                    progress = progress.cleared(id);
                } else {
                    return None;
                }
            } else {
                progress = progress.advanced(id, new_consumed as u16);
            }
        } else if restriction.only {
            return None;
        } else {
            progress = progress.cleared(id);
        }
    }

    Some(progress)
}

/// `true` iff stepping from `predecessor` onto `candidate_edge` is legal:
/// permitted for `mode` and does not violate any turn restriction. used when
/// reconstructing a destination-side state on a split edge without actually
/// enqueuing it (specification section 4.1, `canTurnFrom`).
pub fn can_turn_from(
    predecessor: &State,
    candidate_edge: crate::model::edge::EdgeId,
    edges: &EdgeStore,
    turn_restrictions: &TurnRestrictions,
    mode: StreetMode,
) -> bool {
    let Ok(edge) = edges.get(candidate_edge) else { return false };
    if !edge.permissions.allows(mode) {
        return false;
    }
    advance_turn_restrictions(
        &predecessor.turn_restrictions,
        predecessor.back_edge,
        candidate_edge,
        turn_restrictions,
    )
    .is_some()
}

/// steps `predecessor` across `edge_id`, yielding the successor state, or
/// `None` if the mode cannot traverse this edge or a turn restriction
/// forbids the step. does not set `id` -- the caller (the router's main
/// loop) fills it in once the state is accepted into the arena.
pub fn traverse(
    predecessor: &State,
    edge_id: crate::model::edge::EdgeId,
    ctx: &TraversalContext,
) -> Option<State> {
    traverse_distance(predecessor, edge_id, None, ctx)
}

/// like [`traverse`], but prices only `distance_mm` of travel along the edge
/// rather than its full length -- used to reconstruct a state partway along
/// a destination split edge (specification section 4.7, `getState(split)`).
pub fn traverse_partial(
    predecessor: &State,
    edge_id: crate::model::edge::EdgeId,
    distance_mm: Millimeters,
    ctx: &TraversalContext,
) -> Option<State> {
    traverse_distance(predecessor, edge_id, Some(distance_mm), ctx)
}

fn traverse_distance(
    predecessor: &State,
    edge_id: crate::model::edge::EdgeId,
    distance_mm_override: Option<Millimeters>,
    ctx: &TraversalContext,
) -> Option<State> {
    let edge = ctx.edges.get(edge_id).ok()?;
    if !edge.permissions.allows(ctx.mode) {
        return None;
    }
    if edge.length_mm.0 < 0 {
        warn!("edge {edge_id} has negative length; refusing to traverse");
        return None;
    }
    let distance_mm = distance_mm_override.unwrap_or(edge.length_mm).0.max(0);

    let speed_mps = edge.speed_mps(ctx.mode, ctx.request);
    if speed_mps <= 0.0 {
        warn!("edge {edge_id} resolves to non-positive speed for mode {:?}", ctx.mode);
        return None;
    }
    let travel_time_s =
        Seconds::from_travel_time(Millimeters(distance_mm).as_meters() / speed_mps as f64);

    let turn_cost_s = match predecessor.back_edge {
        None => Seconds::ZERO,
        Some(back_edge) => {
            let back = ctx.edges.get(back_edge).ok()?;
            match (
                travel_bearing(back, ctx.vertices, ctx.reverse),
                travel_bearing(edge, ctx.vertices, ctx.reverse),
            ) {
                (Some(entry), Some(exit)) => {
                    let turn_type = classify_turn(entry, exit);
                    ctx.turn_cost_calculator.cost(turn_type, ctx.mode)
                }
                _ => Seconds::ZERO,
            }
        }
    };

    let turn_restrictions = advance_turn_restrictions(
        &predecessor.turn_restrictions,
        predecessor.back_edge,
        edge_id,
        ctx.turn_restrictions,
    )?;

    let leg_time_s = travel_time_s + turn_cost_s;
    let weight_delta = if ctx.weight_uses_walk_reluctance && ctx.mode == StreetMode::Walk {
        Weight::from_f64(leg_time_s.0 as f64 * ctx.request.walk_reluctance)
    } else {
        Weight(leg_time_s.0)
    };

    Some(State {
        id: predecessor.id,
        vertex: ctx.edges.terminal_vertex(edge, ctx.reverse),
        back_edge: Some(edge_id),
        back_state: Some(predecessor.id),
        duration_seconds: predecessor.duration_seconds + leg_time_s,
        duration_from_origin_seconds: predecessor.duration_from_origin_seconds + leg_time_s,
        distance_mm: predecessor.distance_mm + Millimeters(distance_mm),
        weight: predecessor.weight + weight_delta,
        street_mode: ctx.mode,
        is_bike_share: predecessor.is_bike_share,
        turn_restrictions,
    })
}
