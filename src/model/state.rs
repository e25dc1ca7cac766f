use crate::model::edge::EdgeId;
use crate::model::mode::StreetMode;
use crate::model::turn::TurnProgress;
use crate::model::units::{Millimeters, Seconds, Weight};
use crate::model::vertex::VertexId;
use std::collections::HashMap;

/// dense index into a [`StateArena`]. states never move once pushed, so a
/// `StateId` remains valid for the arena's whole lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);

/// one node of the search tree. unlike a plain Dijkstra/A* node keyed only by
/// vertex, a `State` is keyed by the *edge* it arrived over (`back_edge`):
/// turn costs and turn restrictions depend on which edge precedes the next
/// one, so two states at the same vertex reached by different edges are
/// tracked, compared, and expanded independently.
#[derive(Clone, Debug)]
pub struct State {
    pub id: StateId,
    pub vertex: VertexId,
    pub back_edge: Option<EdgeId>,
    pub back_state: Option<StateId>,
    pub duration_seconds: Seconds,
    /// duration measured from the true geographic origin, as opposed to a
    /// split point; used by [`crate::algorithm::visitor::StopVisitor`]'s
    /// minimum-travel-time floor.
    pub duration_from_origin_seconds: Seconds,
    pub distance_mm: Millimeters,
    pub weight: Weight,
    pub street_mode: StreetMode,
    pub is_bike_share: bool,
    pub turn_restrictions: TurnProgress,
}

impl State {
    /// the cumulative value of `variable` for this state, used both for
    /// priority queue ordering (with a heuristic added on top) and for
    /// dominance comparisons.
    pub fn value(&self, variable: crate::model::dominance::DominanceVariable) -> i64 {
        use crate::model::dominance::DominanceVariable::*;
        match variable {
            DurationSeconds => self.duration_seconds.0,
            Weight => self.weight.0,
            DistanceMillimeters => self.distance_mm.0,
        }
    }
}

/// append-only store of every [`State`] produced during one search. states
/// reference their predecessor by [`StateId`] rather than by pointer so the
/// whole tree can be walked, reversed, and dropped without worrying about
/// lifetimes.
#[derive(Debug, Default)]
pub struct StateArena {
    states: Vec<State>,
}

impl StateArena {
    pub fn new() -> StateArena {
        StateArena { states: Vec::new() }
    }

    pub fn push(&mut self, mut state: State) -> StateId {
        let id = StateId(self.states.len() as u32);
        state.id = id;
        self.states.push(state);
        id
    }

    pub fn get(&self, id: StateId) -> &State {
        &self.states[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }
}

/// identity of a dominance bucket: states with the same key compete against
/// each other, states with different keys never dominate one another.
/// keyed by the edge just arrived over (not the vertex) plus the traveling
/// mode, since both change which edges can legally follow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct BucketKey {
    back_edge: Option<EdgeId>,
    vertex: VertexId,
    mode: StreetMode,
    is_bike_share: bool,
}

fn bucket_key(state: &State) -> BucketKey {
    BucketKey {
        back_edge: state.back_edge,
        vertex: state.vertex,
        mode: state.street_mode,
        is_bike_share: state.is_bike_share,
    }
}

/// tracks the non-dominated frontier of states seen so far, per edge, for one
/// search's active dominance variable.
///
/// two states in the same bucket are comparable -- and therefore one may
/// dominate the other -- only if their turn-restriction progress is
/// identical. states with divergent (but non-identical) progress are kept
/// side by side even if one has a strictly better value, because an `only`
/// restriction can force a path that looks locally worse; the identical-
/// progress case still dominates normally so that genuinely redundant states
/// (e.g. a cycle that returns to the same restriction progress) don't grow
/// the frontier without bound.
#[derive(Debug)]
pub struct BestStatesIndex {
    variable: crate::model::dominance::DominanceVariable,
    buckets: HashMap<BucketKey, Vec<StateId>>,
}

impl BestStatesIndex {
    pub fn new(variable: crate::model::dominance::DominanceVariable) -> BestStatesIndex {
        BestStatesIndex {
            variable,
            buckets: HashMap::new(),
        }
    }

    fn comparable(a: &State, b: &State) -> bool {
        a.turn_restrictions == b.turn_restrictions
    }

    /// offers `candidate` to the frontier. returns `false` if an existing
    /// state dominates it (the candidate should be discarded, a "zombie" the
    /// moment it's created). returns `true` and evicts any states the
    /// candidate itself dominates otherwise.
    pub fn offer(&mut self, candidate_id: StateId, arena: &StateArena) -> bool {
        let candidate = arena.get(candidate_id);
        let key = bucket_key(candidate);
        let bucket = self.buckets.entry(key).or_default();

        for &existing_id in bucket.iter() {
            let existing = arena.get(existing_id);
            if Self::comparable(existing, candidate)
                && existing.value(self.variable) <= candidate.value(self.variable)
            {
                return false;
            }
        }

        bucket.retain(|&existing_id| {
            let existing = arena.get(existing_id);
            !(Self::comparable(existing, candidate)
                && candidate.value(self.variable) <= existing.value(self.variable)
                && existing_id != candidate_id)
        });
        bucket.push(candidate_id);
        true
    }

    /// `true` if `id` is no longer in its bucket's non-dominated frontier,
    /// i.e. it became a zombie after being offered (a later, better state
    /// for the same key arrived and evicted it). checked when a state is
    /// popped from the priority queue, since eviction doesn't remove queue
    /// entries.
    pub fn is_zombie(&self, id: StateId, arena: &StateArena) -> bool {
        let state = arena.get(id);
        let key = bucket_key(state);
        match self.buckets.get(&key) {
            Some(bucket) => !bucket.contains(&id),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dominance::DominanceVariable;

    fn state(id: u32, back_edge: Option<EdgeId>, duration: i64, turns: TurnProgress) -> State {
        State {
            id: StateId(id),
            vertex: VertexId(0),
            back_edge,
            back_state: None,
            duration_seconds: Seconds(duration),
            duration_from_origin_seconds: Seconds(duration),
            distance_mm: Millimeters::ZERO,
            weight: Weight::ZERO,
            street_mode: StreetMode::Walk,
            is_bike_share: false,
            turn_restrictions: turns,
        }
    }

    #[test]
    fn cheaper_state_dominates_more_expensive_one_at_same_edge() {
        let mut arena = StateArena::new();
        let a = arena.push(state(0, Some(EdgeId(3)), 100, TurnProgress::empty()));
        let mut index = BestStatesIndex::new(DominanceVariable::DurationSeconds);
        assert!(index.offer(a, &arena));

        let b = arena.push(state(0, Some(EdgeId(3)), 200, TurnProgress::empty()));
        assert!(!index.offer(b, &arena));
        assert!(index.is_zombie(b, &arena));
        assert!(!index.is_zombie(a, &arena));
    }

    #[test]
    fn better_state_evicts_existing_one() {
        let mut arena = StateArena::new();
        let a = arena.push(state(0, Some(EdgeId(3)), 200, TurnProgress::empty()));
        let mut index = BestStatesIndex::new(DominanceVariable::DurationSeconds);
        assert!(index.offer(a, &arena));

        let b = arena.push(state(0, Some(EdgeId(3)), 100, TurnProgress::empty()));
        assert!(index.offer(b, &arena));
        assert!(index.is_zombie(a, &arena));
    }

    #[test]
    fn divergent_turn_progress_is_incomparable() {
        let mut arena = StateArena::new();
        let progress_a = TurnProgress::empty().advanced(crate::model::turn::TurnRestrictionId(0), 1);
        let progress_b = TurnProgress::empty().advanced(crate::model::turn::TurnRestrictionId(1), 1);

        let a = arena.push(state(0, Some(EdgeId(3)), 50, progress_a));
        let mut index = BestStatesIndex::new(DominanceVariable::DurationSeconds);
        assert!(index.offer(a, &arena));

        let b = arena.push(state(0, Some(EdgeId(3)), 500, progress_b));
        assert!(index.offer(b, &arena));
        assert!(!index.is_zombie(a, &arena));
        assert!(!index.is_zombie(b, &arena));
    }

    #[test]
    fn identical_turn_progress_still_dominates() {
        let mut arena = StateArena::new();
        let progress = TurnProgress::empty().advanced(crate::model::turn::TurnRestrictionId(0), 1);

        let a = arena.push(state(0, Some(EdgeId(3)), 50, progress.clone()));
        let mut index = BestStatesIndex::new(DominanceVariable::DurationSeconds);
        assert!(index.offer(a, &arena));

        let b = arena.push(state(0, Some(EdgeId(3)), 500, progress));
        assert!(!index.offer(b, &arena));
    }
}
