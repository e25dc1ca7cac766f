use crate::error::RouterError;
use crate::model::edge::EdgeId;
use crate::model::mode::StreetMode;
use crate::model::units::Seconds;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::rc::Rc;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnRestrictionId(pub u32);

impl Display for TurnRestrictionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tr{}", self.0)
    }
}

/// an ordered sequence of edges that must (`only == true`) or must not
/// (`only == false`) be followed by the given suffix once `from_edge` has
/// been entered. `via_edges` may be empty for a simple from/to restriction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnRestriction {
    pub from_edge: EdgeId,
    pub via_edges: Vec<EdgeId>,
    pub to_edge: EdgeId,
    pub only: bool,
}

impl TurnRestriction {
    /// the full edge sequence this restriction matches against, in order.
    pub fn sequence(&self) -> impl Iterator<Item = EdgeId> + '_ {
        std::iter::once(self.from_edge)
            .chain(self.via_edges.iter().copied())
            .chain(std::iter::once(self.to_edge))
    }

    pub fn len(&self) -> usize {
        self.via_edges.len() + 2
    }
}

impl Display for TurnRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let polarity = if self.only { "only" } else { "no" };
        write!(f, "{polarity}: {}", self.sequence().join(" -> "))
    }
}

/// read-only table of every [`TurnRestriction`] in the graph, indexed by the
/// edge that begins each one.
#[derive(Debug, Default)]
pub struct TurnRestrictions {
    restrictions: Box<[TurnRestriction]>,
    starting_at: IndexMap<EdgeId, Vec<TurnRestrictionId>>,
}

impl TurnRestrictions {
    pub fn new(restrictions: Vec<TurnRestriction>) -> TurnRestrictions {
        let mut starting_at: IndexMap<EdgeId, Vec<TurnRestrictionId>> = IndexMap::new();
        for (idx, restriction) in restrictions.iter().enumerate() {
            starting_at
                .entry(restriction.from_edge)
                .or_default()
                .push(TurnRestrictionId(idx as u32));
        }
        TurnRestrictions {
            restrictions: restrictions.into_boxed_slice(),
            starting_at,
        }
    }

    pub fn get(&self, id: TurnRestrictionId) -> Result<&TurnRestriction, RouterError> {
        self.restrictions
            .get(id.0 as usize)
            .ok_or(RouterError::TurnRestrictionNotFound(id))
    }

    /// restrictions whose `from_edge` is `edge`, i.e. ones that begin
    /// tracking progress the moment `edge` is traversed.
    pub fn starting_at(&self, edge: EdgeId) -> &[TurnRestrictionId] {
        self.starting_at.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }
}

/// persistent (structural-sharing) record of how far a state has advanced
/// into every turn restriction it is currently inside. cloning a [`TurnProgress`]
/// is `O(1)`; only the single restriction being advanced allocates a new map.
///
/// equality and hashing are structural, which is what lets two states at the
/// same edge with identical progress be treated as coincident for dominance
/// purposes (see the specification's narrow identical-progress exception).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TurnProgress(Option<Rc<BTreeMap<TurnRestrictionId, u16>>>);

impl TurnProgress {
    pub fn empty() -> TurnProgress {
        TurnProgress(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_ref().is_none_or(|m| m.is_empty())
    }

    /// edges consumed so far for `id`, or 0 if not currently tracked.
    pub fn edges_consumed(&self, id: TurnRestrictionId) -> u16 {
        self.0.as_ref().and_then(|m| m.get(&id)).copied().unwrap_or(0)
    }

    pub fn advanced(&self, id: TurnRestrictionId, edges_consumed: u16) -> TurnProgress {
        let mut map = self.0.as_deref().cloned().unwrap_or_default();
        map.insert(id, edges_consumed);
        TurnProgress(Some(Rc::new(map)))
    }

    pub fn cleared(&self, id: TurnRestrictionId) -> TurnProgress {
        let Some(existing) = self.0.as_deref() else {
            return self.clone();
        };
        let mut map = existing.clone();
        map.remove(&id);
        if map.is_empty() {
            TurnProgress(None)
        } else {
            TurnProgress(Some(Rc::new(map)))
        }
    }

    pub fn tracked_ids(&self) -> impl Iterator<Item = TurnRestrictionId> + '_ {
        self.0.iter().flat_map(|m| m.keys().copied())
    }
}

/// geometric classification of a turn between two consecutive edges, derived
/// from the signed bearing change between them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnType {
    Straight,
    Right,
    Left,
    UTurn,
}

const STRAIGHT_THRESHOLD_DEGREES: f64 = 20.0;
const UTURN_THRESHOLD_DEGREES: f64 = 160.0;

/// normalizes a bearing delta to `(-180, 180]`.
fn normalize_bearing_delta(delta_degrees: f64) -> f64 {
    let mut d = delta_degrees % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}

pub fn classify_turn(entry_bearing_degrees: f64, exit_bearing_degrees: f64) -> TurnType {
    let delta = normalize_bearing_delta(exit_bearing_degrees - entry_bearing_degrees);
    let magnitude = delta.abs();
    if magnitude <= STRAIGHT_THRESHOLD_DEGREES {
        TurnType::Straight
    } else if magnitude >= UTURN_THRESHOLD_DEGREES {
        TurnType::UTurn
    } else if delta > 0.0 {
        TurnType::Right
    } else {
        TurnType::Left
    }
}

/// assigns a time penalty to a turn, given which side of the road traffic
/// drives on. crossing oncoming traffic (a left turn where driving is on the
/// right, or vice versa) costs more than a turn with the flow of traffic.
/// pedestrians and cyclists are not penalized for turning.
#[derive(Copy, Clone, Debug)]
pub struct TurnCostCalculator {
    pub drive_on_right: bool,
}

impl TurnCostCalculator {
    pub fn new(drive_on_right: bool) -> TurnCostCalculator {
        TurnCostCalculator { drive_on_right }
    }

    pub fn cost(&self, turn_type: TurnType, mode: StreetMode) -> Seconds {
        if mode != StreetMode::Car {
            return Seconds::ZERO;
        }
        let crosses_traffic = match turn_type {
            TurnType::Left => self.drive_on_right,
            TurnType::Right => !self.drive_on_right,
            _ => false,
        };
        match turn_type {
            TurnType::Straight => Seconds::ZERO,
            TurnType::UTurn => Seconds(20),
            _ if crosses_traffic => Seconds(8),
            _ => Seconds(2),
        }
    }
}
