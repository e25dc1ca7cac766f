use crate::model::dominance::DominanceVariable;
use serde::{Deserialize, Serialize};

/// walking reluctance applied to WALK travel time when the dominance
/// variable is [`DominanceVariable::Weight`], to discourage long walks in a
/// weight-minimizing search relative to a pure duration-minimizing one.
pub const DEFAULT_WALK_RELUCTANCE: f64 = 2.0;

/// per-search parameters: mode speeds, which variable drives the search, and
/// the minimum travel time a visitor should report (see
/// [`crate::algorithm::visitor::StopVisitor`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub walk_speed_mps: f32,
    pub bicycle_speed_mps: f32,
    /// posted speed to use for CAR edges that do not carry their own; falls
    /// further back to [`crate::model::edge::DEFAULT_CAR_SPEED_MPS`].
    pub car_speed_mps: Option<f32>,
    pub walk_reluctance: f64,
    pub dominance_variable: DominanceVariable,
    /// when `true`, the search explores predecessors of the origin along
    /// incoming edges rather than successors along outgoing ones.
    pub reverse_search: bool,
    /// stop candidates reached before this floor (in seconds of travel time
    /// from the true origin, not from a split point) are not reported by
    /// [`crate::algorithm::visitor::StopVisitor`].
    pub min_travel_time_seconds: i64,
}

impl Default for ProfileRequest {
    fn default() -> ProfileRequest {
        ProfileRequest {
            walk_speed_mps: 1.3,
            bicycle_speed_mps: 4.1,
            car_speed_mps: None,
            walk_reluctance: DEFAULT_WALK_RELUCTANCE,
            dominance_variable: DominanceVariable::DurationSeconds,
            reverse_search: false,
            min_travel_time_seconds: 0,
        }
    }
}
