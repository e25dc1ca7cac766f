//! Router-level configuration: mode, dominance variable, stopping
//! conditions, and which visitor (if any) harvests the state cloud as it's
//! produced. Kept separate from [`crate::request::ProfileRequest`], which
//! carries the per-mode speeds and reluctance factors that feed into edge
//! traversal cost rather than search-loop behavior.

use crate::model::dominance::DominanceVariable;
use crate::model::flags::VertexFlags;
use crate::model::vertex::VertexId;
use log::warn;
use serde::{Deserialize, Serialize};

/// default snap radius used when neither [`RouterConfig`] nor a caller-
/// supplied split overrides it.
pub const DEFAULT_LINK_RADIUS_METERS: f64 = 500.0;

/// search-loop configuration for one [`crate::algorithm::router::StreetRouter`]
/// invocation. `distance_limit_meters` and `time_limit_seconds` of `0.0`
/// disable the corresponding prune (the default: explore the whole
/// reachable graph).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub dominance_variable: DominanceVariable,
    pub distance_limit_meters: f64,
    pub time_limit_seconds: i64,
    pub link_radius_meters: f64,
    pub transit_stop_search: bool,
    pub max_transit_stops: usize,
    pub flag_search: Option<VertexFlags>,
    pub max_vertices: usize,
    pub to_vertex: Option<VertexId>,
}

impl Default for RouterConfig {
    fn default() -> RouterConfig {
        RouterConfig {
            dominance_variable: DominanceVariable::DurationSeconds,
            distance_limit_meters: 0.0,
            time_limit_seconds: 0,
            link_radius_meters: DEFAULT_LINK_RADIUS_METERS,
            transit_stop_search: false,
            max_transit_stops: usize::MAX,
            flag_search: None,
            max_vertices: usize::MAX,
            to_vertex: None,
        }
    }
}

impl RouterConfig {
    /// logs the diagnostics the specification calls for when a stopping
    /// condition is set against a dominance variable it doesn't match, or
    /// when both distance and time limits are active at once. none of these
    /// are treated as fatal -- the router still runs with the limits as
    /// given, and the caller is responsible for interpreting results that
    /// are non-optimal with respect to the active dominance variable.
    pub fn validate(&self) {
        use DominanceVariable::*;
        let distance_limited = self.distance_limit_meters > 0.0;
        let time_limited = self.time_limit_seconds > 0;

        if distance_limited && !matches!(self.dominance_variable, DistanceMillimeters) {
            warn!(
                "distance_limit_meters is set but dominance_variable is {:?}; \
                 pruning on distance while optimizing a different variable can \
                 yield non-optimal results for that variable",
                self.dominance_variable
            );
        }
        if time_limited && !matches!(self.dominance_variable, DurationSeconds) {
            warn!(
                "time_limit_seconds is set but dominance_variable is {:?}; \
                 pruning on duration while optimizing a different variable can \
                 yield non-optimal results for that variable",
                self.dominance_variable
            );
        }
        if distance_limited && time_limited {
            warn!("both distance_limit_meters and time_limit_seconds are set; this is unusual but not an error");
        }
    }
}
