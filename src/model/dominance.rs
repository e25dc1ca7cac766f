use serde::{Deserialize, Serialize};

/// which cumulative routing variable drives both priority ordering in the
/// search queue and state domination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominanceVariable {
    DurationSeconds,
    Weight,
    DistanceMillimeters,
}
