use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// mode of travel. drives which edges are traversable, which speed applies,
/// and (for [`crate::model::dominance::DominanceVariable::Weight`]) whether a
/// reluctance factor is layered on top of travel time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetMode {
    Walk,
    Bicycle,
    Car,
}

impl Display for StreetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StreetMode::Walk => "walk",
            StreetMode::Bicycle => "bicycle",
            StreetMode::Car => "car",
        };
        write!(f, "{s}")
    }
}

/// bitset of [`StreetMode`] permissions, stored per-edge-direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSet(pub u8);

impl ModeSet {
    pub const NONE: ModeSet = ModeSet(0);
    pub const ALL: ModeSet = ModeSet(Self::WALK_BIT | Self::BICYCLE_BIT | Self::CAR_BIT);

    const WALK_BIT: u8 = 0b001;
    const BICYCLE_BIT: u8 = 0b010;
    const CAR_BIT: u8 = 0b100;

    fn bit(mode: StreetMode) -> u8 {
        match mode {
            StreetMode::Walk => Self::WALK_BIT,
            StreetMode::Bicycle => Self::BICYCLE_BIT,
            StreetMode::Car => Self::CAR_BIT,
        }
    }

    pub fn with(self, mode: StreetMode) -> ModeSet {
        ModeSet(self.0 | Self::bit(mode))
    }

    pub fn without(self, mode: StreetMode) -> ModeSet {
        ModeSet(self.0 & !Self::bit(mode))
    }

    pub fn allows(self, mode: StreetMode) -> bool {
        self.0 & Self::bit(mode) != 0
    }
}
