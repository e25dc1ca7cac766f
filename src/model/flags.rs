use serde::{Deserialize, Serialize};

macro_rules! bitset {
    ($name:ident { $($const_name:ident = $bit:expr),+ $(,)? }) => {
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub const EMPTY: $name = $name(0);
            $(pub const $const_name: $name = $name(1 << $bit);)+

            pub fn has(self, flag: $name) -> bool {
                self.0 & flag.0 == flag.0
            }

            pub fn set(self, flag: $name) -> $name {
                $name(self.0 | flag.0)
            }

            pub fn unset(self, flag: $name) -> $name {
                $name(self.0 & !flag.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

bitset!(VertexFlags {
    BIKE_SHARE = 0,
    PARK_AND_RIDE = 1,
});

bitset!(EdgeFlags {
    STAIRS = 0,
    LINKABLE = 1,
    BIKE_PATH = 2,
    SIDEWALK = 3,
    CROSSING = 4,
    ROUNDABOUT = 5,
    PLATFORM = 6,
});
