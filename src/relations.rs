use serde_derive::{Deserialize, Serialize};

const CONTACT_BIT: u16 = 0;
const STATIC_ABOVE_BIT: u16 = 1;
const STATIC_BELOW_BIT: u16 = 2;
const STATIC_LEFT_OF_BIT: u16 = 3;
const STATIC_RIGHT_OF_BIT: u16 = 4;
const STATIC_BEHIND_OF_BIT: u16 = 5;
const STATIC_IN_FRONT_OF_BIT: u16 = 6;
// Bit 7 is reserved. It used to be "around", which is already implicitly
// encoded: around = above or below or left or right or behind or in front.
const STATIC_INSIDE_BIT: u16 = 8;
const STATIC_SURROUND_BIT: u16 = 9;
const DYNAMIC_MOVING_TOGETHER_BIT: u16 = 10;
const DYNAMIC_HALTING_TOGETHER_BIT: u16 = 11;
const DYNAMIC_FIXED_MOVING_TOGETHER_BIT: u16 = 12;
const DYNAMIC_GETTING_CLOSE_BIT: u16 = 13;
const DYNAMIC_MOVING_APART_BIT: u16 = 14;
const DYNAMIC_STABLE_BIT: u16 = 15;

/// Set of binary spatial predicates between an ordered pair of objects,
/// backed by a fixed 16-bit layout. The bit positions are part of the wire
/// contract and must not change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relations(u16);

macro_rules! relation_accessors {
    ($($get:ident, $set:ident => $bit:expr;)*) => {
        $(
            #[inline]
            pub fn $get(&self) -> bool {
                self.0 & (1 << $bit) != 0
            }

            #[inline]
            pub fn $set(&mut self, active: bool) {
                if active {
                    self.0 |= 1 << $bit;
                } else {
                    self.0 &= !(1 << $bit);
                }
            }
        )*
    };
}

impl Relations {
    /// Empty relation set, no predicate active.
    #[inline]
    pub fn none() -> Self {
        Self(0)
    }

    #[inline]
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn bits(&self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Keeps only the predicates present in `mask`.
    #[inline]
    pub fn filter(&self, mask: Relations) -> Relations {
        Relations(self.0 & mask.0)
    }

    relation_accessors! {
        contact, set_contact => CONTACT_BIT;
        static_above, set_static_above => STATIC_ABOVE_BIT;
        static_below, set_static_below => STATIC_BELOW_BIT;
        static_left_of, set_static_left_of => STATIC_LEFT_OF_BIT;
        static_right_of, set_static_right_of => STATIC_RIGHT_OF_BIT;
        static_behind_of, set_static_behind_of => STATIC_BEHIND_OF_BIT;
        static_in_front_of, set_static_in_front_of => STATIC_IN_FRONT_OF_BIT;
        static_inside, set_static_inside => STATIC_INSIDE_BIT;
        static_surround, set_static_surround => STATIC_SURROUND_BIT;
        dynamic_moving_together, set_dynamic_moving_together => DYNAMIC_MOVING_TOGETHER_BIT;
        dynamic_halting_together, set_dynamic_halting_together => DYNAMIC_HALTING_TOGETHER_BIT;
        dynamic_fixed_moving_together, set_dynamic_fixed_moving_together => DYNAMIC_FIXED_MOVING_TOGETHER_BIT;
        dynamic_getting_close, set_dynamic_getting_close => DYNAMIC_GETTING_CLOSE_BIT;
        dynamic_moving_apart, set_dynamic_moving_apart => DYNAMIC_MOVING_APART_BIT;
        dynamic_stable, set_dynamic_stable => DYNAMIC_STABLE_BIT;
    }

    /// Human-readable names of the active predicates, in bit order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();

        if self.contact() {
            labels.push("contact");
        }
        if self.static_above() {
            labels.push("above");
        }
        if self.static_below() {
            labels.push("below");
        }
        if self.static_left_of() {
            labels.push("left of");
        }
        if self.static_right_of() {
            labels.push("right of");
        }
        if self.static_behind_of() {
            labels.push("behind of");
        }
        if self.static_in_front_of() {
            labels.push("in front of");
        }
        if self.static_inside() {
            labels.push("inside");
        }
        if self.static_surround() {
            labels.push("surround");
        }
        if self.dynamic_moving_together() {
            labels.push("moving together");
        }
        if self.dynamic_halting_together() {
            labels.push("halting together");
        }
        if self.dynamic_fixed_moving_together() {
            labels.push("fixed moving together");
        }
        if self.dynamic_getting_close() {
            labels.push("getting close");
        }
        if self.dynamic_moving_apart() {
            labels.push("moving apart");
        }
        if self.dynamic_stable() {
            labels.push("stable");
        }

        labels
    }
}

impl From<u16> for Relations {
    #[inline]
    fn from(bits: u16) -> Self {
        Self::from_bits(bits)
    }
}

impl From<Relations> for u16 {
    #[inline]
    fn from(relations: Relations) -> Self {
        relations.bits()
    }
}
