#![warn(missing_docs)]

//! Math types for the cutcell intersection engine.
//!
//! Thin wrappers around nalgebra providing the point and vector types used
//! by every cutcell crate, an axis-aligned bounding box, the six probe
//! directions, and adaptive-precision orientation predicates.

pub mod bbox;
pub mod predicates;

pub use bbox::Aabb3;
pub use predicates::{orient2d, orient3d, Sign};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in a 2D projection plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The x axis.
    X = 0,
    /// The y axis.
    Y = 1,
    /// The z axis.
    Z = 2,
}

impl Axis {
    /// All three axes in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The two remaining axes, in cyclic order (x -> y,z; y -> z,x; z -> x,y).
    pub const fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// One of the six axis-aligned probe directions.
///
/// The discriminant is the slot index used by every six-direction array:
/// `X-`, `X+`, `Y-`, `Y+`, `Z-`, `Z+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Negative x.
    XMinus = 0,
    /// Positive x.
    XPlus = 1,
    /// Negative y.
    YMinus = 2,
    /// Positive y.
    YPlus = 3,
    /// Negative z.
    ZMinus = 4,
    /// Positive z.
    ZPlus = 5,
}

impl Direction {
    /// All six directions in slot order.
    pub const ALL: [Direction; 6] = [
        Direction::XMinus,
        Direction::XPlus,
        Direction::YMinus,
        Direction::YPlus,
        Direction::ZMinus,
        Direction::ZPlus,
    ];

    /// Slot index (0..6).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction for a slot index, if it is in range.
    pub const fn from_index(d: usize) -> Option<Self> {
        match d {
            0 => Some(Direction::XMinus),
            1 => Some(Direction::XPlus),
            2 => Some(Direction::YMinus),
            3 => Some(Direction::YPlus),
            4 => Some(Direction::ZMinus),
            5 => Some(Direction::ZPlus),
            _ => None,
        }
    }

    /// The axis this direction runs along.
    pub const fn axis(self) -> Axis {
        match self {
            Direction::XMinus | Direction::XPlus => Axis::X,
            Direction::YMinus | Direction::YPlus => Axis::Y,
            Direction::ZMinus | Direction::ZPlus => Axis::Z,
        }
    }

    /// True for the `+` directions.
    pub const fn is_positive(self) -> bool {
        self as usize % 2 == 1
    }

    /// The direction pointing the other way along the same axis.
    pub const fn opposite(self) -> Self {
        match self {
            Direction::XMinus => Direction::XPlus,
            Direction::XPlus => Direction::XMinus,
            Direction::YMinus => Direction::YPlus,
            Direction::YPlus => Direction::YMinus,
            Direction::ZMinus => Direction::ZPlus,
            Direction::ZPlus => Direction::ZMinus,
        }
    }

    /// Both directions along an axis, `(minus, plus)`.
    pub const fn pair(axis: Axis) -> (Direction, Direction) {
        match axis {
            Axis::X => (Direction::XMinus, Direction::XPlus),
            Axis::Y => (Direction::YMinus, Direction::YPlus),
            Axis::Z => (Direction::ZMinus, Direction::ZPlus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_slots() {
        for (d, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), d);
            assert_eq!(Direction::from_index(d), Some(*dir));
        }
        assert_eq!(Direction::from_index(6), None);
    }

    #[test]
    fn test_direction_axis_and_opposite() {
        assert_eq!(Direction::YPlus.axis(), Axis::Y);
        assert!(Direction::ZPlus.is_positive());
        assert!(!Direction::XMinus.is_positive());
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.opposite().axis(), dir.axis());
        }
        assert_eq!(Direction::pair(Axis::Z), (Direction::ZMinus, Direction::ZPlus));
    }

    #[test]
    fn test_axis_others_cyclic() {
        assert_eq!(Axis::X.others(), (Axis::Y, Axis::Z));
        assert_eq!(Axis::Y.others(), (Axis::Z, Axis::X));
        assert_eq!(Axis::Z.others(), (Axis::X, Axis::Y));
    }
}
