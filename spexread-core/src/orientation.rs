//! Sensor orientation algebra.
//!
//! An orientation is a horizontal flip, a vertical flip and a 90° clockwise
//! rotation, applied in exactly that order. LightField composes its
//! transforms the same way, which gives the 8 representable orientations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of a data axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Lower-case axis label.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can stand in for an axis in [`Orientation::apply`].
///
/// Coordinate and calibration arrays reverse their element order; axis labels
/// have no order and stay unchanged.
pub trait Reversible {
    #[must_use]
    fn reversed(self) -> Self;
}

impl<T> Reversible for Vec<T> {
    fn reversed(mut self) -> Self {
        self.reverse();
        self
    }
}

impl Reversible for Axis {
    fn reversed(self) -> Self {
        self
    }
}

/// A composition of flips and rotation, as `(flip_h, flip_v, rotate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orientation {
    /// Horizontal flip, reverses the x axis.
    pub flip_h: bool,
    /// Vertical flip, reverses the y axis.
    pub flip_v: bool,
    /// 90° clockwise rotation.
    pub rotate: bool,
}

impl Orientation {
    /// The untransformed orientation.
    pub const NORMAL: Orientation = Orientation::new(false, false, false);

    #[inline]
    #[must_use]
    pub const fn new(flip_h: bool, flip_v: bool, rotate: bool) -> Self {
        Self {
            flip_h,
            flip_v,
            rotate,
        }
    }

    /// All 8 orientations, in `(flip_h, flip_v, rotate)` binary order.
    #[must_use]
    pub fn all() -> [Orientation; 8] {
        let mut out = [Orientation::NORMAL; 8];
        for (i, o) in out.iter_mut().enumerate() {
            *o = Orientation::new(i & 0b100 != 0, i & 0b010 != 0, i & 0b001 != 0);
        }
        out
    }

    /// Parses an orientation label.
    ///
    /// Each flag is set when its marker substring (`Horiz`, `Vert`, `Rot`) is
    /// present. Matching is case-sensitive; anything else, including an empty
    /// string, is [`Orientation::NORMAL`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.contains("Horiz"),
            text.contains("Vert"),
            text.contains("Rot"),
        )
    }

    /// Canonical label, the inverse of [`Orientation::parse`].
    #[must_use]
    pub fn label(self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.flip_h {
            parts.push("FlipHorizontal");
        }
        if self.flip_v {
            parts.push("FlipVertical");
        }
        if self.rotate {
            parts.push("Rotate90Clockwise");
        }
        if parts.is_empty() {
            "Normal".to_string()
        } else {
            parts.join(",")
        }
    }

    /// Applies the transform to an axis pair and returns the new `(x, y)`.
    ///
    /// Flip horizontal reverses `x`, flip vertical reverses `y`, then a
    /// rotation returns `(reversed(y), x)`.
    pub fn apply<A: Reversible>(self, x: A, y: A) -> (A, A) {
        let (mut x, mut y) = (x, y);
        if self.flip_h {
            x = x.reversed();
        }
        if self.flip_v {
            y = y.reversed();
        }
        if self.rotate {
            let rotated_x = y.reversed();
            y = x;
            x = rotated_x;
        }
        (x, y)
    }

    /// The transform that maps data in `from` onto `to`.
    ///
    /// Flips combine by XOR. Rotation is needed whenever the two rotation
    /// states differ, since rotating changes which axis is which.
    #[must_use]
    pub fn transformation_between(from: Orientation, to: Orientation) -> Orientation {
        Orientation::new(
            from.flip_h ^ to.flip_h,
            from.flip_v ^ to.flip_v,
            from.rotate != to.rotate,
        )
    }

    /// Returns true when no flip or rotation is applied.
    #[must_use]
    pub fn is_normal(self) -> bool {
        self == Orientation::NORMAL
    }
}

/// Parses an orientation label, see [`Orientation::parse`].
#[must_use]
pub fn parse_orientation(text: &str) -> Orientation {
    Orientation::parse(text)
}

/// See [`Orientation::transformation_between`].
#[must_use]
pub fn transformation_between(from: Orientation, to: Orientation) -> Orientation {
    Orientation::transformation_between(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orientation() {
        assert_eq!(parse_orientation("HorizRot"), Orientation::new(true, false, true));
        assert_eq!(parse_orientation(""), Orientation::NORMAL);
        assert_eq!(parse_orientation("Normal"), Orientation::NORMAL);
        assert_eq!(
            parse_orientation("FlipVertical"),
            Orientation::new(false, true, false)
        );
        // Case-sensitive substring test.
        assert_eq!(parse_orientation("horizontal,rotate"), Orientation::NORMAL);
    }

    #[test]
    fn test_label_round_trip() {
        for o in Orientation::all() {
            assert_eq!(Orientation::parse(&o.label()), o);
        }
        assert_eq!(Orientation::NORMAL.label(), "Normal");
    }

    #[test]
    fn test_identity_transformation() {
        for o in Orientation::all() {
            assert!(transformation_between(o, o).is_normal());
        }
    }

    #[test]
    fn test_apply_axis_labels() {
        let rot = Orientation::new(false, false, true);
        assert_eq!(rot.apply(Axis::X, Axis::Y), (Axis::Y, Axis::X));
        assert_eq!(
            Orientation::new(true, true, false).apply(Axis::X, Axis::Y),
            (Axis::X, Axis::Y)
        );
    }

    #[test]
    fn test_apply_arrays() {
        let x = vec![0, 1, 2];
        let y = vec![10, 11];

        let (nx, ny) = Orientation::new(true, false, false).apply(x.clone(), y.clone());
        assert_eq!((nx, ny), (vec![2, 1, 0], vec![10, 11]));

        let (nx, ny) = Orientation::new(false, true, false).apply(x.clone(), y.clone());
        assert_eq!((nx, ny), (vec![0, 1, 2], vec![11, 10]));

        // Rotation is a swap that also reverses the former y axis.
        let (nx, ny) = Orientation::new(false, false, true).apply(x.clone(), y.clone());
        assert_eq!((nx, ny), (vec![11, 10], vec![0, 1, 2]));

        let (nx, ny) = Orientation::new(true, false, true).apply(x, y);
        assert_eq!((nx, ny), (vec![11, 10], vec![2, 1, 0]));
    }

    #[test]
    fn test_round_trip_all_pairs() {
        let x = vec![0, 1, 2, 3];
        let y = vec![10, 11, 12];
        for from in Orientation::all() {
            for to in Orientation::all() {
                let forward = transformation_between(from, to);
                let backward = transformation_between(to, from);
                assert_eq!(forward, backward);

                let (fx, fy) = forward.apply(Axis::X, Axis::Y);
                let (bx, by) = backward.apply(fx, fy);
                assert_eq!((bx, by), (Axis::X, Axis::Y));

                if !forward.rotate {
                    let (fx, fy) = forward.apply(x.clone(), y.clone());
                    assert_eq!(backward.apply(fx, fy), (x.clone(), y.clone()));
                } else {
                    // Rotation swaps axis identity; the element multiset survives.
                    let (fx, fy) = forward.apply(x.clone(), y.clone());
                    let (bx, by) = backward.apply(fx, fy);
                    assert_eq!(bx.len(), x.len());
                    assert_eq!(by.len(), y.len());
                }
            }
        }
    }
}
