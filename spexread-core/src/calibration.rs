//! Wavelength calibration remapping between sensor orientations.
//!
//! A calibration is recorded against the first axis of the orientation the
//! sensor had at calibration time. When the sensor orientation changes
//! afterwards, the calibration values are reordered so they follow the
//! current data layout. This is purely an index remapping: nothing guarantees
//! that the calibration stays physically valid in the new orientation.

use crate::metadata::SpeMetadata;
use crate::orientation::{Axis, Orientation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A calibration expressed in the current sensor orientation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationMapping {
    /// Axis the calibration was recorded along.
    pub axis: Axis,
    /// Position of that axis in the current `(x, y)` order.
    pub current_position: usize,
    /// Remapped wavelength values.
    pub values: Vec<f64>,
}

impl CalibrationMapping {
    /// Picks calibration values at the given pixel coordinates.
    ///
    /// Coordinates outside the calibration yield `NaN`.
    #[must_use]
    pub fn sample(&self, coordinates: &[usize]) -> Vec<f64> {
        coordinates
            .iter()
            .map(|&c| self.values.get(c).copied().unwrap_or(f64::NAN))
            .collect()
    }
}

/// Remaps `wavelengths` recorded under `calibration` onto `current`.
#[must_use]
pub fn remap_calibration(
    wavelengths: &[f64],
    calibration: Orientation,
    current: Orientation,
) -> CalibrationMapping {
    let (axis, _) = calibration.apply(Axis::X, Axis::Y);
    let current_order = current.apply(Axis::X, Axis::Y);
    let current_position = usize::from(current_order.0 != axis);

    let delta = Orientation::transformation_between(calibration, current);
    let (x, y) = delta.apply(wavelengths.to_vec(), vec![0.0, 1.0]);
    let values = if current_position == 0 { x } else { y };

    CalibrationMapping {
        axis,
        current_position,
        values,
    }
}

/// Maps the file's wavelength calibration onto the current sensor orientation.
///
/// Returns `None` when the file carries no wavelengths.
#[must_use]
pub fn map_calibration_to_current(metadata: &SpeMetadata) -> Option<CalibrationMapping> {
    let calibrations = &metadata.calibrations;
    let wl = calibrations.wl();
    if wl.is_empty() {
        return None;
    }
    Some(remap_calibration(
        wl,
        calibrations.calibration_orientation(),
        calibrations.sensor_orientation(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WL: [f64; 4] = [500.0, 501.0, 502.0, 503.0];

    fn reversed() -> Vec<f64> {
        WL.iter().rev().copied().collect()
    }

    #[test]
    fn test_same_orientation_is_identity() {
        for o in Orientation::all() {
            let mapping = remap_calibration(&WL, o, o);
            assert_eq!(mapping.values, WL.to_vec());
            assert_eq!(mapping.current_position, 0);
        }
    }

    #[test]
    fn test_horizontal_flip_reverses() {
        let mapping = remap_calibration(
            &WL,
            Orientation::NORMAL,
            Orientation::new(true, false, false),
        );
        assert_eq!(mapping.axis, Axis::X);
        assert_eq!(mapping.values, reversed());
    }

    #[test]
    fn test_vertical_flip_keeps_order() {
        let mapping = remap_calibration(
            &WL,
            Orientation::NORMAL,
            Orientation::new(false, true, false),
        );
        assert_eq!(mapping.values, WL.to_vec());
    }

    #[test]
    fn test_rotation_moves_axis() {
        let mapping = remap_calibration(
            &WL,
            Orientation::NORMAL,
            Orientation::new(false, false, true),
        );
        assert_eq!(mapping.axis, Axis::X);
        assert_eq!(mapping.current_position, 1);
        assert_eq!(mapping.values, WL.to_vec());

        let mapping = remap_calibration(
            &WL,
            Orientation::new(false, false, true),
            Orientation::NORMAL,
        );
        assert_eq!(mapping.axis, Axis::Y);
        assert_eq!(mapping.current_position, 1);
        assert_eq!(mapping.values, WL.to_vec());
    }

    #[test]
    fn test_flip_and_rotation() {
        let mapping = remap_calibration(
            &WL,
            Orientation::NORMAL,
            Orientation::new(true, false, true),
        );
        assert_eq!(mapping.current_position, 1);
        assert_eq!(mapping.values, reversed());
    }

    #[test]
    fn test_values_never_land_on_placeholder() {
        for from in Orientation::all() {
            for to in Orientation::all() {
                let mapping = remap_calibration(&WL, from, to);
                assert_eq!(mapping.values.len(), WL.len());
            }
        }
    }

    #[test]
    fn test_sample() {
        let mapping = remap_calibration(&WL, Orientation::NORMAL, Orientation::NORMAL);
        let picked = mapping.sample(&[1, 3, 9]);
        assert_eq!(picked[..2], [501.0, 503.0]);
        assert!(picked[2].is_nan());
    }
}
