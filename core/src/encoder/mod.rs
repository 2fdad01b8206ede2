//! Volume encoding
//!
//! [`encode`] converts the floating-point dose volume into 32-bit pixel
//! values and [`apply_to_template`] writes them, with the grid geometry and
//! fresh identity, onto the template RT Dose record.

pub mod template;

pub use template::{apply_to_template, InstanceUids};

use crate::error::{ConvertError, Result};
use crate::types::{DoseVolume, EncodeOptions, OverflowPolicy};
use log::warn;
use ndarray::{Array3, Zip};

/// Quantized dose volume
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDose {
    /// Pixel values indexed as (frame, row, column)
    pub pixels: Array3<u32>,

    /// Factor converting pixel values back to dose
    pub dose_grid_scaling: f64,

    /// Voxels written as 0 because they fell below the threshold
    pub zeroed_voxels: usize,

    /// Voxels saturated at `u32::MAX`
    pub clamped_voxels: usize,
}

impl EncodedDose {
    /// Pixel data bytes: little-endian `u32`, frame by frame, row by row
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for value in self.pixels.iter() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Dose recovered from a stored pixel value
    pub fn dose_at(&self, frame: usize, row: usize, column: usize) -> f64 {
        self.pixels[[frame, row, column]] as f64 * self.dose_grid_scaling
    }
}

/// Scales, thresholds and quantizes a dose volume
///
/// Every voxel is multiplied by `10^scale_exponent`. Scaled values below
/// the threshold (including interpolation undershoot below zero) become 0,
/// the rest are truncated toward zero into a `u32`.
///
/// # Errors
///
/// - [`ConvertError::NonFiniteDose`] if a voxel is NaN or infinite
/// - [`ConvertError::DoseOverflow`] if a scaled value exceeds `u32::MAX` and
///   the overflow policy is [`OverflowPolicy::Error`]
pub fn encode(volume: &DoseVolume, options: &EncodeOptions) -> Result<EncodedDose> {
    let factor = options.scale_factor();
    let ceiling = u32::MAX as f64;

    let mut pixels = Array3::<u32>::zeros(volume.data.dim());
    let mut zeroed_voxels = 0;
    let mut clamped_voxels = 0;
    let mut overflow: Option<f64> = None;
    let mut non_finite: Option<(usize, usize, usize)> = None;

    Zip::indexed(&mut pixels)
        .and(&volume.data)
        .for_each(|index, pixel, &dose| {
            let scaled = dose * factor;
            if !scaled.is_finite() {
                non_finite.get_or_insert(index);
                *pixel = 0;
            } else if scaled < options.threshold {
                zeroed_voxels += 1;
                *pixel = 0;
            } else if scaled > ceiling {
                clamped_voxels += 1;
                overflow.get_or_insert(scaled);
                *pixel = u32::MAX;
            } else {
                *pixel = scaled as u32;
            }
        });

    if let Some((frame, row, column)) = non_finite {
        return Err(ConvertError::NonFiniteDose { frame, row, column });
    }

    if clamped_voxels > 0 {
        match options.overflow {
            OverflowPolicy::Error => {
                return Err(ConvertError::DoseOverflow {
                    value: overflow.unwrap_or(ceiling),
                })
            }
            OverflowPolicy::Clamp => warn!(
                "{} voxels exceed the 32-bit range at scale 10^{} and were clamped",
                clamped_voxels, options.scale_exponent
            ),
        }
    }

    Ok(EncodedDose {
        pixels,
        dose_grid_scaling: options.dose_grid_scaling(),
        zeroed_voxels,
        clamped_voxels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Extents, PixelSpacing};
    use ndarray::Array;
    use rstest::rstest;

    fn volume(values: Vec<f64>) -> DoseVolume {
        let n = values.len();
        DoseVolume {
            data: Array::from_shape_vec((1, 1, n), values).unwrap(),
            plane_positions: vec![0.0],
            frame_offsets: vec![0.0],
            spacing: PixelSpacing::default(),
            source_extents: Extents {
                x: (0.0, 1.0),
                y: (0.0, 0.0),
                z: (0.0, 1.0),
            },
        }
    }

    #[test]
    fn test_scaling_recovers_dose() {
        let doses = vec![0.0, 0.123456789, 1.0, 12.5, 42.0];
        let encoded = encode(&volume(doses.clone()), &EncodeOptions::default()).unwrap();

        assert_eq!(encoded.dose_grid_scaling, 1e-8);
        for (i, dose) in doses.iter().enumerate() {
            let recovered = encoded.dose_at(0, 0, i);
            assert!((recovered - dose).abs() <= 1e-8, "{} vs {}", recovered, dose);
        }
    }

    #[rstest]
    #[case(-0.5)]
    #[case(-1e-12)]
    #[case(0.0)]
    #[case(5e-12)]
    fn test_below_threshold_is_zero(#[case] dose: f64) {
        // 5e-12 * 1e8 = 5e-4 < 0.001
        let encoded = encode(&volume(vec![dose]), &EncodeOptions::default()).unwrap();
        assert_eq!(encoded.pixels[[0, 0, 0]], 0);
        assert_eq!(encoded.zeroed_voxels, 1);
    }

    #[test]
    fn test_threshold_applies_to_scaled_value() {
        let options = EncodeOptions::default().with_scale_exponent(0).with_threshold(0.5);
        let encoded = encode(&volume(vec![0.4, 0.6, 2.9]), &options).unwrap();
        assert_eq!(encoded.pixels.as_slice().unwrap(), &[0, 0, 2]);
        assert_eq!(encoded.zeroed_voxels, 1);
    }

    #[test]
    fn test_overflow_clamps_by_default() {
        // 50 Gy * 1e8 = 5e9 > u32::MAX
        let encoded = encode(&volume(vec![50.0, 1.0]), &EncodeOptions::default()).unwrap();
        assert_eq!(encoded.pixels[[0, 0, 0]], u32::MAX);
        assert_eq!(encoded.pixels[[0, 0, 1]], 100_000_000);
        assert_eq!(encoded.clamped_voxels, 1);
    }

    #[test]
    fn test_overflow_error_policy() {
        let options = EncodeOptions::default().with_overflow(OverflowPolicy::Error);
        let err = encode(&volume(vec![1.0, 50.0]), &options).unwrap_err();
        match err {
            ConvertError::DoseOverflow { value } => assert_eq!(value, 5e9),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_non_finite_dose_is_error(#[case] dose: f64) {
        let err = encode(&volume(vec![1.0, dose, 2.0]), &EncodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::NonFiniteDose {
                frame: 0,
                row: 0,
                column: 1
            }
        ));
    }

    #[test]
    fn test_pixel_bytes_are_little_endian_frame_major() {
        let mut v = volume(vec![0.0; 2]);
        v.data = Array::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let options = EncodeOptions::default().with_scale_exponent(0);
        let bytes = encode(&v, &options).unwrap().to_le_bytes();

        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &4u32.to_le_bytes());
    }
}
