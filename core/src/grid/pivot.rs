use crate::error::{ConvertError, Result};
use crate::types::DoseSample;
use ndarray::Array2;
use std::cmp::Ordering;

/// Dose samples of one Y plane pivoted onto their (Z, X) grid
///
/// `dose[[i, j]]` is the dose at `z[i]`, `x[j]`. Both axes are sorted
/// ascending and every cell is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGrid {
    pub y: f64,
    pub z: Vec<f64>,
    pub x: Vec<f64>,
    pub dose: Array2<f64>,
}

impl PlaneGrid {
    /// Pivots the samples of plane `y`
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::IncompleteGrid`] if:
    /// - a coordinate is not finite
    /// - the plane has fewer than two distinct Z or X values
    /// - an (X, Z) pair appears twice
    /// - an (X, Z) pair of the grid is absent or its dose is not a number
    /// - a dose is infinite
    pub fn from_samples<'a>(y: f64, samples: impl IntoIterator<Item = &'a DoseSample>) -> Result<Self> {
        let points: Vec<&DoseSample> = samples.into_iter().collect();

        if let Some(bad) = points.iter().find(|s| !s.x.is_finite() || !s.z.is_finite()) {
            return Err(ConvertError::incomplete(
                y,
                format!("non-finite coordinate X={}, Z={}", bad.x, bad.z),
            ));
        }

        let z = sorted_unique(points.iter().map(|s| s.z));
        let x = sorted_unique(points.iter().map(|s| s.x));
        if z.len() < 2 || x.len() < 2 {
            return Err(ConvertError::incomplete(
                y,
                format!(
                    "need at least 2 distinct Z and X values to interpolate, found {} and {}",
                    z.len(),
                    x.len()
                ),
            ));
        }

        let mut dose = Array2::<f64>::from_elem((z.len(), x.len()), f64::NAN);
        let mut filled = Array2::<bool>::from_elem((z.len(), x.len()), false);

        for sample in &points {
            let (Some(i), Some(j)) = (position(&z, sample.z), position(&x, sample.x)) else {
                continue;
            };
            if filled[[i, j]] {
                return Err(ConvertError::incomplete(
                    y,
                    format!("duplicate sample at X={}, Z={}", sample.x, sample.z),
                ));
            }
            if sample.dose.is_infinite() {
                return Err(ConvertError::incomplete(
                    y,
                    format!("non-finite dose {} at X={}, Z={}", sample.dose, sample.x, sample.z),
                ));
            }
            filled[[i, j]] = true;
            dose[[i, j]] = sample.dose;
        }

        if let Some(((i, j), _)) = dose.indexed_iter().find(|(_, v)| v.is_nan()) {
            return Err(ConvertError::incomplete(
                y,
                format!(
                    "missing dose at X={}, Z={} ({} of {} grid cells populated)",
                    x[j],
                    z[i],
                    dose.iter().filter(|v| !v.is_nan()).count(),
                    dose.len()
                ),
            ));
        }

        Ok(Self { y, z, x, dose })
    }

    /// Axis bounds as `[min Z, max Z, min X, max X]`
    pub fn bounds(&self) -> [f64; 4] {
        [self.z[0], self.z[self.z.len() - 1], self.x[0], self.x[self.x.len() - 1]]
    }
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    values.dedup();
    values
}

fn position(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| probe.partial_cmp(&value).unwrap_or(Ordering::Equal))
        .ok()
}
