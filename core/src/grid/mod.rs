//! Dose grid reconstruction
//!
//! Turns the scattered samples of a [`SampleTable`] into a dense
//! [`DoseVolume`]: each Y plane is pivoted onto its (Z, X) grid, fitted
//! with a bivariate spline, resampled at the configured spacing and
//! stacked as one frame.

pub mod pivot;
pub mod spline;

pub use pivot::PlaneGrid;
pub use spline::arange;

use crate::error::{ConvertError, Result};
use crate::types::{DoseVolume, GridConfig, SampleTable};
use log::debug;
use ndarray::{s, Array2, Array3};
use std::cmp::Ordering;

/// Reconstructs the dose volume from a sample table
///
/// Frames are ordered by ascending Y. Rows follow Z over
/// `[min Z, max Z)` and columns follow X over `[min X, max X)`, both at the
/// configured spacing with an exclusive upper bound.
///
/// # Errors
///
/// - [`ConvertError::EmptyInput`] if the table is empty or holds fewer than two Y planes
/// - [`ConvertError::IncompleteGrid`] if a plane is not a fully populated rectangular grid
/// - [`ConvertError::InconsistentGrid`] if planes do not cover the same Z and X range
///
/// # Example
///
/// ```
/// use eyeplan_core::{reconstruct, DoseSample, GridConfig, PixelSpacing, SampleTable};
///
/// let mut table = SampleTable::default();
/// for y in [0.0, 5.0] {
///     for z in [0.0, 1.0, 2.0] {
///         for x in [0.0, 1.0, 2.0] {
///             table.push(DoseSample::new(x, y, z, x + z));
///         }
///     }
/// }
///
/// let config = GridConfig::default().with_spacing(PixelSpacing::new(1.0, 1.0));
/// let volume = reconstruct(&table, &config).unwrap();
/// assert_eq!(volume.dim(), (2, 2, 2));
/// ```
pub fn reconstruct(table: &SampleTable, config: &GridConfig) -> Result<DoseVolume> {
    let extents = table
        .extents()
        .ok_or_else(|| ConvertError::EmptyInput("the sample table has no rows".to_string()))?;

    let y_planes = table.y_planes();
    debug!("Y planes: {} {:?}", y_planes.len(), y_planes);
    if y_planes.len() < 2 {
        return Err(ConvertError::EmptyInput(format!(
            "found {} Y plane(s), at least 2 are needed to build a volume",
            y_planes.len()
        )));
    }

    debug!(
        "xmin: {}, xmax: {}, zmin: {}, zmax: {}",
        extents.x.0, extents.x.1, extents.z.0, extents.z.1
    );

    let last_y = y_planes[y_planes.len() - 1];
    let mut frame_offsets: Vec<f64> = y_planes.iter().map(|y| y - last_y).collect();
    frame_offsets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut plane_positions = y_planes;
    plane_positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut planes: Vec<Array2<f64>> = Vec::with_capacity(plane_positions.len());
    let mut reference: Option<(f64, [f64; 4])> = None;
    for &y in &plane_positions {
        debug!("Processing Y plane slice # {} mm", y);
        let grid = PlaneGrid::from_samples(y, table.plane(y))?;

        let bounds = grid.bounds();
        match reference {
            None => reference = Some((y, bounds)),
            Some((first_y, first_bounds)) if first_bounds != bounds => {
                return Err(ConvertError::InconsistentGrid(format!(
                    "Y plane {} covers Z {}..{}, X {}..{} but Y plane {} covers Z {}..{}, X {}..{}",
                    y,
                    bounds[0],
                    bounds[1],
                    bounds[2],
                    bounds[3],
                    first_y,
                    first_bounds[0],
                    first_bounds[1],
                    first_bounds[2],
                    first_bounds[3]
                )));
            }
            Some(_) => {}
        }

        planes.push(resample_plane(&grid, config)?);
    }

    let data = stack_planes(&planes);
    debug!("Dose grid shape (frames, rows, columns): {:?}", data.dim());

    Ok(DoseVolume {
        data,
        plane_positions,
        frame_offsets,
        spacing: config.spacing,
        source_extents: extents,
    })
}

/// Evaluates the fitted surface of one plane on the regular (Z, X) grid
///
/// The result is indexed as (row = Z, column = X).
pub fn resample_plane(grid: &PlaneGrid, config: &GridConfig) -> Result<Array2<f64>> {
    let z_targets = arange(grid.z[0], grid.z[grid.z.len() - 1], config.spacing.row);
    let x_targets = arange(grid.x[0], grid.x[grid.x.len() - 1], config.spacing.col);
    if z_targets.is_empty() || x_targets.is_empty() {
        return Err(ConvertError::incomplete(
            grid.y,
            "resampled grid has no rows or columns",
        ));
    }

    let singular = || ConvertError::incomplete(grid.y, "spline system is singular");
    let wz = spline::interpolation_weights(&grid.z, &z_targets, config.interpolation)
        .ok_or_else(singular)?;
    let wx = spline::interpolation_weights(&grid.x, &x_targets, config.interpolation)
        .ok_or_else(singular)?;

    Ok(wz.dot(&grid.dose).dot(&wx.t()))
}

fn stack_planes(planes: &[Array2<f64>]) -> Array3<f64> {
    let (rows, columns) = planes[0].dim();
    let mut volume = Array3::<f64>::zeros((planes.len(), rows, columns));

    for (i, plane) in planes.iter().enumerate() {
        volume.slice_mut(s![i, .., ..]).assign(plane);
    }

    volume
}
