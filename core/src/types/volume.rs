use super::{Extents, PixelSpacing};
use ndarray::{Array3, Axis};

/// Reconstructed dose grid
///
/// `data` is indexed as (frame, row, column) where frames follow Y,
/// rows follow Z and columns follow X. Frames are ordered by ascending Y.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseVolume {
    /// Dose values in physical units
    pub data: Array3<f64>,

    /// Y position of each frame, ascending
    pub plane_positions: Vec<f64>,

    /// Sorted offsets of each plane relative to the last plane of the export
    pub frame_offsets: Vec<f64>,

    /// In-plane resampling spacing
    pub spacing: PixelSpacing,

    /// Bounds of the source samples, before resampling
    pub source_extents: Extents,
}

impl DoseVolume {
    /// Get the dimensions of the volume (frames, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn frames(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn rows(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn columns(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Largest dose in the volume (0 for an all-negative or empty volume)
    pub fn max_dose(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}
