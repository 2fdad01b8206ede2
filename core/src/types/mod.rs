//! Core type definitions for dose conversion
//!
//! This module provides the data model shared by the pipeline stages:
//! - [`DoseSample`] / [`SampleTable`]: scattered dose samples read from the spreadsheet
//! - [`Extents`]: per-axis bounds of a sample table
//! - [`PatientInfo`]: patient identity from the spreadsheet header
//! - [`PixelSpacing`]: in-plane resampling spacing
//! - [`DoseVolume`]: the reconstructed (frame, row, column) dose grid
//! - [`ConvertOptions`]: grid, encoding and run configuration

mod options;
mod patient;
mod pixel_spacing;
mod sample;
mod volume;

pub use options::{ConvertOptions, EncodeOptions, GridConfig, Interpolation, OverflowPolicy};
pub use patient::PatientInfo;
pub use pixel_spacing::PixelSpacing;
pub use sample::{DoseSample, Extents, SampleTable};
pub use volume::DoseVolume;
