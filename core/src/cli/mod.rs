pub mod report;

use crate::types::{
    ConvertOptions, EncodeOptions, GridConfig, Interpolation, OverflowPolicy, PixelSpacing,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for eyeplan2dicom
#[derive(Parser, Debug)]
#[command(name = "eyeplan2dicom")]
#[command(about = "Convert an Eyeplan Excel dose file to a DICOM RT Dose file.")]
#[command(version)]
pub struct Cli {
    /// Excel (.xlsx) file name
    #[arg(value_name = "FILENAME")]
    pub filename: PathBuf,

    /// Source DICOM RT Dose file name
    #[arg(value_name = "SOURCEDICOM")]
    pub sourcedicom: PathBuf,

    /// Output DICOM RT Dose file name
    #[arg(value_name = "OUTPUTDICOM")]
    pub outputdicom: PathBuf,

    /// Show debug log
    #[arg(short, long)]
    pub debug: bool,

    /// In-plane resampling spacing as "row\column" (e.g. "0.1\0.1")
    #[arg(long, default_value = "0.1\\0.1", value_parser = PixelSpacing::parse)]
    pub spacing: PixelSpacing,

    /// Surface fitted over each dose plane
    #[arg(long, default_value = "cubic")]
    pub interpolation: InterpolationArg,

    /// Decimal exponent applied to the dose before 32-bit quantization
    #[arg(long, default_value_t = 8, allow_negative_numbers = true)]
    pub scale: i32,

    /// Scaled values below this are written as zero
    #[arg(long, default_value_t = 0.001)]
    pub threshold: f64,

    /// Fail instead of clamping doses that exceed the 32-bit range
    #[arg(long)]
    pub strict_range: bool,

    /// Convert without writing the output file
    #[arg(long)]
    pub dry_run: bool,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Interpolation options
#[derive(Debug, Clone, ValueEnum)]
pub enum InterpolationArg {
    /// Bicubic spline through every sample
    Cubic,
    /// Bilinear interpolation
    Linear,
}

impl From<InterpolationArg> for Interpolation {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::Cubic => Interpolation::Cubic,
            InterpolationArg::Linear => Interpolation::Linear,
        }
    }
}

impl Cli {
    /// Conversion options selected by the arguments
    pub fn convert_options(&self) -> ConvertOptions {
        let overflow = if self.strict_range {
            OverflowPolicy::Error
        } else {
            OverflowPolicy::Clamp
        };

        ConvertOptions::default()
            .with_grid(
                GridConfig::default()
                    .with_spacing(self.spacing)
                    .with_interpolation(self.interpolation.clone().into()),
            )
            .with_encode(
                EncodeOptions::default()
                    .with_scale_exponent(self.scale)
                    .with_threshold(self.threshold)
                    .with_overflow(overflow),
            )
            .dry_run(self.dry_run)
    }
}
