use super::PixelSpacing;

/// Interpolation used to resample each Y plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum Interpolation {
    /// Tensor-product cubic spline with not-a-knot ends
    #[default]
    Cubic,
    /// Bilinear interpolation between neighbouring samples
    Linear,
}

/// Configuration of the grid reconstruction
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridConfig {
    /// In-plane resampling spacing
    pub spacing: PixelSpacing,

    /// Surface fitted over each plane
    pub interpolation: Interpolation,
}

impl GridConfig {
    /// Builder: Set the resampling spacing
    pub fn with_spacing(mut self, spacing: PixelSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Builder: Set the interpolation kind
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

/// What to do with scaled doses above `u32::MAX`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Saturate at `u32::MAX` and report the number of clamped voxels
    #[default]
    Clamp,
    /// Abort the encoding
    Error,
}

/// Configuration of the pixel encoding
///
/// # Example
///
/// ```
/// use eyeplan_core::EncodeOptions;
///
/// let options = EncodeOptions::default();
/// assert_eq!(options.scale_exponent, 8);
/// assert_eq!(options.dose_grid_scaling(), 1e-8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// Dose is multiplied by `10^scale_exponent` before quantization
    pub scale_exponent: i32,

    /// Scaled values below this are written as 0
    pub threshold: f64,

    /// Handling of values outside the 32-bit range
    pub overflow: OverflowPolicy,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            scale_exponent: 8,
            threshold: 0.001,
            overflow: OverflowPolicy::Clamp,
        }
    }
}

impl EncodeOptions {
    /// Factor applied to the dose before quantization
    pub fn scale_factor(&self) -> f64 {
        10f64.powi(self.scale_exponent)
    }

    /// Value of the DoseGridScaling attribute
    pub fn dose_grid_scaling(&self) -> f64 {
        1.0 / self.scale_factor()
    }

    /// Builder: Set the decimal scale exponent
    pub fn with_scale_exponent(mut self, scale_exponent: i32) -> Self {
        self.scale_exponent = scale_exponent;
        self
    }

    /// Builder: Set the zero threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder: Set the overflow policy
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

/// Full configuration of a conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOptions {
    pub grid: GridConfig,
    pub encode: EncodeOptions,

    /// Run every stage except writing the output file
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_encode(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let options = ConvertOptions::default();
        assert_eq!(options.grid.spacing, PixelSpacing::new(0.1, 0.1));
        assert_eq!(options.grid.interpolation, Interpolation::Cubic);
        assert_eq!(options.encode.scale_exponent, 8);
        assert_eq!(options.encode.threshold, 0.001);
        assert_eq!(options.encode.overflow, OverflowPolicy::Clamp);
        assert!(!options.dry_run);
    }

    #[test]
    fn test_scale_factor_and_scaling_are_reciprocal() {
        let options = EncodeOptions::default().with_scale_exponent(4);
        assert_eq!(options.scale_factor(), 1e4);
        assert!((options.scale_factor() * options.dose_grid_scaling() - 1.0).abs() < 1e-12);
    }
}
