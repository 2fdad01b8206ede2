use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// In-plane spacing of the resampled dose grid (row, column)
///
/// `row` is the step between rows (the Z axis of the export) and `col`
/// the step between columns (the X axis). Written to the DICOM
/// PixelSpacing attribute in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PixelSpacing {
    pub row: f64,
    pub col: f64,
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self { row: 0.1, col: 0.1 }
    }
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Parses a spacing pair from a string
    ///
    /// Accepts formats like:
    /// - "0.1\\0.1" (DICOM multi-value)
    /// - "0.1 0.1"
    /// - "0.1,0.2"
    /// - a single value "0.25", applied to both axes
    ///
    /// # Errors
    ///
    /// Returns an error if no number is found or a value is not strictly positive
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
        });

        let mut numbers = re.find_iter(s).map(|m| m.as_str());
        let row_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse pixel spacing from '{}'", s))?;
        let col_str = numbers.next().unwrap_or(row_str);

        let row: f64 = row_str
            .parse()
            .map_err(|e| format!("Failed to parse row spacing: {}", e))?;
        let col: f64 = col_str
            .parse()
            .map_err(|e| format!("Failed to parse column spacing: {}", e))?;

        if !(row > 0.0 && col > 0.0) || !row.is_finite() || !col.is_finite() {
            return Err(format!("Pixel spacing must be positive, got '{}'", s));
        }

        Ok(PixelSpacing { row, col })
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.1\\0.1", 0.1, 0.1)]
    #[case("0.2 0.1", 0.2, 0.1)]
    #[case("0.5,0.25", 0.5, 0.25)]
    #[case("1e-1\\2e-1", 0.1, 0.2)]
    #[case("0.25", 0.25, 0.25)]
    fn test_parse_spacing(#[case] input: &str, #[case] row: f64, #[case] col: f64) {
        let ps = PixelSpacing::parse(input).unwrap();
        assert_eq!(ps.row, row);
        assert_eq!(ps.col, col);
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(PixelSpacing::parse("0\\0.1").is_err());
        assert!(PixelSpacing::parse("-0.1").is_err());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PixelSpacing::parse("invalid").is_err());
        assert!(PixelSpacing::parse("").is_err());
    }

    #[test]
    fn test_default_spacing() {
        assert_eq!(PixelSpacing::default(), PixelSpacing::new(0.1, 0.1));
    }
}
