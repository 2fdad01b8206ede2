use std::fmt;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error types for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// No usable dose samples
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A Y plane cannot be interpolated because its grid is not rectangular
    #[error("Incomplete grid in Y plane {plane}: {detail}")]
    IncompleteGrid { plane: f64, detail: String },

    /// Y planes do not cover a common Z and X range
    #[error("Inconsistent grid: {0}")]
    InconsistentGrid(String),

    /// Template DICOM object is not a usable RT Dose record
    #[error("Template format error: {0}")]
    TemplateFormat(String),

    /// Scaled dose does not fit in an unsigned 32-bit pixel
    #[error("Dose overflow: scaled value {value} exceeds the 32-bit pixel range")]
    DoseOverflow { value: f64 },

    /// Reconstructed dose is NaN or infinite
    #[error("Non-finite dose at frame {frame}, row {row}, column {column}")]
    NonFiniteDose {
        frame: usize,
        row: usize,
        column: usize,
    },

    /// Spreadsheet reading or parsing error
    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(String),

    /// DICOM writing error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn incomplete(plane: f64, detail: impl Into<String>) -> Self {
        ConvertError::IncompleteGrid {
            plane,
            detail: detail.into(),
        }
    }
}

impl From<calamine::Error> for ConvertError {
    fn from(e: calamine::Error) -> Self {
        ConvertError::SpreadsheetError(format!("{}", e))
    }
}

// A template that cannot be parsed is a malformed template
impl From<dicom_object::ReadError> for ConvertError {
    fn from(e: dicom_object::ReadError) -> Self {
        ConvertError::TemplateFormat(format!("{}", e))
    }
}

impl From<dicom_object::WriteError> for ConvertError {
    fn from(e: dicom_object::WriteError) -> Self {
        ConvertError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for ConvertError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        ConvertError::TemplateFormat(format!("{}", e))
    }
}

/// Pipeline stage in which a conversion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Reconstruct,
    Encode,
    Save,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Reconstruct => "reconstruct",
            Stage::Encode => "encode",
            Stage::Save => "save",
        };
        write!(f, "{}", name)
    }
}

/// A [`ConvertError`] tagged with the stage that produced it
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: ConvertError,
}

/// Attaches a [`Stage`] to a conversion result
pub(crate) trait AtStage<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|source| StageError { stage, source })
    }
}
