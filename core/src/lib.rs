pub mod api;
pub mod cli;
pub mod dicom;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod spreadsheet;
pub mod types;

pub use api::{ConversionSummary, DoseConverter};
pub use cli::report::TextReport;
pub use dicom::{open_template, save_atomic, RT_DOSE_STORAGE};
pub use encoder::{apply_to_template, encode, EncodedDose, InstanceUids};
pub use error::{ConvertError, Result, Stage, StageError};
pub use grid::reconstruct;
pub use spreadsheet::{parse_sheet, read_spreadsheet, EyeplanSheet};
pub use types::*;
