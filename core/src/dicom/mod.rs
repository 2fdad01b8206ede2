//! DICOM template access: tag constants, typed element helpers, UID
//! generation and file I/O.

pub mod io;
pub mod tags;
pub mod uid;
pub mod values;

pub use io::{open_template, save_atomic, validate_rt_dose};
pub use tags::*;
pub use uid::generate_uid;
