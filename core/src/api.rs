use crate::dicom::{open_template, save_atomic};
use crate::encoder::{apply_to_template, encode, InstanceUids};
use crate::error::{AtStage, Stage, StageError};
use crate::grid::reconstruct;
use crate::spreadsheet::{read_spreadsheet, EyeplanSheet};
use crate::types::{ConvertOptions, Extents, PatientInfo, PixelSpacing};
use dicom_object::InMemDicomObject;
use log::info;
use std::path::{Path, PathBuf};

/// Converts Eyeplan dose exports to DICOM RT Dose files
///
/// Runs the pipeline load → reconstruct → encode → save, threading every
/// intermediate value explicitly. Failures carry the [`Stage`] they
/// happened in.
///
/// # Example
///
/// ```
/// use eyeplan_core::{
///     DoseConverter, DoseSample, EyeplanSheet, PatientInfo, SampleTable, RT_DOSE_STORAGE,
/// };
/// use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
/// use dicom_object::InMemDicomObject;
///
/// let mut samples = SampleTable::default();
/// for y in [0.0, 5.0] {
///     for z in [0.0, 0.5, 1.0] {
///         for x in [0.0, 0.5, 1.0] {
///             samples.push(DoseSample::new(x, y, z, x * z));
///         }
///     }
/// }
/// let sheet = EyeplanSheet {
///     patient: PatientInfo::new("Jane Doe", "ID123"),
///     samples,
/// };
///
/// let mut template = InMemDicomObject::new_empty();
/// template.put(DataElement::new(
///     Tag(0x0008, 0x0016), // SOPClassUID
///     VR::UI,
///     PrimitiveValue::from(RT_DOSE_STORAGE),
/// ));
///
/// let summary = DoseConverter::default().convert(&sheet, &mut template).unwrap();
/// assert_eq!(summary.frames, 2);
/// assert_eq!(summary.patient.id, "ID123");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DoseConverter {
    options: ConvertOptions,
}

impl DoseConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Converts `spreadsheet` using `template` and writes the result to `output`
    ///
    /// In dry-run mode nothing is written.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] naming the failed stage and its cause
    pub fn run(
        &self,
        spreadsheet: &Path,
        template: &Path,
        output: &Path,
    ) -> Result<ConversionSummary, StageError> {
        info!("Reading spreadsheet: {}", spreadsheet.display());
        let sheet = read_spreadsheet(spreadsheet).at_stage(Stage::Load)?;

        info!("Reading template: {}", template.display());
        let mut dcm = open_template(template).at_stage(Stage::Load)?;

        let mut summary = self.convert(&sheet, &mut dcm)?;

        if self.options.dry_run {
            info!("Dry run: not writing {}", output.display());
        } else {
            save_atomic(dcm.into_inner(), output).at_stage(Stage::Save)?;
            info!("Wrote {}", output.display());
            summary.output = Some(output.to_path_buf());
        }

        Ok(summary)
    }

    /// Reconstructs, encodes and applies the dose of `sheet` to `template`
    ///
    /// `template` is modified in place and can then be saved.
    pub fn convert(
        &self,
        sheet: &EyeplanSheet,
        template: &mut InMemDicomObject,
    ) -> Result<ConversionSummary, StageError> {
        let volume = reconstruct(&sheet.samples, &self.options.grid).at_stage(Stage::Reconstruct)?;
        let encoded = encode(&volume, &self.options.encode).at_stage(Stage::Encode)?;
        let uids = apply_to_template(template, &volume, &encoded, &sheet.patient)
            .at_stage(Stage::Encode)?;

        let extents = volume.source_extents;
        Ok(ConversionSummary {
            patient: sheet.patient.clone(),
            samples: sheet.samples.len(),
            frames: volume.frames(),
            rows: volume.rows(),
            columns: volume.columns(),
            pixel_spacing: volume.spacing,
            plane_positions: volume.plane_positions.clone(),
            frame_offsets: volume.frame_offsets.clone(),
            image_position: [extents.x.0, extents.z.0, extents.y.0],
            source_extents: extents,
            dose_grid_scaling: encoded.dose_grid_scaling,
            max_dose: volume.max_dose(),
            zeroed_voxels: encoded.zeroed_voxels,
            clamped_voxels: encoded.clamped_voxels,
            uids,
            output: None,
        })
    }
}

/// Outcome of a conversion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ConversionSummary {
    /// Patient written to the output record
    pub patient: PatientInfo,

    /// Number of rows read from the spreadsheet
    pub samples: usize,

    /// NumberOfFrames
    pub frames: usize,

    /// Rows
    pub rows: usize,

    /// Columns
    pub columns: usize,

    /// PixelSpacing (row, column)
    pub pixel_spacing: PixelSpacing,

    /// Y position of each frame
    pub plane_positions: Vec<f64>,

    /// GridFrameOffsetVector
    pub frame_offsets: Vec<f64>,

    /// ImagePositionPatient
    pub image_position: [f64; 3],

    /// Bounds of the source samples
    pub source_extents: Extents,

    /// DoseGridScaling
    pub dose_grid_scaling: f64,

    /// Largest reconstructed dose
    pub max_dose: f64,

    /// Voxels written as 0 below the threshold
    pub zeroed_voxels: usize,

    /// Voxels saturated at the 32-bit maximum
    pub clamped_voxels: usize,

    /// Identity UIDs of the output record
    pub uids: InstanceUids,

    /// Written file, `None` for a dry run
    pub output: Option<PathBuf>,
}
