use super::EncodedDose;
use crate::dicom::tags::{
    get_string_value, BITS_ALLOCATED, BITS_STORED, COLUMNS, DOSE_GRID_SCALING, DVH_SEQUENCE,
    FRAME_OF_REFERENCE_UID, GRID_FRAME_OFFSET_VECTOR, HIGH_BIT, IMAGE_POSITION_PATIENT,
    NUMBER_OF_FRAMES, PATIENT_ID, PATIENT_NAME, PHOTOMETRIC_INTERPRETATION, PIXEL_DATA,
    PIXEL_REPRESENTATION, PIXEL_SPACING, ROWS, SAMPLES_PER_PIXEL, SERIES_INSTANCE_UID,
    SOP_INSTANCE_UID, STUDY_INSTANCE_UID,
};
use crate::dicom::uid::generate_uid;
use crate::dicom::validate_rt_dose;
use crate::dicom::values::{ds_element, is_element, ow_element, str_element, us_element};
use crate::error::{ConvertError, Result};
use crate::types::{DoseVolume, PatientInfo};
use dicom_core::VR;
use dicom_object::InMemDicomObject;
use log::{debug, info};

/// Identity UIDs assigned to the output record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct InstanceUids {
    pub sop_instance: String,
    pub study_instance: String,
    pub series_instance: String,
    pub frame_of_reference: String,
}

impl InstanceUids {
    pub fn generate() -> Self {
        Self {
            sop_instance: generate_uid(),
            study_instance: generate_uid(),
            series_instance: generate_uid(),
            frame_of_reference: generate_uid(),
        }
    }
}

/// Writes an encoded dose volume onto the template RT Dose record
///
/// Sets, overriding whatever the template held:
/// - ImagePositionPatient from the minimum X, Z and Y of the source samples
///   (not of the resampled grid)
/// - GridFrameOffsetVector, PixelSpacing, Rows, Columns and NumberOfFrames
/// - DoseGridScaling and the pixel data with a 32-bit unsigned pixel module
/// - four freshly generated identity UIDs
/// - patient name and ID
///
/// Any DVH sequence is removed since it no longer matches the grid.
///
/// # Errors
///
/// Returns [`ConvertError::TemplateFormat`] if the template is not an RT
/// Dose record or the grid does not fit the Rows/Columns attributes
pub fn apply_to_template(
    dcm: &mut InMemDicomObject,
    volume: &DoseVolume,
    encoded: &EncodedDose,
    patient: &PatientInfo,
) -> Result<InstanceUids> {
    validate_rt_dose(dcm)?;

    let (frames, rows, columns) = encoded.pixels.dim();
    let rows = u16::try_from(rows).map_err(|_| {
        ConvertError::TemplateFormat(format!("{} rows exceed the Rows attribute range", rows))
    })?;
    let columns = u16::try_from(columns).map_err(|_| {
        ConvertError::TemplateFormat(format!(
            "{} columns exceed the Columns attribute range",
            columns
        ))
    })?;

    let extents = &volume.source_extents;
    dcm.put(ds_element(
        IMAGE_POSITION_PATIENT,
        &[extents.x.0, extents.z.0, extents.y.0],
    ));
    dcm.put(ds_element(GRID_FRAME_OFFSET_VECTOR, &volume.frame_offsets));
    dcm.put(ds_element(DOSE_GRID_SCALING, &[encoded.dose_grid_scaling]));
    dcm.put(ds_element(
        PIXEL_SPACING,
        &[volume.spacing.row, volume.spacing.col],
    ));

    dcm.put(us_element(SAMPLES_PER_PIXEL, 1));
    dcm.put(str_element(PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2"));
    dcm.put(is_element(NUMBER_OF_FRAMES, frames));
    dcm.put(us_element(ROWS, rows));
    dcm.put(us_element(COLUMNS, columns));
    dcm.put(us_element(BITS_ALLOCATED, 32));
    dcm.put(us_element(BITS_STORED, 32));
    dcm.put(us_element(HIGH_BIT, 31));
    dcm.put(us_element(PIXEL_REPRESENTATION, 0));
    dcm.put(ow_element(PIXEL_DATA, encoded.to_le_bytes()));

    if dcm.remove_element(DVH_SEQUENCE) {
        debug!("Removed DVH sequence from template");
    }

    let original_sop = get_string_value(dcm, SOP_INSTANCE_UID).unwrap_or_default();
    let uids = InstanceUids::generate();
    dcm.put(str_element(SOP_INSTANCE_UID, VR::UI, &uids.sop_instance));
    dcm.put(str_element(STUDY_INSTANCE_UID, VR::UI, &uids.study_instance));
    dcm.put(str_element(SERIES_INSTANCE_UID, VR::UI, &uids.series_instance));
    dcm.put(str_element(
        FRAME_OF_REFERENCE_UID,
        VR::UI,
        &uids.frame_of_reference,
    ));
    debug!(
        "SOP Instance UID {} replaced by {}",
        original_sop, uids.sop_instance
    );

    dcm.put(str_element(PATIENT_NAME, VR::PN, &patient.name));
    dcm.put(str_element(PATIENT_ID, VR::LO, &patient.id));

    info!(
        "Encoded {} frames of {} x {} pixels for patient {}",
        frames, rows, columns, patient.id
    );

    Ok(uids)
}
