use crate::error::{ConvertError, Result};
use dicom_object::file::ReadPreamble;
use dicom_object::{FileDicomObject, FileMetaTableBuilder, InMemDicomObject, OpenFileOptions};
use log::debug;
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

use super::tags::{
    get_string_value, EXPLICIT_VR_LITTLE_ENDIAN, MODALITY, RT_DOSE_STORAGE, SOP_CLASS_UID,
    SOP_INSTANCE_UID,
};

/// Opens the template RT Dose file
///
/// The 128-byte preamble is optional.
///
/// # Errors
///
/// - [`ConvertError::IoError`] if the file is missing or unreadable
/// - [`ConvertError::TemplateFormat`] if the file cannot be parsed or is
///   not an RT Dose object
pub fn open_template(path: &Path) -> Result<FileDicomObject<InMemDicomObject>> {
    // Fails here for missing or unreadable files, leaving ReadError to parsing
    File::open(path)?;

    let dcm = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Auto)
        .open_file(path)?;
    validate_rt_dose(&dcm)?;
    debug!(
        "Template {} SOP Instance UID: {}",
        path.display(),
        get_string_value(&dcm, SOP_INSTANCE_UID).unwrap_or_default()
    );
    Ok(dcm)
}

/// Checks that a DICOM object is an RT Dose record
///
/// The SOP Class UID must be RT Dose Storage. Objects without a SOP Class
/// UID are accepted when their Modality is RTDOSE.
pub fn validate_rt_dose(dcm: &InMemDicomObject) -> Result<()> {
    match get_string_value(dcm, SOP_CLASS_UID) {
        Some(class) if class == RT_DOSE_STORAGE => Ok(()),
        Some(class) => Err(ConvertError::TemplateFormat(format!(
            "SOP Class UID {} is not RT Dose Storage ({})",
            class, RT_DOSE_STORAGE
        ))),
        None => match get_string_value(dcm, MODALITY) {
            Some(modality) if modality.eq_ignore_ascii_case("RTDOSE") => Ok(()),
            modality => Err(ConvertError::TemplateFormat(format!(
                "missing SOP Class UID and modality {:?} is not RTDOSE",
                modality.unwrap_or_default()
            ))),
        },
    }
}

/// Writes a DICOM object to `path` without leaving partial output behind
///
/// The file meta group is rebuilt for Explicit VR Little Endian with the
/// object's SOP class and instance UIDs. The file is first written to a
/// temporary file in the destination directory and then renamed into place.
pub fn save_atomic(dcm: InMemDicomObject, path: &Path) -> Result<()> {
    let sop_class =
        get_string_value(&dcm, SOP_CLASS_UID).unwrap_or_else(|| RT_DOSE_STORAGE.to_string());
    let sop_instance = get_string_value(&dcm, SOP_INSTANCE_UID).ok_or_else(|| {
        ConvertError::TemplateFormat("output object has no SOP Instance UID".to_string())
    })?;

    let file_dcm = dcm
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(sop_class)
                .media_storage_sop_instance_uid(sop_instance),
        )
        .map_err(|e| ConvertError::DicomError(format!("{}", e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    debug!("Writing temporary file {}", tmp.path().display());

    file_dcm.write_to_file(tmp.path())?;
    tmp.persist(path).map_err(|e| ConvertError::IoError(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::tags::{get_u16_value, ROWS};
    use crate::dicom::values::{str_element, us_element};
    use dicom_core::VR;
    use std::fs;
    use tempfile::TempDir;

    fn rt_dose() -> InMemDicomObject {
        InMemDicomObject::from_element_iter([
            str_element(SOP_CLASS_UID, VR::UI, RT_DOSE_STORAGE),
            str_element(SOP_INSTANCE_UID, VR::UI, "1.2.3.4"),
            str_element(MODALITY, VR::CS, "RTDOSE"),
            us_element(ROWS, 7),
        ])
    }

    #[test]
    fn test_validate_rt_dose() {
        assert!(validate_rt_dose(&rt_dose()).is_ok());
    }

    #[test]
    fn test_validate_rejects_other_sop_class() {
        let dcm = InMemDicomObject::from_element_iter([str_element(
            SOP_CLASS_UID,
            VR::UI,
            "1.2.840.10008.5.1.4.1.1.2",
        )]);
        assert!(matches!(
            validate_rt_dose(&dcm),
            Err(ConvertError::TemplateFormat(_))
        ));
    }

    #[test]
    fn test_validate_falls_back_to_modality() {
        let dose = InMemDicomObject::from_element_iter([str_element(MODALITY, VR::CS, "RTDOSE")]);
        assert!(validate_rt_dose(&dose).is_ok());

        let empty = InMemDicomObject::new_empty();
        assert!(validate_rt_dose(&empty).is_err());
    }

    #[test]
    fn test_save_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.dcm");

        save_atomic(rt_dose(), &path).unwrap();

        let reopened = open_template(&path).unwrap();
        assert_eq!(reopened.meta().transfer_syntax(), EXPLICIT_VR_LITTLE_ENDIAN);
        assert_eq!(
            reopened.meta().media_storage_sop_instance_uid(),
            "1.2.3.4"
        );
        assert_eq!(get_u16_value(&reopened, ROWS), Some(7));

        // Only the output file remains in the directory
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_open_without_preamble() {
        let temp_dir = TempDir::new().unwrap();
        let with_preamble = temp_dir.path().join("with.dcm");
        let without_preamble = temp_dir.path().join("without.dcm");

        save_atomic(rt_dose(), &with_preamble).unwrap();
        let bytes = fs::read(&with_preamble).unwrap();
        assert_eq!(&bytes[128..132], b"DICM");
        fs::write(&without_preamble, &bytes[128..]).unwrap();

        let reopened = open_template(&without_preamble).unwrap();
        assert_eq!(
            get_string_value(&reopened, SOP_INSTANCE_UID).as_deref(),
            Some("1.2.3.4")
        );
    }

    #[test]
    fn test_failed_save_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.dcm");

        let no_instance =
            InMemDicomObject::from_element_iter([str_element(MODALITY, VR::CS, "RTDOSE")]);
        assert!(save_atomic(no_instance, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_open_missing_template_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = open_template(&temp_dir.path().join("missing.dcm")).unwrap_err();
        match err {
            ConvertError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_open_garbage_template_is_format_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("garbage.dcm");
        fs::write(&path, b"this is not a DICOM file").unwrap();

        let err = open_template(&path).unwrap_err();
        assert!(matches!(err, ConvertError::TemplateFormat(_)));
    }
}
