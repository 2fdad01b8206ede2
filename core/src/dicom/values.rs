//! Builders for the element types written to the template.

use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_object::mem::InMemElement;

/// Maximum length of a decimal string value
const DS_MAX_LEN: usize = 16;

/// Formats a number as a DICOM decimal string (DS)
///
/// Uses the shortest representation that round-trips when it fits in 16
/// characters and otherwise drops fractional digits until it does.
pub fn format_ds(value: f64) -> String {
    let shortest = format!("{}", value);
    if shortest.len() <= DS_MAX_LEN {
        return shortest;
    }

    // Fixed notation only keeps enough significant digits in this range
    if (1e-4..1e15).contains(&value.abs()) {
        for precision in (0..DS_MAX_LEN).rev() {
            let fixed = format!("{:.*}", precision, value);
            let trimmed = if fixed.contains('.') {
                fixed.trim_end_matches('0').trim_end_matches('.')
            } else {
                fixed.as_str()
            };
            if trimmed.len() <= DS_MAX_LEN {
                return trimmed.to_string();
            }
        }
    }

    let mut precision = 9;
    loop {
        let scientific = format!("{:.*e}", precision, value);
        if scientific.len() <= DS_MAX_LEN || precision == 0 {
            return scientific;
        }
        precision -= 1;
    }
}

/// Decimal string element, single- or multi-valued
pub fn ds_element(tag: Tag, values: &[f64]) -> InMemElement {
    let strs: Vec<String> = values.iter().map(|&v| format_ds(v)).collect();
    DataElement::new(tag, VR::DS, PrimitiveValue::Strs(strs.into()))
}

/// Unsigned short element
pub fn us_element(tag: Tag, value: u16) -> InMemElement {
    DataElement::new(tag, VR::US, PrimitiveValue::from(value))
}

/// Integer string element
pub fn is_element(tag: Tag, value: usize) -> InMemElement {
    DataElement::new(tag, VR::IS, PrimitiveValue::from(value.to_string()))
}

/// String element with the given VR (UI, PN, LO, CS)
pub fn str_element(tag: Tag, vr: VR, value: &str) -> InMemElement {
    DataElement::new(tag, vr, PrimitiveValue::from(value))
}

/// Native pixel data element holding little-endian bytes
pub fn ow_element(tag: Tag, bytes: Vec<u8>) -> InMemElement {
    DataElement::new(tag, VR::OW, PrimitiveValue::from(bytes))
}
