use uuid::Uuid;

/// Generates a new globally unique DICOM UID
///
/// Uses the `2.25` root, under which a UUID is encoded as a single
/// decimal integer. The result is at most 44 characters long.
pub fn generate_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uid_format() {
        let uid = generate_uid();
        assert!(uid.starts_with("2.25."));
        assert!(uid.len() <= 64);
        assert!(uid[5..].chars().all(|c| c.is_ascii_digit()));
        // No leading zero in a UID component
        assert!(!uid[5..].starts_with('0') || uid.len() == 6);
    }

    #[test]
    fn test_uids_are_unique() {
        let uids: HashSet<String> = (0..100).map(|_| generate_uid()).collect();
        assert_eq!(uids.len(), 100);
    }
}
