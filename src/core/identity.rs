use crate::core::IdGenerator;
use uuid::Uuid;

/// Random 128-bit identifiers, rendered as hyphenated UUID v4 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_v4_uuids() {
        let id = UuidGenerator.new_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn test_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..10_000).map(|_| UuidGenerator.new_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
