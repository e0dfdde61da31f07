//! Bilingual merge of two single-locale fetches

use tracing::debug;

use crate::types::{Catalog, RawRoleRecord, RoleDefinition};

/// Combines English and Japanese fetches into one [`Catalog`]
///
/// The English records decide which ids exist. Japanese records only fill in
/// `display_name_ja` / `description_ja`, and only with non-empty values.
pub struct RoleMerger;

impl RoleMerger {
    /// Merge `en` and `ja` into a catalog keyed by id
    ///
    /// # Arguments
    ///
    /// * `en` - English records; the first occurrence of a duplicate id wins
    /// * `ja` - Japanese records; ids unknown to `en` are discarded
    pub fn merge(en: &[RawRoleRecord], ja: &[RawRoleRecord]) -> Catalog {
        let mut catalog = Catalog::new();

        for record in en {
            if !catalog.insert_if_absent(RoleDefinition::from_english(record)) {
                // First occurrence wins; unverified against the provider
                debug!("Ignoring duplicate role id {}", record.id);
            }
        }

        let mut localized = 0usize;
        for record in ja {
            let Some(role) = catalog.get_mut(&record.id) else {
                debug!("Discarding Japanese-only role id {}", record.id);
                continue;
            };

            if let Some(name) = record.display_name.as_deref().filter(|v| !v.is_empty()) {
                role.display_name_ja = Some(name.to_string());
                localized += 1;
            }
            if let Some(description) = record.description.as_deref().filter(|v| !v.is_empty()) {
                role.description_ja = Some(description.to_string());
            }
        }

        debug!(
            "Merged {} role definitions ({} with Japanese names)",
            catalog.len(),
            localized
        );
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_japanese_display_name_is_attached() {
        let en = vec![RawRoleRecord::new("r1", "Reader")];
        let ja = vec![RawRoleRecord::new("r1", "Reader").with_display_name("閲覧者")];

        let catalog = RoleMerger::merge(&en, &ja);
        assert_eq!(
            catalog.get("r1").unwrap().display_name_ja.as_deref(),
            Some("閲覧者")
        );
    }

    #[test]
    fn test_english_fields_are_kept() {
        let en = vec![RawRoleRecord::new("r1", "Reader")
            .with_display_name("Reader")
            .with_description("View all resources")];
        let ja =
            vec![RawRoleRecord::new("r1", "Reader").with_description("すべてを表示できます")];

        let role = RoleMerger::merge(&en, &ja).get("r1").cloned().unwrap();
        assert_eq!(role.display_name_en.as_deref(), Some("Reader"));
        assert_eq!(role.description_en.as_deref(), Some("View all resources"));
        assert_eq!(role.description_ja.as_deref(), Some("すべてを表示できます"));
        assert_eq!(role.display_name_ja, None);
    }

    #[test]
    fn test_japanese_only_ids_are_dropped() {
        let en = vec![RawRoleRecord::new("r1", "Reader")];
        let ja = vec![
            RawRoleRecord::new("r1", "Reader").with_display_name("閲覧者"),
            RawRoleRecord::new("r9", "Mystery").with_display_name("謎"),
        ];

        let catalog = RoleMerger::merge(&en, &ja);
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains("r9"));
    }

    #[test]
    fn test_empty_japanese_field_does_not_overwrite() {
        let en = vec![RawRoleRecord::new("r1", "Reader")];
        let ja = vec![
            RawRoleRecord::new("r1", "Reader")
                .with_display_name("閲覧者")
                .with_description("閲覧のみ"),
            RawRoleRecord::new("r1", "Reader")
                .with_display_name("")
                .with_description(""),
        ];

        let role = RoleMerger::merge(&en, &ja).get("r1").cloned().unwrap();
        assert_eq!(role.display_name_ja.as_deref(), Some("閲覧者"));
        assert_eq!(role.description_ja.as_deref(), Some("閲覧のみ"));
    }

    #[test]
    fn test_first_english_duplicate_wins() {
        let en = vec![
            RawRoleRecord::new("r1", "Reader"),
            RawRoleRecord::new("r2", "Owner"),
            RawRoleRecord::new("r1", "Impostor"),
        ];

        let catalog = RoleMerger::merge(&en, &[]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("r1").unwrap().role_name, "Reader");
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["r1", "r2"]);
    }

    #[test]
    fn test_english_only_merge_leaves_japanese_unset() {
        let en = vec![RawRoleRecord::new("r1", "Reader").with_description("View all resources")];

        let role = RoleMerger::merge(&en, &[]).get("r1").cloned().unwrap();
        assert_eq!(role.display_name_ja, None);
        assert_eq!(role.description_ja, None);
    }
}
