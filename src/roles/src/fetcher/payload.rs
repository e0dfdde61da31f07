//! Deserialization boundary for role-definition payloads
//!
//! The provider nests fields under `properties`; the CLI emits them at the
//! top level (and sometimes both). Everything is normalized here into
//! [`RawRoleRecord`]: nested values win, empty strings become `None`, and
//! records without an id are dropped.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, RoleError};
use crate::types::RawRoleRecord;

/// One page of the provider response
#[derive(Debug, Deserialize)]
struct RoleListPage {
    value: Vec<WireRoleRecord>,
    #[serde(rename = "nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireRoleRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "roleName", default)]
    role_name: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Top-level `type` is the ARM resource type, so only `roleType` counts here
    #[serde(rename = "roleType", default)]
    role_type: Option<String>,
    #[serde(default)]
    properties: Option<WireProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct WireProperties {
    #[serde(rename = "roleName", default)]
    role_name: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", alias = "roleType", default)]
    role_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl WireRoleRecord {
    fn normalize(self) -> Option<RawRoleRecord> {
        let Some(id) = non_empty(self.id) else {
            debug!("Skipping role record without an id");
            return None;
        };
        let properties = self.properties.unwrap_or_default();

        Some(RawRoleRecord {
            id,
            role_name: non_empty(properties.role_name)
                .or_else(|| non_empty(self.role_name))
                .unwrap_or_default(),
            display_name: non_empty(properties.display_name)
                .or_else(|| non_empty(self.display_name)),
            description: non_empty(properties.description).or_else(|| non_empty(self.description)),
            role_type: non_empty(properties.role_type).or_else(|| non_empty(self.role_type)),
        })
    }
}

/// A parsed provider page
#[derive(Debug, Default)]
pub struct ProviderPage {
    pub records: Vec<RawRoleRecord>,
    pub next_link: Option<String>,
}

/// Parses one provider response body (`{"value": [...], "nextLink": ...}`)
pub fn parse_provider_page(body: &str) -> Result<ProviderPage> {
    let page: RoleListPage = serde_json::from_str(body)
        .map_err(|e| RoleError::Parse(format!("role definition list: {}", e)))?;

    Ok(ProviderPage {
        records: page
            .value
            .into_iter()
            .filter_map(WireRoleRecord::normalize)
            .collect(),
        next_link: non_empty(page.next_link),
    })
}

/// Parses `az role definition list` output (a JSON array), keeping built-in roles
pub fn parse_cli_listing(stdout: &str) -> Result<Vec<RawRoleRecord>> {
    let records: Vec<WireRoleRecord> = serde_json::from_str(stdout)
        .map_err(|e| RoleError::Parse(format!("az role definition list: {}", e)))?;

    Ok(records
        .into_iter()
        .filter_map(WireRoleRecord::normalize)
        .filter(RawRoleRecord::is_built_in)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDER_BODY: &str = r#"{
        "value": [
            {
                "id": "/providers/Microsoft.Authorization/roleDefinitions/acdd72a7",
                "type": "Microsoft.Authorization/roleDefinitions",
                "name": "acdd72a7",
                "properties": {
                    "roleName": "Reader",
                    "displayName": "閲覧者",
                    "description": "すべてを表示できますが、変更を加えることはできません。",
                    "type": "BuiltInRole"
                }
            },
            {
                "id": "",
                "properties": { "roleName": "Ghost" }
            }
        ]
    }"#;

    #[test]
    fn test_provider_fields_are_read_from_properties() {
        let page = parse_provider_page(PROVIDER_BODY).unwrap();

        assert_eq!(page.records.len(), 1);
        let reader = &page.records[0];
        assert_eq!(reader.role_name, "Reader");
        assert_eq!(reader.display_name.as_deref(), Some("閲覧者"));
        assert_eq!(reader.role_type.as_deref(), Some("BuiltInRole"));
        assert!(page.next_link.is_none());
    }

    #[test]
    fn test_provider_next_link() {
        let page = parse_provider_page(r#"{"value": [], "nextLink": "https://next"}"#).unwrap();
        assert_eq!(page.next_link.as_deref(), Some("https://next"));
    }

    #[test]
    fn test_malformed_provider_body_is_parse_error() {
        assert!(matches!(parse_provider_page("<html>"), Err(RoleError::Parse(_))));
        assert!(matches!(parse_provider_page(r#"{"items": []}"#), Err(RoleError::Parse(_))));
    }

    #[test]
    fn test_cli_fields_at_top_level() {
        let stdout = r#"[
            {
                "id": "/subscriptions/S/providers/Microsoft.Authorization/roleDefinitions/b24988ac",
                "roleName": "Contributor",
                "description": "Grants full access to manage all resources.",
                "roleType": "BuiltInRole",
                "type": "Microsoft.Authorization/roleDefinitions"
            }
        ]"#;

        let records = parse_cli_listing(stdout).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role_name, "Contributor");
        assert_eq!(
            records[0].description.as_deref(),
            Some("Grants full access to manage all resources.")
        );
        assert_eq!(records[0].display_name, None);
    }

    #[test]
    fn test_nested_value_wins_and_empty_strings_are_unset() {
        let stdout = r#"[
            {
                "id": "r1",
                "roleName": "top",
                "description": "top-level description",
                "properties": { "roleName": "Reader", "description": "" }
            }
        ]"#;

        let records = parse_cli_listing(stdout).unwrap();
        assert_eq!(records[0].role_name, "Reader");
        assert_eq!(records[0].description.as_deref(), Some("top-level description"));
    }

    #[test]
    fn test_cli_listing_drops_custom_roles() {
        let stdout = r#"[
            {"id": "r1", "roleName": "Reader", "roleType": "BuiltInRole"},
            {"id": "r2", "roleName": "Ops Team", "roleType": "CustomRole"}
        ]"#;

        let records = parse_cli_listing(stdout).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r1");
    }
}
