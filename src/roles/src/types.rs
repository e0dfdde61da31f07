//! Core role catalog types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Role type reported for organization-defined roles
const CUSTOM_ROLE_TYPE: &str = "CustomRole";

/// Response language requested from the role provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    English,
    Japanese,
}

impl Locale {
    /// Value sent in the `Accept-Language` header
    pub fn accept_language(&self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Japanese => "ja-JP",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.accept_language())
    }
}

/// One role definition as returned by a single-locale fetch
///
/// Produced only by the payload normalization in [`crate::fetcher`]; empty
/// strings in the source payload arrive here as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RawRoleRecord {
    /// Role definition resource path
    pub id: String,

    /// Canonical machine name (e.g. "Reader")
    pub role_name: String,

    /// Display name in the fetch locale
    pub display_name: Option<String>,

    /// Description in the fetch locale
    pub description: Option<String>,

    /// "BuiltInRole" or "CustomRole" when the source reports it
    pub role_type: Option<String>,
}

impl RawRoleRecord {
    /// Create a record with an id and role name
    pub fn new(id: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role_name: role_name.into(),
            ..Default::default()
        }
    }

    /// Set the localized display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the localized description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the role type
    pub fn with_role_type(mut self, role_type: impl Into<String>) -> Self {
        self.role_type = Some(role_type.into());
        self
    }

    /// Records without a role type are assumed to be built-in
    pub fn is_built_in(&self) -> bool {
        self.role_type
            .as_deref()
            .map_or(true, |t| !t.eq_ignore_ascii_case(CUSTOM_ROLE_TYPE))
    }
}

/// Bilingual role definition, one per role id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: String,
    pub role_name: String,
    pub display_name_en: Option<String>,
    pub display_name_ja: Option<String>,
    pub description_en: Option<String>,
    pub description_ja: Option<String>,
    pub is_built_in: bool,
}

impl RoleDefinition {
    /// Seed a definition from an English record; Japanese fields start unset
    pub fn from_english(record: &RawRoleRecord) -> Self {
        Self {
            id: record.id.clone(),
            role_name: record.role_name.clone(),
            display_name_en: record.display_name.clone(),
            display_name_ja: None,
            description_en: record.description.clone(),
            description_ja: None,
            is_built_in: record.is_built_in(),
        }
    }
}

/// Merged role definitions keyed by id, iterated in insertion order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<RoleDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition unless its id is already present
    ///
    /// Returns `false` when the id was taken; the existing entry is kept.
    pub(crate) fn insert_if_absent(&mut self, role: RoleDefinition) -> bool {
        if self.index.contains_key(&role.id) {
            return false;
        }
        self.index.insert(role.id.clone(), self.entries.len());
        self.entries.push(role);
        true
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut RoleDefinition> {
        let position = *self.index.get(id)?;
        self.entries.get_mut(position)
    }

    /// Look up a definition by id
    pub fn get(&self, id: &str) -> Option<&RoleDefinition> {
        self.index.get(id).and_then(|&position| self.entries.get(position))
    }

    /// Whether the catalog holds `id`
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.entries.iter()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|role| role.id.as_str())
    }
}

/// One search hit, built per query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Canonical role name
    pub role_name: String,

    /// Japanese display name, possibly synthesized; empty when unknown
    pub display_name: String,

    /// Japanese description, falling back to English
    pub description: String,

    /// Role definition id
    pub id: String,
}
