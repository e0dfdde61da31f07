//! Scope type definitions and validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoleError};

/// Selection value meaning "no subscription, built-in roles only"
pub const ALL_SUBSCRIPTIONS: &str = "all";

/// Azure resource path a role listing is scoped to
///
/// Always begins with `/` and never ends with one:
/// - `/subscriptions/{id}`
/// - `/subscriptions/{id}/resourceGroups/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopePath(String);

impl ScopePath {
    /// Creates a scope path from a raw string
    ///
    /// # Arguments
    ///
    /// * `raw` - The resource path (e.g., "/subscriptions/1234")
    ///
    /// # Returns
    ///
    /// Returns `RoleError::InvalidScope` for empty, relative or
    /// slash-only paths, paths with empty segments, or paths carrying a
    /// query or fragment
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(RoleError::InvalidScope("scope cannot be empty".to_string()));
        }
        if !trimmed.starts_with('/') {
            return Err(RoleError::InvalidScope(format!(
                "scope must start with '/': '{}'",
                raw
            )));
        }
        if trimmed.contains(['?', '#']) {
            return Err(RoleError::InvalidScope(format!(
                "scope cannot contain '?' or '#': '{}'",
                raw
            )));
        }
        if trimmed[1..].split('/').any(str::is_empty) {
            return Err(RoleError::InvalidScope(format!(
                "scope contains an empty segment: '{}'",
                raw
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// `/subscriptions/{subscription_id}`
    pub fn subscription(subscription_id: &str) -> Result<Self> {
        let subscription_id = path_segment("subscription id", subscription_id)?;
        Self::new(&format!("/subscriptions/{}", subscription_id))
    }

    /// `/subscriptions/{subscription_id}/resourceGroups/{name}`
    pub fn resource_group(subscription_id: &str, name: &str) -> Result<Self> {
        let subscription_id = path_segment("subscription id", subscription_id)?;
        let name = path_segment("resource group", name)?;
        Self::new(&format!(
            "/subscriptions/{}/resourceGroups/{}",
            subscription_id, name
        ))
    }

    /// Returns the raw path
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single path segment: trimmed, non-empty, no separators
fn path_segment<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RoleError::InvalidScope(format!("{} cannot be empty", what)));
    }
    if value.contains(['/', '?', '#']) {
        return Err(RoleError::InvalidScope(format!(
            "{} cannot contain '/', '?' or '#': '{}'",
            what, value
        )));
    }
    Ok(value)
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ScopePath {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ScopePath {
    type Error = RoleError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<ScopePath> for String {
    fn from(scope: ScopePath) -> Self {
        scope.0
    }
}

/// Subscription picked by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionSelection {
    /// Built-in roles at tenant root
    AllBuiltIn,
    /// A concrete subscription id
    Subscription(String),
}

impl SubscriptionSelection {
    /// A concrete subscription
    pub fn subscription(id: impl Into<String>) -> Self {
        Self::Subscription(id.into())
    }

    /// Interprets a frontend value; blank or [`ALL_SUBSCRIPTIONS`] is the sentinel
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_SUBSCRIPTIONS) {
            Self::AllBuiltIn
        } else {
            Self::Subscription(value.to_string())
        }
    }
}

/// Resource group picked by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupSelection {
    /// Resource group name
    pub name: String,
    /// Resource id returned by the provider, when the frontend has it
    pub id: Option<String>,
}

impl ResourceGroupSelection {
    /// A resource group known only by name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// Attach the provider-returned resource id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
