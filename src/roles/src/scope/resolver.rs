//! Resolves operator selections into scope paths

use tracing::{debug, warn};

use super::types::{ResourceGroupSelection, ScopePath, SubscriptionSelection};
use crate::error::Result;

/// Maps subscription / resource-group selections to role listing scopes
///
/// - sentinel subscription → `None` (tenant root, built-in roles only)
/// - subscription only → `/subscriptions/{id}`
/// - subscription and group → the group's provider id, or the constructed path
pub struct ScopeResolver;

impl ScopeResolver {
    /// Resolves a selection pair
    ///
    /// # Arguments
    ///
    /// * `subscription` - The selected subscription, or the sentinel
    /// * `resource_group` - The selected resource group, if any
    ///
    /// # Returns
    ///
    /// Returns the scope to list roles at, `None` for tenant root, or
    /// `RoleError::InvalidScope` when a name cannot form a path segment
    pub fn resolve(
        subscription: &SubscriptionSelection,
        resource_group: Option<&ResourceGroupSelection>,
    ) -> Result<Option<ScopePath>> {
        let subscription_id = match subscription {
            SubscriptionSelection::AllBuiltIn => {
                if resource_group.is_some() {
                    debug!("Resource group ignored without a concrete subscription");
                }
                return Ok(None);
            }
            SubscriptionSelection::Subscription(id) => id,
        };

        let Some(group) = resource_group else {
            return ScopePath::subscription(subscription_id).map(Some);
        };

        if let Some(provider_id) = group.id.as_deref() {
            match ScopePath::new(provider_id) {
                Ok(scope) => return Ok(Some(scope)),
                Err(e) => warn!("Ignoring resource group id '{}': {}", provider_id, e),
            }
        }

        ScopePath::resource_group(subscription_id, &group.name).map(Some)
    }
}
