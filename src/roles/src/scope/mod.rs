//! Scope selection module
//!
//! Turns the operator's subscription / resource-group selection into the
//! Azure resource path that role definitions are listed at.
//!
//! # Examples
//!
//! ```
//! use objectseeker_roles::scope::{ResourceGroupSelection, ScopeResolver, SubscriptionSelection};
//!
//! let subscription = SubscriptionSelection::subscription("S");
//! let group = ResourceGroupSelection::new("rg1");
//!
//! let scope = ScopeResolver::resolve(&subscription, Some(&group)).unwrap();
//! assert_eq!(
//!     scope.as_ref().map(|s| s.as_str()),
//!     Some("/subscriptions/S/resourceGroups/rg1")
//! );
//! ```

mod types;
mod resolver;


pub use types::{ResourceGroupSelection, ScopePath, SubscriptionSelection, ALL_SUBSCRIPTIONS};
pub use resolver::ScopeResolver;
