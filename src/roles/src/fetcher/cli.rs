//! `az role definition list` fallback

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::payload::parse_cli_listing;
use crate::az::CommandRunner;
use crate::error::{Result, RoleError};
use crate::scope::ScopePath;
use crate::types::RawRoleRecord;

/// Lists built-in roles through the Azure CLI
///
/// The CLI answers in its own configured language only, so this path cannot
/// tell locales apart.
pub struct CliRoleProvider {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl CliRoleProvider {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Arguments for the listing command
    pub fn list_args(scope: Option<&ScopePath>) -> Vec<&str> {
        let mut args = vec!["role", "definition", "list"];
        if let Some(scope) = scope {
            args.extend(["--scope", scope.as_str()]);
        }
        args.extend(["--output", "json"]);
        args
    }

    /// Fetch built-in roles; every failure is `CliUnavailable`
    pub async fn fetch(&self, scope: Option<&ScopePath>) -> Result<Vec<RawRoleRecord>> {
        let args = Self::list_args(scope);
        let output = self
            .runner
            .run(&args, self.timeout)
            .await
            .map_err(|e| match e {
                RoleError::CliUnavailable(_) => e,
                other => RoleError::CliUnavailable(other.to_string()),
            })?;

        if !output.success() {
            return Err(RoleError::CliUnavailable(format!(
                "az role definition list exited with {}: {}",
                output
                    .status
                    .map_or_else(|| "signal".to_string(), |code| code.to_string()),
                output.stderr.trim()
            )));
        }

        let records = parse_cli_listing(&output.stdout)
            .map_err(|e| RoleError::CliUnavailable(e.to_string()))?;
        debug!("CLI listed {} built-in role definitions", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args_with_and_without_scope() {
        assert_eq!(
            CliRoleProvider::list_args(None),
            vec!["role", "definition", "list", "--output", "json"]
        );

        let scope = ScopePath::subscription("S").unwrap();
        assert_eq!(
            CliRoleProvider::list_args(Some(&scope)),
            vec!["role", "definition", "list", "--scope", "/subscriptions/S", "--output", "json"]
        );
    }
}
