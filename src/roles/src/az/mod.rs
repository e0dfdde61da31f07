//! Azure CLI process boundary
//!
//! Every `az` invocation (credential lookup and the role listing fallback)
//! goes through [`CommandRunner`], so tests can script the CLI.

mod runner;

pub use runner::{
    locate_cli, locate_cli_in, AzCommandRunner, CommandOutput, CommandRunner, CLI_CANDIDATES,
    INTERACTIVE_LIMIT,
};
