//! ObjectSeeker - Azure role lookup
//!
//! Command-line frontend over the bilingual role catalog:
//! - Search roles by English or Japanese name
//! - Resolve a Japanese display name to its canonical role name
//! - Show a single role by name or id
//! - Report the signed-in Azure CLI session
//! - Sign in through `az login`

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use objectseeker_roles::{
    AzCommandRunner, AzureCliCredential, CommandRunner, CredentialProvider, ResourceGroupSelection,
    RoleSearchEngine, ScopePath, ScopeResolver, SearchResult, SubscriptionSelection,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod config;

use config::SeekerConfig;

/// ObjectSeeker CLI
#[derive(Parser)]
#[command(name = "objectseeker")]
#[command(about = "ObjectSeeker - find Azure built-in roles by English or Japanese name")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: ~/.objectseeker/config.toml)
    #[arg(short, long, env = "OBJECTSEEKER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search roles by name or Japanese description
    Search {
        /// Text to look for; empty lists every role
        #[arg(default_value = "")]
        query: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Maximum number of results (overrides config)
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a display name (e.g. 閲覧者) to its role name
    Lookup {
        /// Display name, exact or partial
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Show one role by role name or id
    Describe {
        /// Role name (case-insensitive) or role definition id
        role: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Print the role as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show Azure CLI session status
    Status,

    /// Sign in with the Azure CLI
    Login,
}

/// Where roles are listed from
#[derive(Args, Clone, Default)]
struct ScopeArgs {
    /// Subscription id ("all" for built-in roles only)
    #[arg(long)]
    subscription: Option<String>,

    /// Resource group name within the subscription
    #[arg(long)]
    resource_group: Option<String>,

    /// Resource group id as returned by Azure
    #[arg(long, requires = "resource_group")]
    resource_group_id: Option<String>,
}

impl ScopeArgs {
    fn resolve(&self) -> Result<Option<ScopePath>> {
        let subscription = SubscriptionSelection::parse(self.subscription.as_deref().unwrap_or(""));
        let group = self.resource_group.as_ref().map(|name| {
            let group = ResourceGroupSelection::new(name.as_str());
            match &self.resource_group_id {
                Some(id) => group.with_id(id.as_str()),
                None => group,
            }
        });

        let scope = ScopeResolver::resolve(&subscription, group.as_ref())
            .context("Invalid subscription or resource group")?;
        debug!("Resolved scope: {:?}", scope);
        Ok(scope)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},objectseeker_roles={}", log_level, log_level).into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    // Load configuration
    let config = SeekerConfig::resolve(cli.config.as_deref())?;
    config.validate()?;

    let runner: Arc<dyn CommandRunner> = Arc::new(
        AzCommandRunner::discover(config.azure.cli_path.as_deref())
            .context("Azure CLI not found; install it or set azure.cli_path")?,
    );
    info!("Using Azure CLI at {:?}", runner.program());

    match cli.command {
        Command::Status => status(runner, &config).await,
        Command::Login => login(runner, &config).await,
        Command::Search {
            query,
            scope,
            max_results,
            json,
        } => {
            let engine = build_engine(runner, &config)?;
            let max_results = max_results.unwrap_or(engine.config().default_max_results);
            let receiver = engine.spawn_search(query, max_results, scope.resolve()?);

            let results = receiver
                .await
                .context("Search task ended without a result")?
                .context("Role search failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
            Ok(())
        }
        Command::Lookup { name, scope } => {
            let engine = build_engine(runner, &config)?;
            let scope = scope.resolve()?;
            match engine.role_name_for(&name, scope.as_ref()).await? {
                Some(role_name) => println!("{}", role_name),
                None => anyhow::bail!("No role found for '{}'", name),
            }
            Ok(())
        }
        Command::Describe { role, scope, json } => {
            let engine = build_engine(runner, &config)?;
            let scope = scope.resolve()?;
            let Some(found) = engine.describe(&role, scope.as_ref()).await? else {
                anyhow::bail!("Role '{}' not found", role);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                print_role(&found);
            }
            Ok(())
        }
    }
}

fn build_engine(
    runner: Arc<dyn CommandRunner>,
    config: &SeekerConfig,
) -> Result<Arc<RoleSearchEngine>> {
    let engine = RoleSearchEngine::azure(config.fetcher_config(), config.engine_config(), runner)
        .context("Failed to initialize role search engine")?;
    Ok(Arc::new(engine))
}

/// Report the CLI session
async fn status(runner: Arc<dyn CommandRunner>, config: &SeekerConfig) -> Result<()> {
    let limit = Duration::from_secs(config.search.timeout_secs);
    let program = runner.program().to_path_buf();
    let version = runner.version(limit).await;
    let credential = AzureCliCredential::with_timeout(runner, limit);

    println!("Azure CLI:  {}", program.display());
    match version {
        Ok(version) => println!("Version:    {}", version),
        Err(e) => println!("Version:    (unknown: {})", e),
    }
    println!("Endpoint:   {}", config.azure.management_endpoint);
    match credential.tenant_id().await {
        Ok(tenant) => println!("Tenant:     {}", tenant),
        Err(e) => {
            println!("Tenant:     (not signed in)");
            return Err(e).context("Run 'az login' to sign in");
        }
    }

    Ok(())
}

/// Check the CLI answers, then sign in interactively
async fn login(runner: Arc<dyn CommandRunner>, config: &SeekerConfig) -> Result<()> {
    let limit = Duration::from_secs(config.search.timeout_secs);
    let version = runner
        .version(limit)
        .await
        .context("Azure CLI did not answer 'az --version'")?;
    info!("Azure CLI version: {}", version);

    let credential = AzureCliCredential::with_timeout(runner, limit);
    let tenant = credential.login().await.context("Azure CLI sign-in failed")?;
    println!("Signed in to tenant {}", tenant);
    Ok(())
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No matching roles");
        return;
    }

    let width = results
        .iter()
        .map(|r| r.role_name.chars().count())
        .max()
        .unwrap_or_default();

    for result in results {
        println!(
            "{:<width$}  {}",
            result.role_name,
            result.display_name,
            width = width
        );
    }
    println!("{} role(s)", results.len());
}

fn print_role(role: &SearchResult) {
    println!("Role name:    {}", role.role_name);
    println!("Display name: {}", role.display_name);
    println!("Description:  {}", role.description);
    println!("Id:           {}", role.id);
}
