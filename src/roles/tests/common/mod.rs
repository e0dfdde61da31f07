//! Shared fakes for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use objectseeker_roles::{
    AccessToken, CommandOutput, CommandRunner, CredentialProvider, EngineConfig, FetchOutcome,
    Locale, RawRoleRecord, Result, RoleDefinitionSource, RoleError, RoleSearchEngine, ScopePath,
};

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_TENANT: &str = "00000000-0000-0000-0000-000000000001";

/// Credential provider with a fixed answer
pub struct StaticCredential {
    signed_in: bool,
}

impl StaticCredential {
    pub fn signed_in() -> Arc<Self> {
        Arc::new(Self { signed_in: true })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self { signed_in: false })
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn access_token(&self, _audience: &str) -> Result<AccessToken> {
        if self.signed_in {
            Ok(AccessToken::new(
                TEST_TOKEN,
                SystemTime::now() + Duration::from_secs(3600),
            ))
        } else {
            Err(RoleError::AuthRequired("not signed in".into()))
        }
    }

    async fn tenant_id(&self) -> Result<String> {
        if self.signed_in {
            Ok(TEST_TENANT.to_string())
        } else {
            Err(RoleError::AuthRequired("not signed in".into()))
        }
    }
}

/// Provider-backed source serving fixed records per locale
pub struct FixtureSource {
    en: Vec<RawRoleRecord>,
    ja: Vec<RawRoleRecord>,
    english_fetches: AtomicUsize,
    japanese_fetches: AtomicUsize,
}

impl FixtureSource {
    pub fn new(en: Vec<RawRoleRecord>, ja: Vec<RawRoleRecord>) -> Arc<Self> {
        Arc::new(Self {
            en,
            ja,
            english_fetches: AtomicUsize::new(0),
            japanese_fetches: AtomicUsize::new(0),
        })
    }

    /// Completed English + Japanese fetch pairs
    pub fn cycles(&self) -> usize {
        self.japanese_fetches.load(Ordering::SeqCst)
    }

    pub fn english_fetches(&self) -> usize {
        self.english_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleDefinitionSource for FixtureSource {
    async fn fetch(&self, _scope: Option<&ScopePath>, locale: Locale) -> Result<FetchOutcome> {
        match locale {
            Locale::English => {
                self.english_fetches.fetch_add(1, Ordering::SeqCst);
                Ok(FetchOutcome::provider(self.en.clone()))
            }
            Locale::Japanese => {
                self.japanese_fetches.fetch_add(1, Ordering::SeqCst);
                Ok(FetchOutcome::provider(self.ja.clone()))
            }
        }
    }
}

/// Scripted `az`: account commands succeed, role listing returns `role_list`
pub struct ScriptedAz {
    role_list: CommandOutput,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedAz {
    pub fn new(role_list: CommandOutput) -> Arc<Self> {
        Arc::new(Self {
            role_list,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Argument lists of every `az role ...` invocation
    pub fn role_calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some("role"))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedAz {
    async fn run(&self, args: &[&str], _limit: Duration) -> Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|a| a.to_string()).collect());

        match args {
            ["account", "show", ..] => Ok(CommandOutput::ok(format!(
                r#"{{"tenantId":"{}"}}"#,
                TEST_TENANT
            ))),
            ["account", "get-access-token", ..] => Ok(CommandOutput::ok(format!(
                r#"{{"accessToken":"{}","expires_on":{}}}"#,
                TEST_TOKEN,
                4_102_444_800u64
            ))),
            ["role", "definition", "list", ..] => Ok(self.role_list.clone()),
            _ => Ok(CommandOutput::failed(2, "unknown command")),
        }
    }

    fn program(&self) -> &Path {
        Path::new("az")
    }
}

/// The three-role bilingual fixture used across tests
pub fn sample_records() -> (Vec<RawRoleRecord>, Vec<RawRoleRecord>) {
    let en = vec![
        RawRoleRecord::new("/roleDefinitions/owner", "Owner")
            .with_display_name("Owner")
            .with_description("Grants full access to manage all resources"),
        RawRoleRecord::new("/roleDefinitions/contributor", "Contributor")
            .with_display_name("Contributor")
            .with_description("Grants full access except role assignments"),
        RawRoleRecord::new("/roleDefinitions/reader", "Reader")
            .with_display_name("Reader")
            .with_description("View all resources"),
    ];
    let ja = vec![
        RawRoleRecord::new("/roleDefinitions/owner", "Owner")
            .with_display_name("所有者")
            .with_description("すべてのリソースを管理するためのフル アクセスを付与します"),
        RawRoleRecord::new("/roleDefinitions/contributor", "Contributor")
            .with_description("共同作成者ロールはすべてのリソースを管理できます。"),
        RawRoleRecord::new("/roleDefinitions/reader", "Reader").with_display_name("閲覧者"),
        RawRoleRecord::new("/roleDefinitions/ja-only", "Phantom").with_display_name("幻"),
    ];
    (en, ja)
}

/// Engine over [`FixtureSource`] with a signed-in credential
pub fn fixture_engine(
    en: Vec<RawRoleRecord>,
    ja: Vec<RawRoleRecord>,
) -> (RoleSearchEngine, Arc<FixtureSource>) {
    let source = FixtureSource::new(en, ja);
    let engine = RoleSearchEngine::new(
        StaticCredential::signed_in(),
        source.clone(),
        EngineConfig::default(),
    );
    (engine, source)
}
