//! Basic example of the Block DI container.
//!
//! Run with `RUST_LOG=block_container=trace` to watch resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use block::prelude::*;
use tracing_subscriber::EnvFilter;

// === Define your types ===

struct Config {
    database_url: String,
    debug: bool,
}

#[derive(Injectable)]
struct ConsoleLogger;

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Injectable)]
struct Database {
    config: Arc<Config>,
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.database_url)
    }
}

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

struct RequestId(u64);

impl Default for RequestId {
    fn default() -> Self {
        RequestId(NEXT_REQUEST.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Injectable)]
struct UserService {
    db: Arc<Database>,
    audit: Option<Arc<AuditTrail>>,
    #[inject(skip)]
    request: RequestId,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        if let Some(audit) = &self.audit {
            audit.record(self.request.0, id);
        }
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

/// Never registered: `UserService` gets `None`.
struct AuditTrail;

impl AuditTrail {
    fn record(&self, request: u64, user: u64) {
        println!("[AUDIT] request {request} read user {user}");
    }
}

// === Group registrations in a provider ===

#[derive(Default)]
struct StorageProvider;

impl ServiceProvider for StorageProvider {
    fn register(&self, container: &Container) {
        container.singleton(
            Identifier::of::<Config>(),
            Definition::value(Config {
                database_url: "postgres://localhost/myapp".to_string(),
                debug: true,
            }),
        );
        container.bind_singleton::<ConsoleLogger>();
        container.bind_singleton::<Database>();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("block_container=debug")),
        )
        .init();

    let container = Container::builder()
        .provider(StorageProvider)
        .build();
    container.bind::<UserService>();

    println!("✅ Container ready: {container:?}");

    let config: Arc<Config> = container.resolve()?;
    println!("📋 Config: database_url={}, debug={}", config.database_url, config.debug);

    // Transient: a new service (and request id) each time, sharing the singleton database
    let first: Arc<UserService> = container.resolve()?;
    let second: Arc<UserService> = container.resolve()?;
    println!("👤 {} (request {})", first.get_user(42), first.request.0);
    println!("👤 {} (request {})", second.get_user(7), second.request.0);
    assert!(Arc::ptr_eq(&first.db, &second.db));

    // Factories are auto-wired by their parameter types
    container.set(
        "report",
        Definition::factory(|db: Arc<Database>| db.query("SELECT count(*) FROM users")),
    );
    println!("📊 {}", container.get_as::<String>("report")?);

    // Failures name what is missing
    container.remove(Identifier::of::<Config>());
    container.set("orphan", Definition::factory(|config: Arc<Config>| config.debug));
    if let Err(err) = container.get("orphan") {
        println!("❌ {err}");
    }

    println!("\n🎉 Everything works!");
    Ok(())
}
