//! Basic example of the Wiring container.
//!
//! Run with `RUST_LOG=wiring_container=debug cargo run --example basic`
//! to see registrations and resolutions logged.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wiring::prelude::*;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(Injectable)]
#[injectable(provides = "dyn Logger")]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Config {
    database_url: String,
}

#[derive(Injectable)]
struct Database {
    config: Arc<Config>,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.database_url)
    }
}

trait UserRepository: Send + Sync {
    fn find_user(&self, id: u64) -> String;
}

#[derive(Injectable)]
#[injectable(provides = "dyn UserRepository")]
struct SqlUserRepository {
    db: Arc<Database>,
}

impl UserRepository for SqlUserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

trait Metrics: Send + Sync {
    fn count(&self, name: &str);
}

// Two constructors: the container picks the one with the most parameters.
struct UserService {
    repo: Arc<dyn UserRepository>,
    logger: Arc<dyn Logger>,
    metrics: Option<Arc<dyn Metrics>>,
}

impl Injectable for UserService {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new(
                "with_repo",
                vec![TypeKey::of::<dyn UserRepository>(), TypeKey::of::<dyn Logger>()],
                |args| {
                    Ok(UserService {
                        repo: args.required()?,
                        logger: args.required()?,
                        metrics: None,
                    })
                },
            ),
            Constructor::new(
                "with_metrics",
                vec![
                    TypeKey::of::<dyn UserRepository>(),
                    TypeKey::of::<dyn Logger>(),
                    TypeKey::of::<dyn Metrics>(),
                ],
                |args| {
                    Ok(UserService {
                        repo: args.required()?,
                        logger: args.required()?,
                        metrics: args.optional()?,
                    })
                },
            ),
        ]
    }
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        if let Some(metrics) = &self.metrics {
            metrics.count("user.lookup");
        }
        self.repo.find_user(id)
    }
}

struct PersistenceModule;

impl Module for PersistenceModule {
    fn register(&self, registrar: &mut dyn Registrar) -> Result<()> {
        registrar.instance(
            "config",
            Arc::new(Config {
                database_url: "postgres://localhost/app".into(),
            }),
        )?;
        registrar.singleton_self::<Database>()?;
        registrar.singleton::<dyn UserRepository, SqlUserRepository>("users.repository")?;
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Metrics are not registered; the empty policy lets `UserService`
    // still be built through its widest constructor.
    let container = Container::builder()
        .missing_dependency(MissingDependencyPolicy::Empty)
        .singleton::<dyn Logger, ConsoleLogger>("logger")
        .module(&PersistenceModule)
        .transient_self::<UserService>()
        .build()?;

    if let Some(service) = container.get::<UserService>()? {
        println!("{}", service.get_user(42));
    }

    // Singletons are shared.
    let a = container.get_by_key::<Database>("Database")?;
    let b = container.get_by_key::<Database>("Database")?;
    if let (Some(a), Some(b)) = (a, b) {
        println!("Same database: {}", Arc::ptr_eq(&a, &b));
    }

    // Unknown keys are not errors.
    println!("Cache registered: {}", container.get_by_key::<Database>("cache")?.is_some());

    // Asking for the wrong contract is.
    if let Err(err) = container.get_by_key::<dyn Logger>("config") {
        println!("{err}");
    }

    for info in container.registrations() {
        println!(
            "{:<20} {:<8} {} (built: {})",
            info.key,
            info.lifecycle,
            info.contract.short_name(),
            info.instantiated
        );
    }

    Ok(())
}
