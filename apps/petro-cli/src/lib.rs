//! # petro-cli
//!
//! The operator boundary: one subcommand per station operation.
//!
//! ## Module Organization
//! ```text
//! petro_cli/
//! ├── lib.rs          ◄─── App (services + auth + role gate), run()
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── CliConfig (TOML + PETRO_* env)
//! ├── auth.rs         ◄─── JWT issue / verify
//! ├── error.rs        ◄─── CliError, exit codes
//! └── commands/
//!     ├── mod.rs      ◄─── dispatch, login
//!     ├── admin.rs    ◄─── stations, users
//!     ├── shift.rs    ◄─── shifts, readings, sales
//!     ├── inventory.rs◄─── tanks, nozzles, deliveries, prices
//!     └── cash.rs     ◄─── cash custody
//! ```
//!
//! ## Request Sequence
//! 1. Load configuration
//! 2. Open the database (migrations run on connect)
//! 3. Resolve `--token` to an `Actor`
//! 4. Check the role gate for the operation
//! 5. Run the service call and print its result as JSON

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use petro_core::{AccessPolicy, Actor, Operation, RouteAccessPolicy, SystemClock};
use petro_db::service::{FsReceiptStore, ReceiptStore};
use petro_db::{Database, Services};

use auth::JwtManager;
use cli::Cli;
use config::CliConfig;
use error::CliError;

/// Everything a subcommand needs.
pub struct App {
    pub services: Services,
    pub jwt: JwtManager,
    pub receipts: Arc<dyn ReceiptStore>,
    policy: Box<dyn AccessPolicy>,
}

impl App {
    pub fn new(services: Services, jwt: JwtManager, receipts: impl ReceiptStore + 'static) -> Self {
        App {
            services,
            jwt,
            receipts: Arc::new(receipts),
            policy: Box::new(RouteAccessPolicy),
        }
    }

    /// Opens the configured database and wires the services to the wall clock.
    pub async fn open(config: &CliConfig) -> Result<Self, CliError> {
        let db = Database::new(config.db_config()).await?;
        let services = db.services(config.service_config()?, Arc::new(SystemClock));
        let receipts = FsReceiptStore::new(&config.receipt_dir)?;

        info!(path = %config.database_path.display(), "Database ready");
        Ok(App::new(
            services,
            JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs),
            receipts,
        ))
    }

    /// Resolves the bearer token; every command but `login` needs one.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Actor, CliError> {
        let token = token.ok_or_else(|| {
            CliError::unauthenticated("A token is required; run `petro login` and pass --token")
        })?;
        self.jwt.authenticate(token)
    }

    pub fn authorize(&self, actor: &Actor, operation: Operation) -> Result<(), CliError> {
        self.policy.authorize(actor, operation).map_err(|err| {
            warn!(actor = %actor.id, role = %actor.role, %operation, "Operation denied");
            CliError::from(err)
        })
    }
}

/// Loads configuration, opens the database and runs one command.
pub async fn run(cli: Cli) -> Result<Value, CliError> {
    let config = CliConfig::load(cli.config.as_deref())?;
    if config.uses_dev_secret() {
        warn!("Using the built-in development JWT secret; set PETRO_JWT_SECRET");
    }

    let app = App::open(&config).await?;
    commands::execute(&app, cli.token.as_deref(), cli.command).await
}
