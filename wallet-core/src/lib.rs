//! Wallet Core - business logic for monetary wallet accounts
//!
//! This crate implements the wallet lifecycle following hexagonal architecture:
//!
//! - **domain**: Core entities (Wallet, WalletSummary) and error types
//! - **ports**: Trait definitions for collaborators (WalletStore, RiskOracle, IdGenerator)
//! - **services**: Business rule orchestration (WalletService)
//! - **adapters**: Concrete implementations (DuckDB, in-memory, blocklist, HTTP)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{BlocklistRiskOracle, DuckDbWalletStore, HttpRiskOracle, InMemoryWalletStore, RiskOracleChain};
use config::{Config, StorageBackend};
use ports::{RiskOracle, WalletStore};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Wallet, WalletSummary};
pub use services::WalletService;

/// Main context for wallet operations
///
/// Wires the configured store and risk oracle into a `WalletService`.
pub struct WalletContext {
    pub config: Config,
    pub store: Arc<dyn WalletStore>,
    pub wallet_service: WalletService,
}

impl WalletContext {
    /// Create a context from the settings in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(data_dir, config)
    }

    /// Create a context from an already loaded config
    pub fn with_config(data_dir: &Path, config: Config) -> Result<Self> {
        let store: Arc<dyn WalletStore> = match config.storage_backend {
            StorageBackend::DuckDb => {
                std::fs::create_dir_all(data_dir).with_context(|| {
                    format!("Failed to create wallet directory: {}", data_dir.display())
                })?;
                let db_path = data_dir.join(&config.database_file);
                let store = DuckDbWalletStore::new(&db_path)
                    .with_context(|| format!("Failed to open {}", db_path.display()))?;
                store.ensure_schema().context("Failed to initialize schema")?;
                Arc::new(store)
            }
            StorageBackend::Memory => Arc::new(InMemoryWalletStore::new()),
        };

        let risk = build_risk_oracle(&config)?;
        let wallet_service = WalletService::new(Arc::clone(&store), risk);

        tracing::debug!(backend = %config.storage_backend, "wallet context ready");

        Ok(Self {
            config,
            store,
            wallet_service,
        })
    }
}

/// Local blocklist first, then the remote service when one is configured
fn build_risk_oracle(config: &Config) -> Result<Arc<dyn RiskOracle>> {
    let mut chain = RiskOracleChain::new();

    if !config.blocked_owners.is_empty() {
        chain = chain.with(Arc::new(BlocklistRiskOracle::new(&config.blocked_owners)));
    }
    if let Some(url) = &config.risk_service_url {
        let oracle = HttpRiskOracle::new(url, config.risk_timeout)
            .context("Failed to configure risk service")?;
        chain = chain.with(Arc::new(oracle));
    }

    Ok(Arc::new(chain))
}
