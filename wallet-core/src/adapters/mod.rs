//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB and an in-memory map for the WalletStore port
//! - Static blocklist and HTTP client for the RiskOracle port

pub mod duckdb;
pub mod memory;
pub mod risk;

#[cfg(test)]
pub mod mock;

pub use self::duckdb::DuckDbWalletStore;
pub use memory::InMemoryWalletStore;
pub use risk::{BlocklistRiskOracle, HttpRiskOracle, RiskOracleChain, DEFAULT_RISK_TIMEOUT};
