//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions.

pub mod migration;
mod wallet;

pub use migration::{MigrationResult, MigrationService};
pub use wallet::WalletService;
