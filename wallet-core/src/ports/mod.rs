//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The wallet service
//! depends only on these traits, not on concrete implementations.

mod id;
mod risk;
mod store;

pub use id::{IdGenerator, UuidIdGenerator};
pub use risk::RiskOracle;
pub use store::WalletStore;
