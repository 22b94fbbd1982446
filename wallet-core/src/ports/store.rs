//! Wallet store port - persistence abstraction

use crate::domain::result::Result;
use crate::domain::Wallet;

/// Wallet persistence abstraction
///
/// Implementations (adapters) provide the actual storage. Wallets are handed
/// over by value; the store keeps its own copy.
pub trait WalletStore: Send + Sync {
    /// Insert or replace the wallet with the same id
    fn save(&self, wallet: Wallet) -> Result<Wallet>;

    /// Get wallet by ID, `None` if unknown
    fn find_by_id(&self, id: &str) -> Result<Option<Wallet>>;

    /// Whether any wallet is owned by `email` (exact match)
    fn exists_by_owner_email(&self, email: &str) -> Result<bool>;
}
