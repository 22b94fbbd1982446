//! In-memory wallet store

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::result::{Error, Result};
use crate::domain::Wallet;
use crate::ports::WalletStore;

/// Process-local wallet store backed by a map keyed by wallet id
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: RwLock<HashMap<String, Wallet>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored wallets
    pub fn len(&self) -> Result<usize> {
        Ok(self.wallets.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::database("wallet map lock poisoned")
}

impl WalletStore for InMemoryWalletStore {
    fn save(&self, wallet: Wallet) -> Result<Wallet> {
        let mut wallets = self.wallets.write().map_err(poisoned)?;
        wallets.insert(wallet.id().to_string(), wallet.clone());
        Ok(wallet)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Wallet>> {
        let wallets = self.wallets.read().map_err(poisoned)?;
        Ok(wallets.get(id).cloned())
    }

    fn exists_by_owner_email(&self, email: &str) -> Result<bool> {
        let wallets = self.wallets.read().map_err(poisoned)?;
        Ok(wallets.values().any(|w| w.owner_email() == email))
    }
}
