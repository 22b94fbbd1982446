//! Wallet service - wallet lifecycle and balance mutation
//!
//! Every operation validates its input before touching a collaborator, then
//! applies the business rules in a fixed order. A failure at any step stops
//! the operation; nothing is persisted unless every check passed.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{is_valid_email, Wallet, WalletSummary};
use crate::ports::{IdGenerator, RiskOracle, UuidIdGenerator, WalletStore};

/// Wallet service for creating wallets and moving balances
pub struct WalletService {
    store: Arc<dyn WalletStore>,
    risk: Arc<dyn RiskOracle>,
    ids: Arc<dyn IdGenerator>,
}

impl WalletService {
    /// Create a service that mints UUID wallet ids
    pub fn new(store: Arc<dyn WalletStore>, risk: Arc<dyn RiskOracle>) -> Self {
        Self::with_id_generator(store, risk, Arc::new(UuidIdGenerator))
    }

    /// Create a service with a custom id source
    pub fn with_id_generator(
        store: Arc<dyn WalletStore>,
        risk: Arc<dyn RiskOracle>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { store, risk, ids }
    }

    /// Open a wallet for `owner_email` with `initial_balance`
    ///
    /// Checks run in this order, each short-circuiting the rest:
    /// email shape, balance sign, risk oracle, duplicate owner.
    pub fn create_wallet(&self, owner_email: &str, initial_balance: Decimal) -> Result<WalletSummary> {
        debug!("create_wallet requested");

        if !is_valid_email(owner_email) {
            return Err(Error::invalid_argument("invalid email address"));
        }
        if initial_balance < Decimal::ZERO {
            return Err(Error::invalid_argument("initial balance cannot be negative"));
        }

        if self.risk.is_blocked(owner_email)? {
            warn!("create_wallet rejected: owner is blocked");
            return Err(Error::business_rule("owner is blocked"));
        }
        if self.store.exists_by_owner_email(owner_email)? {
            warn!("create_wallet rejected: wallet already exists");
            return Err(Error::business_rule("wallet already exists"));
        }

        let wallet = Wallet::new(self.ids.next_id(), owner_email, initial_balance);
        let summary = wallet.summary();
        self.store.save(wallet)?;

        info!(wallet_id = %summary.wallet_id, balance = %summary.balance, "wallet created");
        Ok(summary)
    }

    /// Add `amount` to a wallet and return the new balance
    ///
    /// A deposit that would push the balance past `Decimal::MAX` is
    /// rejected without persisting anything.
    pub fn deposit(&self, wallet_id: &str, amount: Decimal) -> Result<Decimal> {
        debug!(wallet_id, "deposit requested");

        if amount <= Decimal::ZERO {
            return Err(Error::invalid_argument("amount is not valid"));
        }

        let mut wallet = self.load(wallet_id)?;
        if wallet.deposit(amount).is_none() {
            warn!(wallet_id, "deposit rejected: balance limit exceeded");
            return Err(Error::business_rule("balance limit exceeded"));
        }
        let balance = self.store.save(wallet)?.balance();

        info!(wallet_id, balance = %balance, "deposit applied");
        Ok(balance)
    }

    /// Take `amount` out of a wallet and return the new balance
    ///
    /// Fails without persisting anything when the balance does not cover
    /// the amount.
    pub fn withdraw(&self, wallet_id: &str, amount: Decimal) -> Result<Decimal> {
        debug!(wallet_id, "withdraw requested");

        if amount <= Decimal::ZERO {
            return Err(Error::invalid_argument("amount must be greater than 0"));
        }

        let mut wallet = self.load(wallet_id)?;
        if amount > wallet.balance() {
            warn!(wallet_id, "withdraw rejected: insufficient funds");
            return Err(Error::business_rule("insufficient funds"));
        }

        wallet.withdraw(amount);
        let balance = self.store.save(wallet)?.balance();

        info!(wallet_id, balance = %balance, "withdrawal applied");
        Ok(balance)
    }

    fn load(&self, wallet_id: &str) -> Result<Wallet> {
        self.store
            .find_by_id(wallet_id)?
            .ok_or_else(|| Error::not_found("wallet not found"))
    }
}
