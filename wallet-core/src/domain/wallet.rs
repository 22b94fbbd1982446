//! Wallet domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary account tied to one owner email
///
/// Identity and owner are fixed at construction. The balance only moves
/// through `deposit` and `withdraw`; neither checks the sign of its
/// argument, that is the service's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    id: String,
    owner_email: String,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet
    pub fn new(id: impl Into<String>, owner_email: impl Into<String>, balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner_email: owner_email.into(),
            balance,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a wallet from persisted state
    pub fn restore(
        id: impl Into<String>,
        owner_email: impl Into<String>,
        balance: Decimal,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_email: owner_email.into(),
            balance,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_email(&self) -> &str {
        &self.owner_email
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Add `amount` to the balance and return the new balance
    ///
    /// Returns `None` and leaves the wallet untouched when the sum does not
    /// fit in a `Decimal`.
    #[must_use]
    pub fn deposit(&mut self, amount: Decimal) -> Option<Decimal> {
        let balance = self.balance.checked_add(amount)?;
        self.balance = balance;
        self.updated_at = Utc::now();
        Some(balance)
    }

    /// Subtract `amount` from the balance
    pub fn withdraw(&mut self, amount: Decimal) {
        self.balance -= amount;
        self.updated_at = Utc::now();
    }

    /// Project to the caller-facing summary
    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            wallet_id: self.id.clone(),
            balance: self.balance,
        }
    }
}

/// Result of creating a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub wallet_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}
