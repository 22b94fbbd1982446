//! Core domain entities
//!
//! Pure data structures and validation rules - no I/O.

pub mod email;
pub mod result;
mod wallet;

pub use email::is_valid_email;
pub use wallet::{Wallet, WalletSummary};
