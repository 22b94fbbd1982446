//! Risk assessment port

use crate::domain::result::Result;

/// Risk assessment oracle
///
/// Reports whether an owner is barred from financial actions. The service
/// treats the answer as opaque; how it is decided is up to the adapter.
pub trait RiskOracle: Send + Sync {
    /// Whether `email` is blocked
    fn is_blocked(&self, email: &str) -> Result<bool>;
}
