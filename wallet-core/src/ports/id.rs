//! Wallet identifier generation

use uuid::Uuid;

/// Source of fresh wallet identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier not handed out before
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
