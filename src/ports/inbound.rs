//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: the interactive front-end drives navigation and gated actions.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive loop until the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}
