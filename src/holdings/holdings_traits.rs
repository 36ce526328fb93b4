use async_trait::async_trait;

use super::holdings_model::Holding;
use crate::errors::Result;

/// Read-only access to the current holdings snapshot, injected by the
/// host so the engine never touches a live backing store directly.
#[async_trait]
pub trait HoldingsProviderTrait: Send + Sync {
    async fn get_holdings(&self) -> Result<Vec<Holding>>;
}
