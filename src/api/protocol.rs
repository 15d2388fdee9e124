use async_trait::async_trait;
use serde_json::Value;

use crate::prelude::*;

/// Transport seam for the pricing service.
///
/// Implementations own authentication, timeouts, and retries. `Ok(None)` means
/// the service returned nothing usable for the request; `Err` is reserved for
/// transport failures worth surfacing to the caller.
#[async_trait]
pub trait PriceProtocol: Sync {
    async fn api_post(&self, path: &str, body: &Value) -> Result<Option<Value>>;
}
