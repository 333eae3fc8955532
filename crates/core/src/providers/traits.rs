use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::RawHolding;

/// Source of the user's holdings.
///
/// The HTTP endpoint is one implementation; tests and embedding hosts can
/// supply their own. Implementations report transport problems as
/// `Timeout`/`Network` so the fetch service knows what is worth retrying.
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the full holdings list in wire form.
    async fn fetch_holdings(&self) -> Result<Vec<RawHolding>, CoreError>;
}

/// Reports whether a network path is usable right now.
///
/// Must be side-effect free. Any failure to determine reachability is
/// reported as `false`.
pub trait ConnectivityProbe: Send + Sync {
    fn is_available(&self) -> bool;
}
