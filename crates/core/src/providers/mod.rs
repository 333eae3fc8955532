pub mod retry;
pub mod traits;

// Provider implementations
pub mod connectivity;
pub mod holdings_api;
