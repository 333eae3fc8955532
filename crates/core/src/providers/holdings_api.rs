use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::holding::RawHolding;
use crate::models::settings::Settings;
use crate::money::decimal_from_f64;
use super::traits::HoldingsProvider;

const PROVIDER_NAME: &str = "HoldingsApi";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Holdings endpoint over HTTP.
///
/// - **Auth**: none, single GET.
/// - **Shape**: `{ "data": { "userHolding": [ { symbol, quantity, ltp, avgPrice, close } ] } }`
/// - Unknown fields anywhere in the document are ignored.
///
/// Error mapping: timeouts → `Timeout`, connection/transport failures →
/// `Network` (both retried upstream); non-2xx status → `Api`; an undecodable
/// body or an unrepresentable price → `InvalidResponse`.
pub struct HttpHoldingsProvider {
    client: Client,
    endpoint: String,
}

impl HttpHoldingsProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeouts(endpoint, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT)
    }

    pub fn with_timeouts(
        endpoint: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_timeouts(
            settings.endpoint_url.clone(),
            settings.request_timeout(),
            settings.connect_timeout(),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ── Holdings API response types ─────────────────────────────────────

#[derive(Deserialize)]
struct HoldingsResponse {
    data: HoldingsData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingsData {
    user_holding: Vec<RawHolding>,
}

/// Decode a holdings document and reject prices that have no decimal form.
pub(crate) fn parse_holdings(body: &[u8]) -> Result<Vec<RawHolding>, CoreError> {
    let resp: HoldingsResponse = serde_json::from_slice(body).map_err(|e| {
        CoreError::InvalidResponse(format!("Failed to parse holdings response: {e}"))
    })?;

    let holdings = resp.data.user_holding;
    for holding in &holdings {
        for (field, value) in [
            ("ltp", holding.ltp),
            ("avgPrice", holding.avg_price),
            ("close", holding.close),
        ] {
            if decimal_from_f64(value).is_none() {
                return Err(CoreError::InvalidResponse(format!(
                    "Unrepresentable {field} for {}: {value}",
                    holding.symbol
                )));
            }
        }
    }

    Ok(holdings)
}

#[async_trait]
impl HoldingsProvider for HttpHoldingsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_holdings(&self) -> Result<Vec<RawHolding>, CoreError> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("Holdings endpoint returned HTTP {status}"),
            });
        }

        let body = response.bytes().await?;
        parse_holdings(&body)
    }
}
