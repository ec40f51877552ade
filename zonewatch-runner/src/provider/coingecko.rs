//! CoinGecko market-chart provider.
//!
//! Fetches daily prices from `/coins/{id}/market_chart`. Handles rate
//! limiting, retries with exponential backoff, response parsing, and the
//! circuit breaker. The free API tier rate-limits aggressively, so requests
//! are made one asset at a time.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use zonewatch_core::{PricePoint, PriceSeries};

use super::circuit_breaker::CircuitBreaker;
use super::{FetchError, PriceProvider};
use crate::config::{AssetSpec, ProviderConfig};

/// `market_chart` response body. Only `prices` is used.
#[derive(Debug, Deserialize)]
struct MarketChart {
    /// `[unix_ms, price]` pairs, oldest first.
    prices: Vec<(f64, f64)>,
}

/// CoinGecko HTTP provider.
pub struct CoinGeckoProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl CoinGeckoProvider {
    pub fn new(
        config: &ProviderConfig,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("zonewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Other(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            circuit_breaker,
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Override the first retry delay (doubles on every further attempt).
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Market-chart URL for one asset.
    pub fn chart_url(&self, id: &str, vs_currency: &str, days: u32) -> String {
        format!(
            "{}/coins/{id}/market_chart?vs_currency={vs_currency}&days={days}&interval=daily",
            self.base_url
        )
    }

    /// Execute the request with retry and circuit breaker logic.
    fn fetch_with_retry(&self, url: &str, id: &str) -> Result<String, FetchError> {
        if !self.circuit_breaker.is_allowed() {
            debug!(
                id,
                remaining_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
                "circuit breaker open, skipping request"
            );
            return Err(FetchError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(id, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(FetchError::CircuitBreakerTripped);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(FetchError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(FetchError::AssetNotFound { id: id.to_string() });
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.trim().parse::<u64>().ok())
                            .unwrap_or(60);
                        warn!(id, retry_after_secs = retry_after, "rate limited");
                        last_error = Some(FetchError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(FetchError::Http {
                            status: status.as_u16(),
                            id: id.to_string(),
                        });
                        continue;
                    }

                    let body = resp
                        .text()
                        .map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;
                    self.circuit_breaker.record_success();
                    return Ok(body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(FetchError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(FetchError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Other("max retries exceeded".into())))
    }
}

/// Parse a `market_chart` body into price samples.
pub fn parse_market_chart(id: &str, body: &str) -> Result<Vec<PricePoint>, FetchError> {
    let chart: MarketChart = serde_json::from_str(body).map_err(|e| {
        FetchError::ResponseFormatChanged(format!("failed to parse response for {id}: {e}"))
    })?;

    chart
        .prices
        .into_iter()
        .map(|(ms, price)| {
            DateTime::from_timestamp_millis(ms as i64)
                .map(|ts| PricePoint::new(ts, price))
                .ok_or_else(|| {
                    FetchError::ResponseFormatChanged(format!("invalid timestamp {ms} for {id}"))
                })
        })
        .collect()
}

impl PriceProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch(
        &self,
        asset: &AssetSpec,
        vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(&asset.id, vs_currency, days);
        let body = self.fetch_with_retry(&url, &asset.id)?;
        let series = PriceSeries::from_points(parse_market_chart(&asset.id, &body)?);
        if series.is_empty() {
            return Err(FetchError::EmptySeries {
                id: asset.id.clone(),
            });
        }
        Ok(series)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
