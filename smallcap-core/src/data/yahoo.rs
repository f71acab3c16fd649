//! Yahoo Finance provider.
//!
//! Fundamentals come from the v10 quoteSummary API, flattened into the same
//! key/value bundle the normalizer reads. Close history comes from the v8
//! chart API. Handles crumb/cookie authentication, retries with exponential
//! backoff, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; every parse failure surfaces as `ResponseFormatChanged`.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{FundamentalsProvider, ProviderError, RawFundamentals, RawValue};
use crate::domain::{Lookback, PriceHistory, PricePoint};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// quoteSummary modules that together carry every field the normalizer reads.
const SUMMARY_MODULES: &str = "assetProfile,price,summaryDetail,financialData,defaultKeyStatistics";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Upper bound on a single retry sleep.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

/// Connection and retry settings.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// API host, e.g. `https://query2.finance.yahoo.com`.
    pub base_url: String,
    /// Page whose response sets the session cookie the crumb is bound to.
    pub cookie_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".into(),
            cookie_url: "https://fc.yahoo.com".into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Yahoo Finance provider.
pub struct YahooProvider {
    client: Client,
    config: YahooConfig,
    circuit_breaker: Arc<CircuitBreaker>,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Self {
        Self::with_config(YahooConfig::default(), circuit_breaker)
    }

    pub fn with_config(config: YahooConfig, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            config,
            circuit_breaker,
            crumb: Mutex::new(None),
        }
    }

    fn quote_summary_url(&self, symbol: &str, crumb: Option<&str>) -> Result<Url, ProviderError> {
        let base = format!(
            "{}/v10/finance/quoteSummary/{symbol}",
            self.config.base_url.trim_end_matches('/')
        );
        let mut params = vec![("modules", SUMMARY_MODULES)];
        if let Some(crumb) = crumb {
            params.push(("crumb", crumb));
        }
        Url::parse_with_params(&base, &params)
            .map_err(|e| ProviderError::Other(format!("bad quoteSummary URL for {symbol}: {e}")))
    }

    fn chart_url(&self, symbol: &str, lookback: Lookback) -> Result<Url, ProviderError> {
        let base = format!(
            "{}/v8/finance/chart/{symbol}",
            self.config.base_url.trim_end_matches('/')
        );
        Url::parse_with_params(&base, &[("range", lookback.as_range()), ("interval", "1d")])
            .map_err(|e| ProviderError::Other(format!("bad chart URL for {symbol}: {e}")))
    }

    /// Cached crumb, fetching one on first use.
    fn crumb(&self) -> Option<String> {
        let mut slot = self.crumb.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = self.fetch_crumb();
        }
        slot.clone()
    }

    fn refresh_crumb(&self) -> Option<String> {
        let fresh = self.fetch_crumb();
        *self.crumb.lock().unwrap_or_else(|e| e.into_inner()) = fresh.clone();
        fresh
    }

    fn fetch_crumb(&self) -> Option<String> {
        // Only the Set-Cookie matters here; the page itself usually 404s.
        if let Err(e) = self.client.get(&self.config.cookie_url).send() {
            tracing::debug!(error = %e, "cookie request failed");
            return None;
        }
        let url = format!(
            "{}/v1/test/getcrumb",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self.client.get(url).send().ok()?;
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "crumb request rejected");
            return None;
        }
        let body = resp.text().ok()?;
        let crumb = body.trim();
        if crumb.is_empty() || crumb.contains('<') {
            return None;
        }
        Some(crumb.to_string())
    }

    /// Send a GET with retry, auth refresh and circuit breaker logic.
    ///
    /// `build_url` receives the current crumb (if the endpoint needs one) so a
    /// refreshed crumb is picked up on the next attempt.
    fn get_with_retry<F>(&self, symbol: &str, needs_crumb: bool, build_url: F) -> Result<Response, ProviderError>
    where
        F: Fn(Option<&str>) -> Result<Url, ProviderError>,
    {
        if !self.circuit_breaker.is_allowed() {
            return Err(ProviderError::CircuitBreakerTripped);
        }

        let mut crumb = if needs_crumb { self.crumb() } else { None };
        let mut refreshed = false;
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                std::thread::sleep(backoff_delay(self.config.base_delay, attempt));
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(ProviderError::CircuitBreakerTripped);
            }

            let url = build_url(crumb.as_deref())?;
            tracing::debug!(symbol, attempt, %url, "GET");

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        self.circuit_breaker.record_success();
                        return Ok(resp);
                    }

                    match status {
                        StatusCode::FORBIDDEN => {
                            // IP ban
                            self.circuit_breaker.trip();
                            return Err(ProviderError::CircuitBreakerTripped);
                        }
                        StatusCode::NOT_FOUND => {
                            return Err(ProviderError::SymbolNotFound {
                                symbol: symbol.to_string(),
                            });
                        }
                        StatusCode::UNAUTHORIZED => {
                            if needs_crumb && !refreshed {
                                refreshed = true;
                                crumb = self.refresh_crumb();
                                last_error = Some(ProviderError::AuthenticationRequired(
                                    "crumb rejected".into(),
                                ));
                                continue;
                            }
                            return Err(ProviderError::AuthenticationRequired(format!(
                                "Yahoo Finance rejected credentials for {symbol}"
                            )));
                        }
                        StatusCode::TOO_MANY_REQUESTS => {
                            self.circuit_breaker.record_failure();
                            let retry_after = resp
                                .headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(60);
                            last_error = Some(ProviderError::RateLimited {
                                retry_after_secs: retry_after,
                            });
                        }
                        _ => {
                            self.circuit_breaker.record_failure();
                            last_error = Some(ProviderError::Other(format!("HTTP {status} for {symbol}")));
                        }
                    }
                }
                Err(e) if e.is_timeout() => {
                    last_error = Some(ProviderError::Timeout(e.to_string()));
                }
                Err(e) if e.is_connect() => {
                    last_error = Some(ProviderError::NetworkUnreachable(e.to_string()));
                }
                Err(e) => return Err(ProviderError::NetworkUnreachable(e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::Other("max retries exceeded".into())))
    }

    /// Flatten quoteSummary modules into one key/value bundle.
    ///
    /// Numeric fields arrive as `{"raw": 1.0, "fmt": "1.00"}`; empty objects
    /// mean "no value". The first module carrying a usable value for a key wins.
    fn parse_quote_summary(symbol: &str, resp: QuoteSummaryResponse) -> Result<RawFundamentals, ProviderError> {
        let result = resp.quote_summary.result.ok_or_else(|| api_error(symbol, resp.quote_summary.error))?;

        let modules = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

        let mut raw = RawFundamentals::new(symbol);
        for (module_name, module) in modules {
            let Some(fields) = module.as_object() else {
                tracing::debug!(symbol, module = %module_name, "skipping non-object module");
                continue;
            };
            for (key, value) in fields {
                let parsed = match value {
                    serde_json::Value::Object(obj) => obj.get("raw").map(RawValue::from_json).unwrap_or(RawValue::Unset),
                    other => RawValue::from_json(other),
                };
                let slot = raw.fields.entry(key.clone()).or_insert(RawValue::Unset);
                if *slot == RawValue::Unset {
                    *slot = parsed;
                }
            }
        }
        Ok(raw)
    }

    fn parse_chart(symbol: &str, lookback: Lookback, resp: ChartResponse) -> Result<PriceHistory, ProviderError> {
        let result = resp.chart.result.ok_or_else(|| api_error(symbol, resp.chart.error))?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| ProviderError::SymbolNotFound { symbol: symbol.to_string() })?;

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?
            .close;

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            // Holidays and halted sessions come back as null closes
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;
            points.push(PricePoint { date, close });
        }

        if points.is_empty() {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        points.sort_by_key(|p| p.date);

        Ok(PriceHistory {
            symbol: symbol.to_string(),
            lookback,
            points,
        })
    }
}

/// `base * 2^(attempt-1)`, saturating at [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(MAX_BACKOFF).min(MAX_BACKOFF)
}

fn api_error(symbol: &str, error: Option<ApiError>) -> ProviderError {
    match error {
        Some(err) if err.code == "Not Found" => ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => ProviderError::ResponseFormatChanged("empty result with no error".into()),
    }
}

impl FundamentalsProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fundamentals(&self, symbol: &str) -> Result<RawFundamentals, ProviderError> {
        let resp = self.get_with_retry(symbol, true, |crumb| self.quote_summary_url(symbol, crumb))?;
        let summary: QuoteSummaryResponse = resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("failed to parse quoteSummary for {symbol}: {e}"))
        })?;
        Self::parse_quote_summary(symbol, summary)
    }

    fn price_history(&self, symbol: &str, lookback: Lookback) -> Result<PriceHistory, ProviderError> {
        let resp = self.get_with_retry(symbol, false, |_| self.chart_url(symbol, lookback))?;
        let chart: ChartResponse = resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("failed to parse chart for {symbol}: {e}"))
        })?;
        Self::parse_chart(symbol, lookback, chart)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
