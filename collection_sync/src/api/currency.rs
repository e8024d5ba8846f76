//! USD → BRL exchange rate lookup

use serde::Deserialize;

use crate::error::Result;

/// Quote endpoint for the USD-BRL pair
pub const RATE_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";

/// Exchange rate applied per run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    /// Rate used when the quote source is unreachable
    pub const FALLBACK: ExchangeRate = ExchangeRate(5.0);

    pub fn new(rate: f64) -> Self {
        Self(rate)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Converts a USD amount, rounding half-to-even at two decimals
    pub fn convert(&self, usd: f64) -> f64 {
        round_cents(usd * self.0)
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Rounds to two decimals with ties to even
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "USDBRL")]
    usd_brl: Quote,
}

#[derive(Debug, Deserialize)]
struct Quote {
    bid: String,
}

fn request_rate(client: &reqwest::blocking::Client, url: &str) -> Result<Option<f64>> {
    let response = client
        .get(url)
        .header("User-Agent", super::USER_AGENT)
        .send()?
        .error_for_status()?;
    let quote: QuoteResponse = serde_json::from_str(&response.text()?)?;
    Ok(quote
        .usd_brl
        .bid
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0))
}

/// Fetches the current USD → BRL bid.
///
/// Never fails: any network, status or parse problem yields
/// [`ExchangeRate::FALLBACK`].
pub fn fetch_usd_to_brl(client: &reqwest::blocking::Client, url: &str) -> ExchangeRate {
    log::info!("Fetching USD-BRL exchange rate");
    match request_rate(client, url) {
        Ok(Some(rate)) => {
            log::info!("USD-BRL rate: {rate}");
            ExchangeRate(rate)
        }
        Ok(None) => {
            log::warn!(
                "Exchange rate response had no usable bid, using fallback {}",
                ExchangeRate::FALLBACK.0
            );
            ExchangeRate::FALLBACK
        }
        Err(e) => {
            log::warn!(
                "Failed to fetch exchange rate ({e}), using fallback {}",
                ExchangeRate::FALLBACK.0
            );
            ExchangeRate::FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn round_cents_ties_to_even() {
        assert_eq!(round_cents(10.0), 10.0);
        assert_eq!(round_cents(1.234), 1.23);
        assert_eq!(round_cents(1.236), 1.24);
        // 0.125 and 0.375 are exact in binary, so the tie rule is visible
        assert_eq!(round_cents(0.125), 0.12);
        assert_eq!(round_cents(0.375), 0.38);
    }

    #[test]
    fn convert_is_idempotent() {
        let rate = ExchangeRate::new(5.4321);
        let first = rate.convert(3.99);
        assert_eq!(first, rate.convert(3.99));
        assert_eq!(first, 21.67);
    }

    async fn rate_from(server: &MockServer) -> ExchangeRate {
        let url = format!("{}/json/last/USD-BRL", server.uri());
        tokio::task::spawn_blocking(move || {
            fetch_usd_to_brl(&reqwest::blocking::Client::new(), &url)
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_rate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/last/USD-BRL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "USDBRL": { "code": "USD", "codein": "BRL", "bid": "5.4321", "ask": "5.4400" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(rate_from(&server).await, ExchangeRate::new(5.4321));
    }

    #[tokio::test]
    async fn fetch_rate_server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(rate_from(&server).await, ExchangeRate::FALLBACK);
    }

    #[tokio::test]
    async fn fetch_rate_malformed_body_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "USDBRL": { "bid": "n/a" } })),
            )
            .mount(&server)
            .await;

        assert_eq!(rate_from(&server).await, ExchangeRate::FALLBACK);
    }

    #[test]
    fn fetch_rate_unreachable_falls_back() {
        let rate = fetch_usd_to_brl(&reqwest::blocking::Client::new(), "http://127.0.0.1:1/rate");
        assert_eq!(rate, ExchangeRate::FALLBACK);
        assert_eq!(rate.convert(2.0), 10.0);
    }
}
