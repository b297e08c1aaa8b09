use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::ExchangeRatesProviderConfig;
use crate::core::rate::{RateQuery, RateRow, RateSource};

const USER_AGENT: &str = concat!("fxchart/", env!("CARGO_PKG_VERSION"));

/// Rate source backed by an HTTP exchange-rate service.
///
/// Rows are requested from `{base_url}/exchange_rates/{CURRENCY}` with the
/// `start`, `end` and `sort` query parameters. Each request is attempted once.
pub struct ExchangeRatesProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRatesProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ExchangeRatesProviderConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Builds the query URL. Spaces in `sort` are sent as `%20`, not form-style `+`.
    fn query_url(&self, query: &RateQuery) -> Result<Url> {
        let endpoint = format!("{}/exchange_rates/{}", self.base_url, query.currency);
        let mut url = Url::parse(&endpoint)
            .with_context(|| format!("Invalid rate source URL: {endpoint}"))?;
        url.set_query(Some(&format!(
            "start={}&end={}&sort={}",
            query.range.start(),
            query.range.end(),
            query.sort_order().replace(' ', "%20")
        )));
        Ok(url)
    }
}

#[async_trait]
impl RateSource for ExchangeRatesProvider {
    #[instrument(
        name = "ExchangeRatesQuery",
        skip(self, query),
        fields(currency = %query.currency)
    )]
    async fn query(&self, query: &RateQuery) -> Result<Vec<RateRow>> {
        let url = self.query_url(query)?;
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency: {}", e, query.currency))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency: {}",
                response.status(),
                query.currency
            ));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response for currency: {}", query.currency))?;

        let rows: Vec<RateRow> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rate rows for {}: {}", query.currency, e))?;

        debug!("Received {} rate rows", rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use crate::core::range::DateRange;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(currency: &str, status_code: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/exchange_rates/{currency}")))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn usd_query(start: i64, end: i64) -> RateQuery {
        let currency: CurrencyCode = "USD".parse().unwrap();
        RateQuery::new(currency, DateRange::new(start, end).unwrap())
    }

    fn provider(mock_server: &MockServer) -> ExchangeRatesProvider {
        ExchangeRatesProvider::new(&mock_server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_query_sends_currency_range_and_order() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchange_rates/USD"))
            .and(query_param("start", "100"))
            .and(query_param("end", "200"))
            .and(query_param("sort", "date ASC"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"date": 100, "rate": 17.5}, {"date": 200, "rate": 17.8}]"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let rows = provider(&mock_server)
            .query(&usd_query(100, 200))
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                RateRow {
                    rate: 17.5,
                    date: Some(100)
                },
                RateRow {
                    rate: 17.8,
                    date: Some(200)
                },
            ]
        );

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("start=100&end=200&sort=date%20ASC")
        );
    }

    #[tokio::test]
    async fn test_rows_without_date_column() {
        let body = r#"[{"rate": 19.9, "currency": "USD"}, {"rate": 20.1}]"#;
        let mock_server = create_mock_server("USD", 200, body).await;

        let rows = provider(&mock_server)
            .query(&usd_query(100, 200))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.date.is_none()));
        assert_eq!(rows[1].rate, 20.1);
    }

    #[tokio::test]
    async fn test_empty_row_set() {
        let mock_server = create_mock_server("USD", 200, "[]").await;

        let rows = provider(&mock_server)
            .query(&usd_query(100, 200))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_response() {
        let mock_server = create_mock_server("USD", 500, "").await;

        let result = provider(&mock_server).query(&usd_query(100, 200)).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency: USD"
        );
    }

    #[tokio::test]
    async fn test_missing_rate_is_rejected() {
        let body = r#"[{"date": 100, "rate": 17.5}, {"date": 200}]"#;
        let mock_server = create_mock_server("USD", 200, body).await;

        let result = provider(&mock_server).query(&usd_query(100, 200)).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse rate rows for USD")
        );
    }

    #[tokio::test]
    async fn test_non_numeric_rate_is_rejected() {
        let body = r#"[{"date": 100, "rate": "17.5"}]"#;
        let mock_server = create_mock_server("USD", 200, body).await;

        let result = provider(&mock_server).query(&usd_query(100, 200)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_slow_source_times_out_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchange_rates/USD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider =
            ExchangeRatesProvider::new(&mock_server.uri(), Duration::from_millis(200)).unwrap();
        let result = provider.query(&usd_query(100, 200)).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Request error:")
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let provider =
            ExchangeRatesProvider::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        let url = provider.query_url(&usd_query(1, 2)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/exchange_rates/USD?start=1&end=2&sort=date%20ASC"
        );
    }
}
