use super::client::HttpClient;
use super::transport::{ReqwestTransport, Transport};
use crate::core::currency::{
    CurrencyCatalog, CurrencyRateProvider, RateQuery, RateResponse, Symbols,
};
use crate::core::date::DateInput;
use crate::core::error::{FxError, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Domain operations over the Frankfurter API.
///
/// A thin shim over [`HttpClient`]: it shapes requests and picks values out
/// of responses, without retrying or caching anything itself.
pub struct RateResolver<T = ReqwestTransport> {
    client: HttpClient<T>,
}

impl<T: Transport> RateResolver<T> {
    pub fn new(client: HttpClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient<T> {
        &self.client
    }

    /// All currencies the service knows, as returned by `GET /currencies`.
    pub async fn currencies(&self) -> Result<CurrencyCatalog> {
        let path = "/currencies";
        let value = self.client.get(path, &[], None).await?;
        CurrencyCatalog::from_json(value, path)
    }

    /// Latest rates from `base` to each of `symbols`.
    pub async fn latest(
        &self,
        base: &str,
        symbols: impl Into<Symbols>,
        amount: Option<f64>,
    ) -> Result<RateResponse> {
        let mut query = RateQuery::latest(base, symbols);
        query.amount = amount;
        self.query(&query).await
    }

    /// Rates from `base` to each of `symbols` on `on_date`.
    pub async fn historical(
        &self,
        on_date: impl Into<DateInput>,
        base: &str,
        symbols: impl Into<Symbols>,
        amount: Option<f64>,
    ) -> Result<RateResponse> {
        let mut query = RateQuery::latest(base, symbols).on(on_date);
        query.amount = amount;
        self.query(&query).await
    }

    /// Runs `query` against `/latest` or `/{date}` depending on its date.
    #[instrument(name = "FxRates", skip(self), fields(base = %query.base))]
    pub async fn query(&self, query: &RateQuery) -> Result<RateResponse> {
        let params = query.params()?;
        let path = query.path()?;
        let value = self.client.get(&path, &params, None).await?;
        let response = RateResponse::from_json(value, &path)?;
        debug!(date = %response.date, rates = response.rates.len(), "Resolved rates");
        Ok(response)
    }

    pub async fn get_latest_rate(&self, base: &str, target: &str) -> Result<f64> {
        check_pair(base, target)?;
        let response = self.latest(base, target, None).await?;
        pick_rate(&response, base, target)
    }

    pub async fn get_historical_rate(
        &self,
        on_date: impl Into<DateInput>,
        base: &str,
        target: &str,
    ) -> Result<f64> {
        check_pair(base, target)?;
        let response = self.historical(on_date, base, target, None).await?;
        pick_rate(&response, base, target)
    }
}

fn check_pair(base: &str, target: &str) -> Result<()> {
    if base.is_empty() || target.is_empty() {
        return Err(FxError::invalid("base and target are required"));
    }
    Ok(())
}

fn pick_rate(response: &RateResponse, base: &str, target: &str) -> Result<f64> {
    response.rate(target).ok_or_else(|| FxError::RateNotFound {
        base: base.to_string(),
        target: target.to_string(),
    })
}

#[async_trait]
impl<T: Transport> CurrencyRateProvider for RateResolver<T> {
    async fn currencies(&self) -> Result<CurrencyCatalog> {
        RateResolver::currencies(self).await
    }

    async fn get_latest_rate(&self, base: &str, target: &str) -> Result<f64> {
        RateResolver::get_latest_rate(self, base, target).await
    }

    async fn get_historical_rate(
        &self,
        on_date: &DateInput,
        base: &str,
        target: &str,
    ) -> Result<f64> {
        RateResolver::get_historical_rate(self, on_date.clone(), base, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::retry::RetryPolicy;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(server: &MockServer) -> RateResolver {
        let client = HttpClient::new(&server.uri())
            .unwrap()
            .with_policy(RetryPolicy::without_backoff());
        RateResolver::new(client)
    }

    fn rates_body(date: &str, rates: serde_json::Value) -> serde_json::Value {
        json!({"amount": 1.0, "base": "AUD", "date": date, "rates": rates})
    }

    #[tokio::test]
    async fn test_currencies_are_returned_unsorted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/currencies"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"USD": "United States Dollar", "AUD": "Australian Dollar", "EUR": "Euro"}"#,
            ))
            .mount(&mock_server)
            .await;

        let catalog = resolver(&mock_server).currencies().await.unwrap();
        assert_eq!(catalog.codes().collect::<Vec<_>>(), vec!["USD", "AUD", "EUR"]);
        assert_eq!(catalog.name("EUR"), Some("Euro"));
    }

    #[tokio::test]
    async fn test_latest_without_amount() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", "AUD"))
            .and(query_param("to", "USD,EUR"))
            .and(query_param_is_missing("amount"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(rates_body("2024-08-30", json!({"USD": 0.6766, "EUR": 0.6118}))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = resolver(&mock_server)
            .latest("AUD", ["USD", "EUR"], None)
            .await
            .unwrap();

        assert_eq!(response.base, "AUD");
        assert_eq!(response.rate("EUR"), Some(0.6118));
    }

    #[tokio::test]
    async fn test_latest_with_amount() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("amount", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "amount": 50.0, "base": "AUD", "date": "2024-08-30", "rates": {"USD": 33.83}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = resolver(&mock_server)
            .latest("AUD", "USD", Some(50.0))
            .await
            .unwrap();
        assert_eq!(response.amount, 50.0);
        assert_eq!(response.rate("USD"), Some(33.83));
    }

    #[tokio::test]
    async fn test_symbols_keep_order_and_duplicates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("to", "USD,EUR,USD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(rates_body("2024-08-30", json!({"USD": 0.6766, "EUR": 0.6118}))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        resolver(&mock_server)
            .latest("AUD", vec!["USD", "EUR", "USD"], None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_historical_date_shapes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-09-01"))
            .and(query_param("from", "AUD"))
            .and(query_param("to", "USD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(rates_body("2024-08-30", json!({"USD": 0.6766}))),
            )
            .expect(3)
            .mount(&mock_server)
            .await;

        let resolver = resolver(&mock_server);
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let from_text = resolver
            .get_historical_rate("2024-09-01T10:00:00", "AUD", "USD")
            .await
            .unwrap();
        let from_date = resolver.get_historical_rate(date, "AUD", "USD").await.unwrap();
        let from_datetime = resolver
            .get_historical_rate(date.and_hms_opt(18, 30, 0).unwrap(), "AUD", "USD")
            .await
            .unwrap();

        assert_eq!(from_text, 0.6766);
        assert_eq!(from_date, 0.6766);
        assert_eq!(from_datetime, 0.6766);
    }

    #[tokio::test]
    async fn test_missing_target_is_rate_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("to", "ZZZ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rates_body("2024-08-30", json!({}))))
            .mount(&mock_server)
            .await;

        let err = resolver(&mock_server)
            .get_latest_rate("AUD", "ZZZ")
            .await
            .unwrap_err();

        match err {
            FxError::RateNotFound { base, target } => {
                assert_eq!(base, "AUD");
                assert_eq!(target, "ZZZ");
            }
            other => panic!("expected RateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_arguments_make_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let resolver = resolver(&mock_server);
        for result in [
            resolver.get_latest_rate("", "USD").await,
            resolver.get_latest_rate("AUD", "").await,
            resolver.get_historical_rate("2024-09-01", "", "USD").await,
        ] {
            assert!(matches!(result, Err(FxError::InvalidArgument(_))));
        }
        assert!(matches!(
            resolver.latest("", "USD", None).await,
            Err(FxError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolver.historical("2024-09-01", "", "USD", None).await,
            Err(FxError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_trait_delegates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-09-01"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(rates_body("2024-08-30", json!({"USD": 0.6766}))),
            )
            .mount(&mock_server)
            .await;

        let provider: Box<dyn CurrencyRateProvider> = Box::new(resolver(&mock_server));
        let rate = provider
            .get_historical_rate(&DateInput::from("2024-09-01"), "AUD", "USD")
            .await
            .unwrap();
        assert_eq!(rate, 0.6766);
    }
}
