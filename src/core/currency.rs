//! Currency conversion abstractions

use crate::core::date::DateInput;
use crate::core::error::{FxError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Three letter currency code, e.g. `USD`. Validated only by the service.
pub type CurrencyCode = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: CurrencyCode,
    pub name: String,
}

/// Currency codes and display names, in the order the service listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyCatalog {
    currencies: Vec<Currency>,
}

impl CurrencyCatalog {
    pub fn new(currencies: Vec<Currency>) -> Self {
        Self { currencies }
    }

    /// Reads a `{code: name}` JSON object without reordering it.
    pub fn from_json(value: Value, path: &str) -> Result<Self> {
        let map: serde_json::Map<String, Value> =
            serde_json::from_value(value).map_err(|source| FxError::Decode {
                path: path.to_string(),
                source,
            })?;

        let mut currencies = Vec::with_capacity(map.len());
        for (code, name) in map {
            let name: String = serde_json::from_value(name).map_err(|source| FxError::Decode {
                path: path.to_string(),
                source,
            })?;
            currencies.push(Currency { code, name });
        }
        Ok(Self { currencies })
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.currencies
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.name.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.name(code).is_some()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.currencies.iter().map(|c| c.code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.iter()
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

/// Target currencies for a rate request.
///
/// A joined string is sent as-is. A list is joined with commas, keeping order
/// and duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbols {
    Joined(String),
    List(Vec<CurrencyCode>),
}

impl Symbols {
    pub fn joined(&self) -> String {
        match self {
            Symbols::Joined(s) => s.clone(),
            Symbols::List(codes) => codes.join(","),
        }
    }
}

impl From<&str> for Symbols {
    fn from(s: &str) -> Self {
        Symbols::Joined(s.to_string())
    }
}

impl From<String> for Symbols {
    fn from(s: String) -> Self {
        Symbols::Joined(s)
    }
}

impl From<&String> for Symbols {
    fn from(s: &String) -> Self {
        Symbols::Joined(s.clone())
    }
}

impl From<Vec<String>> for Symbols {
    fn from(codes: Vec<String>) -> Self {
        Symbols::List(codes)
    }
}

impl From<Vec<&str>> for Symbols {
    fn from(codes: Vec<&str>) -> Self {
        Symbols::List(codes.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Symbols {
    fn from(codes: &[&str]) -> Self {
        Symbols::List(codes.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Symbols {
    fn from(codes: [&str; N]) -> Self {
        Symbols::List(codes.iter().map(|c| c.to_string()).collect())
    }
}

/// A single rates request. `date: None` asks for the latest rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuery {
    pub base: CurrencyCode,
    pub targets: Symbols,
    pub amount: Option<f64>,
    pub date: Option<DateInput>,
}

impl RateQuery {
    pub fn latest(base: &str, targets: impl Into<Symbols>) -> Self {
        Self {
            base: base.to_string(),
            targets: targets.into(),
            amount: None,
            date: None,
        }
    }

    pub fn on(mut self, date: impl Into<DateInput>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Request path for this query: `/latest` or `/{YYYY-MM-DD}`.
    pub fn path(&self) -> Result<String> {
        match &self.date {
            None => Ok("/latest".to_string()),
            Some(date) => {
                let day = date.to_iso();
                if day.is_empty() {
                    return Err(FxError::invalid("date is required"));
                }
                Ok(format!("/{day}"))
            }
        }
    }

    /// Query string parameters. `amount` is only sent when set.
    pub fn params(&self) -> Result<Vec<(&'static str, String)>> {
        if self.base.is_empty() {
            return Err(FxError::invalid("base is required"));
        }

        let mut params = vec![("from", self.base.clone()), ("to", self.targets.joined())];
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(FxError::invalid(format!(
                    "amount must be a positive number, got {amount}"
                )));
            }
            params.push(("amount", amount.to_string()));
        }
        Ok(params)
    }
}

/// Rates for one base currency on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateResponse {
    pub amount: f64,
    pub base: CurrencyCode,
    pub date: NaiveDate,
    pub rates: HashMap<CurrencyCode, f64>,
}

impl RateResponse {
    pub fn from_json(value: Value, path: &str) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| FxError::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub fn rate(&self, target: &str) -> Option<f64> {
        self.rates.get(target).copied()
    }
}

/// Exchange rate lookups used by the presentation layer.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn currencies(&self) -> Result<CurrencyCatalog>;

    async fn get_latest_rate(&self, base: &str, target: &str) -> Result<f64>;

    async fn get_historical_rate(&self, on_date: &DateInput, base: &str, target: &str)
    -> Result<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symbols_joining() {
        assert_eq!(Symbols::from("USD,EUR").joined(), "USD,EUR");
        assert_eq!(Symbols::from(["USD", "EUR", "USD"]).joined(), "USD,EUR,USD");
        assert_eq!(
            Symbols::from(vec!["GBP".to_string(), "JPY".to_string()]).joined(),
            "GBP,JPY"
        );
    }

    #[test]
    fn test_query_params() {
        let query = RateQuery::latest("AUD", ["USD", "EUR"]);
        assert_eq!(query.path().unwrap(), "/latest");
        assert_eq!(
            query.params().unwrap(),
            vec![("from", "AUD".to_string()), ("to", "USD,EUR".to_string())]
        );

        let query = RateQuery::latest("AUD", "USD")
            .with_amount(12.5)
            .on("2024-09-01T10:00:00");
        assert_eq!(query.path().unwrap(), "/2024-09-01");
        assert_eq!(query.params().unwrap()[2], ("amount", "12.5".to_string()));
    }

    #[test]
    fn test_query_validation() {
        let err = RateQuery::latest("", "USD").params().unwrap_err();
        assert!(matches!(err, FxError::InvalidArgument(_)));

        for amount in [0.0, -1.0, f64::NAN] {
            let err = RateQuery::latest("AUD", "USD")
                .with_amount(amount)
                .params()
                .unwrap_err();
            assert!(matches!(err, FxError::InvalidArgument(_)));
        }

        let err = RateQuery::latest("AUD", "USD").on("").path().unwrap_err();
        assert!(matches!(err, FxError::InvalidArgument(_)));
    }

    #[test]
    fn test_catalog_keeps_server_order() {
        let value = json!({"USD": "United States Dollar", "AUD": "Australian Dollar"});
        let catalog = CurrencyCatalog::from_json(value, "/currencies").unwrap();

        assert_eq!(catalog.codes().collect::<Vec<_>>(), vec!["USD", "AUD"]);
        assert_eq!(catalog.name("AUD"), Some("Australian Dollar"));
        assert!(!catalog.contains("ZZZ"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_catalog_rejects_non_string_names() {
        let err = CurrencyCatalog::from_json(json!({"USD": 1}), "/currencies").unwrap_err();
        assert!(matches!(err, FxError::Decode { .. }));
    }

    #[test]
    fn test_rate_response_parsing() {
        let value = json!({
            "amount": 1.0,
            "base": "AUD",
            "date": "2024-08-30",
            "rates": {"USD": 0.67659}
        });
        let response = RateResponse::from_json(value, "/latest").unwrap();
        assert_eq!(response.base, "AUD");
        assert_eq!(response.date, NaiveDate::from_ymd_opt(2024, 8, 30).unwrap());
        assert_eq!(response.rate("USD"), Some(0.67659));
        assert_eq!(response.rate("ZZZ"), None);

        let err = RateResponse::from_json(json!({"message": "not found"}), "/latest").unwrap_err();
        assert!(matches!(err, FxError::Decode { .. }));
    }
}
