use crate::core::cache::KeyValueCollection;
use crate::core::currency::{CurrencyCatalog, CurrencyRateProvider};
use crate::core::date::DateInput;
use crate::core::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CATALOG_KEY: &str = "currencies";

/// Caches the currency catalog of an inner provider for `ttl`.
///
/// Rate lookups always go to the inner provider. Failed or empty catalog
/// fetches are not stored.
pub struct CachingCatalogProvider<T: CurrencyRateProvider> {
    inner: T,
    cache: Arc<dyn KeyValueCollection<String, CurrencyCatalog>>,
    ttl: Duration,
}

impl<T: CurrencyRateProvider> CachingCatalogProvider<T> {
    pub fn new(
        inner: T,
        cache: Arc<dyn KeyValueCollection<String, CurrencyCatalog>>,
        ttl: Duration,
    ) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<T: CurrencyRateProvider> CurrencyRateProvider for CachingCatalogProvider<T> {
    async fn currencies(&self) -> Result<CurrencyCatalog> {
        let key = CATALOG_KEY.to_string();
        if let Some(catalog) = self.cache.get(&key).await {
            debug!("Cache hit for currency catalog");
            return Ok(catalog);
        }
        debug!("Cache miss for currency catalog");
        let catalog = self.inner.currencies().await?;
        if !catalog.is_empty() {
            self.cache.put(key, catalog.clone(), Some(self.ttl)).await;
        }
        Ok(catalog)
    }

    async fn get_latest_rate(&self, base: &str, target: &str) -> Result<f64> {
        self.inner.get_latest_rate(base, target).await
    }

    async fn get_historical_rate(
        &self,
        on_date: &DateInput,
        base: &str,
        target: &str,
    ) -> Result<f64> {
        self.inner.get_historical_rate(on_date, base, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use crate::core::error::FxError;
    use crate::store::memory::MemoryCollection;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockInnerProvider {
        catalog_calls: AtomicUsize,
        rate_calls: AtomicUsize,
        catalog: CurrencyCatalog,
        fail: bool,
    }

    impl MockInnerProvider {
        fn new(catalog: CurrencyCatalog) -> Self {
            Self {
                catalog_calls: AtomicUsize::new(0),
                rate_calls: AtomicUsize::new(0),
                catalog,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(CurrencyCatalog::default())
            }
        }
    }

    #[async_trait]
    impl<'a> CurrencyRateProvider for &'a MockInnerProvider {
        async fn currencies(&self) -> Result<CurrencyCatalog> {
            self.catalog_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FxError::HttpStatus {
                    status: 500,
                    path: "/currencies".to_string(),
                });
            }
            Ok(self.catalog.clone())
        }

        async fn get_latest_rate(&self, _base: &str, _target: &str) -> Result<f64> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.5)
        }

        async fn get_historical_rate(
            &self,
            _on_date: &DateInput,
            _base: &str,
            _target: &str,
        ) -> Result<f64> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.25)
        }
    }

    fn catalog() -> CurrencyCatalog {
        CurrencyCatalog::new(vec![Currency {
            code: "USD".to_string(),
            name: "United States Dollar".to_string(),
        }])
    }

    fn memory() -> Arc<dyn KeyValueCollection<String, CurrencyCatalog>> {
        Arc::new(MemoryCollection::new())
    }

    #[tokio::test]
    async fn test_catalog_is_cached() {
        let inner = MockInnerProvider::new(catalog());
        let provider = CachingCatalogProvider::new(&inner, memory(), Duration::from_secs(60));

        // First call - should hit inner provider
        assert_eq!(provider.currencies().await.unwrap(), catalog());
        assert_eq!(inner.catalog_calls.load(Ordering::SeqCst), 1);

        // Second call - should be cached
        assert_eq!(provider.currencies().await.unwrap(), catalog());
        assert_eq!(inner.catalog_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_catalog_expires() {
        let inner = MockInnerProvider::new(catalog());
        let provider = CachingCatalogProvider::new(&inner, memory(), Duration::from_millis(10));

        provider.currencies().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        provider.currencies().await.unwrap();

        assert_eq!(inner.catalog_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_and_empty_catalogs_are_not_cached() {
        let inner = MockInnerProvider::failing();
        let provider = CachingCatalogProvider::new(&inner, memory(), Duration::from_secs(60));
        assert!(provider.currencies().await.is_err());
        assert!(provider.currencies().await.is_err());
        assert_eq!(inner.catalog_calls.load(Ordering::SeqCst), 2);

        let inner = MockInnerProvider::new(CurrencyCatalog::default());
        let provider = CachingCatalogProvider::new(&inner, memory(), Duration::from_secs(60));
        provider.currencies().await.unwrap();
        provider.currencies().await.unwrap();
        assert_eq!(inner.catalog_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rates_are_not_cached() {
        let inner = MockInnerProvider::new(catalog());
        let provider = CachingCatalogProvider::new(&inner, memory(), Duration::from_secs(60));

        provider.get_latest_rate("AUD", "USD").await.unwrap();
        provider.get_latest_rate("AUD", "USD").await.unwrap();
        let date = DateInput::from("2024-09-01");
        assert_eq!(
            provider.get_historical_rate(&date, "AUD", "USD").await.unwrap(),
            0.25
        );

        assert_eq!(inner.rate_calls.load(Ordering::SeqCst), 3);
    }
}
