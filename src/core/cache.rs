use async_trait::async_trait;
use std::time::Duration;

/// A key-value collection whose entries may expire.
///
/// Implementations never fail on read or write; a storage error is treated
/// as a miss so a broken cache only costs an extra request.
#[async_trait]
pub trait KeyValueCollection<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`. With `ttl: None`, or a `ttl` too far out to represent,
    /// the entry never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
}
