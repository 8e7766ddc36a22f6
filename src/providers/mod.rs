pub mod caching;
pub mod client;
pub mod frankfurter;
pub mod retry;
pub mod transport;

pub use client::HttpClient;
pub use frankfurter::RateResolver;
pub use retry::RetryPolicy;
