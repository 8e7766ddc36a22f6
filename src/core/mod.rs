//! Core types shared by the client, the stores and the CLI

pub mod cache;
pub mod config;
pub mod currency;
pub mod date;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use currency::{
    Currency, CurrencyCatalog, CurrencyCode, CurrencyRateProvider, RateQuery, RateResponse,
    Symbols,
};
pub use date::DateInput;
pub use error::{FxError, Result};
