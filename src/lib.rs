pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{CurrencyCatalog, DateInput, RateQuery};
use crate::providers::caching::CachingCatalogProvider;
use crate::providers::{HttpClient, RateResolver};
use anyhow::Result;
use tracing::{debug, info};

/// Arguments of the `convert` command; unset values come from the config.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub amount: Option<f64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    /// Use the configured default date when `date` is not given.
    pub historical: bool,
}

#[derive(Debug, Clone)]
pub struct RatesArgs {
    pub from: String,
    pub to: String,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Currencies,
    Convert(ConvertArgs),
    Rates(RatesArgs),
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

fn build_resolver(config: &AppConfig) -> Result<RateResolver> {
    let frankfurter = &config.providers.frankfurter;
    let timeout = frankfurter.timeout()?;
    let client =
        HttpClient::new_with_connect_timeout(&frankfurter.base_url, timeout)?.with_timeout(timeout)?;
    Ok(RateResolver::new(client))
}

fn with_catalog_cache(
    config: &AppConfig,
    resolver: RateResolver,
) -> Result<CachingCatalogProvider<RateResolver>> {
    let ttl = config.cache.catalog_ttl()?;
    let data_path = config.default_data_path().ok();
    let cache = store::open_collection::<String, CurrencyCatalog>(data_path.as_deref(), "catalog");
    Ok(CachingCatalogProvider::new(resolver, cache, ttl))
}

fn convert_request(config: &AppConfig, args: ConvertArgs) -> Result<cli::convert::ConvertRequest> {
    let defaults = &config.defaults;
    let date = match (args.date, args.historical) {
        (Some(date), _) => Some(DateInput::from(date)),
        (None, true) => Some(defaults.date()?),
        (None, false) => None,
    };
    Ok(cli::convert::ConvertRequest {
        amount: args.amount.unwrap_or(defaults.amount),
        from: args.from.unwrap_or_else(|| defaults.from.clone()).to_uppercase(),
        to: args.to.unwrap_or_else(|| defaults.to.clone()).to_uppercase(),
        date,
    })
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fx-converter starting...");

    let config = load_config(config_path)?;
    let resolver = build_resolver(&config)?;

    match command {
        AppCommand::Currencies => {
            let provider = with_catalog_cache(&config, resolver)?;
            cli::currencies::run(&provider).await
        }
        AppCommand::Convert(args) => {
            let request = convert_request(&config, args)?;
            let provider = with_catalog_cache(&config, resolver)?;
            cli::convert::run(&provider, request).await
        }
        AppCommand::Rates(args) => {
            let mut query = RateQuery::latest(&args.from.to_uppercase(), args.to.to_uppercase());
            query.amount = args.amount;
            query.date = args.date.map(DateInput::from);
            cli::rates::run(&resolver, query).await
        }
    }
}
