use super::ui;
use crate::core::{Currency, CurrencyRateProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Catalog entries ordered by code for display.
pub fn sorted(currencies: impl Iterator<Item = Currency>) -> Vec<Currency> {
    let mut currencies: Vec<Currency> = currencies.collect();
    currencies.sort_by(|a, b| a.code.cmp(&b.code));
    currencies
}

pub async fn run(provider: &(dyn CurrencyRateProvider + Send + Sync)) -> Result<()> {
    let pb = ui::new_spinner("Fetching currencies");
    let result = provider.currencies().await;
    pb.finish_and_clear();

    let catalog = result.context("Failed to load currencies")?;
    if catalog.is_empty() {
        println!("{}", ui::style_text("No currencies available.", ui::StyleType::Error));
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);
    for currency in sorted(catalog.iter().cloned()) {
        table.add_row(vec![Cell::new(&currency.code), Cell::new(&currency.name)]);
    }

    println!(
        "\n{}",
        ui::style_text(
            &format!("Currencies ({})", catalog.len()),
            ui::StyleType::Title
        )
    );
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_code() {
        let currencies = ["USD", "AUD", "EUR"].into_iter().map(|code| Currency {
            code: code.to_string(),
            name: String::new(),
        });

        let codes: Vec<String> = sorted(currencies).into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["AUD", "EUR", "USD"]);
    }
}
