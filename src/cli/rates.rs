use super::ui;
use crate::core::{RateQuery, RateResponse};
use crate::providers::RateResolver;
use crate::providers::transport::Transport;
use anyhow::{Context, Result};
use comfy_table::Cell;

fn display(response: &RateResponse) {
    println!(
        "\n{}",
        ui::style_text(
            &format!(
                "{} {} on {}",
                ui::format_amount(response.amount),
                response.base,
                response.date
            ),
            ui::StyleType::Title
        )
    );

    let mut rates: Vec<(&String, &f64)> = response.rates.iter().collect();
    rates.sort_by(|a, b| a.0.cmp(b.0));

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Value")]);
    for (code, value) in rates {
        table.add_row(vec![Cell::new(code), ui::number_cell(ui::format_rate(*value))]);
    }
    println!("{table}");
}

pub async fn run<T: Transport>(resolver: &RateResolver<T>, query: RateQuery) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates");
    let result = resolver.query(&query).await;
    pb.finish_and_clear();

    let response = result.with_context(|| {
        format!(
            "Failed to fetch rates for {} to {}",
            query.base,
            query.targets.joined()
        )
    })?;
    if response.rates.is_empty() {
        println!(
            "{}",
            ui::style_text("No rates returned for the requested currencies.", ui::StyleType::Error)
        );
        return Ok(());
    }
    display(&response);
    Ok(())
}
