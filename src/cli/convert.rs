use super::ui;
use crate::core::{CurrencyCatalog, CurrencyRateProvider, DateInput};
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use comfy_table::Cell;
use tracing::debug;

/// One conversion as entered by the user.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
    /// `None` converts at the latest rate.
    pub date: Option<DateInput>,
}

/// Result of a conversion, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub date: String,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub amount: f64,
    pub converted: f64,
    pub inverse: f64,
}

impl Conversion {
    pub fn new(date: String, from: &str, to: &str, rate: f64, amount: f64) -> Self {
        Self {
            date,
            from: from.to_string(),
            to: to.to_string(),
            rate,
            amount,
            converted: amount * rate,
            inverse: 1.0 / rate,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "The conversion rate on {} from {} to {} was {}. So {} in {} correspond to {} in {}. The inverse rate was {}.",
            self.date,
            self.from,
            self.to,
            ui::format_rate(self.rate),
            ui::format_amount(self.amount),
            self.from,
            ui::format_amount(self.converted),
            self.to,
            ui::format_inverse(self.inverse),
        )
    }
}

fn validate(request: &ConvertRequest, catalog: &CurrencyCatalog, today: NaiveDate) -> Result<()> {
    if !request.amount.is_finite() || request.amount < 0.0 {
        bail!("Amount must be zero or more, got {}", request.amount);
    }
    for code in [&request.from, &request.to] {
        if !catalog.contains(code) {
            bail!("Unknown currency code: {code}");
        }
    }
    if let Some(date) = &request.date {
        // Text that is not a plain ISO date is left for the service to judge
        if let Ok(day) = NaiveDate::parse_from_str(&date.to_iso(), "%Y-%m-%d") {
            if day > today {
                bail!("Date {day} is in the future; the latest date allowed is {today}");
            }
        }
    }
    Ok(())
}

/// Resolves the rate for `request`. Identical currencies convert at 1.0
/// without asking the provider.
pub async fn convert(
    provider: &(dyn CurrencyRateProvider + Send + Sync),
    request: &ConvertRequest,
    today: NaiveDate,
) -> Result<Conversion> {
    let catalog = provider
        .currencies()
        .await
        .context("Failed to load currencies")?;
    validate(request, &catalog, today)?;

    let (date, rate) = match &request.date {
        _ if request.from == request.to => {
            debug!("Same currency on both sides, skipping lookup");
            let date = request.date.as_ref().map_or(today.to_string(), |d| d.to_iso());
            (date, 1.0)
        }
        None => {
            let rate = provider
                .get_latest_rate(&request.from, &request.to)
                .await
                .context("Failed to fetch latest rate")?;
            (today.to_string(), rate)
        }
        Some(date) => {
            let rate = provider
                .get_historical_rate(date, &request.from, &request.to)
                .await
                .context("Failed to fetch historical rate")?;
            (date.to_iso(), rate)
        }
    };

    Ok(Conversion::new(date, &request.from, &request.to, rate, request.amount))
}

fn display(conversion: &Conversion, historical: bool) {
    let title = if historical {
        "Conversion Rate"
    } else {
        "Latest Conversion Rate"
    };
    println!("\n{}", ui::style_text(title, ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(&format!("{} → {}", conversion.from, conversion.to)),
        ui::header_cell(&format!("Amount ({})", conversion.from)),
        ui::header_cell(&format!("Converted ({})", conversion.to)),
        ui::header_cell("Inverse"),
    ]);
    table.add_row(vec![
        Cell::new(&conversion.date),
        ui::number_cell(ui::format_rate(conversion.rate)),
        ui::number_cell(ui::format_amount(conversion.amount)),
        ui::highlight_cell(ui::format_amount(conversion.converted)),
        ui::number_cell(ui::format_inverse(conversion.inverse)),
    ]);
    println!("{table}");
    println!(
        "{}",
        ui::style_text(&conversion.summary(), ui::StyleType::Subtle)
    );
}

pub async fn run(
    provider: &(dyn CurrencyRateProvider + Send + Sync),
    request: ConvertRequest,
) -> Result<()> {
    let today = Local::now().date_naive();
    let pb = ui::new_spinner("Fetching rates");
    let result = convert(provider, &request, today).await;
    pb.finish_and_clear();

    let conversion = result?;
    display(&conversion, request.date.is_some());
    Ok(())
}
