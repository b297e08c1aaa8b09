use super::ui;
use crate::core::currency::SUPPORTED_CURRENCIES;
use comfy_table::Cell;

const CODES_PER_ROW: usize = 10;

/// Prints the supported currency codes against the configured base currency.
pub fn run(base_currency: &str) {
    println!(
        "\nCurrencies charted against {}",
        ui::style_text(base_currency, ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    for chunk in SUPPORTED_CURRENCIES.chunks(CODES_PER_ROW) {
        table.add_row(
            chunk
                .iter()
                .map(|code| Cell::new(*code))
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!("{} currencies", SUPPORTED_CURRENCIES.len()),
            ui::StyleType::Subtle
        )
    );
}
