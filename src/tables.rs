use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::price::{ForecastPrices, PriceRecord, Symbol};

pub fn build_forecast_table(forecast: &ForecastPrices) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["Period", "$/kWh", "Renewable", ""]);
    for record in forecast.list() {
        table.add_row(vec![
            Cell::new(
                record
                    .period
                    .map_or_else(|| "—".to_string(), |period| period.format("%b %d %H:%M").to_string()),
            )
            .add_attribute(Attribute::Dim),
            Cell::new(
                record.price_per_kwh.map_or_else(|| "—".to_string(), |price| format!("{price:.4}")),
            )
            .set_alignment(CellAlignment::Right)
            .fg(price_color(record)),
            Cell::new(
                record
                    .renewable_fraction
                    .map_or_else(|| "—".to_string(), |share| format!("{:.0}%", share * 100.0)),
            )
            .set_alignment(CellAlignment::Right),
            Cell::new(record.symbol),
        ]);
    }
    table
}

const fn price_color(record: &PriceRecord) -> Color {
    match record.symbol {
        Symbol::Red => Color::Red,
        Symbol::Yellow => Color::DarkYellow,
        Symbol::Green => Color::Green,
        Symbol::Unknown => Color::Grey,
    }
}
