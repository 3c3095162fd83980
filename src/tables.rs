use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{MonthlySavings, Overview, SavingsSummary},
    dashboard::PriceChart,
    fmt::{energy, kroner, rate},
    quantity::{Zero, cost::Cost, energy::KilowattHours},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn savings_cell(savings: Cost) -> Cell {
    Cell::new(kroner(savings))
        .set_alignment(CellAlignment::Right)
        .fg(if savings.round() < Cost::ZERO { Color::Red } else { Color::Green })
}

#[must_use]
pub fn build_prices_table(chart: &PriceChart) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Dag", "Time", "Spotpris"]);
    for point in &chart.points {
        let price_cell = Cell::new(rate(point.price)).set_alignment(CellAlignment::Right).fg(
            if point.price > chart.reference_rate { Color::Red } else { Color::Green },
        );
        table.add_row(vec![
            Cell::new(point.day).add_attribute(Attribute::Dim),
            if point.is_current {
                Cell::new(&point.label).add_attribute(Attribute::Bold)
            } else {
                Cell::new(&point.label)
            },
            price_cell,
        ]);
    }
    table
}

#[must_use]
pub fn build_overview_table(cost: &Overview<Cost>, consumption: &Overview<KilowattHours>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Kostnad", "Forbruk"]);
    for (title, cost, consumption) in [
        ("I dag", cost.today, consumption.today),
        ("Hittil i måneden", cost.this_month, consumption.this_month),
        ("Prognose måned", cost.forecast, consumption.forecast),
    ] {
        table.add_row(vec![
            Cell::new(title),
            Cell::new(kroner(cost)).set_alignment(CellAlignment::Right),
            Cell::new(energy(consumption)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Savings against the reference rate, with `anchor` being the «since» label.
#[must_use]
pub fn build_savings_table(savings: &SavingsSummary, anchor: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Besparelse", ""]);
    for (title, amount) in [
        ("I dag".to_owned(), savings.today),
        ("Denne måneden".to_owned(), savings.this_month),
        ("Forrige måned".to_owned(), savings.last_month),
        (format!("Siden {anchor}"), savings.since_anchor),
    ] {
        table.add_row(vec![Cell::new(title), savings_cell(amount)]);
    }
    table
}

#[must_use]
pub fn build_monthly_savings_table(monthly_savings: &[MonthlySavings]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Måned", "Besparelse"]);
    for savings in monthly_savings {
        table.add_row(vec![Cell::new(&savings.month), savings_cell(savings.amount)]);
    }
    let total = monthly_savings.iter().map(|savings| savings.amount).sum();
    table.add_row(vec![Cell::new("Totalt").add_attribute(Attribute::Bold), savings_cell(total)]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_monthly_savings_table() {
        let table = build_monthly_savings_table(&[
            MonthlySavings { month: "Oktober 2025".to_owned(), amount: Cost::from(5.0) },
            MonthlySavings { month: "November 2025".to_owned(), amount: Cost::from(-2.5) },
        ]);
        assert_eq!(table.row_count(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("Oktober 2025"));
        assert!(rendered.contains("Totalt"));
    }

    #[test]
    fn test_build_savings_table() {
        let savings = SavingsSummary {
            today: Cost::from(1.0),
            this_month: Cost::from(2.0),
            last_month: Cost::from(3.0),
            since_anchor: Cost::from(4.0),
        };
        let table = build_savings_table(&savings, "1. oktober");
        assert_eq!(table.row_count(), 4);
        assert!(table.to_string().contains("Siden 1. oktober"));
    }
}
