//! Table output for tabs, items and settings.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rst_client::ClientSettings;
use rst_filter::Item;
use rst_sync::{Parameters, TabCoordinator};

/// Placeholder for a characteristic an item does not have.
const MISSING: &str = "-";

pub fn print_tab(tab: &TabCoordinator) {
    let project = tab
        .project()
        .map_or_else(|| MISSING.to_string(), |p| p.result_id.to_string());
    println!("{} - project {project}", tab.kind().label());
    if tab.is_outdated() {
        println!("Computed on outdated data; recompute to refresh.");
    }
    if !tab.filter_text().trim().is_empty() {
        println!("Filter: {}", tab.filter_text().trim());
    }

    let shown: Vec<&Item> = tab.displayed().collect();
    print_items(&shown, tab.items().len());
}

pub fn print_items(shown: &[&Item], total: usize) {
    if !shown.is_empty() {
        println!("{}", item_table(shown));
    }
    println!("{} of {total} shown", shown.len());
}

pub fn print_parameters(parameters: &Parameters) {
    let mut table = styled_table();
    table.set_header(vec![header_cell("Parameter"), header_cell("Value")]);
    for (key, value) in parameters {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    println!("{table}");
}

pub fn print_settings(settings: &ClientSettings, path: &Path) {
    println!("Settings file: {}", path.display());
    let mut table = styled_table();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    table.add_row(vec![Cell::new("server_base"), Cell::new(&settings.server_base)]);
    table.add_row(vec![
        Cell::new("request_timeout_secs"),
        Cell::new(settings.request_timeout_secs),
    ]);
    table.add_row(vec![
        Cell::new("default_filter"),
        Cell::new(&settings.default_filter),
    ]);
    println!("{table}");
}

/// Column names and row values for `items`.
///
/// Columns are the union of the items' characteristics in first-seen order,
/// preceded by the item id.
pub fn item_rows(items: &[&Item]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut columns: Vec<&str> = Vec::new();
    for item in items {
        for name in item.characteristics.keys() {
            if !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
    }

    let rows = items
        .iter()
        .map(|item| {
            std::iter::once(item.id.to_string())
                .chain(columns.iter().map(|name| {
                    item.characteristics
                        .get(*name)
                        .map_or_else(|| MISSING.to_string(), ToString::to_string)
                }))
                .collect()
        })
        .collect();

    let header = std::iter::once("#".to_string())
        .chain(columns.iter().map(|name| (*name).to_string()))
        .collect();
    (header, rows)
}

fn item_table(items: &[&Item]) -> Table {
    let (header, rows) = item_rows(items);
    let mut table = styled_table();
    table.set_header(header.into_iter().map(header_cell).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row.into_iter().map(value_cell).collect::<Vec<_>>());
    }
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: impl Into<String>) -> Cell {
    Cell::new(text.into())
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(text: String) -> Cell {
    if text == MISSING {
        Cell::new(text).add_attribute(Attribute::Dim)
    } else {
        Cell::new(text)
    }
}
