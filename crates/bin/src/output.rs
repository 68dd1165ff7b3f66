//! Output formatting helpers for human-readable and JSON output.

use larder::{FridgeItem, GroceryItem};
use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    println!("{}", render_row(headers.iter().copied(), &widths));
    for row in rows {
        println!(
            "{}",
            render_row(row.iter().map(String::as_str).take(col_count), &widths)
        );
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .enumerate()
        .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Print any serializable value as a single JSON line.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn print_grocery(items: &[GroceryItem], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            if items.is_empty() {
                println!("The grocery list is empty.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|item| {
                    vec![
                        item.position.to_string(),
                        if item.active { "*" } else { "" }.to_string(),
                        item.item_id.to_string(),
                        item.name.clone(),
                        item.quantity.to_string(),
                        item.notes.clone(),
                    ]
                })
                .collect();
            print_table(&["#", "", "ID", "NAME", "QTY", "NOTES"], &rows);
            Ok(())
        }
        OutputFormat::Json => print_json(items),
    }
}

pub fn print_fridge(items: &[FridgeItem], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            if items.is_empty() {
                println!("The fridge is empty.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|item| {
                    vec![
                        item.item_id.to_string(),
                        item.name.clone(),
                        item.quantity.to_string(),
                        item.added.format("%Y-%m-%d %H:%M").to_string(),
                        item.notes.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "NAME", "QTY", "ADDED", "NOTES"], &rows);
            Ok(())
        }
        OutputFormat::Json => print_json(items),
    }
}
