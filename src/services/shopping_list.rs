use std::fmt::Write;

use crate::db::ShoppingListLine;

pub const SHOPPING_LIST_FILENAME: &str = "buylist.txt";

/// Renders the aggregated cart as a plain-text list, one line per
/// (ingredient, unit) group.
#[must_use]
pub fn render_shopping_list(lines: &[ShoppingListLine]) -> String {
    lines
        .iter()
        .fold(String::from("Shopping list:\n"), |mut acc, line| {
            let _ = writeln!(
                acc,
                "{} - {} {}",
                line.name, line.amount, line.measurement_unit
            );
            acc
        })
}
