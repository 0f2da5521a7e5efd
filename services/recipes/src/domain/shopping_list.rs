//! Shopping-list aggregation over the ingredient rows of a user's cart.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::domain::types::{CartLine, ShoppingListItem};

pub const TITLE: &str = "Shopping list";
pub const EMPTY_NOTICE: &str = "Your shopping cart is empty.";

/// Sum amounts per ingredient and order the result by ingredient name.
///
/// Ingredients are keyed by id, so two ingredients sharing a name but not a
/// unit stay separate lines.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut by_id: HashMap<i32, ShoppingListItem> = HashMap::new();
    for line in lines {
        by_id
            .entry(line.ingredient_id)
            .and_modify(|item| item.amount += i64::from(line.amount))
            .or_insert_with(|| ShoppingListItem {
                ingredient_id: line.ingredient_id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: i64::from(line.amount),
            });
    }
    let mut items: Vec<_> = by_id.into_values().collect();
    items.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
            .then_with(|| a.ingredient_id.cmp(&b.ingredient_id))
    });
    items
}

/// Render the plain-text download body.
pub fn render(items: &[ShoppingListItem]) -> String {
    let mut out = format!("{TITLE}\n\n");
    if items.is_empty() {
        out.push_str(EMPTY_NOTICE);
        out.push('\n');
        return out;
    }
    for (n, item) in items.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{}. {} ({}) - {}",
            n + 1,
            item.name,
            item.measurement_unit,
            item.amount
        );
    }
    out
}
