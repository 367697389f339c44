//! Derived list metrics and currency display.
//!
//! Nothing here is stored; every value is recomputed from the item slice.

use super::list::ShoppingListItem;

#[cfg(test)]
#[path = "summary_test.rs"]
mod summary_test;

/// Progress and cost figures for a list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ListSummary {
    pub purchased: usize,
    pub total: usize,
    pub progress_percent: f64,
    pub total_cost: f64,
}

impl ListSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_items(items: &[ShoppingListItem]) -> Self {
        let total = items.len();
        let purchased = items.iter().filter(|item| item.purchased).count();
        let progress_percent = if total == 0 { 0.0 } else { 100.0 * purchased as f64 / total as f64 };
        let total_cost = items
            .iter()
            .filter(|item| item.purchased)
            .filter_map(|item| item.price)
            .sum();
        Self { purchased, total, progress_percent, total_cost }
    }

    /// `true` once a non-empty list has every item purchased.
    #[must_use]
    pub fn all_purchased(&self) -> bool {
        self.total > 0 && self.purchased == self.total
    }
}

// =============================================================================
// CURRENCY
// =============================================================================

/// A currency offered in the settings picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: usize,
}

pub const SUPPORTED_CURRENCIES: [Currency; 7] = [
    Currency { code: "USD", name: "US Dollar", symbol: "$", decimals: 2 },
    Currency { code: "EUR", name: "Euro", symbol: "€", decimals: 2 },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥", decimals: 0 },
    Currency { code: "GBP", name: "British Pound", symbol: "£", decimals: 2 },
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹", decimals: 2 },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "CA$", decimals: 2 },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$", decimals: 2 },
];

#[must_use]
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

/// Format `amount` for display in `code`, e.g. `$1,234.50` or `¥1,235`.
///
/// Well-formed codes outside the catalogue print as `XYZ 1.00`; anything
/// else falls back to dollars.
#[must_use]
pub fn format_currency(amount: f64, code: &str) -> String {
    let code = code.trim();
    if let Some(currency) = find_currency(code) {
        return format!("{}{}", currency.symbol, format_amount(amount, currency.decimals));
    }
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        return format!("{} {}", code.to_ascii_uppercase(), format_amount(amount, 2));
    }
    format!("${}", format_amount(amount, 2))
}

fn format_amount(amount: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') { "-" } else { "" };
    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
