//! Shopping list state: the ordered item collection and its mutations.
//!
//! DESIGN
//! ======
//! [`ShoppingList`] owns the items and the store handle they are mirrored to.
//! Every operation is synchronous and infallible from the caller's side:
//! invalid input (blank names, unknown ids, bad prices) is a silent no-op,
//! and a failed write is logged by the store helpers without rolling back.
//!
//! Newly added items go to the front. A bulk add keeps the batch's own
//! order at the front of the list.

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::summary::ListSummary;
use crate::store::{self, KeyValueStore, SHOPPING_LIST_KEY};

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;

pub const DEFAULT_QUANTITY: &str = "1";

fn default_quantity() -> String {
    DEFAULT_QUANTITY.to_string()
}

fn normalize_quantity(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() { default_quantity() } else { trimmed.to_string() }
}

/// A stored `null` or blank quantity reads as the default.
fn deserialize_quantity<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.as_deref().map_or_else(default_quantity, normalize_quantity))
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

// =============================================================================
// TYPES
// =============================================================================

/// One entry on the list.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub name: String,
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    pub quantity: String,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// An item proposal without id or purchase state, e.g. from recipe import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftItem {
    pub name: String,
    pub quantity: String,
}

impl DraftItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self { name: name.into(), quantity: quantity.into() }
    }
}

/// How an [`ItemPatch`] treats the price.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PricePatch {
    #[default]
    Keep,
    Clear,
    Set(f64),
}

/// Partial update merged into an existing item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub purchased: Option<bool>,
    pub price: PricePatch,
}

impl ItemPatch {
    /// Mark purchased at `price`.
    #[must_use]
    pub fn purchased_at(price: f64) -> Self {
        Self { purchased: Some(true), price: PricePatch::Set(price), ..Self::default() }
    }

    /// Mark not purchased and drop the price.
    #[must_use]
    pub fn unpurchased() -> Self {
        Self { purchased: Some(false), price: PricePatch::Clear, ..Self::default() }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    fn apply(&self, item: &mut ShoppingListItem) {
        if let Some(name) = &self.name {
            let name = name.trim();
            if !name.is_empty() {
                item.name = name.to_string();
            }
        }
        if let Some(quantity) = &self.quantity {
            item.quantity = normalize_quantity(quantity);
        }
        if let Some(purchased) = self.purchased {
            item.purchased = purchased;
        }
        match self.price {
            PricePatch::Keep => {}
            PricePatch::Clear => item.price = None,
            PricePatch::Set(price) if valid_price(price) => item.price = Some(price),
            PricePatch::Set(price) => debug!(price, id = %item.id, "list: ignoring invalid price"),
        }
        // A price only exists on purchased items.
        if !item.purchased {
            item.price = None;
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Owns the list items and mirrors every change to the store.
pub struct ShoppingList<S> {
    items: Vec<ShoppingListItem>,
    store: S,
}

impl<S: KeyValueStore> ShoppingList<S> {
    /// Load items from the store. Missing or unreadable data yields an empty
    /// list; entries that do not decode as items are dropped one by one.
    pub fn load(store: S) -> Self {
        let entries: Vec<Value> = store::load_json(&store, SHOPPING_LIST_KEY).unwrap_or_default();
        let items: Vec<ShoppingListItem> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "list: dropping unreadable item");
                    None
                }
            })
            .collect();
        info!(count = items.len(), "list: loaded");
        Self { items, store }
    }

    #[must_use]
    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ShoppingListItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> ListSummary {
        ListSummary::from_items(&self.items)
    }

    /// Prepend a new item. Returns its id, or `None` when `name` is blank.
    pub fn add_item(&mut self, name: &str, quantity: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let item = ShoppingListItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            quantity: normalize_quantity(quantity),
            purchased: false,
            price: None,
        };
        let id = item.id.clone();
        self.items.insert(0, item);
        self.persist();
        Some(id)
    }

    /// Prepend drafts as new unpurchased items, keeping their order.
    ///
    /// Drafts are taken as-is; filtering is the producer's job.
    pub fn add_multiple_items(&mut self, drafts: Vec<DraftItem>) -> usize {
        let added = drafts.len();
        let mut next: Vec<ShoppingListItem> = drafts
            .into_iter()
            .map(|draft| ShoppingListItem {
                id: Uuid::new_v4().to_string(),
                name: draft.name,
                quantity: draft.quantity,
                purchased: false,
                price: None,
            })
            .collect();
        next.append(&mut self.items);
        self.items = next;
        self.persist();
        added
    }

    /// Merge `patch` into the item with `id`. Returns whether it was found.
    pub fn update_item(&mut self, id: &str, patch: &ItemPatch) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        patch.apply(item);
        self.persist();
        true
    }

    /// Mark purchased at `price`. Negative or non-finite prices are rejected.
    pub fn mark_purchased(&mut self, id: &str, price: f64) -> bool {
        if !valid_price(price) {
            return false;
        }
        self.update_item(id, &ItemPatch::purchased_at(price))
    }

    pub fn unmark_purchased(&mut self, id: &str) -> bool {
        self.update_item(id, &ItemPatch::unpurchased())
    }

    /// Flip the purchase state: purchased items are unmarked, others are
    /// marked at `price`.
    pub fn toggle_item(&mut self, id: &str, price: f64) -> bool {
        match self.get(id).map(|item| item.purchased) {
            Some(true) => self.unmark_purchased(id),
            Some(false) => self.mark_purchased(id, price),
            None => false,
        }
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn clear_list(&mut self) {
        self.items.clear();
        self.persist();
    }

    fn persist(&self) {
        store::save_json(&self.store, SHOPPING_LIST_KEY, &self.items);
    }
}
