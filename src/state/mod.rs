//! Client-owned state: the shopping list, settings and derived summaries.
//!
//! DESIGN
//! ======
//! Managers own their data and a store handle injected at construction.
//! Reads are plain borrows; writes mirror to the store as a side effect.

pub mod list;
pub mod settings;
pub mod summary;
pub mod theme;

pub use list::{DraftItem, ItemPatch, PricePatch, ShoppingList, ShoppingListItem};
pub use settings::{AppSettings, SettingsManager};
pub use summary::{ListSummary, format_currency};
pub use theme::{RootContext, Theme, ThemeRoot};
