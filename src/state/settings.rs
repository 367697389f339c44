//! App settings: theme, shopping date and display currency.
//!
//! DESIGN
//! ======
//! [`SettingsManager`] is the only writer. On load the stored document is
//! shallow-merged onto [`AppSettings::default`] one field at a time, so an
//! older or partially corrupt document still yields a fully populated value.
//! Every change is mirrored to the store and the theme root.

use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;
use tracing::{info, warn};

use super::theme::{Theme, ThemeRoot};
use crate::store::{self, APP_SETTINGS_KEY, KeyValueStore};

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Persisted user preferences.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,
    pub shopping_date: Option<String>,
    pub currency: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self { theme: Theme::Indigo, shopping_date: None, currency: DEFAULT_CURRENCY.to_string() }
    }
}

impl AppSettings {
    /// Overlay the keys present in `stored` onto `self`.
    ///
    /// Keys that are absent keep their current value. Keys whose value has
    /// the wrong type are logged and skipped.
    #[must_use]
    pub fn merged_with(mut self, stored: &Map<String, Value>) -> Self {
        if let Some(raw) = stored.get("theme") {
            match serde_json::from_value::<Theme>(raw.clone()) {
                Ok(theme) => self.theme = theme,
                Err(e) => warn!(error = %e, "settings: ignoring stored theme"),
            }
        }
        if let Some(raw) = stored.get("shoppingDate") {
            match raw {
                Value::Null => self.shopping_date = None,
                Value::String(s) => self.shopping_date = Some(s.clone()),
                other => warn!(value = %other, "settings: ignoring stored shoppingDate"),
            }
        }
        if let Some(raw) = stored.get("currency") {
            match raw.as_str().map(str::trim) {
                Some(code) if !code.is_empty() => self.currency = code.to_string(),
                _ => warn!(value = %raw, "settings: ignoring stored currency"),
            }
        }
        self
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Owns the current [`AppSettings`] and mirrors changes outward.
pub struct SettingsManager<S, R> {
    settings: AppSettings,
    store: S,
    root: R,
}

impl<S: KeyValueStore, R: ThemeRoot> SettingsManager<S, R> {
    /// Read stored settings, fill gaps from defaults and apply the theme.
    ///
    /// Never fails: unreadable or non-object documents fall back to defaults.
    pub fn load(store: S, root: R) -> Self {
        let settings = match store::load_json::<Value>(&store, APP_SETTINGS_KEY) {
            Some(Value::Object(stored)) => AppSettings::default().merged_with(&stored),
            Some(other) => {
                warn!(kind = json_kind(&other), "settings: stored value is not an object; using defaults");
                AppSettings::default()
            }
            None => AppSettings::default(),
        };
        info!(theme = %settings.theme, currency = %settings.currency, "settings: loaded");

        let mut manager = Self { settings, store, root };
        manager.sync();
        manager
    }

    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    #[must_use]
    pub fn shopping_date(&self) -> Option<&str> {
        self.settings.shopping_date.as_deref()
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    #[must_use]
    pub fn root(&self) -> &R {
        &self.root
    }

    pub fn set_theme(&mut self, theme: Theme) {
        let next = AppSettings { theme, ..self.settings.clone() };
        self.commit(next);
    }

    pub fn set_shopping_date(&mut self, date: Option<String>) {
        let next = AppSettings { shopping_date: date, ..self.settings.clone() };
        self.commit(next);
    }

    /// Set the display currency. Codes are uppercased; a blank code is ignored.
    pub fn set_currency(&mut self, currency: &str) {
        let code = currency.trim().to_ascii_uppercase();
        if code.is_empty() {
            return;
        }
        let next = AppSettings { currency: code, ..self.settings.clone() };
        self.commit(next);
    }

    fn commit(&mut self, next: AppSettings) {
        self.settings = next;
        self.sync();
    }

    fn sync(&mut self) {
        store::save_json(&self.store, APP_SETTINGS_KEY, &self.settings);
        self.root.apply(self.settings.theme);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// SHOPPING DATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid shopping date '{0}' (expected YYYY-MM-DD)")]
pub struct InvalidDate(pub String);

/// Validate a `YYYY-MM-DD` calendar date and return it in canonical form.
///
/// # Errors
///
/// Returns [`InvalidDate`] when the input is not a real calendar date.
pub fn parse_shopping_date(raw: &str) -> Result<String, InvalidDate> {
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(raw.trim(), format).map_err(|_| InvalidDate(raw.to_string()))?;
    date.format(format).map_err(|_| InvalidDate(raw.to_string()))
}
