//! Color theme selection and the root context it is applied to.
//!
//! Exactly one visual theme is active at a time. Indigo is the base palette
//! and carries no marker class; emerald and rose each map to one class on the
//! root presentation context. Front ends implement [`ThemeRoot`] to mirror the
//! active theme wherever they render.

use std::fmt;
use std::str::FromStr;

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

/// Available color themes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Indigo,
    Emerald,
    Rose,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Indigo, Theme::Emerald, Theme::Rose];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indigo => "indigo",
            Self::Emerald => "emerald",
            Self::Rose => "rose",
        }
    }

    /// Marker class applied to the root context, `None` for the base palette.
    #[must_use]
    pub fn root_class(self) -> Option<&'static str> {
        match self {
            Self::Indigo => None,
            Self::Emerald => Some("theme-emerald"),
            Self::Rose => Some("theme-rose"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme '{0}' (expected indigo, emerald or rose)")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// Presentation context that reflects the active theme.
pub trait ThemeRoot {
    /// Replace whatever theme was applied before with `theme`.
    fn apply(&mut self, theme: Theme);
}

/// Owned root context holding the single active visual theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RootContext {
    theme: Theme,
}

impl RootContext {
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The marker class currently on the root, if any.
    #[must_use]
    pub fn class(&self) -> Option<&'static str> {
        self.theme.root_class()
    }
}

impl ThemeRoot for RootContext {
    fn apply(&mut self, theme: Theme) {
        self.theme = theme;
    }
}
