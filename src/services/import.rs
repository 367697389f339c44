//! Recipe import session: paste → extract → review → add.
//!
//! DESIGN
//! ======
//! The session is the consumer of an in-flight extraction. Each
//! `begin_extract` hands out a ticket stamped with the session generation;
//! closing or restarting bumps the generation, so a result that lands
//! afterwards is recognised as stale and discarded instead of applied.

use tracing::{debug, info};

use super::recipe::ExtractError;
use crate::error::ErrorCode;
use crate::state::list::{DraftItem, ShoppingList};
use crate::store::KeyValueStore;

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;

/// Where the session currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportPhase {
    Editing,
    Extracting,
    Review(Vec<DraftItem>),
    Failed(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("Please paste a recipe first.")]
    EmptyRecipe,
    #[error("the import session is closed")]
    Closed,
}

impl ErrorCode for ImportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRecipe => "E_EMPTY_RECIPE",
            Self::Closed => "E_IMPORT_CLOSED",
        }
    }
}

/// Identifies one extraction request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ExtractTicket(u64);

#[derive(Debug)]
pub struct ImportSession {
    phase: ImportPhase,
    text: String,
    generation: u64,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    #[must_use]
    pub fn new() -> Self {
        Self { phase: ImportPhase::Editing, text: String::new(), generation: 0 }
    }

    #[must_use]
    pub fn phase(&self) -> &ImportPhase {
        &self.phase
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.phase == ImportPhase::Closed
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if !self.is_closed() {
            self.text = text.into();
        }
    }

    /// Start an extraction of the current text.
    ///
    /// Any extraction already in flight becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::EmptyRecipe`] for blank text (the session shows
    /// the message) and [`ImportError::Closed`] after [`ImportSession::close`].
    pub fn begin_extract(&mut self) -> Result<ExtractTicket, ImportError> {
        if self.is_closed() {
            return Err(ImportError::Closed);
        }
        if self.text.trim().is_empty() {
            self.phase = ImportPhase::Failed(ImportError::EmptyRecipe.to_string());
            return Err(ImportError::EmptyRecipe);
        }
        self.generation += 1;
        self.phase = ImportPhase::Extracting;
        Ok(ExtractTicket(self.generation))
    }

    /// Deliver the outcome for `ticket`. Returns `false` when it was stale
    /// and therefore discarded.
    pub fn finish_extract(&mut self, ticket: ExtractTicket, result: Result<Vec<DraftItem>, ExtractError>) -> bool {
        if self.phase != ImportPhase::Extracting || ticket.0 != self.generation {
            debug!(ticket = ticket.0, generation = self.generation, "import: discarding stale result");
            return false;
        }
        self.phase = match result {
            Ok(drafts) => ImportPhase::Review(drafts),
            Err(e) => ImportPhase::Failed(e.to_string()),
        };
        true
    }

    /// Leave review or an error and go back to editing the text.
    pub fn back(&mut self) {
        if matches!(self.phase, ImportPhase::Review(_) | ImportPhase::Failed(_)) {
            self.phase = ImportPhase::Editing;
        }
    }

    /// Bulk-add the reviewed drafts to `list` and close the session.
    ///
    /// Returns how many items were added; nothing happens outside review.
    pub fn add_all<S: KeyValueStore>(&mut self, list: &mut ShoppingList<S>) -> usize {
        if !matches!(self.phase, ImportPhase::Review(_)) {
            return 0;
        }
        let ImportPhase::Review(drafts) = std::mem::replace(&mut self.phase, ImportPhase::Editing) else {
            return 0;
        };
        let added = list.add_multiple_items(drafts);
        info!(added, "import: added reviewed ingredients");
        self.close();
        added
    }

    /// Dismiss the session. Pending results are discarded when they arrive.
    pub fn close(&mut self) {
        self.generation += 1;
        self.text.clear();
        self.phase = ImportPhase::Closed;
    }
}
