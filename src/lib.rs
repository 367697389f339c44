//! shoplist: a local shopping list with AI-assisted recipe import.
//!
//! ARCHITECTURE
//! ============
//! - [`store`]: durable key-value documents (one JSON file per key).
//! - [`state`]: the list and settings managers plus derived summaries.
//! - [`llm`]: provider adapters behind one structured-output trait.
//! - [`services`]: recipe extraction and the import session built on it.
//!
//! The binary in `main.rs` is a thin CLI over these modules.

pub mod error;
pub mod llm;
pub mod services;
pub mod state;
pub mod store;
