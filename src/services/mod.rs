//! Services built on the LLM adapters and list state.
//!
//! ARCHITECTURE
//! ============
//! `recipe` owns the provider conversation and response validation;
//! `import` owns the user-facing session that feeds results into the list.

pub mod import;
pub mod recipe;
