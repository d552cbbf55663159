//! Core domain types and logic.

pub mod symbol_table;
pub mod catalog;
pub mod holdings;
pub mod ledger;
pub mod engine;
pub mod settings;
pub mod error;
