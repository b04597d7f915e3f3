//! Core business logic for the cash drawer ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `drawer` - Drawer sessions, movements, and reconciliation

pub mod drawer;
