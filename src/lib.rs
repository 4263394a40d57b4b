//! Fechamento: accounting-closing task tracking core.
//!
//! This crate turns closing-task spreadsheets (one sheet per client company
//! and month) into normalized task records, keeping task identity and
//! completion history stable across repeated imports.
//!
//! # Architecture
//!
//! Fechamento follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (spreadsheet export,
//!   in-memory stores)
//!
//! # Modules
//!
//! - [`closing`]: Spreadsheet-to-task reconciliation and sheet sync

pub mod closing;
