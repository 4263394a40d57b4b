//! Closing-task reconciliation for accounting firms.
//!
//! Closing tasks (etapas) are tracked per client company (tenant) per month
//! (period) and imported from shared spreadsheets. This module turns raw
//! spreadsheet rows into normalized, deduplicated task records, keeps task
//! identity and completion history stable across repeated imports, and
//! reports which stored tasks disappeared from the sheet. The module follows
//! hexagonal architecture:
//!
//! - Domain types and the pure pipeline stages in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Reconciliation and sync orchestration in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
