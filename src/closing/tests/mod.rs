//! Unit tests for the closing reconciliation context.

mod memory_tests;
mod sync_tests;
