//! Adapter implementations for closing-task ports.

pub mod memory;
pub mod sheets;
