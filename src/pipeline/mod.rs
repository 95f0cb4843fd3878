//! The upload-and-registration pipeline.
//!
//! This module provides:
//! - `core`: Pipeline struct, wiring and the small admin operations
//! - `upload`: per-item upload orchestration and one-time registration
//! - `register`: macro-group / micro-batch ledger registration
//! - `verify`: reconciliation of ledger bytes against the cache

pub mod core;
pub mod register;
pub mod upload;
pub mod verify;

pub use core::{Pipeline, RegisterSummary, UploadSummary, VerifySummary};

#[cfg(test)]
mod tests;
