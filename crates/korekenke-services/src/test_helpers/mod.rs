//! Test helpers for pipeline unit tests
//!
//! In-memory storage with scripted delays and failures, so pipelines can be
//! exercised without touching a real backend.

pub mod mock_storage;

pub use mock_storage::*;
