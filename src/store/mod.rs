//! Durable confab records.
//!
//! The store owns the local truth about a confab; the GitHub mirror is an
//! enhancement layered on top of it, never a consistency-critical write.

pub mod db;
pub mod models;

pub use db::{ConfabDb, DbHandle};
pub use models::{Confab, ConfabStatus, bump_version};
