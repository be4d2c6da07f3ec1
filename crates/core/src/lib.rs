//! `branches-core` — the branch entity and its validation rules.
//!
//! This crate is **pure domain** (no storage, no HTTP).

pub mod branch;
pub mod error;
pub mod id;

pub use branch::{Branch, BranchDraft};
pub use error::{DomainError, DomainResult};
pub use id::BranchId;
