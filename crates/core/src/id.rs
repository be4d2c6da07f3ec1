//! Strongly-typed branch identifier.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Surrogate key of a branch, assigned by the store on insert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(i64);

impl BranchId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for BranchId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for BranchId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<BranchId> for i64 {
    fn from(value: BranchId) -> Self {
        value.0
    }
}

impl FromStr for BranchId {
    type Err = DomainError;

    /// Accepts an optionally signed decimal integer, as found in a URL path segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = i64::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("BranchId {s:?}: {e}")))?;
        Ok(Self(value))
    }
}
