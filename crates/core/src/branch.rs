//! The branch entity and its input shape.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::BranchId;

/// A physical location of the business.
///
/// Every persisted branch has a non-empty `name` and `location`; `id` is
/// assigned by the store and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub location: String,
}

/// Request body for creating or replacing a branch.
///
/// Missing or `null` fields decode to empty strings so that presence is
/// enforced by [`BranchDraft::validate`] rather than by the decoder. A
/// client-supplied `id` is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BranchDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl BranchDraft {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: location.into(),
        }
    }

    /// Both `name` and `location` must be present and non-empty.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.is_empty() || self.location.is_empty() {
            return Err(DomainError::validation(
                "name and location are required fields",
            ));
        }
        Ok(())
    }

    /// Attach the store-assigned id, producing the persisted entity.
    pub fn into_branch(self, id: BranchId) -> Branch {
        Branch {
            id,
            name: self.name,
            location: self.location,
        }
    }
}
