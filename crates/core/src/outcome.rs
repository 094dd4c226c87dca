use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};

/// JSON body returned with every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            issues: Vec::new(),
        }
    }

    /// Body for a rejected request, listing each offending field
    pub fn invalid(err: ValidationError) -> Self {
        Self {
            detail: err.to_string(),
            issues: err.issues,
        }
    }
}
