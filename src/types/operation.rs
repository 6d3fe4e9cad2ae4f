// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use serde::{Deserialize, Serialize};

/// State of an asynchronous broker operation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationState {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "succeeded")]
    Succeeded,
    #[serde(rename = "failed")]
    Failed,
    /// Any state string the broker sends that OSB does not define. Treated as terminal.
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::InProgress => "in progress",
            OperationState::Succeeded => "succeeded",
            OperationState::Failed => "failed",
            OperationState::Unknown => "unknown",
        }
    }

    /// Every state other than "in progress" ends polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::InProgress)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of request that started the polled operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OperationType {
    Create,
    Update,
    Delete,
    #[default]
    Unknown,
}

/// Result of a last-operation call
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Operation {
    pub state: OperationState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Operation {
    pub fn succeeded(&self) -> bool {
        self.state == OperationState::Succeeded
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.state)
        } else {
            write!(f, "{} ({})", self.state, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_states() {
        let op: Operation =
            serde_json::from_str(r#"{"state":"in progress","description":"creating"}"#).unwrap();
        assert_eq!(op.state, OperationState::InProgress);
        assert_eq!(op.description, "creating");

        let op: Operation = serde_json::from_str(r#"{"state":"succeeded"}"#).unwrap();
        assert!(op.succeeded());

        let op: Operation = serde_json::from_str(r#"{"state":"failed"}"#).unwrap();
        assert_eq!(op.state, OperationState::Failed);
    }

    #[test]
    fn test_unrecognised_state_is_terminal() {
        let op: Operation = serde_json::from_str(r#"{"state":"exploded"}"#).unwrap();
        assert_eq!(op.state, OperationState::Unknown);
        assert!(op.state.is_terminal());
    }

    #[test]
    fn test_only_in_progress_is_not_terminal() {
        assert!(!OperationState::InProgress.is_terminal());
        assert!(OperationState::Succeeded.is_terminal());
        assert!(OperationState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        let op = Operation {
            state: OperationState::Failed,
            description: "quota exceeded".to_string(),
        };
        assert_eq!(op.to_string(), "failed (quota exceeded)");
    }
}
