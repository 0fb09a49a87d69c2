//! Outcome of a reconciliation call

use serde::{Deserialize, Serialize};

/// What a Runner call did to the remote stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A stack was created and reached a ready state
    Create,
    /// The deployed template was replaced
    Update,
    /// A stack was deleted
    Delete,
    /// Nothing was submitted
    NoOp,
}

impl ActionType {
    pub fn is_change(&self) -> bool {
        *self != ActionType::NoOp
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}
