//! Polling state machine for submitted stack operations
//!
//! `observe` is pure: given the operation being waited on and one
//! observation of the stack it decides whether to keep waiting. The Runner
//! drives it with a [`Clock`](crate::Clock) and a cancellation token.

use crate::status::StackStatus;

/// Operation a poll loop waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// One look at the remote stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Status {
        status: StackStatus,
        reason: Option<String>,
    },
    /// The remote side no longer knows the stack
    Gone,
}

impl Observation {
    pub fn status(status: StackStatus) -> Self {
        Observation::Status {
            status,
            reason: None,
        }
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observation::Status { status, .. } => status.fmt(f),
            Observation::Gone => write!(f, "DOES_NOT_EXIST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Complete,
    /// Sleep one interval and observe again
    Pending,
    /// The operation failed remotely; `reason` is verbatim
    Failed { status: StackStatus, reason: String },
    /// Outside what the operation can produce; never looped on
    Unexpected(String),
}

pub fn observe(operation: Operation, observation: &Observation) -> Transition {
    let (status, reason) = match observation {
        Observation::Gone => {
            return match operation {
                Operation::Delete => Transition::Complete,
                _ => Transition::Unexpected(observation.to_string()),
            };
        }
        Observation::Status { status, reason } => (status, reason),
    };

    let failed = || Transition::Failed {
        status: status.clone(),
        reason: reason.clone().unwrap_or_default(),
    };

    use StackStatus::*;
    match (operation, status) {
        (Operation::Create, CreateComplete) => Transition::Complete,
        (Operation::Create, CreateInProgress) => Transition::Pending,
        (
            Operation::Create,
            CreateFailed | RollbackInProgress | RollbackFailed | RollbackComplete,
        ) => failed(),

        (Operation::Update, UpdateComplete) => Transition::Complete,
        (Operation::Update, UpdateInProgress | UpdateCompleteCleanupInProgress) => {
            Transition::Pending
        }
        (
            Operation::Update,
            UpdateFailed
            | UpdateRollbackInProgress
            | UpdateRollbackCompleteCleanupInProgress
            | UpdateRollbackFailed
            | UpdateRollbackComplete,
        ) => failed(),

        (Operation::Delete, DeleteComplete) => Transition::Complete,
        (Operation::Delete, DeleteInProgress) => Transition::Pending,
        (Operation::Delete, DeleteFailed) => failed(),

        _ => Transition::Unexpected(status.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_reason(status: StackStatus, reason: &str) -> Observation {
        Observation::Status {
            status,
            reason: Some(reason.to_string()),
        }
    }

    #[test]
    fn test_create_transitions() {
        assert_eq!(
            observe(Operation::Create, &Observation::status(StackStatus::CreateInProgress)),
            Transition::Pending
        );
        assert_eq!(
            observe(Operation::Create, &Observation::status(StackStatus::CreateComplete)),
            Transition::Complete
        );
        assert_eq!(
            observe(
                Operation::Create,
                &with_reason(StackStatus::CreateFailed, "Resource limit exceeded")
            ),
            Transition::Failed {
                status: StackStatus::CreateFailed,
                reason: "Resource limit exceeded".into()
            }
        );
    }

    #[test]
    fn test_create_never_loops_on_unknown_status() {
        let transition = observe(
            Operation::Create,
            &Observation::status(StackStatus::Unknown("NEW_STATUS".into())),
        );
        assert_eq!(transition, Transition::Unexpected("NEW_STATUS".into()));

        let transition = observe(Operation::Create, &Observation::Gone);
        assert!(matches!(transition, Transition::Unexpected(_)));

        let transition = observe(Operation::Create, &Observation::status(StackStatus::DeleteInProgress));
        assert!(matches!(transition, Transition::Unexpected(_)));
    }

    #[test]
    fn test_delete_transitions() {
        assert_eq!(observe(Operation::Delete, &Observation::Gone), Transition::Complete);
        assert_eq!(
            observe(Operation::Delete, &Observation::status(StackStatus::DeleteComplete)),
            Transition::Complete
        );
        assert_eq!(
            observe(Operation::Delete, &Observation::status(StackStatus::DeleteInProgress)),
            Transition::Pending
        );
        assert!(matches!(
            observe(
                Operation::Delete,
                &with_reason(StackStatus::DeleteFailed, "bucket not empty")
            ),
            Transition::Failed { reason, .. } if reason == "bucket not empty"
        ));
    }

    #[test]
    fn test_update_transitions() {
        assert_eq!(
            observe(
                Operation::Update,
                &Observation::status(StackStatus::UpdateCompleteCleanupInProgress)
            ),
            Transition::Pending
        );
        assert_eq!(
            observe(Operation::Update, &Observation::status(StackStatus::UpdateComplete)),
            Transition::Complete
        );
        assert!(matches!(
            observe(
                Operation::Update,
                &Observation::status(StackStatus::UpdateRollbackComplete)
            ),
            Transition::Failed { .. }
        ));
    }
}
