//! Reconciliation error types

use stackflow_template::TemplateError;
use thiserror::Error;

/// Errors surfaced by the Runner and the remote stack API
#[derive(Error, Debug)]
pub enum CloudError {
    /// The remote API rejected a call. `code` and `message` are kept as
    /// reported so callers can classify them.
    #[error("{operation} on stack {stack} failed: {code}: {message}")]
    Api {
        operation: String,
        stack: String,
        code: String,
        message: String,
    },

    #[error("stack {stack} reached {status}: {reason}")]
    RemoteTerminal {
        stack: String,
        status: String,
        reason: String,
    },

    #[error("stack {stack} is in unexpected status {status} while waiting for {operation}")]
    UnexpectedStatus {
        stack: String,
        operation: String,
        status: String,
    },

    #[error("stack {stack} exists but is not ready (status {status})")]
    NotReady { stack: String, status: String },

    #[error("stack {stack} has no output named {key}")]
    MissingOutput { stack: String, key: String },

    #[error("patch target not found in stack {stack} at {path}")]
    PatchTargetNotFound { stack: String, path: String },

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("waiting for {operation} on stack {stack} was cancelled")]
    Cancelled { stack: String, operation: String },

    #[error("output processor for {key} failed: {message}")]
    Processor { key: String, message: String },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const VALIDATION_ERROR: &str = "ValidationError";

impl CloudError {
    pub fn api(
        operation: impl Into<String>,
        stack: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CloudError::Api {
            operation: operation.into(),
            stack: stack.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// The remote side reports that the stack does not exist.
    ///
    /// Only this validation answer counts; any other failure (throttling,
    /// auth, network) is a real error.
    pub fn is_stack_missing(&self) -> bool {
        matches!(
            self,
            CloudError::Api { code, message, .. }
                if code == VALIDATION_ERROR && message.contains("does not exist")
        )
    }

    /// An update was submitted with a template identical to the deployed one
    pub fn is_no_update(&self) -> bool {
        matches!(
            self,
            CloudError::Api { code, message, .. }
                if code == VALIDATION_ERROR && message.contains("No updates are to be performed")
        )
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_missing_detection() {
        let missing = CloudError::api(
            "DescribeStacks",
            "s",
            "ValidationError",
            "Stack with id s does not exist",
        );
        assert!(missing.is_stack_missing());

        let throttled = CloudError::api("DescribeStacks", "s", "Throttling", "Rate exceeded");
        assert!(!throttled.is_stack_missing());

        let other_validation =
            CloudError::api("CreateStack", "s", "ValidationError", "Template format error");
        assert!(!other_validation.is_stack_missing());
    }

    #[test]
    fn test_no_update_detection() {
        let err = CloudError::api(
            "UpdateStack",
            "s",
            "ValidationError",
            "No updates are to be performed.",
        );
        assert!(err.is_no_update());
        assert!(!err.is_stack_missing());
    }

    #[test]
    fn test_remote_reason_verbatim() {
        let err = CloudError::RemoteTerminal {
            stack: "net".into(),
            status: "CREATE_FAILED".into(),
            reason: "The following resource(s) failed to create: [Vpc].".into(),
        };
        assert!(
            err.to_string()
                .contains("The following resource(s) failed to create: [Vpc].")
        );
    }
}
