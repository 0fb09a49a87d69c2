//! AWS backend error types

use stackflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    /// The service answered with an error code
    #[error("{operation} on {stack} failed: {code}: {message}")]
    Service {
        operation: &'static str,
        stack: String,
        code: String,
        message: String,
    },

    /// The request never got a service answer (network, credentials, timeout)
    #[error("{operation} on {stack} failed: {message}")]
    Transport {
        operation: &'static str,
        stack: String,
        message: String,
    },

    #[error("{operation} on {stack} returned no {field}")]
    MissingField {
        operation: &'static str,
        stack: String,
        field: &'static str,
    },
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Service {
                operation,
                stack,
                code,
                message,
            } => CloudError::api(operation, stack, code, message),
            AwsError::Transport {
                operation,
                stack,
                message,
            } => CloudError::api(operation, stack, "TransportError", message),
            AwsError::MissingField {
                operation,
                stack,
                field,
            } => CloudError::api(
                operation,
                stack,
                "MalformedResponse",
                format!("response has no {}", field),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_keeps_missing_signal() {
        let err: CloudError = AwsError::Service {
            operation: "DescribeStacks",
            stack: "net".into(),
            code: "ValidationError".into(),
            message: "Stack with id net does not exist".into(),
        }
        .into();
        assert!(err.is_stack_missing());
    }

    #[test]
    fn test_transport_error_is_not_missing() {
        let err: CloudError = AwsError::Transport {
            operation: "DescribeStacks",
            stack: "net".into(),
            message: "dispatch failure: does not exist".into(),
        }
        .into();
        assert!(!err.is_stack_missing());
    }
}
