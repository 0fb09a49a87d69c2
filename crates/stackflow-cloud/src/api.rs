//! Remote stack orchestration API

use crate::error::Result;
use crate::status::StackStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CAPABILITY_IAM: &str = "CAPABILITY_IAM";
pub const CAPABILITY_NAMED_IAM: &str = "CAPABILITY_NAMED_IAM";
pub const CAPABILITY_AUTO_EXPAND: &str = "CAPABILITY_AUTO_EXPAND";

/// One `{key, value}` output of a deployed stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
}

impl StackOutput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result of describing a single stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescription {
    pub name: String,
    pub status: StackStatus,
    pub status_reason: Option<String>,
    pub outputs: Vec<StackOutput>,
}

impl StackDescription {
    pub fn new(name: impl Into<String>, status: StackStatus) -> Self {
        Self {
            name: name.into(),
            status,
            status_reason: None,
            outputs: Vec::new(),
        }
    }

    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    /// Status reason as reported, empty when the remote side gave none
    pub fn reason(&self) -> &str {
        self.status_reason.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStackInput {
    pub name: String,
    pub template_body: String,
    pub capabilities: Vec<String>,
    /// Enforced by the remote side, not locally
    pub timeout_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStackInput {
    pub name: String,
    pub template_body: String,
    pub capabilities: Vec<String>,
}

/// Operations consumed from the remote orchestration system.
///
/// A stack that does not exist is reported by `describe_stack` and
/// `get_template` as a `CloudError::Api` for which
/// [`CloudError::is_stack_missing`](crate::CloudError::is_stack_missing)
/// holds. Implementations must preserve that signal.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Submit a create request, returning the remote stack id
    async fn create_stack(&self, input: CreateStackInput) -> Result<String>;

    async fn describe_stack(&self, name: &str) -> Result<StackDescription>;

    async fn delete_stack(&self, name: &str) -> Result<()>;

    /// Template body currently deployed
    async fn get_template(&self, name: &str) -> Result<String>;

    async fn update_stack(&self, input: UpdateStackInput) -> Result<()>;
}

#[async_trait]
impl<T: StackApi + ?Sized> StackApi for Arc<T> {
    async fn create_stack(&self, input: CreateStackInput) -> Result<String> {
        (**self).create_stack(input).await
    }

    async fn describe_stack(&self, name: &str) -> Result<StackDescription> {
        (**self).describe_stack(name).await
    }

    async fn delete_stack(&self, name: &str) -> Result<()> {
        (**self).delete_stack(name).await
    }

    async fn get_template(&self, name: &str) -> Result<String> {
        (**self).get_template(name).await
    }

    async fn update_stack(&self, input: UpdateStackInput) -> Result<()> {
        (**self).update_stack(input).await
    }
}
