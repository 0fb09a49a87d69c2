//! Stack reconciler
//!
//! Within one stack everything is sequential: probe, submit, poll to a
//! terminal state, read outputs. Independent stacks share nothing, so a
//! caller may drive several Runners (or one Runner over several stacks)
//! concurrently.

use crate::action::ActionType;
use crate::api::{
    CAPABILITY_NAMED_IAM, CreateStackInput, StackApi, StackDescription, UpdateStackInput,
};
use crate::clock::{Clock, TokioClock};
use crate::error::{CloudError, Result};
use crate::patch::{self, ListAction, ListPatch};
use crate::poll::{Observation, Operation, Transition, observe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handling of processor keys the deployed stack does not expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMatching {
    /// Skip the key and log a warning
    #[default]
    Lenient,
    /// Fail with [`CloudError::MissingOutput`] before invoking any processor
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub poll_interval: Duration,
    pub output_matching: OutputMatching,
    /// Capabilities sent with updates, including the ones patches submit
    pub capabilities: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            output_matching: OutputMatching::default(),
            capabilities: vec![CAPABILITY_NAMED_IAM.to_string()],
        }
    }
}

/// Callback receiving one output value
pub type OutputProcessor<'a> = Box<dyn FnMut(&str) -> Result<()> + Send + 'a>;

pub struct Runner<A, C = TokioClock> {
    api: A,
    clock: C,
    config: RunnerConfig,
    cancel: CancellationToken,
}

impl<A: StackApi> Runner<A> {
    pub fn new(api: A) -> Self {
        Self::with_clock(api, TokioClock)
    }
}

impl<A: StackApi, C: Clock> Runner<A, C> {
    pub fn with_clock(api: A, clock: C) -> Self {
        Self {
            api,
            clock,
            config: RunnerConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Polling stops with [`CloudError::Cancelled`] once `token` fires.
    /// The remote operation keeps running.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Describe, with "does not exist" mapped to `None`
    async fn probe(&self, name: &str) -> Result<Option<StackDescription>> {
        match self.api.describe_stack(name).await {
            Ok(description) => Ok(Some(description)),
            Err(e) if e.is_stack_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let exists = self.probe(name).await?.is_some();
        debug!(stack = name, exists, "probed stack");
        Ok(exists)
    }

    /// True only in a successful, non-transitional terminal state
    pub async fn ready(&self, name: &str) -> Result<bool> {
        Ok(self
            .probe(name)
            .await?
            .is_some_and(|description| description.status.is_ready()))
    }

    /// Create `name` unless it already exists in a ready state.
    ///
    /// A stack that exists but is not ready is an error; nothing is
    /// submitted for it.
    pub async fn create_if_not_exists(
        &self,
        name: &str,
        template: &[u8],
        capabilities: &[String],
        timeout_minutes: Option<u32>,
    ) -> Result<ActionType> {
        let template_body = template_body(template)?;

        if let Some(description) = self.probe(name).await? {
            if description.status.is_ready() {
                debug!(stack = name, status = %description.status, "stack already ready");
                return Ok(ActionType::NoOp);
            }
            return Err(CloudError::NotReady {
                stack: name.to_string(),
                status: description.status.to_string(),
            });
        }

        let stack_id = self
            .api
            .create_stack(CreateStackInput {
                name: name.to_string(),
                template_body,
                capabilities: capabilities.to_vec(),
                timeout_minutes,
            })
            .await?;
        info!(stack = name, stack_id = %stack_id, "submitted create");

        self.wait(name, Operation::Create).await?;
        Ok(ActionType::Create)
    }

    /// Replace the deployed template and wait for the update to settle.
    ///
    /// A template identical to the deployed one is a no-op.
    pub async fn update(&self, name: &str, template: &[u8]) -> Result<ActionType> {
        let input = UpdateStackInput {
            name: name.to_string(),
            template_body: template_body(template)?,
            capabilities: self.config.capabilities.clone(),
        };
        match self.api.update_stack(input).await {
            Ok(()) => {}
            Err(e) if e.is_no_update() => {
                debug!(stack = name, "no updates to perform");
                return Ok(ActionType::NoOp);
            }
            Err(e) => return Err(e),
        }
        info!(stack = name, "submitted update");

        self.wait(name, Operation::Update).await?;
        Ok(ActionType::Update)
    }

    /// Delete `name` and wait until the remote side no longer knows it.
    ///
    /// Deleting a stack that does not exist submits nothing.
    pub async fn delete(&self, name: &str) -> Result<ActionType> {
        if self.probe(name).await?.is_none() {
            debug!(stack = name, "stack already gone");
            return Ok(ActionType::NoOp);
        }

        self.api.delete_stack(name).await?;
        info!(stack = name, "submitted delete");

        self.wait(name, Operation::Delete).await?;
        Ok(ActionType::Delete)
    }

    /// All outputs of a deployed stack, keyed by output name
    pub async fn describe_outputs(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let description = self.api.describe_stack(name).await?;
        Ok(description
            .outputs
            .into_iter()
            .map(|o| (o.key, o.value))
            .collect())
    }

    /// Feed output values to their processors.
    ///
    /// Outputs are fetched once. Processors run in key order; the first
    /// processor error stops the run.
    pub async fn outputs(
        &self,
        name: &str,
        mut processors: BTreeMap<String, OutputProcessor<'_>>,
    ) -> Result<()> {
        let outputs = self.describe_outputs(name).await?;

        if self.config.output_matching == OutputMatching::Strict {
            if let Some(key) = processors.keys().find(|k| !outputs.contains_key(*k)) {
                return Err(CloudError::MissingOutput {
                    stack: name.to_string(),
                    key: key.clone(),
                });
            }
        }

        for (key, processor) in processors.iter_mut() {
            match outputs.get(key) {
                Some(value) => processor(value.as_str())?,
                None => warn!(stack = name, key = %key, "stack has no such output, skipping"),
            }
        }
        Ok(())
    }

    /// Add or remove one list element inside the deployed template.
    ///
    /// The update is submitted only when the patched document differs from
    /// the deployed one. Removing an element that is not there is an error.
    pub async fn patch(&self, name: &str, list_patch: &ListPatch) -> Result<ActionType> {
        let body = self.api.get_template(name).await?;
        let original: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            CloudError::InvalidTemplate(format!("deployed template of {} is not JSON: {}", name, e))
        })?;

        let Some(operation) = list_patch.operation(&original)? else {
            return match list_patch.action() {
                ListAction::Add => {
                    warn!(stack = name, path = %list_patch.list_path(), "element already present");
                    Ok(ActionType::NoOp)
                }
                ListAction::Remove => Err(CloudError::PatchTargetNotFound {
                    stack: name.to_string(),
                    path: list_patch.list_path(),
                }),
            };
        };

        let mut patched = original.clone();
        patch::apply(&mut patched, &operation)?;

        let before = serde_json::to_vec(&original)?;
        let after = serde_json::to_vec(&patched)?;
        if before == after {
            return Ok(ActionType::NoOp);
        }

        debug!(stack = name, path = %operation.path(), "patching template");
        self.update(name, &after).await
    }

    async fn wait(&self, name: &str, operation: Operation) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let observation = match self.probe(name).await? {
                Some(d) => Observation::Status {
                    status: d.status,
                    reason: d.status_reason,
                },
                None => Observation::Gone,
            };
            debug!(stack = name, %operation, attempt, observed = %observation, "polled stack");

            match observe(operation, &observation) {
                Transition::Complete => {
                    info!(stack = name, %operation, attempts = attempt, "operation complete");
                    return Ok(());
                }
                Transition::Pending => {}
                Transition::Failed { status, reason } => {
                    return Err(CloudError::RemoteTerminal {
                        stack: name.to_string(),
                        status: status.to_string(),
                        reason,
                    });
                }
                Transition::Unexpected(status) => {
                    return Err(CloudError::UnexpectedStatus {
                        stack: name.to_string(),
                        operation: operation.to_string(),
                        status,
                    });
                }
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(CloudError::Cancelled {
                        stack: name.to_string(),
                        operation: operation.to_string(),
                    });
                }
                _ = self.clock.sleep(self.config.poll_interval) => {}
            }
        }
    }
}

fn template_body(template: &[u8]) -> Result<String> {
    String::from_utf8(template.to_vec())
        .map_err(|e| CloudError::InvalidTemplate(format!("template is not UTF-8: {}", e)))
}
