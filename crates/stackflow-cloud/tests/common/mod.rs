#![allow(dead_code)]

use async_trait::async_trait;
use stackflow_cloud::{
    CancellationToken, CloudError, Clock, CreateStackInput, Result, StackApi, StackDescription,
    StackOutput, StackStatus, UpdateStackInput,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted observation: a status with an optional reason, or `None`
/// once the stack is gone
pub type Step = Option<(StackStatus, Option<String>)>;

pub fn step(status: StackStatus) -> Step {
    Some((status, None))
}

pub fn failed(status: StackStatus, reason: &str) -> Step {
    Some((status, Some(reason.to_string())))
}

pub const GONE: Step = None;

#[derive(Default)]
struct FakeStack {
    current: Step,
    script: VecDeque<Step>,
    outputs: Vec<StackOutput>,
    template: String,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct Calls {
    pub create: usize,
    pub describe: usize,
    pub delete: usize,
    pub get_template: usize,
    pub update: usize,
}

#[derive(Default)]
struct State {
    stacks: HashMap<String, FakeStack>,
    create_scripts: HashMap<String, Vec<Step>>,
    delete_scripts: HashMap<String, Vec<Step>>,
    update_scripts: HashMap<String, Vec<Step>>,
    describe_error: Option<(String, String)>,
    calls: Calls,
    last_create: Option<CreateStackInput>,
}

/// In-memory orchestration backend.
///
/// Each describe call first advances the stack's script by one step, then
/// reports the current step.
#[derive(Default)]
pub struct FakeStackApi {
    state: Mutex<State>,
}

fn missing(operation: &str, name: &str) -> CloudError {
    CloudError::api(
        operation,
        name,
        "ValidationError",
        format!("Stack with id {} does not exist", name),
    )
}

impl FakeStackApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(self, name: &str, status: StackStatus) -> Self {
        self.state.lock().unwrap().stacks.insert(
            name.to_string(),
            FakeStack {
                current: step(status),
                ..FakeStack::default()
            },
        );
        self
    }

    pub fn with_outputs(self, name: &str, outputs: &[(&str, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let stack = state.stacks.entry(name.to_string()).or_default();
            stack.outputs = outputs
                .iter()
                .map(|(k, v)| StackOutput::new(*k, *v))
                .collect();
        }
        self
    }

    pub fn with_template(self, name: &str, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .stacks
            .entry(name.to_string())
            .or_default()
            .template = body.to_string();
        self
    }

    /// Observations that follow a create request for `name`
    pub fn on_create(self, name: &str, script: Vec<Step>) -> Self {
        self.state
            .lock()
            .unwrap()
            .create_scripts
            .insert(name.to_string(), script);
        self
    }

    /// Observations that follow a delete request for `name`
    pub fn on_delete(self, name: &str, script: Vec<Step>) -> Self {
        self.state
            .lock()
            .unwrap()
            .delete_scripts
            .insert(name.to_string(), script);
        self
    }

    /// Observations that follow an accepted update request for `name`
    pub fn on_update(self, name: &str, script: Vec<Step>) -> Self {
        self.state
            .lock()
            .unwrap()
            .update_scripts
            .insert(name.to_string(), script);
        self
    }

    pub fn with_describe_error(self, code: &str, message: &str) -> Self {
        self.state.lock().unwrap().describe_error = Some((code.to_string(), message.to_string()));
        self
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    pub fn last_create(&self) -> Option<CreateStackInput> {
        self.state.lock().unwrap().last_create.clone()
    }

    pub fn template(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .stacks
            .get(name)
            .map(|s| s.template.clone())
    }
}

#[async_trait]
impl StackApi for FakeStackApi {
    async fn create_stack(&self, input: CreateStackInput) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.create += 1;
        if state.stacks.get(&input.name).is_some_and(|s| s.current.is_some()) {
            return Err(CloudError::api(
                "CreateStack",
                &input.name,
                "AlreadyExistsException",
                format!("Stack [{}] already exists", input.name),
            ));
        }

        let script = state
            .create_scripts
            .get(&input.name)
            .cloned()
            .unwrap_or_else(|| vec![step(StackStatus::CreateComplete)]);
        let stack = state.stacks.entry(input.name.clone()).or_default();
        stack.current = step(StackStatus::CreateInProgress);
        stack.script = script.into();
        stack.template = input.template_body.clone();

        let id = format!("arn:fake:stack/{}", input.name);
        state.last_create = Some(input);
        Ok(id)
    }

    async fn describe_stack(&self, name: &str) -> Result<StackDescription> {
        let mut state = self.state.lock().unwrap();
        state.calls.describe += 1;
        if let Some((code, message)) = &state.describe_error {
            return Err(CloudError::api("DescribeStacks", name, code, message));
        }

        let stack = state
            .stacks
            .get_mut(name)
            .ok_or_else(|| missing("DescribeStacks", name))?;
        if let Some(next) = stack.script.pop_front() {
            stack.current = next;
        }
        let (status, reason) = stack
            .current
            .clone()
            .ok_or_else(|| missing("DescribeStacks", name))?;

        Ok(StackDescription {
            name: name.to_string(),
            status,
            status_reason: reason,
            outputs: stack.outputs.clone(),
        })
    }

    async fn delete_stack(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete += 1;
        let script = state
            .delete_scripts
            .get(name)
            .cloned()
            .unwrap_or_else(|| vec![step(StackStatus::DeleteInProgress), GONE]);
        if let Some(stack) = state.stacks.get_mut(name) {
            stack.current = step(StackStatus::DeleteInProgress);
            stack.script = script.into();
        }
        Ok(())
    }

    async fn get_template(&self, name: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_template += 1;
        state
            .stacks
            .get(name)
            .filter(|s| s.current.is_some())
            .map(|s| s.template.clone())
            .ok_or_else(|| missing("GetTemplate", name))
    }

    async fn update_stack(&self, input: UpdateStackInput) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.update += 1;
        let script = state
            .update_scripts
            .get(&input.name)
            .cloned()
            .unwrap_or_else(|| vec![step(StackStatus::UpdateComplete)]);
        let stack = state
            .stacks
            .get_mut(&input.name)
            .ok_or_else(|| missing("UpdateStack", &input.name))?;

        let same = match (
            serde_json::from_str::<serde_json::Value>(&stack.template),
            serde_json::from_str::<serde_json::Value>(&input.template_body),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => stack.template == input.template_body,
        };
        if same {
            return Err(CloudError::api(
                "UpdateStack",
                &input.name,
                "ValidationError",
                "No updates are to be performed.",
            ));
        }

        stack.template = input.template_body;
        stack.current = step(StackStatus::UpdateInProgress);
        stack.script = script.into();
        Ok(())
    }
}

/// Records requested sleeps and returns without waiting.
///
/// Optionally cancels a token once a given number of sleeps was requested.
#[derive(Default)]
pub struct ManualClock {
    sleeps: Mutex<Vec<Duration>>,
    cancel: Option<(usize, CancellationToken)>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_after(sleeps: usize, token: CancellationToken) -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
            cancel: Some((sleeps, token)),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        let count = {
            let mut sleeps = self.sleeps.lock().unwrap();
            sleeps.push(duration);
            sleeps.len()
        };
        if let Some((after, token)) = &self.cancel {
            if count >= *after {
                token.cancel();
            }
        }
        tokio::task::yield_now().await;
    }
}
