//! `StackApi` over the CloudFormation SDK

use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, Stack, TemplateStage};
use stackflow_cloud::{
    CreateStackInput, Result, StackApi, StackDescription, StackOutput, StackStatus,
    UpdateStackInput,
};
use tracing::debug;

/// CloudFormation client implementing the remote stack API
#[derive(Debug, Clone)]
pub struct CloudFormationApi {
    client: Client,
}

impl CloudFormationApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS environment (profile, env vars,
    /// instance metadata). `region` overrides the discovered region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn sdk_error<E, R>(operation: &'static str, stack: &str, err: SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => AwsError::Service {
            operation,
            stack: stack.to_string(),
            code: service.code().unwrap_or("Unknown").to_string(),
            message: service.message().unwrap_or_default().to_string(),
        },
        None => AwsError::Transport {
            operation,
            stack: stack.to_string(),
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

fn capabilities(names: &[String]) -> Vec<Capability> {
    names.iter().map(|c| Capability::from(c.as_str())).collect()
}

/// Name, status and creation time are required members of `Stack`
pub(crate) fn describe_from_stack(stack: &Stack) -> StackDescription {
    StackDescription {
        name: stack.stack_name().to_string(),
        status: StackStatus::from(stack.stack_status().as_str()),
        status_reason: stack.stack_status_reason().map(str::to_string),
        outputs: stack
            .outputs()
            .iter()
            .filter_map(|o| match (o.output_key(), o.output_value()) {
                (Some(key), Some(value)) => Some(StackOutput::new(key, value)),
                _ => None,
            })
            .collect(),
    }
}

#[async_trait]
impl StackApi for CloudFormationApi {
    async fn create_stack(&self, input: CreateStackInput) -> Result<String> {
        let output = self
            .client
            .create_stack()
            .stack_name(&input.name)
            .template_body(input.template_body)
            .set_capabilities(Some(capabilities(&input.capabilities)))
            .set_timeout_in_minutes(
                input
                    .timeout_minutes
                    .map(|m| i32::try_from(m).unwrap_or(i32::MAX)),
            )
            .send()
            .await
            .map_err(|e| sdk_error("CreateStack", &input.name, e))?;

        let stack_id = output
            .stack_id()
            .ok_or_else(|| AwsError::MissingField {
                operation: "CreateStack",
                stack: input.name.clone(),
                field: "StackId",
            })?
            .to_string();
        debug!(stack = %input.name, stack_id = %stack_id, "CreateStack accepted");
        Ok(stack_id)
    }

    async fn describe_stack(&self, name: &str) -> Result<StackDescription> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeStacks", name, e))?;

        let stack = output.stacks().first().ok_or_else(|| AwsError::MissingField {
            operation: "DescribeStacks",
            stack: name.to_string(),
            field: "Stacks",
        })?;
        Ok(describe_from_stack(stack))
    }

    async fn delete_stack(&self, name: &str) -> Result<()> {
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteStack", name, e))?;
        Ok(())
    }

    async fn get_template(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_template()
            .stack_name(name)
            .template_stage(TemplateStage::Original)
            .send()
            .await
            .map_err(|e| sdk_error("GetTemplate", name, e))?;

        Ok(output
            .template_body()
            .ok_or_else(|| AwsError::MissingField {
                operation: "GetTemplate",
                stack: name.to_string(),
                field: "TemplateBody",
            })?
            .to_string())
    }

    async fn update_stack(&self, input: UpdateStackInput) -> Result<()> {
        self.client
            .update_stack()
            .stack_name(&input.name)
            .template_body(input.template_body)
            .set_capabilities(Some(capabilities(&input.capabilities)))
            .send()
            .await
            .map_err(|e| sdk_error("UpdateStack", &input.name, e))?;
        debug!(stack = %input.name, "UpdateStack accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cloudformation::primitives::DateTime;
    use aws_sdk_cloudformation::types::{self, Output};

    #[test]
    fn test_describe_from_stack() {
        let stack = Stack::builder()
            .stack_name("prod-vpc")
            .creation_time(DateTime::from_secs(0))
            .stack_status(types::StackStatus::CreateFailed)
            .stack_status_reason("The following resource(s) failed to create: [Vpc].")
            .outputs(
                Output::builder()
                    .output_key("Vpc")
                    .output_value("vpc-0abc")
                    .build(),
            )
            .outputs(Output::builder().output_key("Dangling").build())
            .build()
            .unwrap();

        let description = describe_from_stack(&stack);
        assert_eq!(description.name, "prod-vpc");
        assert_eq!(description.status, StackStatus::CreateFailed);
        assert_eq!(
            description.reason(),
            "The following resource(s) failed to create: [Vpc]."
        );
        assert_eq!(description.outputs, vec![StackOutput::new("Vpc", "vpc-0abc")]);
    }

    #[test]
    fn test_capabilities() {
        let caps = capabilities(&["CAPABILITY_NAMED_IAM".into(), "CAPABILITY_AUTO_EXPAND".into()]);
        assert_eq!(
            caps,
            vec![Capability::CapabilityNamedIam, Capability::CapabilityAutoExpand]
        );
    }
}
