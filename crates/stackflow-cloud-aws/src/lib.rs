//! AWS CloudFormation backend for StackFlow
//!
//! Implements [`stackflow_cloud::StackApi`] with `aws-sdk-cloudformation`.
//!
//! # Example
//!
//! ```ignore
//! use stackflow_cloud::Runner;
//! use stackflow_cloud_aws::CloudFormationApi;
//!
//! let api = CloudFormationApi::from_env(Some("eu-west-1".to_string())).await;
//! let runner = Runner::new(api);
//! runner.create_if_not_exists("stackflow-vpc-prod", &template, &caps, Some(15)).await?;
//! ```

pub mod api;
pub mod error;

pub use api::CloudFormationApi;
pub use error::AwsError;
