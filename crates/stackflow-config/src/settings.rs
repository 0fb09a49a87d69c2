//! StackFlow settings

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use stackflow_cloud::{
    CAPABILITY_AUTO_EXPAND, CAPABILITY_IAM, CAPABILITY_NAMED_IAM, OutputMatching, RunnerConfig,
};
use stackflow_template::address::{Cidr, private_ranges};
use stackflow_template::regions::availability_zones;
use stackflow_template::{DEFAULT_PREFIX, StackNamer};
use std::path::Path;
use std::time::Duration;

const KNOWN_CAPABILITIES: &[&str] = &[CAPABILITY_IAM, CAPABILITY_NAMED_IAM, CAPABILITY_AUTO_EXPAND];

/// Contents of `stackflow.yaml`. Every field has a default, so an empty
/// file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackflowConfig {
    /// Region override; the AWS environment decides when unset
    pub region: Option<String>,
    pub stack_prefix: String,
    pub poll_interval_secs: u64,
    /// Passed with create requests and enforced remotely
    pub timeout_minutes: u32,
    pub capabilities: Vec<String>,
    pub output_matching: OutputMatching,
    /// Blocks a VPC address range must fall inside
    pub approved_ranges: Vec<String>,
}

impl Default for StackflowConfig {
    fn default() -> Self {
        Self {
            region: None,
            stack_prefix: DEFAULT_PREFIX.to_string(),
            poll_interval_secs: 5,
            timeout_minutes: 15,
            capabilities: vec![CAPABILITY_NAMED_IAM.to_string()],
            output_matching: OutputMatching::Lenient,
            approved_ranges: private_ranges().iter().map(Cidr::to_string).collect(),
        }
    }
}

impl StackflowConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load the file found by [`crate::find_config_file`]
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::find_config_file()?)
    }

    /// Like [`load`](Self::load), falling back to defaults when no file exists
    pub fn load_or_default() -> Result<Self> {
        match crate::find_config_file() {
            Ok(path) => Self::load_from(&path),
            Err(ConfigError::ConfigFileNotFound) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }
        if self.timeout_minutes == 0 {
            return Err(ConfigError::Invalid(
                "timeout_minutes must be greater than 0".into(),
            ));
        }
        if let Some(unknown) = self
            .capabilities
            .iter()
            .find(|c| !KNOWN_CAPABILITIES.contains(&c.as_str()))
        {
            return Err(ConfigError::Invalid(format!(
                "unknown capability: {}",
                unknown
            )));
        }
        if let Some(region) = &self.region {
            availability_zones(region)?;
        }
        self.approved_ranges()?;
        self.namer()?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn approved_ranges(&self) -> Result<Vec<Cidr>> {
        if self.approved_ranges.is_empty() {
            return Err(ConfigError::Invalid(
                "approved_ranges must not be empty".into(),
            ));
        }
        self.approved_ranges
            .iter()
            .map(|r| r.parse::<Cidr>().map_err(ConfigError::from))
            .collect()
    }

    pub fn namer(&self) -> Result<StackNamer> {
        Ok(StackNamer::new(&self.stack_prefix)?)
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            poll_interval: self.poll_interval(),
            output_matching: self.output_matching,
            capabilities: self.capabilities.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_template::Purpose;

    #[test]
    fn test_empty_file_is_default() {
        let config = StackflowConfig::from_yaml("").unwrap();
        assert_eq!(config, StackflowConfig::default());
        assert_eq!(config.approved_ranges().unwrap().len(), 3);
    }

    #[test]
    fn test_partial_file() {
        let config = StackflowConfig::from_yaml(
            "region: eu-west-1\npoll_interval_secs: 10\noutput_matching: strict\n",
        )
        .unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.timeout_minutes, 15);

        let runner = config.runner_config();
        assert_eq!(runner.poll_interval, Duration::from_secs(10));
        assert_eq!(runner.output_matching, OutputMatching::Strict);
    }

    #[test]
    fn test_namer_uses_prefix() {
        let config = StackflowConfig::from_yaml("stack_prefix: acme\n").unwrap();
        let name = config.namer().unwrap().name(&Purpose::Vpc, "prod", None);
        assert_eq!(name, "acme-vpc-prod");
    }

    #[test]
    fn test_invalid_values() {
        assert!(StackflowConfig::from_yaml("poll_interval_secs: 0").is_err());
        assert!(StackflowConfig::from_yaml("timeout_minutes: 0").is_err());
        assert!(StackflowConfig::from_yaml("region: mars-north-1").is_err());
        assert!(StackflowConfig::from_yaml("approved_ranges: [\"10.0.0.0/33\"]").is_err());
        assert!(StackflowConfig::from_yaml("approved_ranges: []").is_err());
        assert!(StackflowConfig::from_yaml("capabilities: [CAPABILITY_EVERYTHING]").is_err());
        assert!(StackflowConfig::from_yaml("stack_prefix: \"-bad\"").is_err());
        assert!(StackflowConfig::from_yaml("unknown_field: 1").is_err());
    }
}
