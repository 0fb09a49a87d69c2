//! Standalone IAM managed policy stack

use super::validate_logical_name;
use crate::composition::{Composer, Composition};
use crate::error::{Result, TemplateError};
use crate::resources::{ManagedPolicy, PolicyDocument};

/// One managed policy, exposed under its logical name as the policy ARN
#[derive(Debug, Clone)]
pub struct ManagedPolicyComposer {
    logical_name: String,
    policy_name: String,
    description: String,
    document: PolicyDocument,
}

impl ManagedPolicyComposer {
    pub fn new(
        logical_name: impl Into<String>,
        policy_name: impl Into<String>,
        document: PolicyDocument,
    ) -> Self {
        Self {
            logical_name: logical_name.into(),
            policy_name: policy_name.into(),
            description: String::new(),
            document,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Composer for ManagedPolicyComposer {
    fn compose(&self) -> Result<Composition> {
        validate_logical_name(&self.logical_name)?;
        let valid_name = !self.policy_name.is_empty()
            && self.policy_name.len() <= 128
            && self
                .policy_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+=,.@-_".contains(c));
        if !valid_name {
            return Err(TemplateError::Composition(format!(
                "invalid policy name: '{}'",
                self.policy_name
            )));
        }
        if self.description.len() > 1000 {
            return Err(TemplateError::Composition(
                "policy description exceeds 1000 characters".into(),
            ));
        }
        self.document.validate()?;

        let mut c = Composition::new();
        c.add_exposed(ManagedPolicy::new(
            &self.logical_name,
            &self.policy_name,
            &self.description,
            self.document.clone(),
        ));
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Statement;

    fn document() -> PolicyDocument {
        PolicyDocument::new(vec![Statement::allow(
            &["s3:GetObject"],
            &["arn:aws:s3:::assets/*"],
        )])
    }

    #[test]
    fn test_policy_exposes_arn() {
        let composition = ManagedPolicyComposer::new("ReadAssets", "prod-read-assets", document())
            .compose()
            .unwrap();
        let outputs: Vec<&str> = composition.outputs().iter().map(|o| o.name()).collect();
        assert_eq!(outputs, vec!["ReadAssets"]);
    }

    #[test]
    fn test_invalid_policy_name() {
        let err = ManagedPolicyComposer::new("ReadAssets", "read assets!", document())
            .compose()
            .unwrap_err();
        assert!(err.to_string().contains("read assets!"));
    }

    #[test]
    fn test_empty_document_rejected() {
        let result =
            ManagedPolicyComposer::new("ReadAssets", "prod-read-assets", PolicyDocument::new(vec![]))
                .compose();
        assert!(result.is_err());
    }
}
