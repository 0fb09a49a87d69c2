//! Security group stack

use super::validate_logical_name;
use crate::composition::{Composer, Composition};
use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::resources::{Rule, SecurityGroup};

#[derive(Debug, Clone)]
pub struct SecurityGroupComposer {
    logical_name: String,
    group_name: String,
    description: String,
    vpc_id: String,
    ingress: Vec<Rule>,
    egress: Vec<Rule>,
}

impl SecurityGroupComposer {
    pub fn new(
        logical_name: impl Into<String>,
        group_name: impl Into<String>,
        description: impl Into<String>,
        vpc_id: impl Into<String>,
    ) -> Self {
        Self {
            logical_name: logical_name.into(),
            group_name: group_name.into(),
            description: description.into(),
            vpc_id: vpc_id.into(),
            ingress: Vec::new(),
            egress: Vec::new(),
        }
    }

    pub fn allow_ingress(mut self, rule: Rule) -> Self {
        self.ingress.push(rule);
        self
    }

    pub fn allow_egress(mut self, rule: Rule) -> Self {
        self.egress.push(rule);
        self
    }
}

impl Composer for SecurityGroupComposer {
    fn compose(&self) -> Result<Composition> {
        validate_logical_name(&self.logical_name)?;
        if self.group_name.is_empty() || self.group_name.len() > 255 {
            return Err(TemplateError::Composition(format!(
                "invalid security group name: '{}'",
                self.group_name
            )));
        }
        if self.group_name.starts_with("sg-") {
            return Err(TemplateError::Composition(
                "security group name cannot start with 'sg-'".into(),
            ));
        }
        if self.description.is_empty() {
            return Err(TemplateError::Composition(
                "security group description is empty".into(),
            ));
        }
        if self.vpc_id.trim().is_empty() {
            return Err(TemplateError::Composition("VPC id is empty".into()));
        }
        for rule in self.ingress.iter().chain(&self.egress) {
            rule.validate()?;
        }

        let mut c = Composition::new();
        c.add_exposed(
            SecurityGroup::new(
                &self.logical_name,
                &self.group_name,
                &self.description,
                Intrinsic::literal(self.vpc_id.as_str()),
            )
            .with_ingress(self.ingress.clone())
            .with_egress(self.egress.clone()),
        );
        Ok(c)
    }
}
