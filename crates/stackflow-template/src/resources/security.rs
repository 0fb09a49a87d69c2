//! Security groups, IAM policies and roles

use crate::address::Cidr;
use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::output::Output;
use crate::resource::{Link, Resolver, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One security group ingress or egress rule.
///
/// Rules compare by value; the patch engine relies on this to find a rule
/// inside a deployed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rule {
    pub ip_protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_security_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Rule {
    pub fn tcp(port: u16, cidr: impl Into<String>) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            from_port: Some(port),
            to_port: Some(port),
            cidr_ip: Some(cidr.into()),
            source_security_group_id: None,
            description: None,
        }
    }

    pub fn tcp_from_group(port: u16, group_id: impl Into<String>) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            from_port: Some(port),
            to_port: Some(port),
            cidr_ip: None,
            source_security_group_id: Some(group_id.into()),
            description: None,
        }
    }

    /// All traffic to `cidr`
    pub fn all(cidr: impl Into<String>) -> Self {
        Self {
            ip_protocol: "-1".to_string(),
            from_port: None,
            to_port: None,
            cidr_ip: Some(cidr.into()),
            source_security_group_id: None,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.ip_protocol.as_str() {
            "tcp" | "udp" => match (self.from_port, self.to_port) {
                (Some(from), Some(to)) if from <= to => {}
                _ => {
                    return Err(TemplateError::Composition(format!(
                        "{} rule needs a port range with from <= to",
                        self.ip_protocol
                    )));
                }
            },
            "icmp" | "-1" => {}
            other => {
                return Err(TemplateError::Composition(format!(
                    "unsupported rule protocol: {}",
                    other
                )));
            }
        }

        match (&self.cidr_ip, &self.source_security_group_id) {
            (Some(cidr), None) => {
                cidr.parse::<Cidr>()?;
            }
            (None, Some(_)) => {}
            _ => {
                return Err(TemplateError::Composition(
                    "rule needs exactly one of a CIDR or a source security group".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct SecurityGroup {
    name: String,
    group_name: String,
    description: String,
    vpc: Link,
    ingress: Vec<Rule>,
    egress: Vec<Rule>,
}

impl SecurityGroup {
    pub fn new(
        name: impl Into<String>,
        group_name: impl Into<String>,
        description: impl Into<String>,
        vpc: impl Into<Link>,
    ) -> Self {
        Self {
            name: name.into(),
            group_name: group_name.into(),
            description: description.into(),
            vpc: vpc.into(),
            ingress: Vec::new(),
            egress: Vec::new(),
        }
    }

    pub fn with_ingress(mut self, rules: Vec<Rule>) -> Self {
        self.ingress = rules;
        self
    }

    pub fn with_egress(mut self, rules: Vec<Rule>) -> Self {
        self.egress = rules;
        self
    }
}

impl Resource for SecurityGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::SecurityGroup"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        let mut properties = json!({
            "GroupName": self.group_name,
            "GroupDescription": self.description,
            "VpcId": refs.resolve(&self.vpc)?,
        });
        if !self.ingress.is_empty() {
            properties["SecurityGroupIngress"] = Value::Array(
                self.ingress
                    .iter()
                    .map(Rule::to_value)
                    .collect::<Result<_>>()?,
            );
        }
        if !self.egress.is_empty() {
            properties["SecurityGroupEgress"] = Value::Array(
                self.egress
                    .iter()
                    .map(Rule::to_value)
                    .collect::<Result<_>>()?,
            );
        }
        Ok(properties)
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(
            format!("{}GroupId", self.name),
            Intrinsic::attribute(&self.name, "GroupId"),
        )]
    }
}

/// IAM policy statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    pub action: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl Statement {
    pub fn allow(actions: &[&str], resources: &[&str]) -> Self {
        Self {
            effect: Effect::Allow,
            principal: None,
            action: actions.iter().map(|a| a.to_string()).collect(),
            resource: resources.iter().map(|r| r.to_string()).collect(),
            condition: None,
        }
    }

    /// Trust statement letting `service` assume a role
    pub fn assume_role(service: &str) -> Self {
        Self {
            effect: Effect::Allow,
            principal: Some(json!({ "Service": [service] })),
            action: vec!["sts:AssumeRole".to_string()],
            resource: Vec::new(),
            condition: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: "2012-10-17".to_string(),
            statement: statements,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.statement.is_empty() {
            return Err(TemplateError::Composition(
                "policy document has no statements".into(),
            ));
        }
        for statement in &self.statement {
            if statement.action.is_empty() {
                return Err(TemplateError::Composition(
                    "policy statement has no actions".into(),
                ));
            }
            if statement.principal.is_none() && statement.resource.is_empty() {
                return Err(TemplateError::Composition(
                    "policy statement has neither resources nor a principal".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct ManagedPolicy {
    name: String,
    policy_name: String,
    description: String,
    document: PolicyDocument,
}

impl ManagedPolicy {
    pub fn new(
        name: impl Into<String>,
        policy_name: impl Into<String>,
        description: impl Into<String>,
        document: PolicyDocument,
    ) -> Self {
        Self {
            name: name.into(),
            policy_name: policy_name.into(),
            description: description.into(),
            document,
        }
    }
}

impl Resource for ManagedPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::IAM::ManagedPolicy"
    }

    fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "ManagedPolicyName": self.policy_name,
            "Description": self.description,
            "PolicyDocument": self.document.to_value()?,
        }))
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(self.name.clone(), self.reference())]
    }
}

#[derive(Debug, Clone)]
pub struct Role {
    name: String,
    trust: PolicyDocument,
    managed_policies: Vec<Link>,
    inline: Vec<(String, PolicyDocument)>,
}

impl Role {
    pub fn new(name: impl Into<String>, trust: PolicyDocument) -> Self {
        Self {
            name: name.into(),
            trust,
            managed_policies: Vec::new(),
            inline: Vec::new(),
        }
    }

    pub fn with_managed_policy(mut self, policy: impl Into<Link>) -> Self {
        self.managed_policies.push(policy.into());
        self
    }

    pub fn with_inline_policy(mut self, name: impl Into<String>, document: PolicyDocument) -> Self {
        self.inline.push((name.into(), document));
        self
    }
}

impl Resource for Role {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::IAM::Role"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        let managed = self
            .managed_policies
            .iter()
            .map(|p| refs.resolve(p))
            .collect::<Result<Vec<_>>>()?;
        let mut inline = Vec::with_capacity(self.inline.len());
        for (name, doc) in &self.inline {
            inline.push(json!({ "PolicyName": name, "PolicyDocument": doc.to_value()? }));
        }

        let mut properties = json!({ "AssumeRolePolicyDocument": self.trust.to_value()? });
        if !managed.is_empty() {
            properties["ManagedPolicyArns"] = serde_json::to_value(managed)?;
        }
        if !inline.is_empty() {
            properties["Policies"] = Value::Array(inline);
        }
        Ok(properties)
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(
            format!("{}Arn", self.name),
            Intrinsic::attribute(&self.name, "Arn"),
        )]
    }
}
