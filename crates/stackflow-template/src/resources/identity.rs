//! Cognito user pools

use crate::error::Result;
use crate::intrinsic::Intrinsic;
use crate::output::Output;
use crate::resource::{Handle, Link, Resolver, Resource};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct UserPool {
    name: String,
    pool_name: String,
}

impl UserPool {
    pub fn new(name: impl Into<String>, pool_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pool_name: pool_name.into(),
        }
    }
}

impl Resource for UserPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::Cognito::UserPool"
    }

    fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "UserPoolName": self.pool_name,
            "AdminCreateUserConfig": { "AllowAdminCreateUserOnly": true },
            "AutoVerifiedAttributes": ["email"],
            "UsernameAttributes": ["email"],
            "MfaConfiguration": "OPTIONAL",
            "EnabledMfas": ["SOFTWARE_TOKEN_MFA"],
            "Policies": {
                "PasswordPolicy": {
                    "MinimumLength": 12,
                    "RequireLowercase": true,
                    "RequireNumbers": true,
                    "RequireSymbols": true,
                    "RequireUppercase": true,
                    "TemporaryPasswordValidityDays": 7
                }
            },
        }))
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(format!("{}Id", self.name), self.reference())]
    }
}

#[derive(Debug, Clone)]
pub struct UserPoolClient {
    name: String,
    client_name: String,
    pool: Handle,
    callback_urls: Vec<String>,
}

impl UserPoolClient {
    pub fn new(
        name: impl Into<String>,
        client_name: impl Into<String>,
        pool: Handle,
        callback_urls: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client_name: client_name.into(),
            pool,
            callback_urls,
        }
    }
}

impl Resource for UserPoolClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::Cognito::UserPoolClient"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "ClientName": self.client_name,
            "UserPoolId": refs.reference(self.pool)?,
            "GenerateSecret": true,
            "AllowedOAuthFlowsUserPoolClient": true,
            "AllowedOAuthFlows": ["code"],
            "AllowedOAuthScopes": ["email", "openid", "profile"],
            "CallbackURLs": self.callback_urls,
            "SupportedIdentityProviders": ["COGNITO"],
        }))
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(format!("{}Id", self.name), self.reference())]
    }
}

/// Custom hosted-UI domain for a user pool
#[derive(Debug, Clone)]
pub struct UserPoolDomain {
    name: String,
    domain: String,
    pool: Handle,
    certificate: Link,
}

impl UserPoolDomain {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        pool: Handle,
        certificate: impl Into<Link>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            pool,
            certificate: certificate.into(),
        }
    }
}

impl Resource for UserPoolDomain {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::Cognito::UserPoolDomain"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "Domain": self.domain,
            "UserPoolId": refs.reference(self.pool)?,
            "CustomDomainConfig": { "CertificateArn": refs.resolve(&self.certificate)? },
        }))
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(
            format!("{}CloudFrontDomainName", self.name),
            Intrinsic::attribute(&self.name, "CloudFrontDistribution"),
        )]
    }
}
