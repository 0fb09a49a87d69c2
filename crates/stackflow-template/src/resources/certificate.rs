//! ACM certificates

use crate::error::{Result, TemplateError};
use crate::output::Output;
use crate::resource::{Link, Resolver, Resource};
use serde_json::{Value, json};
use std::str::FromStr;

/// Key algorithm for the issued certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    #[default]
    Rsa2048,
    EcPrime256v1,
    EcSecp384r1,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa2048 => "RSA_2048",
            KeyAlgorithm::EcPrime256v1 => "EC_prime256v1",
            KeyAlgorithm::EcSecp384r1 => "EC_secp384r1",
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RSA_2048" => Ok(KeyAlgorithm::Rsa2048),
            "EC_prime256v1" => Ok(KeyAlgorithm::EcPrime256v1),
            "EC_secp384r1" => Ok(KeyAlgorithm::EcSecp384r1),
            other => Err(TemplateError::Composition(format!(
                "unsupported key algorithm: {}",
                other
            ))),
        }
    }
}

/// DNS-validated certificate
#[derive(Debug, Clone)]
pub struct Certificate {
    name: String,
    domain: String,
    hosted_zone: Link,
    algorithm: KeyAlgorithm,
}

impl Certificate {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        hosted_zone: impl Into<Link>,
        algorithm: KeyAlgorithm,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            hosted_zone: hosted_zone.into(),
            algorithm,
        }
    }
}

impl Resource for Certificate {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::CertificateManager::Certificate"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "DomainName": self.domain,
            "KeyAlgorithm": self.algorithm.as_str(),
            "ValidationMethod": "DNS",
            "DomainValidationOptions": [{
                "DomainName": self.domain,
                "HostedZoneId": refs.resolve(&self.hosted_zone)?,
            }],
        }))
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(self.name.clone(), self.reference())]
    }
}
