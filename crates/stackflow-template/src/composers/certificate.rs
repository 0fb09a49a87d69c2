//! DNS-validated certificate stack

use super::{validate_fqdn, validate_logical_name};
use crate::composition::{Composer, Composition};
use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::resources::{Certificate, KeyAlgorithm};

#[derive(Debug, Clone)]
pub struct CertificateComposer {
    logical_name: String,
    domain: String,
    hosted_zone_id: String,
    algorithm: KeyAlgorithm,
}

impl CertificateComposer {
    pub fn new(domain: impl Into<String>, hosted_zone_id: impl Into<String>) -> Self {
        Self {
            logical_name: "Certificate".to_string(),
            domain: domain.into(),
            hosted_zone_id: hosted_zone_id.into(),
            algorithm: KeyAlgorithm::default(),
        }
    }

    pub fn with_logical_name(mut self, logical_name: impl Into<String>) -> Self {
        self.logical_name = logical_name.into();
        self
    }

    pub fn with_algorithm(mut self, algorithm: KeyAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

impl Composer for CertificateComposer {
    fn compose(&self) -> Result<Composition> {
        validate_logical_name(&self.logical_name)?;
        validate_fqdn(&self.domain)?;
        if self.hosted_zone_id.is_empty()
            || !self.hosted_zone_id.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(TemplateError::Composition(format!(
                "invalid hosted zone id: '{}'",
                self.hosted_zone_id
            )));
        }

        let mut c = Composition::new();
        c.add_exposed(Certificate::new(
            &self.logical_name,
            &self.domain,
            Intrinsic::literal(self.hosted_zone_id.as_str()),
            self.algorithm,
        ));
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use serde_json::{Value, json};

    #[test]
    fn test_certificate_template() {
        let composition = CertificateComposer::new("auth.example.com", "Z123ABC")
            .with_algorithm(KeyAlgorithm::EcPrime256v1)
            .compose()
            .unwrap();
        let bytes = Builder::new().build([&composition]).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();

        let properties = &doc["Resources"]["Certificate"]["Properties"];
        assert_eq!(properties["KeyAlgorithm"], json!("EC_prime256v1"));
        assert_eq!(
            properties["DomainValidationOptions"][0]["HostedZoneId"],
            json!("Z123ABC")
        );
        assert_eq!(doc["Outputs"]["Certificate"]["Value"], json!({"Ref": "Certificate"}));
    }

    #[test]
    fn test_invalid_domain() {
        assert!(CertificateComposer::new("not a domain", "Z123").compose().is_err());
        assert!(CertificateComposer::new("example.com", "").compose().is_err());
    }
}
