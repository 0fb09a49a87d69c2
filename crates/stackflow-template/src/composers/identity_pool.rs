//! Cognito user pool with a hosted sign-in domain

use super::validate_fqdn;
use crate::composition::{Composer, Composition};
use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::resources::{UserPool, UserPoolClient, UserPoolDomain};

/// Custom Cognito domains are fronted by CloudFront, which only accepts
/// certificates issued in us-east-1.
const CERTIFICATE_ARN_PREFIX: &str = "arn:aws:acm:us-east-1:";

#[derive(Debug, Clone)]
pub struct IdentityPoolComposer {
    cluster: String,
    domain: String,
    certificate_arn: String,
    callback_urls: Vec<String>,
}

impl IdentityPoolComposer {
    pub fn new(
        cluster: impl Into<String>,
        domain: impl Into<String>,
        certificate_arn: impl Into<String>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            domain: domain.into(),
            certificate_arn: certificate_arn.into(),
            callback_urls: Vec::new(),
        }
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_urls.push(url.into());
        self
    }
}

impl Composer for IdentityPoolComposer {
    fn compose(&self) -> Result<Composition> {
        if self.cluster.trim().is_empty() {
            return Err(TemplateError::Composition("cluster name is empty".into()));
        }
        validate_fqdn(&self.domain)?;
        if !self.certificate_arn.starts_with(CERTIFICATE_ARN_PREFIX) {
            return Err(TemplateError::Composition(format!(
                "certificate for the sign-in domain must be issued in us-east-1, got '{}'",
                self.certificate_arn
            )));
        }
        if let Some(url) = self
            .callback_urls
            .iter()
            .find(|url| !url.starts_with("https://"))
        {
            return Err(TemplateError::Composition(format!(
                "callback URL must use https: '{}'",
                url
            )));
        }

        let mut c = Composition::new();
        let pool = c.add_exposed(UserPool::new(
            "UserPool",
            format!("{}-users", self.cluster),
        ));
        c.add_exposed(UserPoolClient::new(
            "UserPoolClient",
            format!("{}-client", self.cluster),
            pool,
            self.callback_urls.clone(),
        ));
        c.add_exposed(UserPoolDomain::new(
            "UserPoolDomain",
            &self.domain,
            pool,
            Intrinsic::literal(self.certificate_arn.as_str()),
        ));
        Ok(c)
    }
}
