//! Composers for the infrastructure features StackFlow provisions

pub mod certificate;
pub mod identity_pool;
pub mod managed_policy;
pub mod postgres;
pub mod security_group;
pub mod vpc;

pub use certificate::CertificateComposer;
pub use identity_pool::IdentityPoolComposer;
pub use managed_policy::ManagedPolicyComposer;
pub use postgres::{PostgresComposer, Rotation};
pub use security_group::SecurityGroupComposer;
pub use vpc::VpcComposer;

use crate::error::{Result, TemplateError};

/// Logical ids are alphanumeric and at most 255 characters
pub(crate) fn validate_logical_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 255 || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TemplateError::Composition(format!(
            "invalid logical name '{}': use 1-255 letters and digits",
            name
        )));
    }
    Ok(())
}

/// Fully qualified domain name, optionally with a leading wildcard label
pub(crate) fn validate_fqdn(domain: &str) -> Result<()> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();

    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    let valid = domain.len() <= 253
        && labels.len() >= 2
        && labels
            .iter()
            .enumerate()
            .all(|(i, label)| (i == 0 && *label == "*") || valid_label(label));

    if !valid {
        return Err(TemplateError::Composition(format!(
            "invalid domain name: '{}'",
            domain
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_names() {
        assert!(validate_logical_name("PublicSubnet00").is_ok());
        assert!(validate_logical_name("public-subnet").is_err());
        assert!(validate_logical_name("").is_err());
    }

    #[test]
    fn test_fqdn() {
        assert!(validate_fqdn("auth.example.com").is_ok());
        assert!(validate_fqdn("*.example.com").is_ok());
        assert!(validate_fqdn("example.com.").is_ok());
        assert!(validate_fqdn("localhost").is_err());
        assert!(validate_fqdn("a..b").is_err());
        assert!(validate_fqdn("-bad.example.com").is_err());
        assert!(validate_fqdn("foo.*.example.com").is_err());
    }
}
