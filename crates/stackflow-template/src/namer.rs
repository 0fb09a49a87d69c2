//! Deterministic stack names
//!
//! The same logical identity always yields the same name, which is what
//! lets create and delete stay idempotent without local bookkeeping.

use crate::error::{Result, TemplateError};
use sha2::{Digest, Sha256};

pub const DEFAULT_PREFIX: &str = "stackflow";

const MAX_STACK_NAME: usize = 128;
const MAX_PREFIX: usize = 32;
const DIGEST_CHARS: usize = 8;

/// What a stack is for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Purpose {
    Vpc,
    ManagedPolicy,
    SecurityGroup,
    Certificate,
    IdentityPool,
    Postgres,
    Custom(String),
}

impl Purpose {
    pub fn as_str(&self) -> &str {
        match self {
            Purpose::Vpc => "vpc",
            Purpose::ManagedPolicy => "policy",
            Purpose::SecurityGroup => "securitygroup",
            Purpose::Certificate => "certificate",
            Purpose::IdentityPool => "identitypool",
            Purpose::Postgres => "postgres",
            Purpose::Custom(s) => s,
        }
    }
}

/// Derives stack names of the form `<prefix>-<purpose>-<cluster>[-<disambiguator>]`.
///
/// Segments that are not plain alphanumerics get sanitized; whenever that
/// loses information, or the name would exceed the 128 character limit, a
/// short digest of the raw identity is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackNamer {
    prefix: String,
}

impl Default for StackNamer {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl StackNamer {
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let valid = prefix.len() <= MAX_PREFIX
            && prefix.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !prefix.ends_with('-');
        if !valid {
            return Err(TemplateError::Composition(format!(
                "invalid stack name prefix '{}': must start with a letter and contain only letters, digits and inner hyphens (max {} chars)",
                prefix, MAX_PREFIX
            )));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name(&self, purpose: &Purpose, cluster: &str, disambiguator: Option<&str>) -> String {
        let mut raw = vec![purpose.as_str(), cluster];
        if let Some(d) = disambiguator {
            raw.push(d);
        }

        let sanitized: Vec<String> = raw.iter().map(|s| sanitize(s)).collect();
        let lossless = raw.iter().zip(&sanitized).all(|(r, s)| {
            !r.is_empty() && r.chars().all(|c| c.is_ascii_alphanumeric()) && *r == s.as_str()
        });

        let mut name = self.prefix.clone();
        for segment in sanitized.iter().filter(|s| !s.is_empty()) {
            name.push('-');
            name.push_str(segment);
        }

        if lossless && name.len() <= MAX_STACK_NAME {
            return name;
        }

        let digest = digest(&self.prefix, &raw);
        name.truncate(MAX_STACK_NAME - DIGEST_CHARS - 1);
        while name.ends_with('-') {
            name.pop();
        }
        format!("{}-{}", name, digest)
    }
}

fn sanitize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn digest(prefix: &str, raw: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    for segment in raw {
        hasher.update([0u8]);
        hasher.update(segment.as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .take(DIGEST_CHARS / 2)
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_readable() {
        let namer = StackNamer::default();
        assert_eq!(namer.name(&Purpose::Vpc, "prod", None), "stackflow-vpc-prod");
        assert_eq!(
            namer.name(&Purpose::Postgres, "prod", Some("orders")),
            "stackflow-postgres-prod-orders"
        );
    }

    #[test]
    fn test_names_are_deterministic() {
        let namer = StackNamer::default();
        let a = namer.name(&Purpose::ManagedPolicy, "my_cluster", Some("external dns"));
        let b = namer.name(&Purpose::ManagedPolicy, "my_cluster", Some("external dns"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_lossy_sanitization_does_not_collide() {
        let namer = StackNamer::default();
        let underscored = namer.name(&Purpose::Vpc, "my_cluster", None);
        let hyphenated = namer.name(&Purpose::Vpc, "my-cluster", None);
        assert_ne!(underscored, hyphenated);
        assert!(underscored.starts_with("stackflow-vpc-my-cluster-"));

        let split = namer.name(&Purpose::Vpc, "prod", Some("x"));
        let joined = namer.name(&Purpose::Vpc, "prod-x", None);
        assert_ne!(split, joined);
    }

    #[test]
    fn test_long_names_are_bounded() {
        let namer = StackNamer::default();
        let cluster = "c".repeat(200);
        let name = namer.name(&Purpose::Certificate, &cluster, None);
        assert_eq!(name.len(), MAX_STACK_NAME);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(StackNamer::new("1abc").is_err());
        assert!(StackNamer::new("abc_").is_err());
        assert!(StackNamer::new("okctl").is_ok());
    }
}
