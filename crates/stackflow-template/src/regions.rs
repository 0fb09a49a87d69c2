//! Supported regions and their availability zones

use crate::error::{Result, TemplateError};

const SUPPORTED: &[(&str, &[&str])] = &[
    ("eu-west-1", &["a", "b", "c"]),
    ("eu-central-1", &["a", "b", "c"]),
    ("eu-north-1", &["a", "b", "c"]),
    ("us-east-1", &["a", "b", "c"]),
    ("us-west-2", &["a", "b", "c"]),
];

pub fn supported_regions() -> Vec<&'static str> {
    SUPPORTED.iter().map(|(r, _)| *r).collect()
}

/// Availability zones used for subnet placement in `region`
pub fn availability_zones(region: &str) -> Result<Vec<String>> {
    SUPPORTED
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(r, zones)| zones.iter().map(|z| format!("{}{}", r, z)).collect())
        .ok_or_else(|| {
            TemplateError::UnsupportedRegion(format!(
                "{} (supported: {})",
                region,
                supported_regions().join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zones_for_supported_region() {
        assert_eq!(
            availability_zones("eu-west-1").unwrap(),
            vec!["eu-west-1a", "eu-west-1b", "eu-west-1c"]
        );
    }

    #[test]
    fn test_unsupported_region() {
        let err = availability_zones("mars-north-1").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedRegion(_)));
    }
}
