//! Validated address blocks

use super::cidr::Cidr;
use crate::error::{Result, TemplateError};
use std::net::Ipv4Addr;

/// How many subnets of which size a block has to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRequirement {
    pub subnets: u32,
    pub prefix_len: u8,
}

impl AddressRequirement {
    pub fn new(subnets: u32, prefix_len: u8) -> Self {
        Self {
            subnets,
            prefix_len,
        }
    }

    pub fn hosts_per_subnet(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len.min(32)))
    }

    /// `subnets × hosts per subnet`, rounded up to the next power of two.
    ///
    /// A requirement for zero subnets, or one too large to count in 64
    /// bits, is rejected.
    pub fn required_addresses(&self) -> Result<u64> {
        if self.subnets == 0 {
            return Err(TemplateError::Composition(
                "address requirement needs at least one subnet".into(),
            ));
        }
        u64::from(self.subnets)
            .checked_mul(self.hosts_per_subnet())
            .and_then(u64::checked_next_power_of_two)
            .ok_or_else(|| {
                TemplateError::Composition(format!(
                    "address requirement of {} /{} subnets is too large",
                    self.subnets, self.prefix_len
                ))
            })
    }
}

/// RFC 1918 private ranges
pub fn private_ranges() -> Vec<Cidr> {
    vec![
        Cidr::new(Ipv4Addr::new(10, 0, 0, 0), 8),
        Cidr::new(Ipv4Addr::new(172, 16, 0, 0), 12),
        Cidr::new(Ipv4Addr::new(192, 168, 0, 0), 16),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// An IPv4 block that is parseable, big enough for its requirement and
/// inside one of the approved ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBlock {
    cidr: Cidr,
}

impl AddressBlock {
    pub fn new(
        candidate: &str,
        requirement: AddressRequirement,
        approved: &[Cidr],
    ) -> Result<Self> {
        let cidr: Cidr = candidate.parse()?;

        if requirement.prefix_len > 32 {
            return Err(TemplateError::InvalidCidr(format!(
                "subnet prefix length must be <= 32, got {}",
                requirement.prefix_len
            )));
        }

        let required = requirement.required_addresses()?;
        let available = cidr.size();
        if available < required {
            return Err(TemplateError::InsufficientAddresses {
                block: cidr.to_string(),
                required,
                available,
            });
        }

        if !approved.iter().any(|range| range.contains(&cidr)) {
            let approved = approved
                .iter()
                .map(Cidr::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(TemplateError::UnapprovedRange {
                block: cidr.to_string(),
                approved,
            });
        }

        Ok(Self { cidr })
    }

    pub fn cidr(&self) -> Cidr {
        self.cidr
    }
}

impl std::fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cidr.fmt(f)
    }
}
