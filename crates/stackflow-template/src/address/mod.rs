//! Address allocator: validated blocks partitioned into typed, zoned subnets

mod block;
mod cidr;
mod distributor;

pub use block::{AddressBlock, AddressRequirement, private_ranges};
pub use cidr::Cidr;
pub use distributor::{Distributor, Slot, SubnetType};

use crate::error::{Result, TemplateError};
use std::collections::BTreeMap;

/// A sub-block of an [`AddressBlock`] tagged with its role and zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub cidr: Cidr,
    pub subnet_type: SubnetType,
    pub zone: String,
    pub index: usize,
}

impl Subnet {
    /// Logical resource name, e.g. `PrivateSubnet02`
    pub fn logical_name(&self) -> String {
        format!("{}Subnet{:02}", self.subnet_type.title(), self.index)
    }
}

/// Subnets grouped by type, each group in allocation order
pub type Subnets = BTreeMap<SubnetType, Vec<Subnet>>;

/// Carve `count` consecutive blocks of `prefix_len` bits out of `block`,
/// handing each one to `create` to be tagged.
pub fn partition<F>(block: &AddressBlock, count: usize, prefix_len: u8, mut create: F) -> Result<Subnets>
where
    F: FnMut(Cidr) -> Result<Subnet>,
{
    let parent = block.cidr();
    if prefix_len < parent.prefix_len() {
        return Err(TemplateError::InvalidCidr(format!(
            "subnet prefix /{} is larger than block {}",
            prefix_len, parent
        )));
    }

    let mut subnets = Subnets::new();
    let mut current = Cidr::new(parent.network(), prefix_len)?;

    for i in 0..count {
        if i > 0 {
            current = current.next(prefix_len).ok_or_else(|| {
                TemplateError::InvalidCidr(format!("address space exhausted after {}", current))
            })?;
        }
        if !parent.contains(&current) {
            return Err(TemplateError::InsufficientAddresses {
                block: parent.to_string(),
                required: (count as u64) * current.size(),
                available: parent.size(),
            });
        }

        let subnet = create(current)?;
        subnets.entry(subnet.subnet_type).or_default().push(subnet);
    }

    Ok(subnets)
}

/// [`partition`] with slots drawn from `distributor`
pub fn distribute(
    block: &AddressBlock,
    count: usize,
    prefix_len: u8,
    distributor: &mut Distributor,
) -> Result<Subnets> {
    partition(block, count, prefix_len, |cidr| {
        let slot = distributor.next();
        Ok(Subnet {
            cidr,
            subnet_type: slot.subnet_type,
            zone: slot.zone,
            index: slot.index,
        })
    })
}
