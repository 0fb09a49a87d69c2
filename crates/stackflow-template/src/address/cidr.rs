//! IPv4 network blocks in CIDR notation

use crate::error::{Result, TemplateError};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// An IPv4 network. Host bits are cleared on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

fn mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

impl Cidr {
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(TemplateError::InvalidCidr(format!(
                "IPv4 prefix length must be <= 32, got {}",
                prefix_len
            )));
        }
        Ok(Self {
            network: Ipv4Addr::from(u32::from(address) & mask(prefix_len)),
            prefix_len,
        })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    pub fn first(&self) -> Ipv4Addr {
        self.network
    }

    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !mask(self.prefix_len))
    }

    pub fn contains_addr(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask(self.prefix_len) == u32::from(self.network)
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Cidr) -> bool {
        self.prefix_len <= other.prefix_len
            && self.contains_addr(other.first())
            && self.contains_addr(other.last())
    }

    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.contains_addr(other.first()) || other.contains_addr(self.first())
    }

    /// The block of `prefix_len` bits that starts right after this one
    pub fn next(&self, prefix_len: u8) -> Option<Cidr> {
        let start = u32::from(self.last()).checked_add(1)?;
        Cidr::new(Ipv4Addr::from(start), prefix_len).ok()
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Cidr {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        let (address, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| TemplateError::InvalidCidr(format!("Invalid CIDR notation: {}", s)))?;

        let address = match address.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => v4,
            Ok(IpAddr::V6(_)) => {
                return Err(TemplateError::InvalidCidr(format!(
                    "{} is not an IPv4 block",
                    s
                )));
            }
            Err(e) => {
                return Err(TemplateError::InvalidCidr(format!(
                    "Invalid IPv4 address in {}: {}",
                    s, e
                )));
            }
        };

        let prefix_len = prefix.parse::<u8>().map_err(|e| {
            TemplateError::InvalidCidr(format!("Invalid prefix length in {}: {}", s, e))
        })?;

        Self::new(address, prefix_len)
    }
}
