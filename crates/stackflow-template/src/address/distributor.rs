//! Round-robin assignment of subnets to (type, zone) slots

use crate::error::{Result, TemplateError};
use serde::{Deserialize, Serialize};

/// Role a subnet plays in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetType {
    Public,
    Private,
    Database,
}

impl SubnetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetType::Public => "public",
            SubnetType::Private => "private",
            SubnetType::Database => "database",
        }
    }

    /// Prefix used for logical resource names, e.g. `PublicSubnet00`
    pub fn title(&self) -> &'static str {
        match self {
            SubnetType::Public => "Public",
            SubnetType::Private => "Private",
            SubnetType::Database => "Database",
        }
    }
}

impl std::fmt::Display for SubnetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slot handed out by [`Distributor::next`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub subnet_type: SubnetType,
    pub zone: String,
    /// Ordinal of this slot among the slots of the same type
    pub index: usize,
}

/// Cycles through types in fixed order, and through zones independently
/// per type, so every zone of a type is used once before any repeats.
///
/// State is never reset; build a fresh distributor per planning pass.
#[derive(Debug, Clone)]
pub struct Distributor {
    types: Vec<SubnetType>,
    zones: Vec<String>,
    type_cursor: usize,
    zone_cursors: Vec<usize>,
}

impl Distributor {
    pub fn new(types: &[SubnetType], zones: &[String]) -> Result<Self> {
        let mut unique_types: Vec<SubnetType> = Vec::with_capacity(types.len());
        for t in types {
            if !unique_types.contains(t) {
                unique_types.push(*t);
            }
        }

        let mut unique_zones: Vec<String> = Vec::with_capacity(zones.len());
        for z in zones {
            if !unique_zones.contains(z) {
                unique_zones.push(z.clone());
            }
        }

        if unique_types.is_empty() {
            return Err(TemplateError::Distributor(
                "at least one subnet type is required".into(),
            ));
        }
        if unique_zones.is_empty() {
            return Err(TemplateError::Distributor(
                "at least one availability zone is required".into(),
            ));
        }

        let zone_cursors = vec![0; unique_types.len()];
        Ok(Self {
            types: unique_types,
            zones: unique_zones,
            type_cursor: 0,
            zone_cursors,
        })
    }

    pub fn types(&self) -> &[SubnetType] {
        &self.types
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Hand out the next slot
    pub fn next(&mut self) -> Slot {
        let type_idx = self.type_cursor % self.types.len();
        self.type_cursor += 1;

        let visits = self.zone_cursors[type_idx];
        self.zone_cursors[type_idx] += 1;

        Slot {
            subnet_type: self.types[type_idx],
            zone: self.zones[visits % self.zones.len()].clone(),
            index: visits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn zones() -> Vec<String> {
        vec!["eu-west-1a".into(), "eu-west-1b".into(), "eu-west-1c".into()]
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(Distributor::new(&[], &zones()).is_err());
        assert!(Distributor::new(&[SubnetType::Public], &[]).is_err());
    }

    #[test]
    fn test_types_round_robin_and_zones_per_type() {
        let mut d = Distributor::new(&[SubnetType::Public, SubnetType::Private], &zones()).unwrap();
        let slots: Vec<Slot> = (0..4).map(|_| d.next()).collect();

        assert_eq!(slots[0].subnet_type, SubnetType::Public);
        assert_eq!(slots[0].zone, "eu-west-1a");
        assert_eq!(slots[1].subnet_type, SubnetType::Private);
        assert_eq!(slots[1].zone, "eu-west-1a");
        assert_eq!(slots[2].subnet_type, SubnetType::Public);
        assert_eq!(slots[2].zone, "eu-west-1b");
        assert_eq!(slots[2].index, 1);
        assert_eq!(slots[3].subnet_type, SubnetType::Private);
        assert_eq!(slots[3].zone, "eu-west-1b");
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let d = Distributor::new(
            &[SubnetType::Public, SubnetType::Public, SubnetType::Database],
            &["a".to_string(), "a".to_string()],
        )
        .unwrap();
        assert_eq!(d.types(), &[SubnetType::Public, SubnetType::Database]);
        assert_eq!(d.zones(), &["a".to_string()]);
    }

    #[test]
    fn test_every_pair_once_before_repeat() {
        let types = [SubnetType::Public, SubnetType::Private, SubnetType::Database];
        let mut d = Distributor::new(&types, &zones()).unwrap();

        let mut seen = HashSet::new();
        for _ in 0..types.len() * zones().len() {
            let slot = d.next();
            assert!(seen.insert((slot.subnet_type, slot.zone)));
        }
        assert_eq!(seen.len(), 9);

        let again = d.next();
        assert!(seen.contains(&(again.subnet_type, again.zone)));
    }
}
