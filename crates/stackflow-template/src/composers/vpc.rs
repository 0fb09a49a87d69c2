//! Network composer: VPC, subnets spread over zones, routing and NAT

use crate::address::{
    AddressBlock, AddressRequirement, Cidr, Distributor, SubnetType, distribute, private_ranges,
};
use crate::composition::{Composer, Composition};
use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::output::Output;
use crate::regions::availability_zones;
use crate::resource::Handle;
use crate::resources::{
    DbSubnetGroup, Eip, InternetGateway, NatGateway, Route, RouteTable, RouteTarget, Subnet,
    SubnetRouteTableAssociation, Vpc, VpcGatewayAttachment,
};
use std::collections::BTreeMap;

pub const DEFAULT_SUBNET_PREFIX: u8 = 24;

const SUBNET_TYPES: [SubnetType; 3] = [SubnetType::Public, SubnetType::Private, SubnetType::Database];

/// Builds one VPC with a public, private and database subnet in every
/// availability zone of the region. Private subnets egress through a NAT
/// gateway in the public subnet of the same zone.
#[derive(Debug, Clone)]
pub struct VpcComposer {
    cluster: String,
    region: String,
    cidr: String,
    approved_ranges: Vec<Cidr>,
    subnet_prefix_len: u8,
}

impl VpcComposer {
    pub fn new(
        cluster: impl Into<String>,
        region: impl Into<String>,
        cidr: impl Into<String>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            region: region.into(),
            cidr: cidr.into(),
            approved_ranges: private_ranges(),
            subnet_prefix_len: DEFAULT_SUBNET_PREFIX,
        }
    }

    pub fn with_approved_ranges(mut self, ranges: Vec<Cidr>) -> Self {
        self.approved_ranges = ranges;
        self
    }

    pub fn with_subnet_prefix_len(mut self, prefix_len: u8) -> Self {
        self.subnet_prefix_len = prefix_len;
        self
    }
}

impl Composer for VpcComposer {
    fn compose(&self) -> Result<Composition> {
        if self.cluster.trim().is_empty() {
            return Err(TemplateError::Composition("cluster name is empty".into()));
        }

        let zones = availability_zones(&self.region)?;
        let count = SUBNET_TYPES.len() * zones.len();
        let block = AddressBlock::new(
            &self.cidr,
            AddressRequirement::new(count as u32, self.subnet_prefix_len),
            &self.approved_ranges,
        )?;
        let mut distributor = Distributor::new(&SUBNET_TYPES, &zones)?;
        let subnets = distribute(&block, count, self.subnet_prefix_len, &mut distributor)?;

        let mut c = Composition::new();
        let vpc = c.add_exposed(Vpc::new("Vpc", block.to_string()));
        let igw = c.add(InternetGateway::new("InternetGateway"));
        let attachment = c.add(VpcGatewayAttachment::new("VpcGatewayAttachment", vpc, igw));

        let public_table = c.add(RouteTable::new("PublicRouteTable", vpc));
        c.add(
            Route::new(
                "PublicRoute",
                public_table,
                "0.0.0.0/0",
                RouteTarget::InternetGateway(igw),
            )
            .after(attachment),
        );

        let mut nat_by_zone: BTreeMap<&str, Handle> = BTreeMap::new();
        let mut public = Vec::new();
        for s in subnets.get(&SubnetType::Public).into_iter().flatten() {
            let name = s.logical_name();
            let subnet = c.add(Subnet::new(&name, vpc, s.cidr.to_string(), &s.zone, true));
            c.add(SubnetRouteTableAssociation::new(
                format!("{}RouteTableAssociation", name),
                subnet,
                public_table,
            ));
            let eip = c.add(Eip::new(format!("NatGatewayEip{:02}", s.index), attachment));
            let nat = c.add(NatGateway::new(format!("NatGateway{:02}", s.index), eip, subnet));
            nat_by_zone.insert(&s.zone, nat);
            public.push(subnet);
        }

        let mut private = Vec::new();
        for s in subnets.get(&SubnetType::Private).into_iter().flatten() {
            let nat = *nat_by_zone.get(s.zone.as_str()).ok_or_else(|| {
                TemplateError::Composition(format!("no NAT gateway in zone {}", s.zone))
            })?;
            let name = s.logical_name();
            let subnet = c.add(Subnet::new(&name, vpc, s.cidr.to_string(), &s.zone, false));
            let table = c.add(RouteTable::new(format!("PrivateRouteTable{:02}", s.index), vpc));
            c.add(Route::new(
                format!("PrivateRoute{:02}", s.index),
                table,
                "0.0.0.0/0",
                RouteTarget::NatGateway(nat),
            ));
            c.add(SubnetRouteTableAssociation::new(
                format!("{}RouteTableAssociation", name),
                subnet,
                table,
            ));
            private.push(subnet);
        }

        let mut database = Vec::new();
        for s in subnets.get(&SubnetType::Database).into_iter().flatten() {
            let name = s.logical_name();
            database.push(c.add(Subnet::new(&name, vpc, s.cidr.to_string(), &s.zone, false)));
        }
        let group = c.add(DbSubnetGroup::new(
            "DatabaseSubnetGroup",
            format!("Database subnets for {}", self.cluster),
            database.clone(),
        ));

        let public_refs = references(&c, &public)?;
        let private_refs = references(&c, &private)?;
        let database_refs = references(&c, &database)?;
        c.add_output(Output::joined("PublicSubnets", ",", public_refs));
        c.add_output(Output::joined("PrivateSubnets", ",", private_refs));
        c.add_output(Output::joined("DatabaseSubnets", ",", database_refs));
        c.add_output(Output::new("DatabaseSubnetGroupName", c.reference(group)?));

        Ok(c)
    }
}

fn references(c: &Composition, handles: &[Handle]) -> Result<Vec<Intrinsic>> {
    handles.iter().map(|h| c.reference(*h)).collect()
}
