//! VPC networking resources

use crate::error::Result;
use crate::output::Output;
use crate::resource::{Handle, Resolver, Resource};
use serde_json::{Value, json};

fn name_tag(value: &str) -> Value {
    json!([{ "Key": "Name", "Value": value }])
}

#[derive(Debug, Clone)]
pub struct Vpc {
    name: String,
    cidr: String,
}

impl Vpc {
    pub fn new(name: impl Into<String>, cidr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr: cidr.into(),
        }
    }
}

impl Resource for Vpc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::VPC"
    }

    fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "CidrBlock": self.cidr,
            "EnableDnsHostnames": true,
            "EnableDnsSupport": true,
            "Tags": name_tag(&self.name),
        }))
    }

    fn named_outputs(&self) -> Vec<Output> {
        vec![Output::new(self.name.clone(), self.reference())]
    }
}

#[derive(Debug, Clone)]
pub struct InternetGateway {
    name: String,
}

impl InternetGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for InternetGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::InternetGateway"
    }

    fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({ "Tags": name_tag(&self.name) }))
    }
}

#[derive(Debug, Clone)]
pub struct VpcGatewayAttachment {
    name: String,
    vpc: Handle,
    gateway: Handle,
}

impl VpcGatewayAttachment {
    pub fn new(name: impl Into<String>, vpc: Handle, gateway: Handle) -> Self {
        Self {
            name: name.into(),
            vpc,
            gateway,
        }
    }
}

impl Resource for VpcGatewayAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::VPCGatewayAttachment"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "VpcId": refs.reference(self.vpc)?,
            "InternetGatewayId": refs.reference(self.gateway)?,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Subnet {
    name: String,
    vpc: Handle,
    cidr: String,
    zone: String,
    public: bool,
}

impl Subnet {
    pub fn new(
        name: impl Into<String>,
        vpc: Handle,
        cidr: impl Into<String>,
        zone: impl Into<String>,
        public: bool,
    ) -> Self {
        Self {
            name: name.into(),
            vpc,
            cidr: cidr.into(),
            zone: zone.into(),
            public,
        }
    }
}

impl Resource for Subnet {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::Subnet"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "VpcId": refs.reference(self.vpc)?,
            "CidrBlock": self.cidr,
            "AvailabilityZone": self.zone,
            "MapPublicIpOnLaunch": self.public,
            "Tags": name_tag(&self.name),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    name: String,
    vpc: Handle,
}

impl RouteTable {
    pub fn new(name: impl Into<String>, vpc: Handle) -> Self {
        Self {
            name: name.into(),
            vpc,
        }
    }
}

impl Resource for RouteTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::RouteTable"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "VpcId": refs.reference(self.vpc)?,
            "Tags": name_tag(&self.name),
        }))
    }
}

/// Where a route sends its traffic
#[derive(Debug, Clone, Copy)]
pub enum RouteTarget {
    InternetGateway(Handle),
    NatGateway(Handle),
}

/// A route in a route table. Routes through an internet gateway must wait
/// for the gateway attachment, passed as `after`.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    table: Handle,
    destination: String,
    target: RouteTarget,
    after: Option<Handle>,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        table: Handle,
        destination: impl Into<String>,
        target: RouteTarget,
    ) -> Self {
        Self {
            name: name.into(),
            table,
            destination: destination.into(),
            target,
            after: None,
        }
    }

    pub fn after(mut self, dependency: Handle) -> Self {
        self.after = Some(dependency);
        self
    }
}

impl Resource for Route {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::Route"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        let (key, target) = match self.target {
            RouteTarget::InternetGateway(h) => ("GatewayId", refs.reference(h)?),
            RouteTarget::NatGateway(h) => ("NatGatewayId", refs.reference(h)?),
        };
        let mut properties = json!({
            "RouteTableId": refs.reference(self.table)?,
            "DestinationCidrBlock": self.destination,
        });
        properties[key] = target.to_value();
        Ok(properties)
    }

    fn depends_on(&self) -> Vec<Handle> {
        self.after.into_iter().collect()
    }
}

#[derive(Debug, Clone)]
pub struct SubnetRouteTableAssociation {
    name: String,
    subnet: Handle,
    table: Handle,
}

impl SubnetRouteTableAssociation {
    pub fn new(name: impl Into<String>, subnet: Handle, table: Handle) -> Self {
        Self {
            name: name.into(),
            subnet,
            table,
        }
    }
}

impl Resource for SubnetRouteTableAssociation {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::SubnetRouteTableAssociation"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "SubnetId": refs.reference(self.subnet)?,
            "RouteTableId": refs.reference(self.table)?,
        }))
    }
}

/// Elastic IP for a NAT gateway
#[derive(Debug, Clone)]
pub struct Eip {
    name: String,
    attachment: Handle,
}

impl Eip {
    pub fn new(name: impl Into<String>, attachment: Handle) -> Self {
        Self {
            name: name.into(),
            attachment,
        }
    }
}

impl Resource for Eip {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::EIP"
    }

    fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({ "Domain": "vpc" }))
    }

    fn depends_on(&self) -> Vec<Handle> {
        vec![self.attachment]
    }
}

#[derive(Debug, Clone)]
pub struct NatGateway {
    name: String,
    eip: Handle,
    subnet: Handle,
}

impl NatGateway {
    pub fn new(name: impl Into<String>, eip: Handle, subnet: Handle) -> Self {
        Self {
            name: name.into(),
            eip,
            subnet,
        }
    }
}

impl Resource for NatGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::EC2::NatGateway"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "AllocationId": refs.attribute(self.eip, "AllocationId")?,
            "SubnetId": refs.reference(self.subnet)?,
            "Tags": name_tag(&self.name),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct DbSubnetGroup {
    name: String,
    description: String,
    subnets: Vec<Handle>,
}

impl DbSubnetGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>, subnets: Vec<Handle>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            subnets,
        }
    }
}

impl Resource for DbSubnetGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::RDS::DBSubnetGroup"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "DBSubnetGroupDescription": self.description,
            "SubnetIds": refs.references(&self.subnets)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;

    #[test]
    fn test_route_through_gateway_waits_for_attachment() {
        let mut c = Composition::new();
        let vpc = c.add(Vpc::new("Vpc", "10.0.0.0/16"));
        let igw = c.add(InternetGateway::new("InternetGateway"));
        let attachment = c.add(VpcGatewayAttachment::new("VpcGatewayAttachment", vpc, igw));
        let table = c.add(RouteTable::new("PublicRouteTable", vpc));
        c.add(
            Route::new(
                "PublicRoute",
                table,
                "0.0.0.0/0",
                RouteTarget::InternetGateway(igw),
            )
            .after(attachment),
        );

        let rendered = c.render_resources().unwrap();
        let (_, route) = rendered.iter().find(|(n, _)| n == "PublicRoute").unwrap();
        assert_eq!(route["DependsOn"], json!(["VpcGatewayAttachment"]));
        assert_eq!(route["Properties"]["GatewayId"], json!({"Ref": "InternetGateway"}));
        assert_eq!(route["Properties"]["RouteTableId"], json!({"Ref": "PublicRouteTable"}));
    }

    #[test]
    fn test_nat_gateway_uses_eip_allocation() {
        let mut c = Composition::new();
        let vpc = c.add(Vpc::new("Vpc", "10.0.0.0/16"));
        let igw = c.add(InternetGateway::new("InternetGateway"));
        let attachment = c.add(VpcGatewayAttachment::new("Attach", vpc, igw));
        let subnet = c.add(Subnet::new("PublicSubnet00", vpc, "10.0.0.0/24", "eu-west-1a", true));
        let eip = c.add(Eip::new("NatGatewayEip00", attachment));
        c.add(NatGateway::new("NatGateway00", eip, subnet));

        let rendered = c.render_resources().unwrap();
        let (_, nat) = rendered.iter().find(|(n, _)| n == "NatGateway00").unwrap();
        assert_eq!(
            nat["Properties"]["AllocationId"],
            json!({"Fn::GetAtt": ["NatGatewayEip00", "AllocationId"]})
        );
        let (_, eip) = rendered.iter().find(|(n, _)| n == "NatGatewayEip00").unwrap();
        assert_eq!(eip["DependsOn"], json!(["Attach"]));
    }
}
