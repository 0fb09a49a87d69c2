//! Typed resource catalog
//!
//! Each kind implements [`crate::Resource`]. Dependencies are held as
//! [`crate::Handle`]s and resolved to logical names at render time.

pub mod certificate;
pub mod database;
pub mod identity;
pub mod network;
pub mod security;

pub use certificate::{Certificate, KeyAlgorithm};
pub use database::{
    DbInstance, Function, InvokePermission, RotationSchedule, Secret, SecretTargetAttachment,
};
pub use identity::{UserPool, UserPoolClient, UserPoolDomain};
pub use network::{
    DbSubnetGroup, Eip, InternetGateway, NatGateway, Route, RouteTable, RouteTarget, Subnet,
    SubnetRouteTableAssociation, Vpc, VpcGatewayAttachment,
};
pub use security::{Effect, ManagedPolicy, PolicyDocument, Role, Rule, SecurityGroup, Statement};
