//! PostgreSQL instance with a generated admin secret and optional rotation

use super::validate_logical_name;
use crate::address::Cidr;
use crate::composition::{Composer, Composition, Transform};
use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::output::Output;
use crate::regions::availability_zones;
use crate::resources::{
    DbInstance, Function, InvokePermission, PolicyDocument, Role, RotationSchedule, Rule, Secret,
    SecretTargetAttachment, SecurityGroup, Statement,
};
use serde_json::Value;

pub const POSTGRES_PORT: u16 = 5432;
pub const MIN_STORAGE_GB: u32 = 20;
pub const MAX_STORAGE_GB: u32 = 65536;

const RESERVED_USERNAMES: &[&str] = &["postgres", "rdsadmin", "rdsrepladmin"];
const VPC_ACCESS_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaVPCAccessExecutionRole";

/// Where the rotation function code lives and how often it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub code_bucket: String,
    pub code_key: String,
    pub days: u32,
    pub subnet_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PostgresComposer {
    name: String,
    cluster: String,
    region: String,
    vpc_id: String,
    vpc_cidr: String,
    subnet_group: String,
    db_name: String,
    username: String,
    instance_class: String,
    allocated_storage: u32,
    rotation: Option<Rotation>,
}

impl PostgresComposer {
    /// `name` prefixes every logical id, so several databases can share a template.
    pub fn new(
        name: impl Into<String>,
        cluster: impl Into<String>,
        region: impl Into<String>,
        vpc_id: impl Into<String>,
        vpc_cidr: impl Into<String>,
        subnet_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
            region: region.into(),
            vpc_id: vpc_id.into(),
            vpc_cidr: vpc_cidr.into(),
            subnet_group: subnet_group.into(),
            db_name: "app".to_string(),
            username: "app_admin".to_string(),
            instance_class: "db.t3.micro".to_string(),
            allocated_storage: MIN_STORAGE_GB,
            rotation: None,
        }
    }

    pub fn with_database(mut self, db_name: impl Into<String>, username: impl Into<String>) -> Self {
        self.db_name = db_name.into();
        self.username = username.into();
        self
    }

    pub fn with_instance(mut self, instance_class: impl Into<String>, allocated_storage: u32) -> Self {
        self.instance_class = instance_class.into();
        self.allocated_storage = allocated_storage;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    fn validate(&self) -> Result<()> {
        validate_logical_name(&self.name)?;
        if self.cluster.trim().is_empty() {
            return Err(TemplateError::Composition("cluster name is empty".into()));
        }
        availability_zones(&self.region)?;
        if self.vpc_id.trim().is_empty() || self.subnet_group.trim().is_empty() {
            return Err(TemplateError::Composition(
                "database needs a VPC id and a subnet group".into(),
            ));
        }
        self.vpc_cidr.parse::<Cidr>()?;

        if !is_identifier(&self.db_name, 63) {
            return Err(TemplateError::Composition(format!(
                "invalid database name: '{}'",
                self.db_name
            )));
        }
        if !is_identifier(&self.username, 16) || RESERVED_USERNAMES.contains(&self.username.as_str())
        {
            return Err(TemplateError::Composition(format!(
                "invalid master username: '{}'",
                self.username
            )));
        }
        if !self.instance_class.starts_with("db.") {
            return Err(TemplateError::Composition(format!(
                "instance class must start with 'db.', got '{}'",
                self.instance_class
            )));
        }
        if !(MIN_STORAGE_GB..=MAX_STORAGE_GB).contains(&self.allocated_storage) {
            return Err(TemplateError::Composition(format!(
                "allocated storage must be between {} and {} GB, got {}",
                MIN_STORAGE_GB, MAX_STORAGE_GB, self.allocated_storage
            )));
        }

        if let Some(rotation) = &self.rotation {
            if rotation.code_bucket.is_empty() || rotation.code_key.is_empty() {
                return Err(TemplateError::Composition(
                    "rotation function code location is incomplete".into(),
                ));
            }
            if !(1..=365).contains(&rotation.days) {
                return Err(TemplateError::Composition(format!(
                    "rotation interval must be 1-365 days, got {}",
                    rotation.days
                )));
            }
            if rotation.subnet_ids.is_empty() {
                return Err(TemplateError::Composition(
                    "rotation function needs at least one subnet".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Letter first, then letters, digits or underscores
fn is_identifier(value: &str, max_len: usize) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && value.len() <= max_len
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Composer for PostgresComposer {
    fn compose(&self) -> Result<Composition> {
        self.validate()?;

        let name = &self.name;
        let mut c = Composition::new();

        let security_group = c.add_exposed(
            SecurityGroup::new(
                format!("{}SecurityGroup", name),
                format!("{}-{}-postgres", self.cluster, name.to_lowercase()),
                format!("PostgreSQL access for {}", name),
                Intrinsic::literal(self.vpc_id.as_str()),
            )
            .with_ingress(vec![
                Rule::tcp(POSTGRES_PORT, &self.vpc_cidr).with_description("postgres from VPC"),
            ]),
        );
        let secret = c.add(Secret::new(
            format!("{}AdminSecret", name),
            format!("{}/{}/admin", self.cluster, self.db_name),
            &self.username,
        ));
        let database = c.add(DbInstance::new(
            format!("{}Database", name),
            &self.db_name,
            &self.instance_class,
            self.allocated_storage,
            Intrinsic::literal(self.subnet_group.as_str()),
            security_group,
            secret,
        ));
        let attachment = c.add(SecretTargetAttachment::new(
            format!("{}SecretAttachment", name),
            secret,
            database,
        ));

        if let Some(rotation) = &self.rotation {
            let secret_name = c.name_of(secret)?.to_string();
            let role = c.add(
                Role::new(
                    format!("{}RotationRole", name),
                    PolicyDocument::new(vec![Statement::assume_role("lambda.amazonaws.com")]),
                )
                .with_managed_policy(Intrinsic::literal(VPC_ACCESS_POLICY))
                .with_inline_policy(
                    "rotate-secret",
                    PolicyDocument::new(vec![Statement::allow(
                        &[
                            "secretsmanager:DescribeSecret",
                            "secretsmanager:GetSecretValue",
                            "secretsmanager:PutSecretValue",
                            "secretsmanager:UpdateSecretVersionStage",
                        ],
                        &["*"],
                    )]),
                ),
            );
            let subnets = Value::Array(
                rotation
                    .subnet_ids
                    .iter()
                    .map(|id| Value::String(id.clone()))
                    .collect(),
            );
            let function = c.add(
                Function::new(
                    format!("{}RotationFunction", name),
                    &rotation.code_bucket,
                    &rotation.code_key,
                    "lambda_function.lambda_handler",
                    role,
                    Intrinsic::literal(subnets),
                    security_group,
                )
                .with_env(
                    "SECRETS_MANAGER_ENDPOINT",
                    format!("https://secretsmanager.{}.amazonaws.com", self.region),
                )
                .with_env("SECRET_NAME", Intrinsic::reference(secret_name)),
            );
            let permission = c.add(InvokePermission::new(
                format!("{}RotationPermission", name),
                function,
            ));
            c.add(
                RotationSchedule::new(
                    format!("{}RotationSchedule", name),
                    secret,
                    function,
                    rotation.days,
                )
                .after(attachment)
                .after(permission),
            );
            c.set_transform(Transform::Serverless);
        }

        c.add_output(Output::new(
            format!("{}Endpoint", name),
            c.attribute(database, "Endpoint.Address")?,
        ));
        c.add_output(Output::new(
            format!("{}Port", name),
            c.attribute(database, "Endpoint.Port")?,
        ));
        c.add_output(Output::new(format!("{}SecretArn", name), c.reference(secret)?));

        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn composer() -> PostgresComposer {
        PostgresComposer::new(
            "Orders",
            "prod",
            "eu-west-1",
            "vpc-0abc",
            "10.0.0.0/16",
            "prod-database-subnets",
        )
    }

    fn rotation() -> Rotation {
        Rotation {
            code_bucket: "artifacts".into(),
            code_key: "rotation/postgres.zip".into(),
            days: 30,
            subnet_ids: vec!["subnet-1".into(), "subnet-2".into()],
        }
    }

    #[test]
    fn test_database_without_rotation() {
        let composition = composer().compose().unwrap();
        assert_eq!(composition.transform(), None);

        let bytes = Builder::new().build([&composition]).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        let resources = doc["Resources"].as_object().unwrap();
        assert_eq!(resources.len(), 4);
        assert_eq!(
            doc["Outputs"]["OrdersEndpoint"]["Value"],
            json!({"Fn::GetAtt": ["OrdersDatabase", "Endpoint.Address"]})
        );
        assert_eq!(
            doc["Resources"]["OrdersSecurityGroup"]["Properties"]["SecurityGroupIngress"][0]
                ["FromPort"],
            json!(5432)
        );
    }

    #[test]
    fn test_rotation_adds_serverless_function() {
        let composition = composer().with_rotation(rotation()).compose().unwrap();
        assert_eq!(composition.transform(), Some(Transform::Serverless));

        let bytes = Builder::new().build([&composition]).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["Transform"], json!("AWS::Serverless-2016-10-31"));

        let schedule = &doc["Resources"]["OrdersRotationSchedule"];
        assert_eq!(
            schedule["DependsOn"],
            json!(["OrdersSecretAttachment", "OrdersRotationPermission"])
        );
        assert_eq!(
            doc["Resources"]["OrdersRotationFunction"]["Properties"]["VpcConfig"]["SubnetIds"],
            json!(["subnet-1", "subnet-2"])
        );
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(composer().with_instance("t3.micro", 20).compose().is_err());
        assert!(composer().with_instance("db.t3.micro", 10).compose().is_err());
        assert!(composer().with_database("1orders", "admin_user").compose().is_err());
        assert!(composer().with_database("orders", "postgres").compose().is_err());

        let mut bad_rotation = rotation();
        bad_rotation.subnet_ids.clear();
        assert!(composer().with_rotation(bad_rotation).compose().is_err());
    }
}
