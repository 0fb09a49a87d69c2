//! RDS instances, generated secrets and secret rotation

use crate::error::Result;
use crate::intrinsic::Intrinsic;
use crate::resource::{Handle, Link, Resolver, Resource};
use serde_json::{Value, json};

/// Secrets Manager secret holding a generated password under `password`
#[derive(Debug, Clone)]
pub struct Secret {
    name: String,
    secret_name: String,
    username: String,
}

impl Secret {
    pub fn new(
        name: impl Into<String>,
        secret_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            secret_name: secret_name.into(),
            username: username.into(),
        }
    }
}

impl Resource for Secret {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::SecretsManager::Secret"
    }

    fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "Name": self.secret_name,
            "GenerateSecretString": {
                "SecretStringTemplate": json!({ "username": self.username }).to_string(),
                "GenerateStringKey": "password",
                "PasswordLength": 32,
                "ExcludeCharacters": "\"@/\\",
            },
        }))
    }
}

#[derive(Debug, Clone)]
pub struct DbInstance {
    name: String,
    db_name: String,
    instance_class: String,
    allocated_storage: u32,
    subnet_group: Link,
    security_group: Handle,
    secret: Handle,
}

impl DbInstance {
    pub fn new(
        name: impl Into<String>,
        db_name: impl Into<String>,
        instance_class: impl Into<String>,
        allocated_storage: u32,
        subnet_group: impl Into<Link>,
        security_group: Handle,
        secret: Handle,
    ) -> Self {
        Self {
            name: name.into(),
            db_name: db_name.into(),
            instance_class: instance_class.into(),
            allocated_storage,
            subnet_group: subnet_group.into(),
            security_group,
            secret,
        }
    }
}

impl Resource for DbInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::RDS::DBInstance"
    }

    fn deletion_policy(&self) -> Option<&'static str> {
        Some("Snapshot")
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        let secret = refs.name_of(self.secret)?;
        Ok(json!({
            "DBName": self.db_name,
            "Engine": "postgres",
            "DBInstanceClass": self.instance_class,
            "AllocatedStorage": self.allocated_storage.to_string(),
            "StorageEncrypted": true,
            "PubliclyAccessible": false,
            "DBSubnetGroupName": refs.resolve(&self.subnet_group)?,
            "VPCSecurityGroups": [refs.attribute(self.security_group, "GroupId")?],
            "MasterUsername": Intrinsic::sub(format!(
                "{{{{resolve:secretsmanager:${{{}}}:SecretString:username}}}}",
                secret
            )),
            "MasterUserPassword": Intrinsic::sub(format!(
                "{{{{resolve:secretsmanager:${{{}}}:SecretString:password}}}}",
                secret
            )),
        }))
    }
}

/// Links a secret to the database it authenticates against
#[derive(Debug, Clone)]
pub struct SecretTargetAttachment {
    name: String,
    secret: Handle,
    target: Handle,
}

impl SecretTargetAttachment {
    pub fn new(name: impl Into<String>, secret: Handle, target: Handle) -> Self {
        Self {
            name: name.into(),
            secret,
            target,
        }
    }
}

impl Resource for SecretTargetAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::SecretsManager::SecretTargetAttachment"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "SecretId": refs.reference(self.secret)?,
            "TargetId": refs.reference(self.target)?,
            "TargetType": "AWS::RDS::DBInstance",
        }))
    }
}

/// Serverless function, expanded by the serverless transform
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    code_bucket: String,
    code_key: String,
    handler: String,
    role: Handle,
    subnets: Link,
    security_group: Handle,
    environment: Vec<(String, Intrinsic)>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        code_bucket: impl Into<String>,
        code_key: impl Into<String>,
        handler: impl Into<String>,
        role: Handle,
        subnets: impl Into<Link>,
        security_group: Handle,
    ) -> Self {
        Self {
            name: name.into(),
            code_bucket: code_bucket.into(),
            code_key: code_key.into(),
            handler: handler.into(),
            role,
            subnets: subnets.into(),
            security_group,
            environment: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<Intrinsic>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }
}

impl Resource for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::Serverless::Function"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        let mut variables = serde_json::Map::new();
        for (key, value) in &self.environment {
            variables.insert(key.clone(), value.to_value());
        }
        Ok(json!({
            "CodeUri": { "Bucket": self.code_bucket, "Key": self.code_key },
            "Handler": self.handler,
            "Runtime": "python3.12",
            "Timeout": 30,
            "Role": refs.attribute(self.role, "Arn")?,
            "VpcConfig": {
                "SubnetIds": refs.resolve(&self.subnets)?,
                "SecurityGroupIds": [refs.attribute(self.security_group, "GroupId")?],
            },
            "Environment": { "Variables": Value::Object(variables) },
        }))
    }
}

/// Permission for Secrets Manager to invoke a rotation function
#[derive(Debug, Clone)]
pub struct InvokePermission {
    name: String,
    function: Handle,
}

impl InvokePermission {
    pub fn new(name: impl Into<String>, function: Handle) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

impl Resource for InvokePermission {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::Lambda::Permission"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "Action": "lambda:InvokeFunction",
            "FunctionName": refs.reference(self.function)?,
            "Principal": "secretsmanager.amazonaws.com",
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RotationSchedule {
    name: String,
    secret: Handle,
    function: Handle,
    days: u32,
    after: Vec<Handle>,
}

impl RotationSchedule {
    pub fn new(name: impl Into<String>, secret: Handle, function: Handle, days: u32) -> Self {
        Self {
            name: name.into(),
            secret,
            function,
            days,
            after: Vec::new(),
        }
    }

    pub fn after(mut self, dependency: Handle) -> Self {
        self.after.push(dependency);
        self
    }
}

impl Resource for RotationSchedule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "AWS::SecretsManager::RotationSchedule"
    }

    fn properties(&self, refs: &Resolver<'_>) -> Result<Value> {
        Ok(json!({
            "SecretId": refs.reference(self.secret)?,
            "RotationLambdaARN": refs.attribute(self.function, "Arn")?,
            "RotationRules": { "AutomaticallyAfterDays": self.days },
        }))
    }

    fn depends_on(&self) -> Vec<Handle> {
        self.after.clone()
    }
}
