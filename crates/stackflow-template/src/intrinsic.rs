//! Intrinsic value expressions embedded in rendered templates

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// A value that is either a literal or resolved by the orchestration
/// service at deploy time (`Ref`, `Fn::GetAtt`, `Fn::Join`, `Fn::Sub`).
#[derive(Debug, Clone, PartialEq)]
pub enum Intrinsic {
    Literal(Value),
    Ref(String),
    GetAtt { resource: String, attribute: String },
    Join { delimiter: String, parts: Vec<Intrinsic> },
    Sub(String),
}

impl Intrinsic {
    pub fn literal(value: impl Into<Value>) -> Self {
        Intrinsic::Literal(value.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Intrinsic::Ref(name.into())
    }

    pub fn attribute(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Intrinsic::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    pub fn join(delimiter: impl Into<String>, parts: Vec<Intrinsic>) -> Self {
        Intrinsic::Join {
            delimiter: delimiter.into(),
            parts,
        }
    }

    pub fn sub(template: impl Into<String>) -> Self {
        Intrinsic::Sub(template.into())
    }

    /// Wire representation of the expression
    pub fn to_value(&self) -> Value {
        match self {
            Intrinsic::Literal(v) => v.clone(),
            Intrinsic::Ref(name) => json!({ "Ref": name }),
            Intrinsic::GetAtt {
                resource,
                attribute,
            } => json!({ "Fn::GetAtt": [resource, attribute] }),
            Intrinsic::Join { delimiter, parts } => {
                let parts: Vec<Value> = parts.iter().map(Intrinsic::to_value).collect();
                json!({ "Fn::Join": [delimiter, parts] })
            }
            Intrinsic::Sub(template) => json!({ "Fn::Sub": template }),
        }
    }
}

impl Serialize for Intrinsic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<&str> for Intrinsic {
    fn from(s: &str) -> Self {
        Intrinsic::Literal(Value::String(s.to_string()))
    }
}

impl From<String> for Intrinsic {
    fn from(s: String) -> Self {
        Intrinsic::Literal(Value::String(s))
    }
}
