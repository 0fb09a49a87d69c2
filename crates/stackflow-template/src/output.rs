//! Stack outputs

use crate::intrinsic::Intrinsic;
use serde_json::{Map, Value};

/// A named value a deployed stack exposes
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    name: String,
    value: Intrinsic,
    description: Option<String>,
    export: Option<String>,
}

impl Output {
    pub fn new(name: impl Into<String>, value: impl Into<Intrinsic>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
            export: None,
        }
    }

    /// Output whose value is a delimited join of several expressions
    pub fn joined(name: impl Into<String>, delimiter: &str, parts: Vec<Intrinsic>) -> Self {
        Self::new(name, Intrinsic::join(delimiter, parts))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Export the value under a region-wide name for cross-stack imports
    pub fn with_export(mut self, export: impl Into<String>) -> Self {
        self.export = Some(export.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Intrinsic {
        &self.value
    }

    pub fn render(&self) -> Value {
        let mut body = Map::new();
        if let Some(description) = &self.description {
            body.insert("Description".into(), Value::String(description.clone()));
        }
        body.insert("Value".into(), self.value.to_value());
        if let Some(export) = &self.export {
            let mut name = Map::new();
            name.insert("Name".into(), Value::String(export.clone()));
            body.insert("Export".into(), Value::Object(name));
        }
        Value::Object(body)
    }
}
