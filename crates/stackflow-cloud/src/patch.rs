//! Structural patches over a deployed template document
//!
//! Paths are JSON pointers. Inside arrays the last token is an index or
//! `-` (append, add only).

use crate::error::{CloudError, Result};
use serde_json::Value;
use stackflow_template::resources::Rule;

pub const INGRESS_PROPERTY: &str = "SecurityGroupIngress";

#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. } | PatchOperation::Remove { path } => path,
        }
    }
}

/// Apply one operation in place
pub fn apply(document: &mut Value, operation: &PatchOperation) -> Result<()> {
    let (parent_path, token) = split_pointer(operation.path())?;
    let parent = document
        .pointer_mut(parent_path)
        .ok_or_else(|| CloudError::InvalidPatch(format!("no value at '{}'", parent_path)))?;

    match (operation, parent) {
        (PatchOperation::Add { value, .. }, Value::Object(map)) => {
            map.insert(token, value.clone());
        }
        (PatchOperation::Add { value, .. }, Value::Array(items)) => {
            if token == "-" {
                items.push(value.clone());
            } else {
                let index = array_index(&token, items.len() + 1)?;
                items.insert(index, value.clone());
            }
        }
        (PatchOperation::Remove { .. }, Value::Object(map)) => {
            if map.remove(&token).is_none() {
                return Err(CloudError::InvalidPatch(format!(
                    "no member '{}' to remove",
                    token
                )));
            }
        }
        (PatchOperation::Remove { .. }, Value::Array(items)) => {
            let index = array_index(&token, items.len())?;
            items.remove(index);
        }
        (_, _) => {
            return Err(CloudError::InvalidPatch(format!(
                "'{}' is neither an object nor an array",
                parent_path
            )));
        }
    }
    Ok(())
}

fn split_pointer(path: &str) -> Result<(&str, String)> {
    match path.rfind('/') {
        Some(pos) if path.starts_with('/') => {
            let token = path[pos + 1..].replace("~1", "/").replace("~0", "~");
            Ok((&path[..pos], token))
        }
        _ => Err(CloudError::InvalidPatch(format!(
            "'{}' is not a JSON pointer below the document root",
            path
        ))),
    }
}

fn array_index(token: &str, bound: usize) -> Result<usize> {
    let index: usize = token
        .parse()
        .map_err(|_| CloudError::InvalidPatch(format!("'{}' is not an array index", token)))?;
    if index >= bound {
        return Err(CloudError::InvalidPatch(format!(
            "index {} out of bounds",
            index
        )));
    }
    Ok(index)
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Add,
    Remove,
}

/// Add or remove one element of a resource's list property.
///
/// Elements are matched by value, never by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPatch {
    resource: String,
    property: String,
    element: Value,
    action: ListAction,
}

impl ListPatch {
    pub fn add(resource: impl Into<String>, property: impl Into<String>, element: Value) -> Self {
        Self {
            resource: resource.into(),
            property: property.into(),
            element,
            action: ListAction::Add,
        }
    }

    pub fn remove(
        resource: impl Into<String>,
        property: impl Into<String>,
        element: Value,
    ) -> Self {
        Self {
            resource: resource.into(),
            property: property.into(),
            element,
            action: ListAction::Remove,
        }
    }

    /// Add an ingress rule to a security group
    pub fn add_ingress(group: impl Into<String>, rule: &Rule) -> Result<Self> {
        Ok(Self::add(group, INGRESS_PROPERTY, rule.to_value()?))
    }

    pub fn remove_ingress(group: impl Into<String>, rule: &Rule) -> Result<Self> {
        Ok(Self::remove(group, INGRESS_PROPERTY, rule.to_value()?))
    }

    pub fn action(&self) -> ListAction {
        self.action
    }

    pub fn list_path(&self) -> String {
        format!(
            "/Resources/{}/Properties/{}",
            escape(&self.resource),
            escape(&self.property)
        )
    }

    /// Index of the first element equal to ours, if any
    pub fn position(&self, document: &Value) -> Result<Option<usize>> {
        let resource_path = format!("/Resources/{}", escape(&self.resource));
        if document.pointer(&resource_path).is_none() {
            return Err(CloudError::InvalidPatch(format!(
                "template has no resource '{}'",
                self.resource
            )));
        }

        match document.pointer(&self.list_path()) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(items.iter().position(|item| *item == self.element)),
            Some(_) => Err(CloudError::InvalidPatch(format!(
                "{} of '{}' is not a list",
                self.property, self.resource
            ))),
        }
    }

    /// The structural operation needed, or `None` when there is nothing to do:
    /// the element is already present (add) or absent (remove).
    pub fn operation(&self, document: &Value) -> Result<Option<PatchOperation>> {
        let index = self.position(document)?;
        let list = self.list_path();

        let operation = match (self.action, index) {
            (ListAction::Add, Some(_)) | (ListAction::Remove, None) => None,
            (ListAction::Add, None) => {
                if document.pointer(&list).is_some() {
                    Some(PatchOperation::Add {
                        path: format!("{}/0", list),
                        value: self.element.clone(),
                    })
                } else {
                    let properties = format!("/Resources/{}/Properties", escape(&self.resource));
                    if document.pointer(&properties).is_none() {
                        return Err(CloudError::InvalidPatch(format!(
                            "resource '{}' has no properties",
                            self.resource
                        )));
                    }
                    Some(PatchOperation::Add {
                        path: list,
                        value: Value::Array(vec![self.element.clone()]),
                    })
                }
            }
            (ListAction::Remove, Some(i)) => Some(PatchOperation::Remove {
                path: format!("{}/{}", list, i),
            }),
        };
        Ok(operation)
    }
}
