//! Resource capability contract and the handle registry that wires
//! dependents to the resources they point at.

use crate::error::{Result, TemplateError};
use crate::intrinsic::Intrinsic;
use crate::output::Output;
use serde_json::{Map, Value};

/// Stable index of a resource inside the composition that owns it.
///
/// Dependents keep handles instead of the resources themselves; a handle
/// is only turned into a logical name when the composition is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A value a resource points at: another resource in the same composition,
/// or an expression resolved elsewhere (an id exported by another stack).
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Handle(Handle),
    Value(Intrinsic),
}

impl From<Handle> for Link {
    fn from(handle: Handle) -> Self {
        Link::Handle(handle)
    }
}

impl From<Intrinsic> for Link {
    fn from(value: Intrinsic) -> Self {
        Link::Value(value)
    }
}

impl From<&str> for Link {
    fn from(value: &str) -> Self {
        Link::Value(Intrinsic::from(value))
    }
}

impl From<String> for Link {
    fn from(value: String) -> Self {
        Link::Value(Intrinsic::from(value))
    }
}

/// A composable infrastructure resource.
///
/// Every kind exposes its logical name, its reference token and its
/// provider-native body. Kinds without outputs keep the empty default for
/// [`Resource::named_outputs`] so call sites stay uniform.
pub trait Resource: std::fmt::Debug + Send + Sync {
    /// Logical id, unique within a template
    fn name(&self) -> &str;

    /// Provider type string, e.g. `AWS::EC2::VPC`
    fn kind(&self) -> &'static str;

    /// Provider properties with every handle resolved through `refs`
    fn properties(&self, refs: &Resolver<'_>) -> Result<Value>;

    /// Resources that must exist before this one, beyond implicit references
    fn depends_on(&self) -> Vec<Handle> {
        Vec::new()
    }

    fn deletion_policy(&self) -> Option<&'static str> {
        None
    }

    /// Token other resources embed to point at this one
    fn reference(&self) -> Intrinsic {
        Intrinsic::reference(self.name())
    }

    fn named_outputs(&self) -> Vec<Output> {
        Vec::new()
    }

    /// Full provider-native body: type, properties and explicit ordering
    fn render(&self, refs: &Resolver<'_>) -> Result<Value> {
        let mut body = Map::new();
        body.insert("Type".into(), Value::String(self.kind().to_string()));

        let depends_on = self.depends_on();
        if !depends_on.is_empty() {
            let names = depends_on
                .into_iter()
                .map(|h| refs.name_of(h).map(|n| Value::String(n.to_string())))
                .collect::<Result<Vec<_>>>()?;
            body.insert("DependsOn".into(), Value::Array(names));
        }

        if let Some(policy) = self.deletion_policy() {
            body.insert("DeletionPolicy".into(), Value::String(policy.to_string()));
        }

        let properties = self.properties(refs)?;
        if !properties.as_object().is_some_and(Map::is_empty) {
            body.insert("Properties".into(), properties);
        }

        Ok(Value::Object(body))
    }
}

/// Ordered set of resources addressed by [`Handle`]
#[derive(Debug, Default)]
pub struct Registry {
    resources: Vec<Box<dyn Resource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: Box<dyn Resource>) -> Handle {
        self.resources.push(resource);
        Handle(self.resources.len() - 1)
    }

    pub fn get(&self, handle: Handle) -> Result<&dyn Resource> {
        self.resources
            .get(handle.0)
            .map(|r| r.as_ref())
            .ok_or(TemplateError::UnknownHandle(handle.0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver { registry: self }
    }
}

/// Render-time view of a [`Registry`] that maps handles to names and tokens
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn name_of(&self, handle: Handle) -> Result<&'a str> {
        Ok(self.registry.get(handle)?.name())
    }

    pub fn reference(&self, handle: Handle) -> Result<Intrinsic> {
        Ok(self.registry.get(handle)?.reference())
    }

    pub fn attribute(&self, handle: Handle, attribute: &str) -> Result<Intrinsic> {
        Ok(Intrinsic::attribute(self.name_of(handle)?, attribute))
    }

    pub fn references(&self, handles: &[Handle]) -> Result<Vec<Intrinsic>> {
        handles.iter().map(|h| self.reference(*h)).collect()
    }

    pub fn resolve(&self, link: &Link) -> Result<Intrinsic> {
        match link {
            Link::Handle(handle) => self.reference(*handle),
            Link::Value(value) => Ok(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Bucket {
        name: String,
        after: Vec<Handle>,
    }

    impl Resource for Bucket {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> &'static str {
            "AWS::S3::Bucket"
        }

        fn properties(&self, _refs: &Resolver<'_>) -> Result<Value> {
            Ok(json!({}))
        }

        fn depends_on(&self) -> Vec<Handle> {
            self.after.clone()
        }
    }

    #[test]
    fn test_render_resolves_depends_on() {
        let mut registry = Registry::new();
        let first = registry.insert(Box::new(Bucket {
            name: "Logs".into(),
            after: vec![],
        }));
        let second = registry.insert(Box::new(Bucket {
            name: "Data".into(),
            after: vec![first],
        }));

        let refs = registry.resolver();
        let body = registry.get(second).unwrap().render(&refs).unwrap();
        assert_eq!(body, json!({"Type": "AWS::S3::Bucket", "DependsOn": ["Logs"]}));
    }

    #[test]
    fn test_unknown_handle() {
        let registry = Registry::new();
        let err = registry.resolver().name_of(Handle(3)).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownHandle(3)));
    }
}
