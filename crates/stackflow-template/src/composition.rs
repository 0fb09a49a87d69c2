//! Compositions: the resources, outputs and transform one feature needs

use crate::error::Result;
use crate::intrinsic::Intrinsic;
use crate::output::Output;
use crate::resource::{Handle, Registry, Resource};
use serde_json::Value;

/// Template-level macro a composition needs in order to render correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// `AWS::Serverless-2016-10-31`
    Serverless,
    /// `AWS::LanguageExtensions`
    LanguageExtensions,
}

impl Transform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::Serverless => "AWS::Serverless-2016-10-31",
            Transform::LanguageExtensions => "AWS::LanguageExtensions",
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources, outputs and an optional transform produced by one [`Composer`]
#[derive(Debug, Default)]
pub struct Composition {
    registry: Registry,
    outputs: Vec<Output>,
    transform: Option<Transform>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and return the handle dependents should hold
    pub fn add<R: Resource + 'static>(&mut self, resource: R) -> Handle {
        self.registry.insert(Box::new(resource))
    }

    /// Register a resource and publish its named outputs
    pub fn add_exposed<R: Resource + 'static>(&mut self, resource: R) -> Handle {
        self.outputs.extend(resource.named_outputs());
        self.add(resource)
    }

    pub fn add_output(&mut self, output: Output) {
        self.outputs.push(output);
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = Some(transform);
    }

    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn resources(&self) -> impl Iterator<Item = &dyn Resource> {
        self.registry.iter()
    }

    pub fn reference(&self, handle: Handle) -> Result<Intrinsic> {
        self.registry.resolver().reference(handle)
    }

    pub fn attribute(&self, handle: Handle, attribute: &str) -> Result<Intrinsic> {
        self.registry.resolver().attribute(handle, attribute)
    }

    pub fn name_of(&self, handle: Handle) -> Result<&str> {
        self.registry.resolver().name_of(handle)
    }

    /// Render every resource in insertion order as `(logical name, body)`
    pub fn render_resources(&self) -> Result<Vec<(String, Value)>> {
        let refs = self.registry.resolver();
        self.registry
            .iter()
            .map(|r| Ok((r.name().to_string(), r.render(&refs)?)))
            .collect()
    }
}

/// A unit producing the resources for one logical infrastructure feature.
///
/// Implementations validate every input before constructing anything and
/// either return a complete [`Composition`] or an error.
pub trait Composer {
    fn compose(&self) -> Result<Composition>;
}
