//! Builder: aggregates compositions into a single template document

use crate::composition::{Composer, Composition, Transform};
use crate::error::{NameKind, Result, TemplateError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const FORMAT_VERSION: &str = "2010-09-09";

/// The aggregate document submitted to the orchestration API.
///
/// Keys are unique by construction: the builder refuses to insert a name
/// twice, so serialization never has to deal with duplicates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,

    #[serde(rename = "Transform", skip_serializing_if = "Option::is_none")]
    transform: Option<String>,

    #[serde(rename = "Resources")]
    resources: BTreeMap<String, Value>,

    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, Value>,
}

impl Template {
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            ..Default::default()
        }
    }

    pub fn resources(&self) -> &BTreeMap<String, Value> {
        &self.resources
    }

    pub fn outputs(&self) -> &BTreeMap<String, Value> {
        &self.outputs
    }

    pub fn transform(&self) -> Option<&str> {
        self.transform.as_deref()
    }

    fn insert_resource(&mut self, name: String, body: Value) -> Result<()> {
        if self.resources.contains_key(&name) {
            return Err(TemplateError::NameCollision {
                kind: NameKind::Resource,
                name,
            });
        }
        self.resources.insert(name, body);
        Ok(())
    }

    fn insert_output(&mut self, name: String, body: Value) -> Result<()> {
        if self.outputs.contains_key(&name) {
            return Err(TemplateError::NameCollision {
                kind: NameKind::Output,
                name,
            });
        }
        self.outputs.insert(name, body);
        Ok(())
    }

    fn merge_transform(&mut self, transform: Transform) -> Result<()> {
        match &self.transform {
            Some(existing) if existing != transform.as_str() => {
                Err(TemplateError::TransformConflict {
                    existing: existing.clone(),
                    requested: transform.as_str().to_string(),
                })
            }
            Some(_) => Ok(()),
            None => {
                self.transform = Some(transform.as_str().to_string());
                Ok(())
            }
        }
    }

    /// Wire format consumed by the reconciler
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Assembles compositions into a [`Template`].
///
/// `build` takes `&mut self`, so one builder can never run two
/// overlapping builds.
#[derive(Debug, Default)]
pub struct Builder {
    template: Template,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            template: Template::new(),
        }
    }

    /// Aggregate `compositions` and serialize the result.
    ///
    /// Fails on the first resource or output name already present.
    pub fn build<'c, I>(&mut self, compositions: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = &'c Composition>,
    {
        self.assemble(compositions)?;
        self.template.to_bytes()
    }

    /// Run every composer, then build. Nothing is assembled if any
    /// composer fails.
    pub fn build_from(&mut self, composers: &[&dyn Composer]) -> Result<Vec<u8>> {
        let compositions = composers
            .iter()
            .map(|c| c.compose())
            .collect::<Result<Vec<_>>>()?;
        self.build(&compositions)
    }

    /// Aggregate without serializing.
    ///
    /// On error the builder holds an empty template, never a partial one.
    pub fn assemble<'c, I>(&mut self, compositions: I) -> Result<&Template>
    where
        I: IntoIterator<Item = &'c Composition>,
    {
        self.template = Template::new();
        let mut template = Template::new();

        for composition in compositions {
            for output in composition.outputs() {
                template.insert_output(output.name().to_string(), output.render())?;
            }

            for (name, body) in composition.render_resources()? {
                template.insert_resource(name, body)?;
            }

            if let Some(transform) = composition.transform() {
                template.merge_transform(transform)?;
            }
        }

        tracing::debug!(
            resources = template.resources.len(),
            outputs = template.outputs.len(),
            "assembled template"
        );

        self.template = template;
        Ok(&self.template)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsic::Intrinsic;
    use crate::output::Output;
    use crate::resources::network::Vpc;
    use serde_json::json;

    fn vpc_composition(name: &str) -> Composition {
        let mut composition = Composition::new();
        composition.add_exposed(Vpc::new(name, "10.0.0.0/16"));
        composition
    }

    #[test]
    fn test_build_renders_format_version_and_resources() {
        let mut builder = Builder::new();
        let bytes = builder.build([&vpc_composition("Vpc")]).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(doc["AWSTemplateFormatVersion"], json!("2010-09-09"));
        assert_eq!(doc["Resources"]["Vpc"]["Type"], json!("AWS::EC2::VPC"));
        assert_eq!(doc["Outputs"]["Vpc"]["Value"], json!({"Ref": "Vpc"}));
        assert!(doc.get("Transform").is_none());
    }

    #[test]
    fn test_resource_collision() {
        let mut builder = Builder::new();
        let err = builder
            .build([&vpc_composition("Shared"), &{
                let mut c = Composition::new();
                c.add(Vpc::new("Shared", "10.1.0.0/16"));
                c
            }])
            .unwrap_err();

        match err {
            TemplateError::NameCollision { kind, name } => {
                assert_eq!(kind, NameKind::Resource);
                assert_eq!(name, "Shared");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_build_leaves_no_partial_template() {
        let mut builder = Builder::new();
        builder.build([&vpc_composition("Previous")]).unwrap();

        let mut second = Composition::new();
        second.add(Vpc::new("Other", "10.1.0.0/16"));
        second.add(Vpc::new("Vpc", "10.2.0.0/16"));

        let err = builder
            .build([&vpc_composition("Vpc"), &second])
            .unwrap_err();
        assert!(matches!(err, TemplateError::NameCollision { .. }));
        assert!(builder.template().resources().is_empty());
        assert!(builder.template().outputs().is_empty());
    }

    #[test]
    fn test_output_collision() {
        let mut a = Composition::new();
        a.add(Vpc::new("VpcA", "10.0.0.0/16"));
        a.add_output(Output::new("Id", Intrinsic::reference("VpcA")));
        let mut b = Composition::new();
        b.add(Vpc::new("VpcB", "10.1.0.0/16"));
        b.add_output(Output::new("Id", Intrinsic::reference("VpcB")));

        let err = Builder::new().build([&a, &b]).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::NameCollision {
                kind: NameKind::Output,
                ..
            }
        ));
    }

    #[test]
    fn test_build_is_deterministic_and_resets_between_builds() {
        let composition = vpc_composition("Vpc");
        let mut builder = Builder::new();
        let first = builder.build([&composition]).unwrap();
        let second = builder.build([&composition]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transform_merge() {
        let mut a = vpc_composition("VpcA");
        a.set_transform(Transform::Serverless);
        let mut b = vpc_composition("VpcB");
        b.set_transform(Transform::Serverless);
        let plain = vpc_composition("VpcC");

        let mut builder = Builder::new();
        let template = builder.assemble([&a, &plain, &b]).unwrap();
        assert_eq!(template.transform(), Some("AWS::Serverless-2016-10-31"));
        assert_eq!(template.resources().len(), 3);
    }

    #[test]
    fn test_transform_conflict() {
        let mut a = vpc_composition("VpcA");
        a.set_transform(Transform::Serverless);
        let mut b = vpc_composition("VpcB");
        b.set_transform(Transform::LanguageExtensions);

        let err = Builder::new().build([&a, &b]).unwrap_err();
        assert!(matches!(err, TemplateError::TransformConflict { .. }));
    }
}
