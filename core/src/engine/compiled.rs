//! engine/compiled.rs
//! Validated, immutable form of a `TransformConfig`.
//!
//! Compiled once before a pipeline starts and shared by every worker
//! context through `Arc`.

use std::path::Path;
use std::sync::Arc;

use crate::dispatch::FieldTransform;
use crate::engine::config::{CodecSpec, FieldStrategy, TransformConfig};
use crate::engine::registry::TransformRegistry;
use crate::engine::types::ConfigError;
use crate::schema::{field_spec, FieldTag};
use crate::types::StreamError;

/// One coded section of field data: member tags in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    pub members: Vec<FieldTag>,
    pub elt_width: usize,
    pub codec: CodecSpec,
}

impl SectionPlan {
    /// Member bitmask as stored in the section header.
    pub fn member_mask(&self) -> u8 {
        self.members.iter().fold(0u8, |m, t| m | t.bit())
    }

    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }
}

pub struct CompiledConfig {
    config: TransformConfig,
    transform: Arc<dyn FieldTransform>,
    sections: Vec<SectionPlan>,
}

impl CompiledConfig {
    pub fn compile(
        config: TransformConfig,
        registry: &TransformRegistry,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        let transform = registry.resolve(&config.entry_transform)?;

        let sections = match &config.strategy {
            FieldStrategy::PerField(specs) => FieldTag::ALL
                .iter()
                .map(|&tag| SectionPlan {
                    members: vec![tag],
                    elt_width: field_spec(tag).elt_width,
                    codec: specs[tag.index()],
                })
                .collect(),
            FieldStrategy::Clustered(clusters) => clusters
                .iter()
                .map(|c| {
                    let mut members = c.tags.clone();
                    members.sort_unstable();
                    SectionPlan {
                        elt_width: field_spec(members[0]).elt_width,
                        members,
                        codec: c.codec,
                    }
                })
                .collect(),
        };

        Ok(Arc::new(Self { config, transform, sections }))
    }

    /// Compile against the built-in transform registry.
    pub fn compile_builtin(config: TransformConfig) -> Result<Arc<Self>, ConfigError> {
        Self::compile(config, &TransformRegistry::with_builtin())
    }

    /// Load, validate and compile a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>, StreamError> {
        let config = TransformConfig::load(path)?;
        Ok(Self::compile_builtin(config)?)
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn transform(&self) -> &Arc<dyn FieldTransform> {
        &self.transform
    }

    pub fn sections(&self) -> &[SectionPlan] {
        &self.sections
    }

    pub fn aux_codec(&self) -> CodecSpec {
        self.config.aux_codec
    }
}

impl std::fmt::Debug for CompiledConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledConfig")
            .field("transform", &self.transform.name())
            .field("sections", &self.sections)
            .finish()
    }
}
