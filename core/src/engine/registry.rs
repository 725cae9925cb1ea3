//! engine/registry.rs
//! Named transform registry consulted when a configuration is compiled.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::{FieldTransform, RecordDispatch};
use crate::engine::types::ConfigError;

#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<&'static str, Arc<dyn FieldTransform>>,
}

impl TransformRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in transform.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RecordDispatch));
        registry
    }

    /// Register `transform` under its own name, replacing any previous entry.
    pub fn register(&mut self, transform: Arc<dyn FieldTransform>) {
        self.transforms.insert(transform.name(), transform);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn FieldTransform>, ConfigError> {
        self.transforms
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownTransform(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.transforms.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry").field("transforms", &self.names()).finish()
    }
}
