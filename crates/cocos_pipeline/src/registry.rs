//! Registries mapping `(module, action)` to processors.
//!
//! A [`ProcessorRegistry`] is assembled once through its builder and is
//! read-only afterwards, so it can be shared behind an `Arc` by any number of
//! concurrent invocations.

use crate::processors;
use crate::tables::NodeTypeTable;
use crate::traits::{Postprocessor, Preprocessor, Validator};
use crate::types::ActionKey;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One key-to-function map. At most one entry per key; re-registering replaces.
pub struct Registry<T: ?Sized> {
    entries: HashMap<ActionKey, Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `entry` for the pair, returning whatever it replaced.
    pub fn register(&mut self, module: &str, action: &str, entry: Arc<T>) -> Option<Arc<T>> {
        let key = ActionKey::new(module, action);
        let previous = self.entries.insert(key, entry);
        if previous.is_some() {
            debug!("🔁 Replaced registry entry for {}:{}", module, action);
        }
        previous
    }

    pub fn get(&self, module: &str, action: &str) -> Option<Arc<T>> {
        self.get_key(&ActionKey::new(module, action))
    }

    pub fn get_key(&self, key: &ActionKey) -> Option<Arc<T>> {
        self.entries.get(key).cloned()
    }

    pub fn has(&self, module: &str, action: &str) -> bool {
        self.entries.contains_key(&ActionKey::new(module, action))
    }

    /// All registered keys as `"module:action"`, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().map(ToString::to_string).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three registries consulted by the [`Pipeline`](crate::Pipeline).
#[derive(Default)]
pub struct ProcessorRegistry {
    pub validators: Registry<dyn Validator>,
    pub preprocessors: Registry<dyn Preprocessor>,
    pub postprocessors: Registry<dyn Postprocessor>,
}

static SHARED: OnceCell<Arc<ProcessorRegistry>> = OnceCell::new();

impl ProcessorRegistry {
    pub fn builder() -> ProcessorRegistryBuilder {
        ProcessorRegistryBuilder::default()
    }

    /// Process-wide registry holding every built-in processor.
    ///
    /// Built on first use; later calls return the same instance.
    pub fn shared() -> Arc<ProcessorRegistry> {
        SHARED
            .get_or_init(|| {
                info!("🔧 Initializing built-in processor registry");
                Arc::new(ProcessorRegistry::builder().with_builtins().build())
            })
            .clone()
    }
}

/// Assembles a [`ProcessorRegistry`].
#[derive(Default)]
pub struct ProcessorRegistryBuilder {
    registry: ProcessorRegistry,
}

impl ProcessorRegistryBuilder {
    /// Registers every built-in processor with the default node-type table.
    pub fn with_builtins(self) -> Self {
        self.with_builtins_using(NodeTypeTable::default())
    }

    /// Registers every built-in processor, expanding node types from `table`.
    pub fn with_builtins_using(mut self, table: NodeTypeTable) -> Self {
        processors::register_builtins(&mut self.registry, Arc::new(table));
        self
    }

    pub fn validator(mut self, module: &str, action: &str, validator: impl Validator + 'static) -> Self {
        self.registry
            .validators
            .register(module, action, Arc::new(validator));
        self
    }

    pub fn preprocessor(
        mut self,
        module: &str,
        action: &str,
        preprocessor: impl Preprocessor + 'static,
    ) -> Self {
        self.registry
            .preprocessors
            .register(module, action, Arc::new(preprocessor));
        self
    }

    pub fn postprocessor(
        mut self,
        module: &str,
        action: &str,
        postprocessor: impl Postprocessor + 'static,
    ) -> Self {
        self.registry
            .postprocessors
            .register(module, action, Arc::new(postprocessor));
        self
    }

    pub fn build(self) -> ProcessorRegistry {
        debug!(
            "📋 Registry built: {} validators, {} preprocessors, {} postprocessors",
            self.registry.validators.len(),
            self.registry.preprocessors.len(),
            self.registry.postprocessors.len()
        );
        self.registry
    }
}
