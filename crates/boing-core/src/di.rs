use crate::assembly::{AssembledInstance, Definition, GraphAssembler};
use crate::bean::Bean;
use crate::config::ContainerConfig;
use crate::document::DefinitionDocument;
use crate::error::{AssemblyError, Result, TeardownError};
use crate::registry::TypeRegistry;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only view of a finished assembly. Cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    instances: Arc<IndexMap<String, AssembledInstance>>,
}

impl Assembly {
    pub fn get(&self, id: &str) -> Option<&AssembledInstance> {
        self.instances.get(id)
    }

    /// Borrow an assembled object as `T`
    pub fn get_as<T: Bean, R>(&self, id: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.get(id)?.with(f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssembledInstance)> {
        self.instances.iter().map(|(id, instance)| (id.as_str(), instance))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl From<IndexMap<String, AssembledInstance>> for Assembly {
    fn from(instances: IndexMap<String, AssembledInstance>) -> Self {
        Assembly {
            instances: Arc::new(instances),
        }
    }
}

/// Dependency injection container
/// Owns the configuration, the type registry and every assembled instance
pub struct Container {
    config: Arc<ContainerConfig>,
    registry: Arc<TypeRegistry>,
    assembler: GraphAssembler,
}

impl Container {
    pub fn new(config: ContainerConfig, registry: TypeRegistry) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(registry);
        let assembler = GraphAssembler::new(registry.clone(), config.resolution.clone());

        Container {
            config,
            registry,
            assembler,
        }
    }

    /// Container with the default configuration
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self::new(ContainerConfig::default(), registry)
    }

    pub fn config(&self) -> &Arc<ContainerConfig> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn register(&mut self, definition: Definition) -> Result<()> {
        self.assembler.register(definition)
    }

    pub fn register_all<I>(&mut self, definitions: I) -> Result<()>
    where
        I: IntoIterator<Item = Definition>,
    {
        self.assembler.register_all(definitions).map(|_| ())
    }

    /// Register every bean of a parsed document
    pub fn load_document(&mut self, document: DefinitionDocument) -> Result<usize> {
        let definitions = document.into_definitions(self.config.default_scope)?;
        let count = definitions.len();
        self.register_all(definitions)?;
        Ok(count)
    }

    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let document = DefinitionDocument::from_json_str(json)?;
        self.load_document(document)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let document = DefinitionDocument::from_file(path)?;
        self.load_document(document)
    }

    /// Assemble every registered definition
    pub fn assemble(&mut self) -> Result<Assembly> {
        let ids: Vec<String> = self.assembler.definition_ids().map(str::to_string).collect();
        self.assembler.request(&ids).map(Assembly::from)
    }

    /// Assemble one definition; singletons come from the cache once built
    pub fn get(&mut self, id: &str) -> Result<AssembledInstance> {
        let mut assembled = self.assembler.request(&[id])?;
        assembled
            .swap_remove(id)
            .ok_or_else(|| AssemblyError::UnknownDefinition(id.to_string()))
    }

    /// Assemble one definition and borrow it as `T`. `Ok(None)` if the object
    /// is not a `T`.
    pub fn get_as<T: Bean, R>(&mut self, id: &str, f: impl FnOnce(&T) -> R) -> Result<Option<R>> {
        Ok(self.get(id)?.with(f))
    }

    /// Every instance built so far, in construction order
    pub fn instances(&self) -> &[AssembledInstance] {
        self.assembler.instances()
    }

    /// Run every `destroy` hook in reverse construction order
    pub fn shutdown(&mut self) -> std::result::Result<(), TeardownError> {
        self.assembler.teardown()
    }

    pub fn is_shut_down(&self) -> bool {
        self.assembler.is_closed()
    }
}
