use crate::operations::{Instance, Resource};
use crate::registry::{OperationRegistry, OperationTable};
use rwx_core::ConfigError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// A resolved resource: its instance plus the operation table of its type
#[derive(Clone)]
pub struct ResourceHandle {
    path: String,
    instance: Arc<Instance>,
    table: Arc<OperationTable>,
}

impl ResourceHandle {
    pub fn new(path: impl Into<String>, instance: Arc<Instance>, table: Arc<OperationTable>) -> Self {
        Self {
            path: path.into(),
            instance,
            table,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn instance(&self) -> &Instance {
        self.instance.as_ref()
    }

    pub fn table(&self) -> &OperationTable {
        &self.table
    }

    pub fn type_name(&self) -> &'static str {
        self.table.resource_type()
    }

    pub fn downcast<R: Resource>(&self) -> Option<&R> {
        self.instance.downcast_ref::<R>()
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("path", &self.path)
            .field("type", &self.type_name())
            .finish()
    }
}

/// Resolves resource paths for the container
pub trait ResourceNamespace: Send + Sync {
    fn resolve(&self, path: &str) -> Option<ResourceHandle>;

    /// Direct children of `path`, as normalized paths
    fn children(&self, path: &str) -> Vec<String>;
}

/// Canonical form of a resource path: leading `/`, no trailing `/` except
/// for the root, no empty segments.
pub fn normalize_path(path: &str) -> Result<String, ConfigError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| s.chars().any(|c| c.is_whitespace() || c == '#')) {
        return Err(ConfigError::InvalidPath(path.to_string()));
    }
    Ok(format!("/{}", segments.join("/")))
}

/// In-memory namespace keyed by normalized path
#[derive(Debug, Default)]
pub struct ResourceTree {
    registry: Arc<OperationRegistry>,
    resources: RwLock<BTreeMap<String, ResourceHandle>>,
}

impl ResourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree sharing an operation registry with other trees
    pub fn with_registry(registry: Arc<OperationRegistry>) -> Self {
        Self {
            registry,
            resources: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Mount `resource` at `path`, registering its type on first use.
    /// Replaces any resource previously mounted there.
    pub fn insert<R: Resource>(&self, path: &str, resource: Arc<R>) -> Result<(), ConfigError> {
        let path = normalize_path(path)?;
        let table = self.registry.describe::<R>()?;
        let handle = ResourceHandle::new(path.clone(), resource, table);

        info!("Mounted {} at {}", handle.type_name(), path);
        self.write().insert(path, handle);
        Ok(())
    }

    pub fn remove(&self, path: &str) -> Option<ResourceHandle> {
        let path = normalize_path(path).ok()?;
        let removed = self.write().remove(&path);
        if removed.is_some() {
            debug!("Unmounted {}", path);
        }
        removed
    }

    pub fn paths(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // writers only insert or remove whole handles; poisoning leaves the map consistent
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, ResourceHandle>> {
        self.resources.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, ResourceHandle>> {
        self.resources.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResourceNamespace for ResourceTree {
    fn resolve(&self, path: &str) -> Option<ResourceHandle> {
        let path = normalize_path(path).ok()?;
        self.read().get(&path).cloned()
    }

    fn children(&self, path: &str) -> Vec<String> {
        let Ok(parent) = normalize_path(path) else {
            return Vec::new();
        };
        let prefix = if parent == "/" {
            parent.clone()
        } else {
            format!("{}/", parent)
        };

        let resources = self.read();
        let children: BTreeSet<String> = resources
            .keys()
            .filter_map(|candidate| {
                let rest = candidate.strip_prefix(&prefix)?;
                let first = rest.split('/').next().filter(|s| !s.is_empty())?;
                Some(format!("{}{}", prefix, first))
            })
            .collect();
        children.into_iter().collect()
    }
}
