use crate::descriptor::{ActionDescriptor, MethodDescriptor};
use crate::operations::{ActionHandler, Arguments, Instance, MethodHandler, OperationError, Operations, Resource};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;
use rwx_core::{ConfigError, Representation, TypedValue};
use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A method descriptor bound to its handler
pub struct MethodEntry {
    descriptor: MethodDescriptor,
    handler: MethodHandler,
}

impl MethodEntry {
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    pub(crate) fn invoke(
        &self,
        instance: &Instance,
        input: Option<Representation>,
    ) -> Result<Option<Representation>, OperationError> {
        (self.handler)(instance, input)
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// An action descriptor bound to its handler, with defaults parsed up front
pub struct ActionEntry {
    descriptor: ActionDescriptor,
    defaults: Vec<Option<TypedValue>>,
    handler: ActionHandler,
}

impl ActionEntry {
    pub fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    /// Parsed default of the parameter at `index`
    pub fn default_for(&self, index: usize) -> Option<&TypedValue> {
        self.defaults.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn invoke(
        &self,
        instance: &Instance,
        args: &Arguments,
    ) -> Result<Option<TypedValue>, OperationError> {
        (self.handler)(instance, args)
    }
}

impl fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEntry")
            .field("descriptor", &self.descriptor)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Immutable description of one resource type's operations
#[derive(Debug)]
pub struct OperationTable {
    resource: &'static str,
    methods: Vec<MethodEntry>,
    actions: IndexMap<String, ActionEntry>,
}

impl OperationTable {
    /// Validate and freeze what a resource type registered
    pub(crate) fn build<R>(resource: &'static str, ops: Operations<R>) -> Result<Self, ConfigError> {
        let methods = build_methods(resource, ops.methods)?;
        let actions = build_actions(resource, ops.actions)?;
        Ok(Self {
            resource,
            methods,
            actions,
        })
    }

    /// Rust type name of the resource this table describes
    pub fn resource_type(&self) -> &'static str {
        self.resource
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().map(|m| &m.descriptor)
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.values().map(|a| &a.descriptor)
    }

    pub fn method_entries(&self) -> &[MethodEntry] {
        &self.methods
    }

    pub fn action(&self, name: &str) -> Option<&ActionEntry> {
        self.actions.get(name)
    }
}

fn build_methods(
    resource: &str,
    methods: Vec<(MethodDescriptor, MethodHandler)>,
) -> Result<Vec<MethodEntry>, ConfigError> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(methods.len());

    for (index, (descriptor, handler)) in methods.into_iter().enumerate() {
        if descriptor.method_type.is_empty() {
            return Err(ConfigError::MissingMethodType {
                resource: resource.to_string(),
                index,
            });
        }
        let empty_media = [descriptor.consumes_media_type(), descriptor.produces_media_type()]
            .into_iter()
            .flatten()
            .any(str::is_empty);
        if empty_media {
            return Err(ConfigError::EmptyMediaType {
                resource: resource.to_string(),
                method_type: descriptor.method_type.clone(),
            });
        }

        let (method_type, consumes, produces) = descriptor.signature();
        let key = (
            method_type.to_string(),
            consumes.map(str::to_string),
            produces.map(str::to_string),
        );
        if !seen.insert(key.clone()) {
            let (method_type, consumes, produces) = key;
            return Err(ConfigError::DuplicateMethod {
                resource: resource.to_string(),
                method_type,
                consumes,
                produces,
            });
        }

        entries.push(MethodEntry {
            descriptor,
            handler,
        });
    }

    Ok(entries)
}

fn build_actions(
    resource: &str,
    actions: Vec<(ActionDescriptor, ActionHandler)>,
) -> Result<IndexMap<String, ActionEntry>, ConfigError> {
    let mut entries = IndexMap::with_capacity(actions.len());

    for (index, (descriptor, handler)) in actions.into_iter().enumerate() {
        if descriptor.name.is_empty() {
            return Err(ConfigError::MissingActionName {
                resource: resource.to_string(),
                index,
            });
        }
        if entries.contains_key(&descriptor.name) {
            return Err(ConfigError::DuplicateAction {
                resource: resource.to_string(),
                name: descriptor.name.clone(),
            });
        }

        let mut names = HashSet::new();
        let mut defaults = Vec::with_capacity(descriptor.parameters.len());
        for (position, parameter) in descriptor.parameters.iter().enumerate() {
            if parameter.name.is_empty() {
                return Err(ConfigError::MissingParameterName {
                    resource: resource.to_string(),
                    action: descriptor.name.clone(),
                    index: position,
                });
            }
            if !names.insert(parameter.name.as_str()) {
                return Err(ConfigError::DuplicateParameter {
                    resource: resource.to_string(),
                    action: descriptor.name.clone(),
                    parameter: parameter.name.clone(),
                });
            }
            let default = match parameter.effective_default() {
                Some(text) => Some(TypedValue::parse(parameter.parameter_type, text).map_err(
                    |_| ConfigError::InvalidDefault {
                        resource: resource.to_string(),
                        action: descriptor.name.clone(),
                        parameter: parameter.name.clone(),
                        parameter_type: parameter.parameter_type,
                        value: text.to_string(),
                    },
                )?),
                None => None,
            };
            defaults.push(default);
        }

        entries.insert(
            descriptor.name.clone(),
            ActionEntry {
                descriptor,
                defaults,
                handler,
            },
        );
    }

    Ok(entries)
}

/// Per-type cache of operation tables. Building a table runs the type's
/// registration exactly once; later lookups share the same `Arc`.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    tables: DashMap<TypeId, Arc<OperationTable>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `R`, built on first use. Concurrent first callers wait on
    /// the shard lock so `R::operations` runs once per registry.
    pub fn describe<R: Resource>(&self) -> Result<Arc<OperationTable>, ConfigError> {
        let type_id = TypeId::of::<R>();
        if let Some(table) = self.tables.get(&type_id) {
            return Ok(Arc::clone(table.value()));
        }

        match self.tables.entry(type_id) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let mut ops = Operations::<R>::new();
                R::operations(&mut ops);
                let table = Arc::new(OperationTable::build(type_name::<R>(), ops)?);
                info!(
                    "Registered resource type {} ({} methods, {} actions)",
                    table.resource_type(),
                    table.methods.len(),
                    table.actions.len()
                );
                entry.insert(Arc::clone(&table));
                debug!("Operation table cached for {}", type_name::<R>());
                Ok(table)
            }
        }
    }

    pub fn is_registered<R: Resource>(&self) -> bool {
        self.tables.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
