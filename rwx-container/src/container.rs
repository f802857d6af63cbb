use crate::capability::CapabilityBuilder;
use crate::dispatch::{invoke_action, invoke_method};
use crate::namespace::{normalize_path, ResourceHandle, ResourceNamespace};
use crate::plugin::{ContainerPlugin, SubresourcePlugin};
use rwx_core::{
    CapabilityDocument, Codec, CodecRegistry, ConfigError, DiscoItems, DispatchError,
    ProtocolDocument, XmppUri,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Assembles a [`ResourceContainer`]. Codecs and plugins can only be added
/// here; the container built from it is immutable.
pub struct ContainerBuilder {
    address: XmppUri,
    namespace: Arc<dyn ResourceNamespace>,
    codecs: CodecRegistry,
    plugins: Vec<Arc<dyn ContainerPlugin>>,
}

impl ContainerBuilder {
    /// `address` is the entity URI of the container (no path); the
    /// default codecs are pre-registered.
    pub fn new(address: XmppUri, namespace: Arc<dyn ResourceNamespace>) -> Self {
        Self {
            address,
            namespace,
            codecs: CodecRegistry::with_defaults(),
            plugins: Vec::new(),
        }
    }

    /// Start from an explicit codec set instead of the defaults
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Result<Self, ConfigError> {
        self.codecs.register(codec)?;
        Ok(self)
    }

    /// Append a plugin; plugins run in the order they were added
    pub fn plugin(mut self, plugin: Arc<dyn ContainerPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Append the built-in plugin listing child resources
    pub fn with_subresources(self) -> Self {
        let plugin = Arc::new(SubresourcePlugin::new(Arc::clone(&self.namespace)));
        self.plugin(plugin)
    }

    pub fn build(self) -> ResourceContainer {
        let codecs = Arc::new(self.codecs);
        info!(
            "Container {} ready ({} codecs, {} plugins)",
            self.address,
            codecs.media_types().count(),
            self.plugins.len()
        );
        ResourceContainer {
            address: self.address,
            namespace: self.namespace,
            capabilities: CapabilityBuilder::new(Arc::clone(&codecs), self.plugins),
            codecs,
        }
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("address", &self.address)
            .field("codecs", &self.codecs)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

/// Entry points for invocation, capability description and discovery.
/// Every method is synchronous and safe to call from many threads at once.
#[derive(Clone)]
pub struct ResourceContainer {
    address: XmppUri,
    namespace: Arc<dyn ResourceNamespace>,
    codecs: Arc<CodecRegistry>,
    capabilities: CapabilityBuilder,
}

impl ResourceContainer {
    pub fn builder(address: XmppUri, namespace: Arc<dyn ResourceNamespace>) -> ContainerBuilder {
        ContainerBuilder::new(address, namespace)
    }

    pub fn address(&self) -> &XmppUri {
        &self.address
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Execute the method or action invocation carried by `document`
    pub fn dispatch(&self, document: ProtocolDocument) -> Result<ProtocolDocument, DispatchError> {
        let ProtocolDocument {
            path,
            method,
            action,
        } = document;

        match (method, action) {
            (Some(method), None) => {
                info!("Method {} on {}", method.method_type, path);
                let handle = self.resolve(&path)?;
                let method = invoke_method(&handle, &self.codecs, method)?;
                Ok(ProtocolDocument::method(path, method))
            }
            (None, Some(action)) => {
                info!("Action {} on {}", action.name, path);
                let handle = self.resolve(&path)?;
                let action = invoke_action(&handle, action)?;
                Ok(ProtocolDocument::action(path, action))
            }
            (Some(_), Some(_)) => Err(DispatchError::invalid_document(format!(
                "Document for {} carries both a method and an action",
                path
            ))),
            (None, None) => Err(DispatchError::invalid_document(format!(
                "Document for {} carries neither a method nor an action",
                path
            ))),
        }
    }

    /// Capability document of the resource at `path`, extended by every plugin
    pub fn describe_capabilities(&self, path: &str) -> Result<CapabilityDocument, DispatchError> {
        info!("Describing {}", path);
        let handle = self.resolve(path)?;
        Ok(self.capabilities.build(&handle))
    }

    /// Direct children of `path`, keyed by their xmpp URI. The root always
    /// exists; any other path must be a resource or have children.
    pub fn discover_items(&self, path: &str) -> Result<DiscoItems, DispatchError> {
        let parent = normalize_path(path).map_err(|_| DispatchError::resource_not_found(path))?;
        let children = self.namespace.children(&parent);
        if parent != "/" && children.is_empty() && self.namespace.resolve(&parent).is_none() {
            return Err(DispatchError::resource_not_found(path));
        }

        let mut items = DiscoItems::new();
        for child in children {
            let address = self
                .address
                .with_path(child.as_str())
                .map_err(|e| DispatchError::internal(e.to_string()))?;
            let name = child.rsplit('/').next().unwrap_or_default().to_string();
            items.add_item(address.to_string(), name);
        }
        debug!("Discovered {} items under {}", items.items.len(), parent);
        Ok(items)
    }

    fn resolve(&self, path: &str) -> Result<ResourceHandle, DispatchError> {
        self.namespace.resolve(path).ok_or_else(|| {
            debug!("Nothing mounted at {}", path);
            DispatchError::resource_not_found(path)
        })
    }
}

impl fmt::Debug for ResourceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceContainer")
            .field("address", &self.address)
            .field("codecs", &self.codecs)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MethodDescriptor;
    use crate::namespace::ResourceTree;
    use crate::operations::{Operations, Resource};
    use rwx_core::{ActionInvocation, ErrorCode, MethodInvocation};

    struct Door;

    impl Resource for Door {
        fn operations(ops: &mut Operations<Self>) {
            ops.method(MethodDescriptor::new("get"), |_, _| Ok(None));
        }
    }

    fn container() -> ResourceContainer {
        let tree = Arc::new(ResourceTree::new());
        tree.insert("/house/door/front", Arc::new(Door)).unwrap();
        tree.insert("/house/door/back", Arc::new(Door)).unwrap();
        ResourceContainer::builder(XmppUri::entity("house.example.org").unwrap(), tree).build()
    }

    #[test]
    fn test_document_must_carry_exactly_one_invocation() {
        let container = container();

        let mut both = ProtocolDocument::method("/house/door/front", MethodInvocation::new("get"));
        both.action = Some(ActionInvocation::new("open"));
        assert_eq!(
            container.dispatch(both).unwrap_err().code,
            ErrorCode::InvalidDocument
        );

        let neither = ProtocolDocument {
            path: "/house/door/front".into(),
            method: None,
            action: None,
        };
        assert_eq!(
            container.dispatch(neither).unwrap_err().code,
            ErrorCode::InvalidDocument
        );
    }

    #[test]
    fn test_unknown_path() {
        let container = container();
        let doc = ProtocolDocument::method("/garage", MethodInvocation::new("get"));
        assert_eq!(
            container.dispatch(doc).unwrap_err().code,
            ErrorCode::ResourceNotFound
        );
        assert_eq!(
            container.describe_capabilities("/garage").unwrap_err().code,
            ErrorCode::ResourceNotFound
        );
        assert_eq!(
            container.discover_items("/garage").unwrap_err().code,
            ErrorCode::ResourceNotFound
        );
    }

    #[test]
    fn test_discover_items() {
        let container = container();

        let items = container.discover_items("/house/door").unwrap();
        assert_eq!(
            items.addresses().collect::<Vec<_>>(),
            vec![
                "xmpp://house.example.org#/house/door/back",
                "xmpp://house.example.org#/house/door/front",
            ]
        );
        assert_eq!(
            items.items.get("xmpp://house.example.org#/house/door/front"),
            Some(&"front".to_string())
        );

        // intermediate paths are discoverable even without a resource
        assert_eq!(container.discover_items("/").unwrap().items.len(), 1);
        assert!(container.discover_items("/house/door/back").unwrap().items.is_empty());
    }
}
