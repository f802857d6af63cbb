use crate::namespace::{ResourceHandle, ResourceNamespace};
use rwx_core::{CapabilityDocument, ExtensionNode};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// Hook run on every capability document after the base nodes are rendered.
/// Plugins run in registration order and each receives the document as left
/// by the previous one.
pub trait ContainerPlugin: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn extend(
        &self,
        document: CapabilityDocument,
        path: &str,
        resource: &ResourceHandle,
    ) -> CapabilityDocument;
}

/// Appends a `subresources` node listing the direct children of the
/// described resource
pub struct SubresourcePlugin {
    namespace: Arc<dyn ResourceNamespace>,
}

impl SubresourcePlugin {
    pub const NAME: &'static str = "subresources";

    pub fn new(namespace: Arc<dyn ResourceNamespace>) -> Self {
        Self { namespace }
    }
}

impl fmt::Debug for SubresourcePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubresourcePlugin").finish_non_exhaustive()
    }
}

impl ContainerPlugin for SubresourcePlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn extend(
        &self,
        mut document: CapabilityDocument,
        path: &str,
        _resource: &ResourceHandle,
    ) -> CapabilityDocument {
        let children = self.namespace.children(path);
        document.extensions.push(ExtensionNode {
            plugin: Self::NAME.to_string(),
            name: "children".to_string(),
            content: json!(children),
        });
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MethodDescriptor;
    use crate::namespace::ResourceTree;
    use crate::operations::{Operations, Resource};

    struct Folder;

    impl Resource for Folder {
        fn operations(ops: &mut Operations<Self>) {
            ops.method(MethodDescriptor::new("get"), |_, _| Ok(None));
        }
    }

    #[test]
    fn test_subresources_listed() {
        let tree = Arc::new(ResourceTree::new());
        tree.insert("/house", Arc::new(Folder)).unwrap();
        tree.insert("/house/kitchen", Arc::new(Folder)).unwrap();
        tree.insert("/house/hall", Arc::new(Folder)).unwrap();

        let plugin = SubresourcePlugin::new(tree.clone());
        let handle = tree.resolve("/house").unwrap();
        let doc = plugin.extend(CapabilityDocument::new("/house"), "/house", &handle);

        let nodes: Vec<_> = doc.extensions_of(SubresourcePlugin::NAME).collect();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].content, json!(["/house/hall", "/house/kitchen"]));
    }
}
