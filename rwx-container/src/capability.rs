//! Renders capability documents from operation tables.

use crate::descriptor::{ActionDescriptor, MethodDescriptor, ParameterDescriptor};
use crate::namespace::ResourceHandle;
use crate::plugin::ContainerPlugin;
use rwx_core::{
    ActionNode, CapabilityDocument, CodecRegistry, Documentation, MethodNode, ParameterNode,
    RequestNode, ResponseNode, ResultNode,
};
use std::sync::Arc;
use tracing::{debug, warn};

const RESULT_TITLE: &str = "Return type";

#[derive(Debug, Clone)]
pub struct CapabilityBuilder {
    codecs: Arc<CodecRegistry>,
    plugins: Arc<[Arc<dyn ContainerPlugin>]>,
}

impl CapabilityBuilder {
    pub fn new(codecs: Arc<CodecRegistry>, plugins: Vec<Arc<dyn ContainerPlugin>>) -> Self {
        Self {
            codecs,
            plugins: plugins.into(),
        }
    }

    /// Base document for `handle`, then every plugin in order
    pub fn build(&self, handle: &ResourceHandle) -> CapabilityDocument {
        let base = self.render(handle);
        self.plugins.iter().fold(base, |document, plugin| {
            debug!("Applying plugin {} to {}", plugin.name(), handle.path());
            plugin.extend(document, handle.path(), handle)
        })
    }

    /// One node per registered method and action, nothing else
    pub fn render(&self, handle: &ResourceHandle) -> CapabilityDocument {
        let table = handle.table();
        let mut document = CapabilityDocument::new(handle.path());
        document.methods = table.methods().map(|m| self.method_node(m)).collect();
        document.actions = table.actions().map(action_node).collect();
        document
    }

    pub fn plugins(&self) -> impl Iterator<Item = &Arc<dyn ContainerPlugin>> {
        self.plugins.iter()
    }

    fn method_node(&self, method: &MethodDescriptor) -> MethodNode {
        let request = method.consumes_media_type().map(|media_type| {
            let templates = match self.codecs.lookup(media_type) {
                Ok(codec) => codec.templates(),
                Err(e) => {
                    warn!("{}: rendering {} without templates", e, method.method_type);
                    Vec::new()
                }
            };
            RequestNode {
                media_type: media_type.to_string(),
                templates,
            }
        });

        MethodNode {
            method_type: method.method_type.clone(),
            documentation: documentation(&method.method_type, method.documentation.as_deref()),
            request,
            response: method.produces_media_type().map(|media_type| ResponseNode {
                media_type: media_type.to_string(),
            }),
        }
    }
}

fn action_node(action: &ActionDescriptor) -> ActionNode {
    ActionNode {
        name: action.name.clone(),
        documentation: documentation(&action.name, action.documentation.as_deref()),
        parameters: action.parameters.iter().map(parameter_node).collect(),
        result: action.result.as_ref().map(|result| ResultNode {
            result_type: result.result_type,
            documentation: documentation(RESULT_TITLE, result.documentation.as_deref()),
        }),
    }
}

fn parameter_node(parameter: &ParameterDescriptor) -> ParameterNode {
    ParameterNode {
        name: parameter.name.clone(),
        parameter_type: parameter.parameter_type,
        default_value: parameter.effective_default().map(str::to_string),
        documentation: documentation(&parameter.name, parameter.documentation.as_deref()),
    }
}

fn documentation(title: &str, text: Option<&str>) -> Option<Documentation> {
    text.map(|text| Documentation::new(title, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{ResourceNamespace, ResourceTree};
    use crate::operations::{Operations, Resource};
    use rwx_core::{APPLICATION_JSON, TEXT_URI_LIST};

    struct Playlist;

    impl Resource for Playlist {
        fn operations(ops: &mut Operations<Self>) {
            ops.method(
                MethodDescriptor::new("put")
                    .consumes(TEXT_URI_LIST)
                    .documentation("Replace the tracks"),
                |_, _| Ok(None),
            )
            .method(
                MethodDescriptor::new("put").consumes("application/x-m3u"),
                |_, _| Ok(None),
            );
            ops.action(
                ActionDescriptor::new("shuffle")
                    .parameter(
                        ParameterDescriptor::of::<i64>("seed")
                            .default_value("")
                            .documentation("Random seed"),
                    )
                    .returns::<bool>(),
                |_, _| Ok(true),
            );
        }
    }

    fn handle() -> ResourceHandle {
        let tree = ResourceTree::new();
        tree.insert("/playlist", Arc::new(Playlist)).unwrap();
        tree.resolve("/playlist").unwrap()
    }

    #[test]
    fn test_templates_come_from_codec() {
        let builder = CapabilityBuilder::new(Arc::new(CodecRegistry::with_defaults()), Vec::new());
        let doc = builder.build(&handle());

        let put = doc.find_method("put", Some(TEXT_URI_LIST), None).unwrap();
        assert_eq!(put.request.as_ref().unwrap().templates.len(), 1);
        assert_eq!(
            put.documentation,
            Some(Documentation::new("put", "Replace the tracks"))
        );

        // no codec registered for m3u
        let m3u = doc.find_method("put", Some("application/x-m3u"), None).unwrap();
        assert!(m3u.request.as_ref().unwrap().templates.is_empty());
        assert!(doc.find_method("put", Some(APPLICATION_JSON), None).is_none());
    }

    #[test]
    fn test_action_rendering() {
        let builder = CapabilityBuilder::new(Arc::new(CodecRegistry::new()), Vec::new());
        let doc = builder.render(&handle());

        let shuffle = doc.find_action("shuffle").unwrap();
        let seed = shuffle.parameter("seed").unwrap();
        assert_eq!(seed.default_value, None);
        assert_eq!(
            seed.documentation,
            Some(Documentation::new("seed", "Random seed"))
        );
        let result = shuffle.result.as_ref().unwrap();
        assert_eq!(result.result_type, rwx_core::ParameterType::Boolean);
        assert_eq!(result.documentation, None);
    }
}
