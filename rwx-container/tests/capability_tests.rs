use rwx_container::{
    ActionDescriptor, ContainerPlugin, MethodDescriptor, Operations, ParameterDescriptor, Resource,
    ResourceContainer, ResourceHandle, ResourceTree, SubresourcePlugin,
};
use rwx_core::{CapabilityDocument, ErrorCode, ExtensionNode, JsonCodec, XmppUri};
use serde_json::json;
use std::sync::Arc;

struct Light;

impl Resource for Light {
    fn operations(ops: &mut Operations<Self>) {
        ops.method(
            MethodDescriptor::new("get")
                .produces("text/plain")
                .documentation("Switch state"),
            |_, _| Ok(Some(json!("on"))),
        )
        .method(
            MethodDescriptor::new("put").consumes("application/json"),
            |_, _| Ok(None),
        )
        .method(MethodDescriptor::new("delete"), |_, _| Ok(None));
        ops.action(
            ActionDescriptor::new("setBrightness")
                .documentation("Dim the light")
                .parameter(
                    ParameterDescriptor::of::<i64>("level")
                        .default_value("50")
                        .documentation("Percent"),
                )
                .returns::<bool>(),
            |_, _| Ok(true),
        );
        ops.action(ActionDescriptor::new("blink"), |_, _| Ok(()));
    }
}

/// Appends a marker node carrying how many extensions it saw
#[derive(Debug)]
struct Marker(&'static str);

impl ContainerPlugin for Marker {
    fn name(&self) -> &str {
        self.0
    }

    fn extend(
        &self,
        mut document: CapabilityDocument,
        path: &str,
        resource: &ResourceHandle,
    ) -> CapabilityDocument {
        document.extensions.push(ExtensionNode {
            plugin: self.0.to_string(),
            name: "marker".to_string(),
            content: json!({
                "path": path,
                "seen": document.extensions.len(),
                "type": resource.type_name().rsplit("::").next(),
            }),
        });
        document
    }
}

fn tree() -> Arc<ResourceTree> {
    let tree = Arc::new(ResourceTree::new());
    tree.insert("/light/1", Arc::new(Light)).unwrap();
    tree.insert("/light/1/bulb", Arc::new(Light)).unwrap();
    tree
}

fn address() -> XmppUri {
    XmppUri::entity("lights.example.org").unwrap()
}

#[test]
fn test_one_node_per_descriptor() {
    let container = ResourceContainer::builder(address(), tree()).build();
    let doc = container.describe_capabilities("/light/1").unwrap();

    assert_eq!(doc.path, "/light/1");
    assert_eq!(doc.methods.len(), 3);
    assert_eq!(doc.actions.len(), 2);
    assert!(doc.extensions.is_empty());

    let set = doc.find_action("setBrightness").unwrap();
    assert_eq!(set.parameter("level").unwrap().default_value.as_deref(), Some("50"));
    assert!(doc.find_action("blink").unwrap().result.is_none());
}

#[test]
fn test_plugins_run_in_registration_order() {
    let container = ResourceContainer::builder(address(), tree())
        .plugin(Arc::new(Marker("first")))
        .plugin(Arc::new(Marker("second")))
        .build();
    let doc = container.describe_capabilities("/light/1").unwrap();

    // plugins only append
    assert_eq!(doc.methods.len(), 3);
    assert_eq!(doc.actions.len(), 2);

    let order: Vec<_> = doc.extensions.iter().map(|e| e.plugin.as_str()).collect();
    assert_eq!(order, vec!["first", "second"]);
    assert_eq!(doc.extensions[0].content["seen"], 0);
    assert_eq!(doc.extensions[1].content["seen"], 1);
    assert_eq!(doc.extensions[1].content["type"], "Light");
}

#[test]
fn test_documents_are_built_fresh() {
    let tree = tree();
    let container = ResourceContainer::builder(address(), tree.clone())
        .with_subresources()
        .build();

    let before = container.describe_capabilities("/light/1").unwrap();
    tree.insert("/light/1/switch", Arc::new(Light)).unwrap();
    let after = container.describe_capabilities("/light/1").unwrap();

    let children = |doc: &CapabilityDocument| {
        doc.extensions_of(SubresourcePlugin::NAME)
            .next()
            .map(|node| node.content.clone())
    };
    assert_eq!(children(&before), Some(json!(["/light/1/bulb"])));
    assert_eq!(
        children(&after),
        Some(json!(["/light/1/bulb", "/light/1/switch"]))
    );
}

#[test]
fn test_unknown_path() {
    let container = ResourceContainer::builder(address(), tree()).build();
    let err = container.describe_capabilities("/light/9").unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[test]
fn test_capability_document_snapshot() {
    let json_codec = JsonCodec::with_templates(vec![json!({ "state": "on" })]);
    let container = ResourceContainer::builder(address(), tree())
        .codecs(rwx_core::CodecRegistry::new())
        .codec(Arc::new(json_codec))
        .unwrap()
        .with_subresources()
        .build();
    let doc = container.describe_capabilities("/light/1").unwrap();

    insta::assert_json_snapshot!(doc, @r#"
    {
      "path": "/light/1",
      "methods": [
        {
          "type": "get",
          "documentation": {
            "title": "get",
            "text": "Switch state"
          },
          "response": {
            "mediaType": "text/plain"
          }
        },
        {
          "type": "put",
          "request": {
            "mediaType": "application/json",
            "templates": [
              "{\"state\":\"on\"}"
            ]
          }
        },
        {
          "type": "delete"
        }
      ],
      "actions": [
        {
          "name": "setBrightness",
          "documentation": {
            "title": "setBrightness",
            "text": "Dim the light"
          },
          "parameters": [
            {
              "name": "level",
              "type": "INTEGER",
              "defaultValue": "50",
              "documentation": {
                "title": "level",
                "text": "Percent"
              }
            }
          ],
          "result": {
            "type": "BOOLEAN"
          }
        },
        {
          "name": "blink",
          "parameters": []
        }
      ],
      "extensions": [
        {
          "plugin": "subresources",
          "name": "children",
          "content": [
            "/light/1/bulb"
          ]
        }
      ]
    }
    "#);
}
