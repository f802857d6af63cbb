//! RWX container binary
//!
//! Serves a demo lighting resource tree over stdin/stdout. Logs go to
//! stderr and to the configured log directory.
//!
//! Usage: `rwx-container [config.json]`

use anyhow::Result;
use rwx_container::{
    init_logging, ActionDescriptor, ContainerConfig, MethodDescriptor, OperationError,
    Operations, ParameterDescriptor, Resource, ResourceComponent, ResourceContainer, ResourceTree,
};
use rwx_core::{APPLICATION_JSON, TEXT_PLAIN};
use rwx_transport::{EnvelopeCodec, FramedTransport};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Dimmable light
#[derive(Debug)]
struct Light {
    on: AtomicBool,
    brightness: AtomicI64,
}

impl Light {
    fn new() -> Self {
        Self {
            on: AtomicBool::new(true),
            brightness: AtomicI64::new(100),
        }
    }

    fn state(&self) -> &'static str {
        if self.on.load(Ordering::SeqCst) {
            "on"
        } else {
            "off"
        }
    }
}

impl Resource for Light {
    fn operations(ops: &mut Operations<Self>) {
        ops.method(
            MethodDescriptor::new("get")
                .produces(TEXT_PLAIN)
                .documentation("Current switch state, on or off"),
            |light, _| Ok(Some(json!(light.state()))),
        )
        .method(
            MethodDescriptor::new("get").produces(APPLICATION_JSON),
            |light, _| {
                Ok(Some(json!({
                    "state": light.state(),
                    "brightness": light.brightness.load(Ordering::SeqCst),
                })))
            },
        )
        .method(
            MethodDescriptor::new("put")
                .consumes(TEXT_PLAIN)
                .documentation("Switch the light on or off"),
            |light, input| {
                let on = match input.as_ref().and_then(|v| v.as_str()) {
                    Some("on") => true,
                    Some("off") => false,
                    other => {
                        return Err(OperationError::failed(format!(
                            "expected on or off, got {:?}",
                            other
                        )))
                    }
                };
                light.on.store(on, Ordering::SeqCst);
                Ok(None)
            },
        );

        ops.action(
            ActionDescriptor::new("setBrightness")
                .documentation("Set brightness in percent")
                .parameter(ParameterDescriptor::of::<i64>("level").default_value("50"))
                .returns::<bool>(),
            |light, args| {
                let level = args.get::<i64>("level")?;
                if !(0..=100).contains(&level) {
                    return Ok(false);
                }
                light.brightness.store(level, Ordering::SeqCst);
                Ok(true)
            },
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ContainerConfig::from_file(path)?,
        None => ContainerConfig::default(),
    };
    init_logging(&config.log_dir, &config.log_prefix)?;
    info!("Starting {} as {}", config.name, config.jid);

    let tree = Arc::new(ResourceTree::new());
    tree.insert("/light/1", Arc::new(Light::new()))?;
    tree.insert("/light/2", Arc::new(Light::new()))?;

    let container = ResourceContainer::builder(config.address()?, tree)
        .with_subresources()
        .build();
    let component = ResourceComponent::new(container, config.max_concurrent_requests);

    let codec = EnvelopeCodec::with_max_frame_size(config.frame_format, config.max_frame_size);
    let transport = FramedTransport::new(tokio::io::stdin(), tokio::io::stdout(), codec);

    if let Err(e) = component.serve(transport).await {
        error!("Component error: {}", e);
        std::process::exit(1);
    }

    info!("Shut down");
    Ok(())
}
