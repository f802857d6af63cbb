//! Resource container for RWX: resources register methods and actions,
//! the container dispatches REST documents to them and describes them
//! as capability documents.

pub mod capability;
pub mod component;
pub mod config;
pub mod container;
pub mod descriptor;
pub mod dispatch;
pub mod logging;
pub mod namespace;
pub mod operations;
pub mod plugin;
pub mod registry;

pub use capability::CapabilityBuilder;
pub use component::ResourceComponent;
pub use config::ContainerConfig;
pub use container::{ContainerBuilder, ResourceContainer};
pub use descriptor::{
    ActionDescriptor, MediaBinding, MethodDescriptor, ParameterDescriptor, ResultDescriptor,
};
pub use logging::{init_logging, init_test_logging};
pub use namespace::{normalize_path, ResourceHandle, ResourceNamespace, ResourceTree};
pub use operations::{ActionOutput, Arguments, Instance, OperationError, Operations, Resource};
pub use plugin::{ContainerPlugin, SubresourcePlugin};
pub use registry::{ActionEntry, MethodEntry, OperationRegistry, OperationTable};

pub use rwx_core::{
    ActionInvocation, CapabilityDocument, CodecRegistry, ConfigError, DispatchError, ErrorCode,
    MethodInvocation, ParameterType, ProtocolDocument, Representation, TypedValue, XmppUri,
};
