//! Explicit registration of a resource type's methods and actions.

use crate::descriptor::{ActionDescriptor, MethodDescriptor};
use rwx_core::{NativeValue, ParameterType, Representation, TypedValue, XmppUri};
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased resource instance as stored in a namespace
pub type Instance = dyn Any + Send + Sync;

pub(crate) type MethodHandler = Arc<
    dyn Fn(&Instance, Option<Representation>) -> Result<Option<Representation>, OperationError>
        + Send
        + Sync,
>;

pub(crate) type ActionHandler =
    Arc<dyn Fn(&Instance, &Arguments) -> Result<Option<TypedValue>, OperationError> + Send + Sync>;

/// An addressable unit exposing methods and actions.
///
/// `operations` is called once per type; the resulting table is shared by
/// every instance. The container never serializes calls on one instance, so
/// resources holding mutable state must synchronize internally.
pub trait Resource: Any + Send + Sync + Sized {
    fn operations(ops: &mut Operations<Self>);
}

/// Collects descriptors together with the closures that implement them
pub struct Operations<R> {
    pub(crate) methods: Vec<(MethodDescriptor, MethodHandler)>,
    pub(crate) actions: Vec<(ActionDescriptor, ActionHandler)>,
    _resource: PhantomData<fn(&R)>,
}

impl<R: Resource> Operations<R> {
    pub(crate) fn new() -> Self {
        Self {
            methods: Vec::new(),
            actions: Vec::new(),
            _resource: PhantomData,
        }
    }

    /// Bind a method. The handler receives the decoded request
    /// representation when the descriptor consumes one, and must return a
    /// representation when it produces one.
    pub fn method<F>(&mut self, descriptor: MethodDescriptor, handler: F) -> &mut Self
    where
        F: Fn(&R, Option<Representation>) -> Result<Option<Representation>, OperationError>
            + Send
            + Sync
            + 'static,
    {
        let erased: MethodHandler = Arc::new(move |instance: &Instance, input: Option<Representation>| {
            let resource = downcast::<R>(instance)?;
            handler(resource, input)
        });
        self.methods.push((descriptor, erased));
        self
    }

    /// Bind an action. Arguments arrive bound and type-checked in
    /// declaration order.
    pub fn action<F, T>(&mut self, descriptor: ActionDescriptor, handler: F) -> &mut Self
    where
        F: Fn(&R, &Arguments) -> Result<T, OperationError> + Send + Sync + 'static,
        T: ActionOutput,
    {
        let erased: ActionHandler = Arc::new(move |instance: &Instance, args: &Arguments| {
            let resource = downcast::<R>(instance)?;
            handler(resource, args).map(ActionOutput::into_result)
        });
        self.actions.push((descriptor, erased));
        self
    }
}

impl<R> fmt::Debug for Operations<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operations")
            .field("resource", &type_name::<R>())
            .field("methods", &self.methods.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

fn downcast<R: Resource>(instance: &Instance) -> Result<&R, OperationError> {
    instance
        .downcast_ref::<R>()
        .ok_or(OperationError::WrongInstance(type_name::<R>()))
}

/// Arguments bound for one action call, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, TypedValue)>,
}

impl Arguments {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: String, value: TypedValue) {
        self.values.push((name, value));
    }

    pub fn get<T: NativeValue>(&self, name: &str) -> Result<T, OperationError> {
        let value = self
            .value(name)
            .ok_or_else(|| OperationError::MissingArgument(name.to_string()))?;
        T::from_typed(value).ok_or_else(|| OperationError::ArgumentType {
            name: name.to_string(),
            expected: T::TYPE,
            actual: value.parameter_type(),
        })
    }

    pub fn value(&self, name: &str) -> Option<&TypedValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &TypedValue> {
        self.values.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Native return values of action handlers
pub trait ActionOutput {
    fn into_result(self) -> Option<TypedValue>;
}

impl ActionOutput for () {
    fn into_result(self) -> Option<TypedValue> {
        None
    }
}

impl ActionOutput for TypedValue {
    fn into_result(self) -> Option<TypedValue> {
        Some(self)
    }
}

impl ActionOutput for Option<TypedValue> {
    fn into_result(self) -> Option<TypedValue> {
        self
    }
}

macro_rules! native_output {
    ($($ty:ty),*) => {
        $(
            impl ActionOutput for $ty {
                fn into_result(self) -> Option<TypedValue> {
                    Some(self.into_typed())
                }
            }
        )*
    };
}

native_output!(String, i64, f64, bool, XmppUri);

/// Failure raised by a resource's handler
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("{0}")]
    Failed(String),

    #[error("No argument named {0}")]
    MissingArgument(String),

    #[error("Argument {name} is {actual}, expected {expected}")]
    ArgumentType {
        name: String,
        expected: ParameterType,
        actual: ParameterType,
    },

    #[error("Handler for {0} invoked on a different resource type")]
    WrongInstance(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed(message.into())
    }
}
