//! Method and action invocation against a resolved resource.

use crate::namespace::ResourceHandle;
use crate::operations::{Arguments, OperationError};
use crate::registry::MethodEntry;
use rwx_core::{
    ActionInvocation, CodecRegistry, DispatchError, ErrorCode, MethodInvocation, Payload,
    RepresentationError, TypedValue,
};
use tracing::{debug, warn};

/// Negotiate, decode, invoke and encode one method call. The returned
/// invocation carries the response payload and no request.
pub fn invoke_method(
    handle: &ResourceHandle,
    codecs: &CodecRegistry,
    mut invocation: MethodInvocation,
) -> Result<MethodInvocation, DispatchError> {
    let entry = negotiate(handle, &invocation)?;
    let descriptor = entry.descriptor();

    let input = match descriptor.consumes_media_type() {
        Some(media_type) => {
            let payload = invocation
                .request
                .as_ref()
                .and_then(|request| request.representation.as_deref())
                .ok_or_else(|| RepresentationError::MissingRepresentation(media_type.to_string()))?;
            Some(codecs.lookup(media_type)?.decode(payload)?)
        }
        None => None,
    };

    let output = entry
        .invoke(handle.instance(), input)
        .map_err(|e| operation_error(handle, &descriptor.method_type, e))?;

    match descriptor.produces_media_type() {
        Some(media_type) => {
            let value =
                output.ok_or_else(|| RepresentationError::NothingProduced(media_type.to_string()))?;
            let encoded = codecs.lookup(media_type)?.encode(&value)?;
            invocation.response = Some(Payload::new(media_type, encoded));
        }
        None => {
            if output.is_some() {
                debug!(
                    "Discarding output of {} on {}: method produces nothing",
                    descriptor.method_type,
                    handle.path()
                );
            }
        }
    }

    invocation.request = None;
    Ok(invocation)
}

/// First method whose type and media types match the invocation exactly,
/// in declaration order.
fn negotiate<'a>(
    handle: &'a ResourceHandle,
    invocation: &MethodInvocation,
) -> Result<&'a MethodEntry, DispatchError> {
    let wanted = (
        invocation.method_type.as_str(),
        invocation.request.as_ref().map(|p| p.media_type.as_str()),
        invocation.response.as_ref().map(|p| p.media_type.as_str()),
    );

    let found = handle
        .table()
        .method_entries()
        .iter()
        .find(|entry| entry.descriptor().signature() == wanted);

    match found {
        Some(entry) => {
            debug!("Matched method {:?} on {}", wanted, handle.path());
            Ok(entry)
        }
        None => {
            debug!("No method matches {:?} on {}", wanted, handle.path());
            Err(DispatchError::operation_not_found(format!(
                "No method on {} matches type={}, request={}, response={}",
                handle.path(),
                wanted.0,
                wanted.1.unwrap_or("none"),
                wanted.2.unwrap_or("none"),
            )))
        }
    }
}

/// Bind parameters, invoke the action and attach its typed result. The
/// returned invocation carries the result and no parameters.
pub fn invoke_action(
    handle: &ResourceHandle,
    mut invocation: ActionInvocation,
) -> Result<ActionInvocation, DispatchError> {
    let entry = handle
        .table()
        .action(&invocation.name)
        .ok_or_else(|| DispatchError::action_not_found(&invocation.name))?;
    let descriptor = entry.descriptor();

    let mut args = Arguments::with_capacity(descriptor.parameters.len());
    for (index, parameter) in descriptor.parameters.iter().enumerate() {
        let supplied = invocation.parameter(&parameter.name);
        let value = match supplied {
            Some(value) if value.parameter_type() == parameter.parameter_type => value.clone(),
            _ => match entry.default_for(index) {
                Some(default) => {
                    debug!("Binding default for {}.{}", descriptor.name, parameter.name);
                    default.clone()
                }
                None => {
                    let message = match supplied {
                        Some(value) => format!(
                            "Parameter {} must be {}, got {}",
                            parameter.name,
                            parameter.parameter_type,
                            value.parameter_type()
                        ),
                        None => format!("Missing parameter {}", parameter.name),
                    };
                    return Err(DispatchError::parameter_binding(&parameter.name, message));
                }
            },
        };
        args.push(parameter.name.clone(), value);
    }

    let output = entry
        .invoke(handle.instance(), &args)
        .map_err(|e| operation_error(handle, &descriptor.name, e))?;

    invocation.result = match (&descriptor.result, output) {
        (Some(_), Some(value)) if !value.is_finite() => {
            return Err(DispatchError::new(
                ErrorCode::Representation,
                format!("Action {} returned {:?}, which has no wire form", descriptor.name, value),
            ));
        }
        (Some(declared), Some(value)) if value.parameter_type() == declared.result_type => Some(value),
        (Some(declared), Some(value)) => {
            return Err(DispatchError::internal(format!(
                "Action {} declares a {} result but returned {}",
                descriptor.name,
                declared.result_type,
                value.parameter_type()
            )));
        }
        (Some(declared), None) => {
            return Err(DispatchError::internal(format!(
                "Action {} declares a {} result but returned nothing",
                descriptor.name, declared.result_type
            )));
        }
        (None, _) => None::<TypedValue>,
    };

    invocation.parameters.clear();
    Ok(invocation)
}

fn operation_error(handle: &ResourceHandle, operation: &str, err: OperationError) -> DispatchError {
    match err {
        OperationError::Failed(_) | OperationError::Other(_) => {
            DispatchError::operation_failed(err.to_string())
        }
        other => {
            warn!(
                "{} on {} ({}) misbehaved: {}",
                operation,
                handle.path(),
                handle.type_name(),
                other
            );
            DispatchError::internal(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ActionDescriptor, MethodDescriptor, ParameterDescriptor};
    use crate::namespace::{ResourceNamespace, ResourceTree};
    use crate::operations::{Operations, Resource};
    use rwx_core::ParameterType;
    use serde_json::json;
    use std::sync::Arc;

    struct Thermostat;

    impl Resource for Thermostat {
        fn operations(ops: &mut Operations<Self>) {
            ops.method(
                MethodDescriptor::new("get").produces("application/json"),
                |_, _| Ok(Some(json!({ "celsius": 21 }))),
            )
            .method(
                MethodDescriptor::new("put").consumes("application/json"),
                |_, input| match input {
                    Some(value) if value.get("celsius").is_some() => Ok(None),
                    _ => Err(OperationError::failed("celsius required")),
                },
            )
            .method(MethodDescriptor::new("get").produces("text/plain"), |_, _| {
                Ok(None)
            });
            ops.action(
                ActionDescriptor::new("label").returns::<String>(),
                |_, _| Ok(42i64),
            );
            ops.action(
                ActionDescriptor::new("ratio")
                    .parameter(ParameterDescriptor::of::<f64>("divisor"))
                    .returns::<f64>(),
                |_, args| Ok(1.0 / args.get::<f64>("divisor")?),
            );
            ops.action(
                ActionDescriptor::new("reset")
                    .parameter(ParameterDescriptor::new("hard", ParameterType::Boolean)),
                |_, args| args.get::<bool>("hard").map(|_| ()),
            );
        }
    }

    fn handle() -> ResourceHandle {
        let tree = ResourceTree::new();
        tree.insert("/thermostat", Arc::new(Thermostat)).unwrap();
        tree.resolve("/thermostat").unwrap()
    }

    #[test]
    fn test_method_response_encoded_and_request_cleared() {
        let codecs = CodecRegistry::with_defaults();
        let out = invoke_method(
            &handle(),
            &codecs,
            MethodInvocation::new("get").accepting("application/json"),
        )
        .unwrap();
        assert_eq!(out.response_representation(), Some(r#"{"celsius":21}"#));
        assert!(out.request.is_none());
    }

    #[test]
    fn test_consumed_request_without_payload() {
        let codecs = CodecRegistry::with_defaults();
        let mut invocation = MethodInvocation::new("put");
        invocation.request = Some(Payload::expecting("application/json"));
        let err = invoke_method(&handle(), &codecs, invocation).unwrap_err();
        assert_eq!(err.code, ErrorCode::Representation);
    }

    #[test]
    fn test_malformed_payload_and_handler_failure() {
        let codecs = CodecRegistry::with_defaults();
        let err = invoke_method(
            &handle(),
            &codecs,
            MethodInvocation::new("put").with_request("application/json", "{celsius"),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Representation);

        let err = invoke_method(
            &handle(),
            &codecs,
            MethodInvocation::new("put").with_request("application/json", "{}"),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::OperationFailed);
        assert_eq!(err.message, "celsius required");
    }

    #[test]
    fn test_declared_output_missing() {
        let codecs = CodecRegistry::with_defaults();
        let err = invoke_method(
            &handle(),
            &codecs,
            MethodInvocation::new("get").accepting("text/plain"),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Representation);
    }

    #[test]
    fn test_result_type_mismatch_is_internal() {
        let err = invoke_action(&handle(), ActionInvocation::new("label")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_wrongly_typed_parameter_without_default() {
        let err = invoke_action(
            &handle(),
            ActionInvocation::new("reset").with_parameter("hard", TypedValue::Integer(1)),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ParameterBinding);
        assert_eq!(err.data, Some(json!({ "parameter": "hard" })));

        let out = invoke_action(
            &handle(),
            ActionInvocation::new("reset").with_parameter("hard", TypedValue::Boolean(true)),
        )
        .unwrap();
        assert!(out.parameters.is_empty());
        assert_eq!(out.result, None);
    }

    #[test]
    fn test_non_finite_result_rejected() {
        let ratio = |divisor: f64| {
            invoke_action(
                &handle(),
                ActionInvocation::new("ratio").with_parameter("divisor", TypedValue::Double(divisor)),
            )
        };

        let out = ratio(4.0).unwrap();
        assert_eq!(out.result, Some(TypedValue::Double(0.25)));
        let wire = serde_json::to_string(&out).unwrap();
        assert_eq!(serde_json::from_str::<ActionInvocation>(&wire).unwrap(), out);

        assert_eq!(ratio(0.0).unwrap_err().code, ErrorCode::Representation);
        assert_eq!(ratio(f64::NAN).unwrap_err().code, ErrorCode::Representation);
    }
}
