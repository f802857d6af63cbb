use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rwx_container::{
    ActionDescriptor, MethodDescriptor, Operations, ParameterDescriptor, Resource,
    ResourceContainer, ResourceTree,
};
use rwx_core::{ActionInvocation, MethodInvocation, ProtocolDocument, TypedValue, XmppUri};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

struct Sensor;

impl Resource for Sensor {
    fn operations(ops: &mut Operations<Self>) {
        // padding so negotiation has to scan
        for i in 0..8 {
            ops.method(
                MethodDescriptor::new(format!("probe{}", i)).produces("text/plain"),
                |_, _| Ok(Some(json!("ok"))),
            );
        }
        ops.method(MethodDescriptor::new("get").produces("text/plain"), |_, _| {
            Ok(Some(json!("21.5")))
        })
        .method(
            MethodDescriptor::new("put").consumes("application/json").produces("application/json"),
            |_, input| Ok(input),
        );
        ops.action(
            ActionDescriptor::new("calibrate")
                .parameter(ParameterDescriptor::of::<f64>("offset"))
                .parameter(ParameterDescriptor::of::<i64>("samples").default_value("10"))
                .returns::<bool>(),
            |_, _| Ok(true),
        );
    }
}

fn container(resources: usize) -> ResourceContainer {
    let tree = Arc::new(ResourceTree::new());
    for i in 0..resources {
        tree.insert(&format!("/sensor/{}", i), Arc::new(Sensor)).unwrap();
    }
    ResourceContainer::builder(XmppUri::entity("sensors.example.org").unwrap(), tree)
        .with_subresources()
        .build()
}

fn bench_method_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("method_dispatch");
    let container = container(100);

    let get = ProtocolDocument::method(
        "/sensor/42",
        MethodInvocation::new("get").accepting("text/plain"),
    );
    group.bench_function("get_text", |b| {
        b.iter(|| black_box(container.dispatch(get.clone()).unwrap()))
    });

    let put = ProtocolDocument::method(
        "/sensor/42",
        MethodInvocation::new("put")
            .with_request("application/json", r#"{"unit":"celsius","values":[1,2,3]}"#)
            .accepting("application/json"),
    );
    group.bench_function("put_json_roundtrip", |b| {
        b.iter(|| black_box(container.dispatch(put.clone()).unwrap()))
    });

    group.finish();
}

fn bench_action_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("action_dispatch");
    let container = container(100);

    let supplied = ProtocolDocument::action(
        "/sensor/7",
        ActionInvocation::new("calibrate")
            .with_parameter("offset", TypedValue::Double(0.5))
            .with_parameter("samples", TypedValue::Integer(3)),
    );
    let defaulted = ProtocolDocument::action(
        "/sensor/7",
        ActionInvocation::new("calibrate").with_parameter("offset", TypedValue::Double(0.5)),
    );

    for (name, document) in [("supplied", supplied), ("defaulted", defaulted)] {
        group.bench_with_input(BenchmarkId::new("calibrate", name), &document, |b, document| {
            b.iter(|| black_box(container.dispatch(document.clone()).unwrap()))
        });
    }

    group.finish();
}

fn bench_describe(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe_capabilities");

    for resources in [1, 100, 1000] {
        let container = container(resources);
        group.bench_with_input(
            BenchmarkId::new("with_subresources", resources),
            &container,
            |b, container| b.iter(|| black_box(container.describe_capabilities("/sensor/0").unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_method_dispatch,
    bench_action_dispatch,
    bench_describe
);
criterion_main!(benches);
