//! Extraction from a descriptor pool assembled from raw descriptor bytes.
//!
//! Options are encoded as raw bytes the same way protoc serializes them, so
//! extension fields reach the pool exactly as they do in a plugin request.

use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::source_code_info::Location;
use prost_types::{DescriptorProto, FieldDescriptorProto, FileOptions, SourceCodeInfo};
use temporal_schema::{
    ActivityOptions, SignalOptions, SignalRef, WorkflowOptions, extract, options::ServiceOptions,
};

#[derive(Clone, PartialEq, Message)]
struct RawFileSet {
    #[prost(message, repeated, tag = "1")]
    file: Vec<RawFile>,
}

#[derive(Clone, PartialEq, Message)]
struct RawFile {
    #[prost(string, optional, tag = "1")]
    name: Option<String>,
    #[prost(string, optional, tag = "2")]
    package: Option<String>,
    #[prost(string, repeated, tag = "3")]
    dependency: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    message_type: Vec<DescriptorProto>,
    #[prost(message, repeated, tag = "6")]
    service: Vec<RawService>,
    #[prost(message, repeated, tag = "7")]
    extension: Vec<FieldDescriptorProto>,
    #[prost(message, optional, tag = "8")]
    options: Option<FileOptions>,
    #[prost(message, optional, tag = "9")]
    source_code_info: Option<SourceCodeInfo>,
    #[prost(string, optional, tag = "12")]
    syntax: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct RawService {
    #[prost(string, optional, tag = "1")]
    name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    method: Vec<RawMethod>,
    #[prost(bytes = "vec", optional, tag = "3")]
    options: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
struct RawMethod {
    #[prost(string, optional, tag = "1")]
    name: Option<String>,
    #[prost(string, optional, tag = "2")]
    input_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    output_type: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    options: Option<Vec<u8>>,
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        field,
        ..Default::default()
    }
}

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn message_field(name: &str, number: i32, type_name: &str, label: Label) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(label as i32),
        type_name: Some(type_name.into()),
        ..field(name, number, Type::Message)
    }
}

fn extension(name: &str, number: i32, type_name: &str, extendee: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        extendee: Some(extendee.into()),
        ..message_field(name, number, type_name, Label::Optional)
    }
}

fn extendable(name: &str) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        extension_range: vec![prost_types::descriptor_proto::ExtensionRange {
            start: Some(1000),
            end: Some(536_870_912),
            options: None,
        }],
        ..Default::default()
    }
}

fn options_bytes<M: Message>(number: u32, value: &M) -> Vec<u8> {
    let mut buf = Vec::new();
    prost::encoding::message::encode(number, value, &mut buf);
    buf
}

fn descriptor_proto() -> RawFile {
    RawFile {
        name: Some("google/protobuf/descriptor.proto".into()),
        package: Some("google.protobuf".into()),
        message_type: vec![extendable("ServiceOptions"), extendable("MethodOptions")],
        ..Default::default()
    }
}

fn empty_proto() -> RawFile {
    RawFile {
        name: Some("google/protobuf/empty.proto".into()),
        package: Some("google.protobuf".into()),
        message_type: vec![message("Empty", vec![])],
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

fn temporal_proto() -> RawFile {
    let mut workflow = message(
        "WorkflowOptions",
        vec![
            field("name", 1, Type::String),
            message_field(
                "signal",
                11,
                ".temporal.v1.WorkflowOptions.Signal",
                Label::Repeated,
            ),
        ],
    );
    workflow.nested_type = vec![message(
        "Signal",
        vec![field("ref", 1, Type::String), field("start", 2, Type::Bool)],
    )];

    RawFile {
        name: Some("temporal/v1/temporal.proto".into()),
        package: Some("temporal.v1".into()),
        dependency: vec!["google/protobuf/descriptor.proto".into()],
        message_type: vec![
            message("ServiceOptions", vec![field("task_queue", 1, Type::String)]),
            message("ActivityOptions", vec![field("name", 1, Type::String)]),
            workflow,
            message("SignalOptions", vec![field("name", 1, Type::String)]),
        ],
        extension: vec![
            extension(
                "service",
                7233,
                ".temporal.v1.ServiceOptions",
                ".google.protobuf.ServiceOptions",
            ),
            extension(
                "activity",
                7234,
                ".temporal.v1.ActivityOptions",
                ".google.protobuf.MethodOptions",
            ),
            extension(
                "workflow",
                7235,
                ".temporal.v1.WorkflowOptions",
                ".google.protobuf.MethodOptions",
            ),
            extension(
                "signal",
                7237,
                ".temporal.v1.SignalOptions",
                ".google.protobuf.MethodOptions",
            ),
        ],
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

fn example_proto() -> RawFile {
    let workflow = WorkflowOptions {
        name: "transfer".into(),
        signal: vec![SignalRef {
            r#ref: "LeaseAcquired".into(),
            start: true,
        }],
        ..Default::default()
    };
    let activity = ActivityOptions {
        name: "deposit".into(),
        ..Default::default()
    };

    RawFile {
        name: Some("example/v1/example.proto".into()),
        package: Some("example.v1".into()),
        dependency: vec![
            "temporal/v1/temporal.proto".into(),
            "google/protobuf/empty.proto".into(),
        ],
        message_type: vec![
            message("TransferRequest", vec![field("amount", 1, Type::Int64)]),
            message("TransferResponse", vec![]),
        ],
        service: vec![RawService {
            name: Some("Example".into()),
            options: Some(options_bytes(
                7233,
                &ServiceOptions {
                    task_queue: "transfers".into(),
                },
            )),
            method: vec![
                RawMethod {
                    name: Some("Transfer".into()),
                    input_type: Some(".example.v1.TransferRequest".into()),
                    output_type: Some(".example.v1.TransferResponse".into()),
                    options: Some(options_bytes(7235, &workflow)),
                },
                RawMethod {
                    name: Some("LeaseAcquired".into()),
                    input_type: Some(".google.protobuf.Empty".into()),
                    output_type: Some(".google.protobuf.Empty".into()),
                    options: Some(options_bytes(7237, &SignalOptions::default())),
                },
                RawMethod {
                    name: Some("Deposit".into()),
                    input_type: Some(".example.v1.TransferRequest".into()),
                    output_type: Some(".google.protobuf.Empty".into()),
                    options: Some(options_bytes(7234, &activity)),
                },
                RawMethod {
                    name: Some("Plain".into()),
                    input_type: Some(".google.protobuf.Empty".into()),
                    output_type: Some(".google.protobuf.Empty".into()),
                    options: None,
                },
            ],
        }],
        options: Some(FileOptions {
            go_package: Some("github.com/acme/gen/example/v1;examplev1".into()),
            ..Default::default()
        }),
        source_code_info: Some(SourceCodeInfo {
            location: vec![Location {
                path: vec![6, 0, 2, 0],
                span: vec![10, 2, 60],
                leading_comments: Some(" Transfer moves funds\n between accounts.\n".into()),
                trailing_comments: None,
                leading_detached_comments: vec![],
            }],
        }),
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

fn pool() -> DescriptorPool {
    let set = RawFileSet {
        file: vec![
            descriptor_proto(),
            empty_proto(),
            temporal_proto(),
            example_proto(),
        ],
    };
    DescriptorPool::decode(set.encode_to_vec().as_slice()).unwrap()
}

#[test]
fn extracts_service_and_method_options() {
    let pool = pool();
    let file = pool.get_file_by_name("example/v1/example.proto").unwrap();
    let proto = extract::file(&file).unwrap();

    assert_eq!(proto.package, "example.v1");
    assert_eq!(proto.go_package.import_path, "github.com/acme/gen/example/v1");
    assert_eq!(proto.go_package.name, "examplev1");

    let service = &proto.services[0];
    assert_eq!(service.full_name, "example.v1.Example");
    assert_eq!(
        service.options.as_ref().map(|o| o.task_queue.as_str()),
        Some("transfers")
    );

    let names: Vec<_> = service.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Transfer", "LeaseAcquired", "Deposit", "Plain"]);

    let transfer = &service.methods[0];
    assert_eq!(transfer.full_name, "example.v1.Example.Transfer");
    assert_eq!(
        transfer.input.as_ref().map(|m| m.go_name.as_str()),
        Some("TransferRequest")
    );
    assert_eq!(transfer.input.as_ref().unwrap().go_package, None);
    assert_eq!(
        transfer.doc.as_deref(),
        Some("Transfer moves funds\nbetween accounts.")
    );
    let workflow = transfer.options.workflow.as_ref().unwrap();
    assert_eq!(workflow.name, "transfer");
    assert_eq!(workflow.signal.len(), 1);
    assert_eq!(workflow.signal[0].r#ref, "LeaseAcquired");
    assert!(workflow.signal[0].start);
    assert!(transfer.options.activity.is_none());

    let lease = &service.methods[1];
    assert!(lease.input.is_none());
    assert!(lease.output.is_none());
    assert!(lease.options.signal.is_some());
    assert!(lease.doc.is_none());

    let deposit = &service.methods[2];
    assert_eq!(
        deposit.options.activity.as_ref().map(|a| a.name.as_str()),
        Some("deposit")
    );
    assert!(deposit.output.is_none());

    assert!(service.methods[3].options.is_empty());
}

#[test]
fn pool_without_temporal_options_yields_no_roles() {
    let set = RawFileSet {
        file: vec![empty_proto()],
    };
    let pool = DescriptorPool::decode(set.encode_to_vec().as_slice()).unwrap();
    let file = pool
        .get_file_by_name("google/protobuf/empty.proto")
        .unwrap();
    let proto = extract::file(&file).unwrap();

    assert!(proto.services.is_empty());
    assert_eq!(proto.go_package.import_path, "google/protobuf");
    assert_eq!(proto.go_package.name, "protobuf");
}
