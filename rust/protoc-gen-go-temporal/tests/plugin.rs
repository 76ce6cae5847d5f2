//! Requests as protoc sends them, answered through the plugin's entry point.

use prost::Message;
use prost_types::compiler::Version;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileOptions};
use protoc_gen_go_temporal::{CodeGeneratorRequest, respond};
use temporal_schema::ActivityOptions;
use temporal_schema::options::ServiceOptions;

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

fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::String as i32),
        ..Default::default()
    }
}

fn extension(name: &str, number: i32, type_name: &str, extendee: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(Type::Message as i32),
        type_name: Some(type_name.into()),
        extendee: Some(extendee.into()),
        ..Default::default()
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

fn temporal_proto() -> RawFile {
    RawFile {
        name: Some("temporal/v1/temporal.proto".into()),
        package: Some("temporal.v1".into()),
        dependency: vec!["google/protobuf/descriptor.proto".into()],
        message_type: vec![
            message("ServiceOptions", vec![string_field("task_queue", 1)]),
            message("ActivityOptions", vec![string_field("name", 1)]),
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
        ],
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

fn example_proto() -> RawFile {
    RawFile {
        name: Some("example/v1/example.proto".into()),
        package: Some("example.v1".into()),
        dependency: vec!["temporal/v1/temporal.proto".into()],
        message_type: vec![
            message("DepositRequest", vec![string_field("account", 1)]),
            message("DepositResponse", vec![]),
        ],
        service: vec![RawService {
            name: Some("Example".into()),
            options: Some(options_bytes(
                7233,
                &ServiceOptions {
                    task_queue: "deposits".into(),
                },
            )),
            method: vec![RawMethod {
                name: Some("Deposit".into()),
                input_type: Some(".example.v1.DepositRequest".into()),
                output_type: Some(".example.v1.DepositResponse".into()),
                options: Some(options_bytes(
                    7234,
                    &ActivityOptions {
                        name: "deposit".into(),
                        ..Default::default()
                    },
                )),
            }],
        }],
        options: Some(FileOptions {
            go_package: Some("github.com/acme/gen/example/v1;examplev1".into()),
            ..Default::default()
        }),
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

fn plain_proto() -> RawFile {
    RawFile {
        name: Some("example/v1/plain.proto".into()),
        package: Some("example.v1".into()),
        message_type: vec![message("Plain", vec![])],
        syntax: Some("proto3".into()),
        ..Default::default()
    }
}

fn request(files: &[&str], parameter: Option<&str>) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: files.iter().map(|f| f.to_string()).collect(),
        parameter: parameter.map(str::to_string),
        compiler_version: Some(Version {
            major: Some(5),
            minor: Some(27),
            patch: Some(0),
            suffix: None,
        }),
        proto_file: [
            descriptor_proto(),
            temporal_proto(),
            example_proto(),
            plain_proto(),
        ]
        .iter()
        .map(Message::encode_to_vec)
        .collect(),
    }
}

#[test]
fn generates_file_under_go_import_path() {
    let response = respond(&request(&["example/v1/example.proto"], None));

    assert_eq!(response.error, None);
    assert_eq!(response.supported_features, Some(1));
    assert_eq!(response.file.len(), 1);

    let file = &response.file[0];
    assert_eq!(
        file.name.as_deref(),
        Some("github.com/acme/gen/example/v1/example_temporal.pb.go")
    );
    let content = file.content.as_deref().unwrap();
    assert!(content.contains("// \tprotoc v5.27.0\n"));
    assert!(content.contains("\npackage examplev1\n"));
    assert!(content.contains("const ExampleTaskQueue = \"deposits\"\n"));
    assert!(content.contains("\tExampleDepositActivityName = \"deposit\"\n"));
    assert!(content.contains("type ExampleActivities interface {"));
}

#[test]
fn source_relative_paths_follow_the_proto() {
    let response = respond(&request(
        &["example/v1/example.proto"],
        Some("paths=source_relative"),
    ));

    assert_eq!(response.error, None);
    assert_eq!(
        response.file[0].name.as_deref(),
        Some("example/v1/example_temporal.pb.go")
    );
}

#[test]
fn files_without_services_are_skipped() {
    let response = respond(&request(&["example/v1/plain.proto"], None));

    assert_eq!(response.error, None);
    assert!(response.file.is_empty());
}

#[test]
fn bad_parameters_are_reported_to_protoc() {
    let response = respond(&request(
        &["example/v1/example.proto"],
        Some("enable-updates=true,plugins=grpc"),
    ));

    assert_eq!(
        response.error.as_deref(),
        Some("unknown parameter \"plugins\"")
    );
    assert!(response.file.is_empty());
    assert_eq!(response.supported_features, Some(1));
}

#[test]
fn every_failing_file_is_reported() {
    let response = respond(&request(
        &["example/v1/missing.proto", "example/v1/gone.proto"],
        None,
    ));

    let error = response.error.unwrap();
    let lines: Vec<_> = error.lines().collect();
    assert_eq!(
        lines,
        [
            "example/v1/missing.proto: not among the request's proto files",
            "example/v1/gone.proto: not among the request's proto files",
        ]
    );
    assert!(response.file.is_empty());
}

#[test]
fn request_survives_the_wire() {
    let sent = request(&["example/v1/example.proto"], Some("enable-updates=false"));
    let received = CodeGeneratorRequest::decode(sent.encode_to_vec().as_slice()).unwrap();

    assert_eq!(received, sent);
    assert_eq!(received.parameter(), "enable-updates=false");
    assert_eq!(received.compiler_version_label().as_deref(), Some("v5.27.0"));
}
