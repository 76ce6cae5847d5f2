//! End-to-end generation tests: descriptors in, Go source out.

use temporal_codegen::{
    Config, FileOptions, Features, GenerateError, Paths, generate_file, generate_service,
    generate_services, output_name,
};
use temporal_schema::{
    ActivityOptions, GoPackage, IdReusePolicy, MessageRef, MethodDescriptor, ProtoFile,
    QueryOptions, QueryRef, ServiceDescriptor, SignalOptions, SignalRef, UpdateOptions, UpdateRef,
    WorkflowOptions,
};

fn msg(name: &str) -> MessageRef {
    MessageRef::local(&format!("example.v1.{name}"))
}

fn transfer(queries: &[&str]) -> MethodDescriptor {
    MethodDescriptor::new("Transfer")
        .with_input(msg("TransferRequest"))
        .with_output(msg("TransferResponse"))
        .with_doc("Transfer moves funds\nbetween accounts.")
        .with_workflow(WorkflowOptions {
            id: "transfer/${! id }".to_string(),
            query: queries
                .iter()
                .map(|q| QueryRef {
                    r#ref: q.to_string(),
                })
                .collect(),
            signal: vec![SignalRef {
                r#ref: "LeaseAcquired".to_string(),
                start: true,
            }],
            update: vec![UpdateRef {
                r#ref: "SetRate".to_string(),
            }],
            ..Default::default()
        })
}

fn methods() -> Vec<MethodDescriptor> {
    vec![
        transfer(&["Status", "Progress"]),
        MethodDescriptor::new("LeaseAcquired")
            .with_input(msg("LeaseAcquiredRequest"))
            .with_signal(SignalOptions::default()),
        MethodDescriptor::new("Status")
            .with_output(msg("StatusResponse"))
            .with_query(QueryOptions::default()),
        MethodDescriptor::new("Progress")
            .with_output(msg("ProgressResponse"))
            .with_query(QueryOptions {
                name: "progress".to_string(),
            }),
        MethodDescriptor::new("SetRate")
            .with_input(msg("SetRateRequest"))
            .with_output(msg("SetRateResponse"))
            .with_update(UpdateOptions {
                validate: true,
                ..Default::default()
            }),
        MethodDescriptor::new("Deposit")
            .with_input(msg("DepositRequest"))
            .with_output(msg("DepositResponse"))
            .with_activity(ActivityOptions {
                name: "deposit".to_string(),
                ..Default::default()
            }),
    ]
}

fn example() -> ServiceDescriptor {
    methods()
        .into_iter()
        .fold(ServiceDescriptor::new("example.v1", "Example"), |svc, m| {
            svc.with_method(m)
        })
}

fn render(descriptor: &ServiceDescriptor) -> String {
    generate_service(descriptor, Features::default(), &Config::default())
        .unwrap()
        .body
}

#[test]
fn workflow_interface_and_input_expose_signals() {
    let body = render(&example());
    assert!(body.contains(
        "\tExecute(ctx workflow.Context, req *TransferRequest) (*TransferResponse, error)\n"
    ));
    assert!(body.contains(
        "type ExampleTransferInput struct {\n\tExampleWorkflowResources\n\tReq *TransferRequest\n\tLeaseAcquired *ExampleLeaseAcquiredSignal\n}\n"
    ));
    assert!(body.contains("\tValidateSetRate(ctx workflow.Context, req *SetRateRequest) error\n"));
    assert!(body.contains("\tStatus() (*StatusResponse, error)\n"));
}

#[test]
fn method_docs_are_carried_into_comments() {
    let body = render(&example());
    assert!(body.contains(
        "// ExampleTransfer describes a(n) example.v1.Example.Transfer workflow implementation\n//\n// Transfer moves funds\n// between accounts.\ntype ExampleTransfer interface {\n"
    ));
}

#[test]
fn permuted_schema_renders_identically() {
    let forward = render(&example());

    let mut reversed = methods();
    reversed.reverse();
    let last = reversed.len() - 1;
    reversed[last] = transfer(&["Progress", "Status"]);
    let reversed = reversed
        .into_iter()
        .fold(ServiceDescriptor::new("example.v1", "Example"), |svc, m| {
            svc.with_method(m)
        });

    assert_eq!(forward, render(&reversed));
}

#[test]
fn name_constants_fall_back_to_full_name() {
    let body = render(&example());
    assert!(body.contains("\tExampleTransferWorkflowName = \"example.v1.Example.Transfer\"\n"));
    assert!(body.contains("\tExampleStatusQueryName = \"example.v1.Example.Status\"\n"));
    assert!(body.contains("\tExampleProgressQueryName = \"progress\"\n"));
    assert!(body.contains("\tExampleDepositActivityName = \"deposit\"\n"));
    assert!(body.contains(
        "\tExampleTransferIdExpression = expression.MustParseExpression(\"transfer/${! id }\")\n"
    ));
}

#[test]
fn workflow_start_defaults() {
    let body = render(&example());
    assert!(body.contains("options.WorkflowRunTimeout = 3600000000000 // 1h0m0s"));
    assert!(body.contains(
        "options.WorkflowIDReusePolicy = enums.WORKFLOW_ID_REUSE_POLICY_ALLOW_DUPLICATE"
    ));
    // No task queue anywhere: nothing to default to.
    assert!(!body.contains("TaskQueue ="));
}

#[test]
fn explicit_workflow_options_override_defaults() {
    let descriptor = ServiceDescriptor::new("example.v1", "Example")
        .with_options(temporal_schema::ServiceOptions {
            task_queue: "transfers".to_string(),
        })
        .with_method(
            MethodDescriptor::new("Transfer")
                .with_input(msg("TransferRequest"))
                .with_workflow(WorkflowOptions {
                    id_reuse_policy: IdReusePolicy::RejectDuplicate as i32,
                    run_timeout: Some(prost_types::Duration {
                        seconds: 90,
                        nanos: 0,
                    }),
                    ..Default::default()
                }),
        );
    let body = render(&descriptor);
    assert!(body.contains("const ExampleTaskQueue = \"transfers\"\n"));
    assert!(body.contains("options.TaskQueue = ExampleTaskQueue"));
    assert!(body.contains("options.WorkflowRunTimeout = 90000000000 // 1m30s"));
    assert!(body.contains(
        "options.WorkflowIDReusePolicy = enums.WORKFLOW_ID_REUSE_POLICY_REJECT_DUPLICATE"
    ));
    assert!(!body.contains("1h0m0s"));
}

#[test]
fn activities_default_to_five_attempts() {
    let body = render(&example());
    assert!(body.contains("opts.RetryPolicy = &temporal.RetryPolicy{\n\t\t\tMaximumAttempts: 5,\n\t\t}"));
}

#[test]
fn disabling_updates_removes_update_declarations() {
    let unit = generate_service(
        &example(),
        Features { updates: false },
        &Config::default(),
    )
    .unwrap();
    assert!(!unit.body.contains("SetRate"));
    assert!(!unit.body.contains("UpdateHandlerOptions"));
    assert!(unit.body.contains("type ExampleTransfer interface {"));
}

#[test]
fn batch_failures_do_not_interfere() {
    let a = ServiceDescriptor::new("example.v1", "A").with_method(
        MethodDescriptor::new("Hello")
            .with_input(msg("HelloRequest"))
            .with_workflow(WorkflowOptions::default()),
    );
    let b = ServiceDescriptor::new("example.v1", "B").with_method(
        MethodDescriptor::new("Hello").with_workflow(WorkflowOptions {
            query: vec![QueryRef {
                r#ref: "Status".to_string(),
            }],
            ..Default::default()
        }),
    );

    let results = generate_services(&[a.clone(), b], Features::default(), &Config::default());
    assert_eq!(results.len(), 2);
    let alone = generate_service(&a, Features::default(), &Config::default()).unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &alone);

    let message = results[1].as_ref().unwrap_err().to_string();
    assert!(message.contains("Status"), "{message}");
    assert!(message.contains("undefined"), "{message}");
    assert!(message.starts_with("service example.v1.B: "), "{message}");
}

fn proto_file(services: Vec<ServiceDescriptor>) -> ProtoFile {
    ProtoFile {
        name: "example/v1/example.proto".to_string(),
        package: "example.v1".to_string(),
        go_package: GoPackage::from_go_package_option("github.com/acme/gen/example/v1;examplev1"),
        services,
    }
}

#[test]
fn file_has_header_package_and_sorted_imports() {
    let options = FileOptions {
        compiler_version: Some("v4.25.1".to_string()),
        ..Default::default()
    };
    let file = generate_file(&proto_file(vec![example()]), &options, &Config::default())
        .unwrap()
        .unwrap();

    assert_eq!(file.name, "github.com/acme/gen/example/v1/example_temporal.pb.go");
    let content = &file.content;
    assert!(content.starts_with(
        "// Code generated by protoc-gen-go-temporal. DO NOT EDIT.\n// versions:\n"
    ));
    assert!(content.contains("// \tprotoc v4.25.1\n// source: example/v1/example.proto\n\npackage examplev1\n\nimport (\n"));
    assert!(content.contains("\n\t\"context\"\n"));
    assert!(content.contains("\n\tenums \"go.temporal.io/api/enums/v1\"\n"));
    assert!(content.contains("\n\t\"go.temporal.io/sdk/workflow\"\n"));
    let context = content.find("\t\"context\"").unwrap();
    let workflow = content.find("\t\"go.temporal.io/sdk/workflow\"").unwrap();
    assert!(context < workflow);
    assert!(content.ends_with("}\n"));
}

#[test]
fn source_relative_paths_follow_the_proto() {
    let file = proto_file(vec![example()]);
    assert_eq!(
        output_name(&file, Paths::SourceRelative),
        "example/v1/example_temporal.pb.go"
    );
}

#[test]
fn file_without_roles_generates_nothing() {
    let plain = ServiceDescriptor::new("example.v1", "Plain").with_method(
        MethodDescriptor::new("Ping")
            .with_input(msg("PingRequest"))
            .with_output(msg("PingResponse")),
    );
    let generated = generate_file(
        &proto_file(vec![plain]),
        &FileOptions::default(),
        &Config::default(),
    )
    .unwrap();
    assert_eq!(generated, None);
}

#[test]
fn file_reports_every_failing_service() {
    let broken = |name: &str| {
        ServiceDescriptor::new("example.v1", name).with_method(
            MethodDescriptor::new("Notify")
                .with_output(msg("NotifyResponse"))
                .with_signal(SignalOptions::default()),
        )
    };
    let err = generate_file(
        &proto_file(vec![broken("Second"), broken("First")]),
        &FileOptions::default(),
        &Config::default(),
    )
    .unwrap_err();

    let GenerateError::Services(errors) = &err else {
        panic!("expected one error per service, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    let message = err.to_string();
    let first = message.find("example.v1.First").unwrap();
    let second = message.find("example.v1.Second").unwrap();
    assert!(first < second);
    assert!(message.contains("output"));
}

#[test]
fn foreign_messages_are_imported() {
    let money = MessageRef::local("common.v1.Money")
        .in_package(GoPackage::from_go_package_option("github.com/acme/gen/common/v1;commonv1"));
    let descriptor = ServiceDescriptor::new("example.v1", "Example").with_method(
        MethodDescriptor::new("Charge")
            .with_input(money)
            .with_activity(ActivityOptions::default()),
    );
    let file = generate_file(
        &proto_file(vec![descriptor]),
        &FileOptions::default(),
        &Config::default(),
    )
    .unwrap()
    .unwrap();
    assert!(file.content.contains("\n\tcommonv1 \"github.com/acme/gen/common/v1\"\n"));
    assert!(file.content.contains("Charge(ctx context.Context, req *commonv1.Money) error"));
}

#[test]
fn import_alias_clash_across_services_fails_the_file() {
    let service = |name: &str, path: &str| {
        let message = MessageRef::local("models.Thing")
            .in_package(GoPackage::from_go_package_option(path));
        ServiceDescriptor::new("example.v1", name).with_method(
            MethodDescriptor::new("Do")
                .with_input(message)
                .with_activity(ActivityOptions::default()),
        )
    };
    let err = generate_file(
        &proto_file(vec![
            service("First", "github.com/acme/a/models"),
            service("Second", "github.com/acme/b/models"),
        ]),
        &FileOptions::default(),
        &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GenerateError::ImportConflict(_)), "{err:?}");
}

#[test]
fn query_without_output_is_not_generated() {
    let mut methods = methods();
    for method in &mut methods {
        if method.name == "Status" {
            method.output = None;
            method.input = Some(msg("StatusRequest"));
        }
    }
    let descriptor = methods
        .into_iter()
        .fold(ServiceDescriptor::new("example.v1", "Example"), |svc, m| {
            svc.with_method(m)
        });

    let err = generate_service(&descriptor, Features::default(), &Config::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("service example.v1.Example: "), "{message}");
    assert!(message.contains("query \"Status\" has no output"), "{message}");
}

#[test]
fn test_client_comments_name_qualified_entities() {
    let body = render(&example());
    assert!(body.contains(
        "// Transfer executes a(n) example.v1.Example.Transfer workflow in the test environment\nfunc (c *ExampleTestClient) Transfer("
    ));
    assert!(body.contains(
        "// TransferWithLeaseAcquired sends a(n) example.v1.Example.LeaseAcquired signal to a(n) example.v1.Example.Transfer workflow, starting it if necessary\n"
    ));
    assert!(body.contains(
        "// GetTransfer is not supported by the test client\nfunc (c *ExampleTestClient) GetTransfer("
    ));
    assert!(body.contains("// GetSetRate is not supported by the test client\n"));
    assert!(!body.contains("is a noop"));
}
