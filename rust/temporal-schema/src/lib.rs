#![deny(unsafe_code)]

//! Schema types for Temporal-annotated protobuf services.
//!
//! A protobuf service whose methods carry `temporal.v1` options describes a
//! workflow client/worker pair. This crate holds the plain-data view of such
//! a service that the code generator consumes:
//!
//! - [`ProtoFile`]: one `.proto` file and the Go package it generates into
//! - [`ServiceDescriptor`]: a service with its methods and service options
//! - [`MethodDescriptor`]: one RPC with its message types and [`MethodOptions`]
//!
//! The [`extract`] module builds these from a `prost_reflect::DescriptorPool`.
//! Tests and other front ends can also build them by hand with the
//! `with_*` constructors.

pub mod extract;
pub mod options;

pub use options::{
    ActivityOptions, IdReusePolicy, MethodOptions, QueryOptions, QueryRef, RetryPolicy, Role,
    RoleOptions, ServiceOptions, SignalOptions, SignalRef, UpdateOptions, UpdateRef,
    WorkflowOptions,
};

/// Fully-qualified name of the message type treated as "no payload".
pub const EMPTY_MESSAGE: &str = "google.protobuf.Empty";

/// A `.proto` file with the services it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoFile {
    /// Path of the file relative to the include root (e.g., "example/v1/example.proto").
    pub name: String,

    /// Protobuf package (e.g., "example.v1").
    pub package: String,

    /// Go package the generated code belongs to.
    pub go_package: GoPackage,

    /// Services declared in this file, in declaration order.
    pub services: Vec<ServiceDescriptor>,
}

/// A Go package: its import path and the name used in `package` clauses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoPackage {
    pub import_path: String,
    pub name: String,
}

impl GoPackage {
    /// Parses a `go_package` file option.
    ///
    /// Accepts both `"path/to/pkg"` and `"path/to/pkg;name"`.
    pub fn from_go_package_option(option: &str) -> Self {
        match option.split_once(';') {
            Some((path, name)) => GoPackage {
                import_path: path.to_string(),
                name: sanitize_package_name(name),
            },
            None => GoPackage {
                import_path: option.to_string(),
                name: sanitize_package_name(option.rsplit('/').next().unwrap_or(option)),
            },
        }
    }
}

/// A service definition with all of its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    /// Service name (e.g., "Example").
    pub name: String,

    /// Fully-qualified name (e.g., "example.v1.Example").
    pub full_name: String,

    /// Methods in declaration order.
    pub methods: Vec<MethodDescriptor>,

    /// Service-level options, if present.
    pub options: Option<ServiceOptions>,

    /// Leading comment on the service, if any.
    pub doc: Option<String>,
}

impl ServiceDescriptor {
    pub fn new(package: &str, name: &str) -> Self {
        let full_name = if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}.{name}")
        };
        ServiceDescriptor {
            name: name.to_string(),
            full_name,
            methods: Vec::new(),
            options: None,
            doc: None,
        }
    }

    pub fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Appends a method, deriving its fully-qualified name from this service.
    pub fn with_method(mut self, mut method: MethodDescriptor) -> Self {
        method.full_name = format!("{}.{}", self.full_name, method.name);
        self.methods.push(method);
        self
    }
}

/// A single RPC on a service.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    /// Method name as declared (e.g., "Transfer").
    pub name: String,

    /// Fully-qualified name (e.g., "example.v1.Example.Transfer").
    pub full_name: String,

    /// Request message, `None` for `google.protobuf.Empty`.
    pub input: Option<MessageRef>,

    /// Response message, `None` for `google.protobuf.Empty`.
    pub output: Option<MessageRef>,

    /// Leading comment on the method, if any.
    pub doc: Option<String>,

    pub options: MethodOptions,
}

impl MethodDescriptor {
    pub fn new(name: &str) -> Self {
        MethodDescriptor {
            name: name.to_string(),
            full_name: name.to_string(),
            input: None,
            output: None,
            doc: None,
            options: MethodOptions::default(),
        }
    }

    pub fn with_input(mut self, message: MessageRef) -> Self {
        self.input = message.into_payload();
        self
    }

    pub fn with_output(mut self, message: MessageRef) -> Self {
        self.output = message.into_payload();
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn with_activity(mut self, options: ActivityOptions) -> Self {
        self.options.activity = Some(options);
        self
    }

    pub fn with_workflow(mut self, options: WorkflowOptions) -> Self {
        self.options.workflow = Some(options);
        self
    }

    pub fn with_query(mut self, options: QueryOptions) -> Self {
        self.options.query = Some(options);
        self
    }

    pub fn with_signal(mut self, options: SignalOptions) -> Self {
        self.options.signal = Some(options);
        self
    }

    pub fn with_update(mut self, options: UpdateOptions) -> Self {
        self.options.update = Some(options);
        self
    }
}

/// A message type used as a method input or output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageRef {
    /// Fully-qualified protobuf name (e.g., "example.v1.TransferRequest").
    pub full_name: String,

    /// Go type name, as protoc-gen-go spells it (e.g., "TransferRequest").
    pub go_name: String,

    /// Package declaring the Go type. `None` means the package being generated.
    pub go_package: Option<GoPackage>,
}

impl MessageRef {
    /// A message declared in the package being generated.
    ///
    /// The Go name is derived from the last component of `full_name`.
    pub fn local(full_name: &str) -> Self {
        let simple = full_name.rsplit('.').next().unwrap_or(full_name);
        MessageRef {
            full_name: full_name.to_string(),
            go_name: go_camel_case(simple),
            go_package: None,
        }
    }

    pub fn in_package(mut self, package: GoPackage) -> Self {
        self.go_package = Some(package);
        self
    }

    pub fn is_empty_message(&self) -> bool {
        self.full_name == EMPTY_MESSAGE
    }

    fn into_payload(self) -> Option<Self> {
        if self.is_empty_message() {
            None
        } else {
            Some(self)
        }
    }
}

/// Converts a protobuf identifier to the Go identifier protoc-gen-go uses.
///
/// Dots separating nested message names become underscores, and
/// `_x` sequences collapse to `X`.
///
/// # Example
///
/// ```
/// use temporal_schema::go_camel_case;
///
/// assert_eq!(go_camel_case("transfer_request"), "TransferRequest");
/// assert_eq!(go_camel_case("Outer.Inner"), "Outer_Inner");
/// ```
pub fn go_camel_case(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let next_is_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
        match c {
            b'.' if next_is_lower => {}
            b'.' => out.push('_'),
            b'_' if i == 0 || bytes[i - 1] == b'.' => out.push('X'),
            b'_' if next_is_lower => {}
            c if c.is_ascii_digit() => out.push(c as char),
            c => {
                out.push(c.to_ascii_uppercase() as char);
                while bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase) {
                    i += 1;
                    out.push(bytes[i] as char);
                }
            }
        }
        i += 1;
    }
    out
}

/// Turns an arbitrary string into a valid Go package name.
pub fn sanitize_package_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
