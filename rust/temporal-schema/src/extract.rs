//! Option extraction from a `prost_reflect` descriptor pool.
//!
//! The pool must be built from raw descriptor bytes (for example with
//! [`DescriptorPool::decode`]) so that extension fields on
//! `google.protobuf.MethodOptions` are preserved. A pool that never loaded
//! `temporal/v1/temporal.proto` simply yields methods without options.

use std::fmt;

use prost_reflect::{
    DescriptorPool, DynamicMessage, ExtensionDescriptor, FileDescriptor, MessageDescriptor, Value,
};
use tracing::trace;

use crate::{
    ActivityOptions, GoPackage, MessageRef, MethodDescriptor, MethodOptions, ProtoFile,
    QueryOptions, ServiceDescriptor, ServiceOptions, SignalOptions, UpdateOptions,
    WorkflowOptions, go_camel_case, sanitize_package_name,
};

/// Fully-qualified extension names, keyed by what they annotate.
pub const SERVICE_EXTENSION: &str = "temporal.v1.service";
pub const ACTIVITY_EXTENSION: &str = "temporal.v1.activity";
pub const WORKFLOW_EXTENSION: &str = "temporal.v1.workflow";
pub const QUERY_EXTENSION: &str = "temporal.v1.query";
pub const SIGNAL_EXTENSION: &str = "temporal.v1.signal";
pub const UPDATE_EXTENSION: &str = "temporal.v1.update";

// Field numbers in FileDescriptorProto / ServiceDescriptorProto, used to
// locate comments in SourceCodeInfo.
const FILE_SERVICE_FIELD: i32 = 6;
const SERVICE_METHOD_FIELD: i32 = 2;

/// Error decoding an option block.
#[derive(Debug)]
pub enum ExtractError {
    /// The extension value was present but could not be decoded.
    InvalidOption {
        /// Fully-qualified name of the annotated service or method.
        target: String,
        extension: &'static str,
        message: String,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::InvalidOption {
                target,
                extension,
                message,
            } => write!(f, "invalid {extension} option on {target:?}: {message}"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Resolved extension descriptors for one pool.
struct Extensions {
    service: Option<ExtensionDescriptor>,
    activity: Option<ExtensionDescriptor>,
    workflow: Option<ExtensionDescriptor>,
    query: Option<ExtensionDescriptor>,
    signal: Option<ExtensionDescriptor>,
    update: Option<ExtensionDescriptor>,
}

impl Extensions {
    fn resolve(pool: &DescriptorPool) -> Self {
        Extensions {
            service: pool.get_extension_by_name(SERVICE_EXTENSION),
            activity: pool.get_extension_by_name(ACTIVITY_EXTENSION),
            workflow: pool.get_extension_by_name(WORKFLOW_EXTENSION),
            query: pool.get_extension_by_name(QUERY_EXTENSION),
            signal: pool.get_extension_by_name(SIGNAL_EXTENSION),
            update: pool.get_extension_by_name(UPDATE_EXTENSION),
        }
    }
}

/// Reads a file and all of its services.
pub fn file(file: &FileDescriptor) -> Result<ProtoFile, ExtractError> {
    let extensions = Extensions::resolve(file.parent_pool());
    let proto = file.file_descriptor_proto();

    let mut services = Vec::new();
    for service in file.services() {
        let service_path = [FILE_SERVICE_FIELD, service.index() as i32];
        let options = decode_extension::<ServiceOptions>(
            &service.options(),
            extensions.service.as_ref(),
            service.full_name(),
            SERVICE_EXTENSION,
        )?;

        let mut methods = Vec::new();
        for method in service.methods() {
            let target = method.full_name();
            let raw = method.options();
            let options = MethodOptions {
                activity: decode_extension::<ActivityOptions>(
                    &raw,
                    extensions.activity.as_ref(),
                    target,
                    ACTIVITY_EXTENSION,
                )?,
                workflow: decode_extension::<WorkflowOptions>(
                    &raw,
                    extensions.workflow.as_ref(),
                    target,
                    WORKFLOW_EXTENSION,
                )?,
                query: decode_extension::<QueryOptions>(
                    &raw,
                    extensions.query.as_ref(),
                    target,
                    QUERY_EXTENSION,
                )?,
                signal: decode_extension::<SignalOptions>(
                    &raw,
                    extensions.signal.as_ref(),
                    target,
                    SIGNAL_EXTENSION,
                )?,
                update: decode_extension::<UpdateOptions>(
                    &raw,
                    extensions.update.as_ref(),
                    target,
                    UPDATE_EXTENSION,
                )?,
            };
            trace!(method = target, ?options, "extracted method options");

            let method_path = [
                service_path[0],
                service_path[1],
                SERVICE_METHOD_FIELD,
                method.index() as i32,
            ];
            methods.push(MethodDescriptor {
                name: method.name().to_string(),
                full_name: target.to_string(),
                input: message_ref(&method.input(), file),
                output: message_ref(&method.output(), file),
                doc: leading_comment(proto, &method_path),
                options,
            });
        }

        services.push(ServiceDescriptor {
            name: service.name().to_string(),
            full_name: service.full_name().to_string(),
            methods,
            options,
            doc: leading_comment(proto, &service_path),
        });
    }

    Ok(ProtoFile {
        name: file.name().to_string(),
        package: file.package_name().to_string(),
        go_package: go_package(file),
        services,
    })
}

/// Works out the Go package of a file.
///
/// Uses the `go_package` option when set. Otherwise the import path is the
/// directory of the file and the name is the last protobuf package component.
pub fn go_package(file: &FileDescriptor) -> GoPackage {
    let option = file
        .file_descriptor_proto()
        .options
        .as_ref()
        .and_then(|options| options.go_package.as_deref())
        .filter(|option| !option.is_empty());
    if let Some(option) = option {
        return GoPackage::from_go_package_option(option);
    }

    let import_path = match file.name().rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    };
    let name = match file.package_name().rsplit('.').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => file
            .name()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .trim_end_matches(".proto")
            .to_string(),
    };
    GoPackage {
        import_path,
        name: sanitize_package_name(&name),
    }
}

fn message_ref(message: &MessageDescriptor, generating: &FileDescriptor) -> Option<MessageRef> {
    if message.full_name() == crate::EMPTY_MESSAGE {
        return None;
    }

    let declaring = message.parent_file();
    let package = declaring.package_name();
    let relative = message
        .full_name()
        .strip_prefix(package)
        .map(|rest| rest.trim_start_matches('.'))
        .unwrap_or(message.full_name());

    let go_package = if declaring.name() == generating.name() {
        None
    } else {
        let declared = go_package(&declaring);
        (declared != go_package(generating)).then_some(declared)
    };

    Some(MessageRef {
        full_name: message.full_name().to_string(),
        go_name: go_camel_case(relative),
        go_package,
    })
}

fn leading_comment(proto: &prost_types::FileDescriptorProto, path: &[i32]) -> Option<String> {
    let location = proto
        .source_code_info
        .as_ref()?
        .location
        .iter()
        .find(|location| location.path == path)?;
    let comment = location.leading_comments.as_deref()?;

    let lines: Vec<&str> = comment
        .trim_end()
        .lines()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end())
        .collect();
    let doc = lines.join("\n");
    (!doc.trim().is_empty()).then_some(doc)
}

fn decode_extension<T>(
    options: &DynamicMessage,
    extension: Option<&ExtensionDescriptor>,
    target: &str,
    name: &'static str,
) -> Result<Option<T>, ExtractError>
where
    T: prost::Message + Default,
{
    let Some(extension) = extension else {
        return Ok(None);
    };
    if !options.has_extension(extension) {
        return Ok(None);
    }

    let invalid = |message: String| ExtractError::InvalidOption {
        target: target.to_string(),
        extension: name,
        message,
    };
    match options.get_extension(extension).as_ref() {
        Value::Message(message) => message
            .transcode_to::<T>()
            .map(Some)
            .map_err(|e| invalid(e.to_string())),
        other => Err(invalid(format!("expected a message, got {other:?}"))),
    }
}
