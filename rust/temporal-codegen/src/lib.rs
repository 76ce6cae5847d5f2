#![deny(unsafe_code)]

//! Go code generation for Temporal services declared in protobuf.
//!
//! # The Pipeline
//!
//! ```text
//! .proto + temporal.v1 options  →  ServiceDescriptor  →  Service (validated)  →  Go source
//!     (protoc request)           (temporal-schema)        (model)                (render)
//! ```
//!
//! A [`ServiceDescriptor`] is classified and validated into a
//! [`model::Service`]. Nothing is emitted for a service that fails
//! validation. The [`Renderer`] then drives the Go emitters in a fixed
//! order, each appending to one [`targets::go::GoFile`], and
//! [`generate_file`] stitches the per-service units of one proto file into
//! a single Go source file with a package clause and an import block.
//!
//! # Usage
//!
//! ```
//! use temporal_codegen::{Config, Features, generate_service};
//! use temporal_schema::{MessageRef, MethodDescriptor, ServiceDescriptor, WorkflowOptions};
//!
//! let descriptor = ServiceDescriptor::new("example.v1", "Example").with_method(
//!     MethodDescriptor::new("Hello")
//!         .with_input(MessageRef::local("example.v1.HelloRequest"))
//!         .with_output(MessageRef::local("example.v1.HelloResponse"))
//!         .with_workflow(WorkflowOptions::default()),
//! );
//!
//! let unit = generate_service(&descriptor, Features::default(), &Config::default()).unwrap();
//! assert!(unit.body.contains("type ExampleHello interface {"));
//! assert!(unit.imports.contains_key("go.temporal.io/sdk/workflow"));
//! ```
//!
//! # Determinism
//!
//! Every collection in the model is keyed by name, and workflow reference
//! lists are sorted at build time, so permuting methods in the schema yields
//! byte-identical output.

pub mod code_writer;
pub mod config;
pub mod model;
pub mod names;
mod render;
pub mod targets;

use std::collections::BTreeMap;
use std::fmt;

use temporal_schema::{ProtoFile, ServiceDescriptor};
use tracing::debug;

pub use config::{Config, Defaults};
pub use model::{Features, ModelError, Service, ValidationError};
pub use render::Renderer;
pub use targets::go::GoUnit;
use targets::go::{ImportConflict, add_import};

/// Header line Go tooling recognizes as generated code.
pub const GENERATED_HEADER: &str = "// Code generated by protoc-gen-go-temporal. DO NOT EDIT.";

/// Why generation failed.
#[derive(Debug)]
pub enum GenerateError {
    /// A service failed to classify or validate.
    Model { service: String, error: ModelError },

    /// Two Go packages referenced from one file share an import alias.
    ImportConflict(ImportConflict),

    /// Writing to the output buffer failed.
    Format(fmt::Error),

    /// Several services of one file failed.
    Services(Vec<GenerateError>),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Model { service, error } => {
                write!(f, "service {service}: {error}")
            }
            GenerateError::ImportConflict(conflict) => write!(f, "{conflict}"),
            GenerateError::Format(e) => write!(f, "formatting error: {e}"),
            GenerateError::Services(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Model { error, .. } => Some(error),
            GenerateError::ImportConflict(conflict) => Some(conflict),
            GenerateError::Format(e) => Some(e),
            GenerateError::Services(_) => None,
        }
    }
}

impl From<fmt::Error> for GenerateError {
    fn from(e: fmt::Error) -> Self {
        GenerateError::Format(e)
    }
}

impl From<ImportConflict> for GenerateError {
    fn from(conflict: ImportConflict) -> Self {
        GenerateError::ImportConflict(conflict)
    }
}

/// Builds, validates and renders one service.
pub fn generate_service(
    descriptor: &ServiceDescriptor,
    features: Features,
    config: &Config,
) -> Result<GoUnit, GenerateError> {
    let service = build(descriptor, features)?;
    Renderer::new(config).render(&service)
}

/// Generates each service independently: one failing service does not
/// affect the others. Results are in input order.
pub fn generate_services(
    descriptors: &[ServiceDescriptor],
    features: Features,
    config: &Config,
) -> Vec<Result<GoUnit, GenerateError>> {
    descriptors
        .iter()
        .map(|descriptor| generate_service(descriptor, features, config))
        .collect()
}

fn build(descriptor: &ServiceDescriptor, features: Features) -> Result<Service, GenerateError> {
    Service::build(descriptor, features).map_err(|error| GenerateError::Model {
        service: descriptor.full_name.clone(),
        error,
    })
}

/// Where generated files are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Paths {
    /// Under the Go import path of the proto file's `go_package`.
    #[default]
    Import,
    /// Next to the proto file.
    SourceRelative,
}

/// Per-request settings for [`generate_file`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOptions {
    pub features: Features,
    pub paths: Paths,
    /// Compiler version for the header, e.g. `v4.25.1`.
    pub compiler_version: Option<String>,
}

/// A rendered Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Output path relative to the protoc output directory.
    pub name: String,
    pub content: String,
}

/// Output path of the Go file generated for `file`.
pub fn output_name(file: &ProtoFile, paths: Paths) -> String {
    let stem = file.name.strip_suffix(".proto").unwrap_or(&file.name);
    match paths {
        Paths::SourceRelative => format!("{stem}_temporal.pb.go"),
        Paths::Import => {
            let base = stem.rsplit('/').next().unwrap_or(stem);
            let dir = file.go_package.import_path.trim_end_matches('/');
            if dir.is_empty() || dir == "." {
                format!("{base}_temporal.pb.go")
            } else {
                format!("{dir}/{base}_temporal.pb.go")
            }
        }
    }
}

/// Generates the Go file for every service in `file` that carries roles.
///
/// Returns `Ok(None)` when no service has any Temporal role. Every failing
/// service is reported; nothing is emitted for the file if any fails.
pub fn generate_file(
    file: &ProtoFile,
    options: &FileOptions,
    config: &Config,
) -> Result<Option<GeneratedFile>, GenerateError> {
    let mut services: Vec<&ServiceDescriptor> = file.services.iter().collect();
    services.sort_by(|a, b| a.name.cmp(&b.name));

    let renderer = Renderer::new(config);
    let mut units = Vec::new();
    let mut errors = Vec::new();
    for descriptor in services {
        let service = match build(descriptor, options.features) {
            Ok(service) => service,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        if service.is_empty() {
            debug!(service = service.full_name(), "no temporal roles, skipping");
            continue;
        }
        match renderer.render(&service) {
            Ok(unit) => units.push(unit),
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => {}
        1 => return Err(errors.remove(0)),
        _ => return Err(GenerateError::Services(errors)),
    }
    if units.is_empty() {
        return Ok(None);
    }

    let mut imports = BTreeMap::new();
    for unit in &units {
        for (path, alias) in &unit.imports {
            add_import(&mut imports, path, alias)?;
        }
    }

    let content = assemble(file, options, &imports, &units)?;
    Ok(Some(GeneratedFile {
        name: output_name(file, options.paths),
        content,
    }))
}

fn assemble(
    file: &ProtoFile,
    options: &FileOptions,
    imports: &BTreeMap<String, String>,
    units: &[GoUnit],
) -> Result<String, fmt::Error> {
    let mut w = code_writer::CodeWriter::go(String::new());
    w.writeln(GENERATED_HEADER)?;
    w.writeln("// versions:")?;
    crate::cw_writeln!(w, "// \tprotoc-gen-go-temporal v{}", env!("CARGO_PKG_VERSION"))?;
    crate::cw_writeln!(
        w,
        "// \tprotoc {}",
        options.compiler_version.as_deref().unwrap_or("(unknown)")
    )?;
    crate::cw_writeln!(w, "// source: {}", file.name)?;
    w.blank_line()?;
    crate::cw_writeln!(w, "package {}", file.go_package.name)?;
    w.blank_line()?;

    w.group("import", |w| {
        for (path, alias) in imports {
            let last = path.rsplit('/').next().unwrap_or(path);
            if last == alias {
                crate::cw_writeln!(w, "{}", targets::go::literal::string(path))?;
            } else {
                crate::cw_writeln!(w, "{alias} {}", targets::go::literal::string(path))?;
            }
        }
        Ok(())
    })?;

    for unit in units {
        w.blank_line()?;
        w.write(unit.body.trim_end())?;
        w.blank_line()?;
    }
    Ok(w.into_inner())
}
