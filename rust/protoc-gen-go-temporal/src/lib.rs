#![deny(unsafe_code)]

//! The `protoc-gen-go-temporal` plugin.
//!
//! protoc runs the binary once per invocation, writing a
//! `CodeGeneratorRequest` to its stdin and reading a `CodeGeneratorResponse`
//! back from its stdout. For every requested `.proto` file that declares at
//! least one Temporal workflow, activity, query, signal or update, the
//! response carries one `<name>_temporal.pb.go` file.
//!
//! Errors never abort the process. Bad parameters, undecodable options and
//! invalid services are reported through the response's `error` field, which
//! protoc prints before discarding every generated file.

pub mod config;
pub mod request;

use std::fmt;

use prost_reflect::{DescriptorError, DescriptorPool};
use prost_types::compiler::CodeGeneratorResponse;
use prost_types::compiler::code_generator_response::{Feature, File};
use temporal_codegen::{Config, FileOptions, GenerateError, GeneratedFile, generate_file};
use temporal_schema::extract::{self, ExtractError};
use tracing::{debug, info, warn};

pub use config::{ConfigError, PluginConfig};
pub use request::CodeGeneratorRequest;

/// Why a request produced no files.
#[derive(Debug)]
pub enum PluginError {
    Config(ConfigError),
    Descriptors(DescriptorError),
    /// A `file_to_generate` entry had no matching `proto_file`.
    MissingFile(String),
    Extract {
        file: String,
        error: ExtractError,
    },
    Generate {
        file: String,
        error: GenerateError,
    },
    /// More than one requested file failed.
    Files(Vec<PluginError>),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::Config(error) => write!(f, "{error}"),
            PluginError::Descriptors(error) => write!(f, "invalid descriptors: {error}"),
            PluginError::MissingFile(file) => {
                write!(f, "{file}: not among the request's proto files")
            }
            PluginError::Extract { file, error } => write!(f, "{file}: {error}"),
            PluginError::Generate { file, error } => write!(f, "{file}: {error}"),
            PluginError::Files(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PluginError::Config(error) => Some(error),
            PluginError::Descriptors(error) => Some(error),
            PluginError::Extract { error, .. } => Some(error),
            PluginError::Generate { error, .. } => Some(error),
            PluginError::MissingFile(_) | PluginError::Files(_) => None,
        }
    }
}

impl From<ConfigError> for PluginError {
    fn from(error: ConfigError) -> Self {
        PluginError::Config(error)
    }
}

impl From<DescriptorError> for PluginError {
    fn from(error: DescriptorError) -> Self {
        PluginError::Descriptors(error)
    }
}

/// Answers one plugin request.
pub fn respond(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };
    match generate(request) {
        Ok(files) => response.file = files,
        Err(error) => response.error = Some(error.to_string()),
    }
    response
}

/// Generates the Go files for every file protoc asked for.
///
/// All requested files are attempted before failing so the error lists
/// every problem at once.
pub fn generate(request: &CodeGeneratorRequest) -> Result<Vec<File>, PluginError> {
    let plugin_config = PluginConfig::parse(request.parameter())?;
    debug!(?plugin_config, "parsed parameters");

    let pool = request.descriptor_pool()?;
    let options = FileOptions {
        features: plugin_config.features,
        paths: plugin_config.paths,
        compiler_version: request.compiler_version_label(),
    };
    let config = Config::default();

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for name in &request.file_to_generate {
        match generate_one(&pool, name, &options, &config) {
            Ok(Some(generated)) => {
                info!(proto = %name, file = %generated.name, "writing");
                files.push(File {
                    name: Some(generated.name),
                    content: Some(generated.content),
                    ..Default::default()
                });
            }
            Ok(None) => warn!(proto = %name, "no Temporal services, skipping"),
            Err(error) => errors.push(error),
        }
    }

    match errors.len() {
        0 => Ok(files),
        1 => Err(errors.remove(0)),
        _ => Err(PluginError::Files(errors)),
    }
}

fn generate_one(
    pool: &DescriptorPool,
    name: &str,
    options: &FileOptions,
    config: &Config,
) -> Result<Option<GeneratedFile>, PluginError> {
    let descriptor = pool
        .get_file_by_name(name)
        .ok_or_else(|| PluginError::MissingFile(name.to_string()))?;
    let file = extract::file(&descriptor).map_err(|error| PluginError::Extract {
        file: name.to_string(),
        error,
    })?;
    generate_file(&file, options, config).map_err(|error| PluginError::Generate {
        file: name.to_string(),
        error,
    })
}
