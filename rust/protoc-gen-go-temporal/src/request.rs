//! Wire types for the protoc plugin protocol.
//!
//! `prost_types::compiler::CodeGeneratorRequest` decodes `proto_file` into
//! `FileDescriptorProto`, which drops unknown fields and with them every
//! custom option. The request here keeps each file as raw bytes so the
//! descriptor pool sees the extensions exactly as protoc wrote them.

use prost::Message;
use prost_reflect::{DescriptorError, DescriptorPool};
use prost_types::compiler::Version;

#[derive(Clone, PartialEq, Message)]
pub struct CodeGeneratorRequest {
    /// Files named on the protoc command line, in order.
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub compiler_version: Option<Version>,
    /// Encoded `FileDescriptorProto`s in dependency order.
    #[prost(bytes = "vec", repeated, tag = "15")]
    pub proto_file: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
struct RawFileDescriptorSet {
    #[prost(bytes = "vec", repeated, tag = "1")]
    file: Vec<Vec<u8>>,
}

impl CodeGeneratorRequest {
    /// Builds a pool holding every file of the request, options included.
    pub fn descriptor_pool(&self) -> Result<DescriptorPool, DescriptorError> {
        let set = RawFileDescriptorSet {
            file: self.proto_file.clone(),
        };
        DescriptorPool::decode(set.encode_to_vec().as_slice())
    }

    /// protoc's version as `vMAJOR.MINOR.PATCH[-suffix]`.
    pub fn compiler_version_label(&self) -> Option<String> {
        let version = self.compiler_version.as_ref()?;
        let mut label = format!(
            "v{}.{}.{}",
            version.major.unwrap_or_default(),
            version.minor.unwrap_or_default(),
            version.patch.unwrap_or_default()
        );
        if let Some(suffix) = version.suffix.as_deref().filter(|s| !s.is_empty()) {
            label.push('-');
            label.push_str(suffix);
        }
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_version(suffix: Option<&str>) -> CodeGeneratorRequest {
        CodeGeneratorRequest {
            compiler_version: Some(Version {
                major: Some(4),
                minor: Some(25),
                patch: Some(1),
                suffix: suffix.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn formats_compiler_version() {
        assert_eq!(
            with_version(None).compiler_version_label().as_deref(),
            Some("v4.25.1")
        );
        assert_eq!(
            with_version(Some("")).compiler_version_label().as_deref(),
            Some("v4.25.1")
        );
        assert_eq!(
            with_version(Some("rc2")).compiler_version_label().as_deref(),
            Some("v4.25.1-rc2")
        );
        assert_eq!(
            CodeGeneratorRequest::default().compiler_version_label(),
            None
        );
    }

    #[test]
    fn missing_parameter_reads_as_empty() {
        assert_eq!(CodeGeneratorRequest::default().parameter(), "");
    }
}
