//! The Go packages generated code depends on.

/// A runtime package generated code refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pkg {
    Context,
    Errors,
    Fmt,
    Activity,
    Client,
    Enums,
    Expression,
    Temporal,
    Testsuite,
    Uuid,
    Worker,
    Workflow,
}

/// An import path and the identifier generated code uses for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoImport {
    pub path: String,
    pub alias: String,
}

impl GoImport {
    pub fn new(path: &str, alias: &str) -> Self {
        GoImport {
            path: path.to_string(),
            alias: alias.to_string(),
        }
    }
}

/// Target vocabulary: where each [`Pkg`] lives.
///
/// The default targets the Temporal Go SDK and the expression helpers that
/// ship with protoc-gen-go-temporal. Override individual entries to point
/// generated code at forks or vendored copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub context: GoImport,
    pub errors: GoImport,
    pub fmt: GoImport,
    pub activity: GoImport,
    pub client: GoImport,
    pub enums: GoImport,
    pub expression: GoImport,
    pub temporal: GoImport,
    pub testsuite: GoImport,
    pub uuid: GoImport,
    pub worker: GoImport,
    pub workflow: GoImport,
}

impl Vocabulary {
    pub fn temporal_sdk() -> Self {
        Vocabulary {
            context: GoImport::new("context", "context"),
            errors: GoImport::new("errors", "errors"),
            fmt: GoImport::new("fmt", "fmt"),
            activity: GoImport::new("go.temporal.io/sdk/activity", "activity"),
            client: GoImport::new("go.temporal.io/sdk/client", "client"),
            enums: GoImport::new("go.temporal.io/api/enums/v1", "enums"),
            expression: GoImport::new(
                "github.com/cludden/protoc-gen-go-temporal/pkg/expression",
                "expression",
            ),
            temporal: GoImport::new("go.temporal.io/sdk/temporal", "temporal"),
            testsuite: GoImport::new("go.temporal.io/sdk/testsuite", "testsuite"),
            uuid: GoImport::new("github.com/google/uuid", "uuid"),
            worker: GoImport::new("go.temporal.io/sdk/worker", "worker"),
            workflow: GoImport::new("go.temporal.io/sdk/workflow", "workflow"),
        }
    }

    pub fn import(&self, pkg: Pkg) -> &GoImport {
        match pkg {
            Pkg::Context => &self.context,
            Pkg::Errors => &self.errors,
            Pkg::Fmt => &self.fmt,
            Pkg::Activity => &self.activity,
            Pkg::Client => &self.client,
            Pkg::Enums => &self.enums,
            Pkg::Expression => &self.expression,
            Pkg::Temporal => &self.temporal,
            Pkg::Testsuite => &self.testsuite,
            Pkg::Uuid => &self.uuid,
            Pkg::Worker => &self.worker,
            Pkg::Workflow => &self.workflow,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::temporal_sdk()
    }
}
