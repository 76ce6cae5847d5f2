//! Option messages carried by the `temporal.v1` protobuf extensions.
//!
//! These mirror `proto/temporal/v1/temporal.proto` field for field. They are
//! decoded from descriptor extensions by transcoding, so only the wire tags
//! need to agree with the schema.

use prost_types::Duration;

/// Service-level defaults (`temporal.v1.service`).
#[derive(Clone, PartialEq, prost::Message)]
pub struct ServiceOptions {
    #[prost(string, tag = "1")]
    pub task_queue: String,
}

/// Activity declaration (`temporal.v1.activity`).
#[derive(Clone, PartialEq, prost::Message)]
pub struct ActivityOptions {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub task_queue: String,
    #[prost(message, optional, tag = "3")]
    pub schedule_to_close_timeout: Option<Duration>,
    #[prost(message, optional, tag = "4")]
    pub schedule_to_start_timeout: Option<Duration>,
    #[prost(message, optional, tag = "5")]
    pub start_to_close_timeout: Option<Duration>,
    #[prost(message, optional, tag = "6")]
    pub heartbeat_timeout: Option<Duration>,
    #[prost(message, optional, tag = "7")]
    pub retry_policy: Option<RetryPolicy>,
}

/// Workflow declaration (`temporal.v1.workflow`).
#[derive(Clone, PartialEq, prost::Message)]
pub struct WorkflowOptions {
    #[prost(string, tag = "1")]
    pub name: String,
    /// ID expression evaluated against the workflow input.
    #[prost(string, tag = "2")]
    pub id: String,
    #[prost(enumeration = "IdReusePolicy", tag = "3")]
    pub id_reuse_policy: i32,
    #[prost(message, optional, tag = "4")]
    pub execution_timeout: Option<Duration>,
    #[prost(message, optional, tag = "5")]
    pub run_timeout: Option<Duration>,
    #[prost(message, optional, tag = "6")]
    pub task_timeout: Option<Duration>,
    #[prost(string, tag = "7")]
    pub task_queue: String,
    /// Search attribute mapping expression evaluated against the workflow input.
    #[prost(string, tag = "8")]
    pub search_attributes: String,
    #[prost(message, optional, tag = "9")]
    pub retry_policy: Option<RetryPolicy>,
    #[prost(message, repeated, tag = "10")]
    pub query: Vec<QueryRef>,
    #[prost(message, repeated, tag = "11")]
    pub signal: Vec<SignalRef>,
    #[prost(message, repeated, tag = "12")]
    pub update: Vec<UpdateRef>,
}

/// A query handled by a workflow.
#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryRef {
    #[prost(string, tag = "1")]
    pub r#ref: String,
}

/// A signal handled by a workflow.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignalRef {
    #[prost(string, tag = "1")]
    pub r#ref: String,
    /// Whether clients get signal-with-start helpers for this signal.
    #[prost(bool, tag = "2")]
    pub start: bool,
}

/// An update handled by a workflow.
#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateRef {
    #[prost(string, tag = "1")]
    pub r#ref: String,
}

/// Query declaration (`temporal.v1.query`).
#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryOptions {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Signal declaration (`temporal.v1.signal`).
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignalOptions {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Update declaration (`temporal.v1.update`).
#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateOptions {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub id: String,
    #[prost(bool, tag = "3")]
    pub validate: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RetryPolicy {
    #[prost(message, optional, tag = "1")]
    pub initial_interval: Option<Duration>,
    #[prost(double, tag = "2")]
    pub backoff_coefficient: f64,
    #[prost(message, optional, tag = "3")]
    pub max_interval: Option<Duration>,
    #[prost(int32, tag = "4")]
    pub max_attempts: i32,
    #[prost(string, repeated, tag = "5")]
    pub non_retryable_error_types: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum IdReusePolicy {
    Unspecified = 0,
    AllowDuplicate = 1,
    AllowDuplicateFailedOnly = 2,
    RejectDuplicate = 3,
    TerminateIfRunning = 4,
}

impl IdReusePolicy {
    /// The enum value name as declared in the schema.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            IdReusePolicy::Unspecified => "WORKFLOW_ID_REUSE_POLICY_UNSPECIFIED",
            IdReusePolicy::AllowDuplicate => "WORKFLOW_ID_REUSE_POLICY_ALLOW_DUPLICATE",
            IdReusePolicy::AllowDuplicateFailedOnly => {
                "WORKFLOW_ID_REUSE_POLICY_ALLOW_DUPLICATE_FAILED_ONLY"
            }
            IdReusePolicy::RejectDuplicate => "WORKFLOW_ID_REUSE_POLICY_REJECT_DUPLICATE",
            IdReusePolicy::TerminateIfRunning => "WORKFLOW_ID_REUSE_POLICY_TERMINATE_IF_RUNNING",
        }
    }
}

/// The role a method plays in a Temporal service.
///
/// Declaration order is the order in which roles are attached while
/// building a service model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Activity,
    Workflow,
    Query,
    Signal,
    Update,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Activity,
        Role::Workflow,
        Role::Query,
        Role::Signal,
        Role::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Activity => "activity",
            Role::Workflow => "workflow",
            Role::Query => "query",
            Role::Signal => "signal",
            Role::Update => "update",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one role, borrowed from a method's [`MethodOptions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoleOptions<'a> {
    Activity(&'a ActivityOptions),
    Workflow(&'a WorkflowOptions),
    Query(&'a QueryOptions),
    Signal(&'a SignalOptions),
    Update(&'a UpdateOptions),
}

impl RoleOptions<'_> {
    pub fn role(&self) -> Role {
        match self {
            RoleOptions::Activity(_) => Role::Activity,
            RoleOptions::Workflow(_) => Role::Workflow,
            RoleOptions::Query(_) => Role::Query,
            RoleOptions::Signal(_) => Role::Signal,
            RoleOptions::Update(_) => Role::Update,
        }
    }
}

/// Every Temporal option block found on a method.
///
/// A block is `None` when the method does not carry that extension. No
/// defaults are filled in here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodOptions {
    pub activity: Option<ActivityOptions>,
    pub workflow: Option<WorkflowOptions>,
    pub query: Option<QueryOptions>,
    pub signal: Option<SignalOptions>,
    pub update: Option<UpdateOptions>,
}

impl MethodOptions {
    /// Returns the options for `role`, or `None` if the method lacks them.
    pub fn get(&self, role: Role) -> Option<RoleOptions<'_>> {
        match role {
            Role::Activity => self.activity.as_ref().map(RoleOptions::Activity),
            Role::Workflow => self.workflow.as_ref().map(RoleOptions::Workflow),
            Role::Query => self.query.as_ref().map(RoleOptions::Query),
            Role::Signal => self.signal.as_ref().map(RoleOptions::Signal),
            Role::Update => self.update.as_ref().map(RoleOptions::Update),
        }
    }

    pub fn is_empty(&self) -> bool {
        Role::ALL.iter().all(|role| self.get(*role).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_requested_role() {
        let options = MethodOptions {
            query: Some(QueryOptions::default()),
            ..Default::default()
        };

        assert!(matches!(
            options.get(Role::Query),
            Some(RoleOptions::Query(_))
        ));
        assert!(options.get(Role::Signal).is_none());
        assert!(!options.is_empty());
        assert!(MethodOptions::default().is_empty());
    }

    #[test]
    fn id_reuse_policy_decodes_unknown_as_unspecified() {
        let options = WorkflowOptions {
            id_reuse_policy: 42,
            ..Default::default()
        };
        assert_eq!(options.id_reuse_policy(), IdReusePolicy::Unspecified);

        let options = WorkflowOptions {
            id_reuse_policy: IdReusePolicy::AllowDuplicateFailedOnly as i32,
            ..Default::default()
        };
        assert_eq!(
            options.id_reuse_policy().as_str_name(),
            "WORKFLOW_ID_REUSE_POLICY_ALLOW_DUPLICATE_FAILED_ONLY"
        );
    }
}
