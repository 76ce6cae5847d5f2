//! Generator configuration injected into the renderer.

use std::time::Duration;

use temporal_schema::IdReusePolicy;

use crate::targets::go::Vocabulary;

/// Everything the renderer needs besides the service model.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Import paths and aliases of the runtime packages the generated code calls.
    pub vocabulary: Vocabulary,
    pub defaults: Defaults,
}

/// Values generated code falls back to when neither the schema options nor
/// the caller supply one.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub workflow_run_timeout: Duration,
    pub workflow_id_reuse_policy: IdReusePolicy,
    pub activity_max_attempts: i32,
    /// Applied when an activity has neither a schedule-to-close nor a
    /// start-to-close timeout.
    pub activity_schedule_to_close_timeout: Duration,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            workflow_run_timeout: Duration::from_secs(60 * 60),
            workflow_id_reuse_policy: IdReusePolicy::AllowDuplicate,
            activity_max_attempts: 5,
            activity_schedule_to_close_timeout: Duration::from_secs(2 * 60),
        }
    }
}
