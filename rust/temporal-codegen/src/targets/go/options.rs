//! Option defaulting shared by workflow starts, child workflows and activities.
//!
//! Generated code only fills a field the caller left at its zero value, so
//! explicitly passed options always win over schema options, and schema
//! options win over provider defaults.

use std::fmt;

use temporal_schema::{IdReusePolicy, RetryPolicy, WorkflowOptions};

use super::literal;
use super::{GoFile, Pkg, Scope};
use crate::cw_writeln;
use crate::model::Entity;

/// Which Go options struct a workflow's defaults are written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkflowTarget {
    /// `client.StartWorkflowOptions`.
    Start,
    /// `workflow.ChildWorkflowOptions`.
    Child,
}

impl WorkflowTarget {
    fn id_field(self) -> &'static str {
        match self {
            WorkflowTarget::Start => "ID",
            WorkflowTarget::Child => "WorkflowID",
        }
    }
}

/// `if opts.Field == 0 { opts.Field = N }` for a configured duration.
pub(crate) fn default_duration(
    f: &mut GoFile<'_>,
    opts: &str,
    field: &str,
    nanos: Option<i128>,
) -> fmt::Result {
    let Some(nanos) = nanos else {
        return Ok(());
    };
    let value = literal::duration(nanos);
    f.block(&format!("if {opts}.{field} == 0"), |f| {
        cw_writeln!(f, "{opts}.{field} = {value}")
    })
}

/// The body of a `temporal.RetryPolicy` composite literal.
pub(crate) fn retry_policy_fields(f: &mut GoFile<'_>, policy: &RetryPolicy) -> fmt::Result {
    if let Some(interval) = &policy.initial_interval {
        cw_writeln!(
            f,
            "InitialInterval: {},",
            literal::duration(literal::nanos(interval))
        )?;
    }
    if policy.backoff_coefficient != 0.0 {
        cw_writeln!(
            f,
            "BackoffCoefficient: {},",
            literal::float(policy.backoff_coefficient)
        )?;
    }
    if let Some(interval) = &policy.max_interval {
        cw_writeln!(
            f,
            "MaximumInterval: {},",
            literal::duration(literal::nanos(interval))
        )?;
    }
    if policy.max_attempts != 0 {
        cw_writeln!(f, "MaximumAttempts: {},", policy.max_attempts)?;
    }
    if !policy.non_retryable_error_types.is_empty() {
        let types: Vec<String> = policy
            .non_retryable_error_types
            .iter()
            .map(|t| literal::string(t))
            .collect();
        cw_writeln!(f, "NonRetryableErrorTypes: []string{{{}}},", types.join(", "))?;
    }
    Ok(())
}

/// `if opts.RetryPolicy == nil { opts.RetryPolicy = &temporal.RetryPolicy{...} }`.
pub(crate) fn default_retry_policy(
    f: &mut GoFile<'_>,
    opts: &str,
    policy: &RetryPolicy,
) -> fmt::Result {
    let ty = f.qual(Pkg::Temporal, "RetryPolicy");
    f.block(&format!("if {opts}.RetryPolicy == nil"), |f| {
        f.composite(&format!("{opts}.RetryPolicy = &{ty}"), "}", |f| {
            retry_policy_fields(f, policy)
        })
    })
}

/// The task queue a workflow starts on unless the caller picks one: the
/// workflow's own option, then the service constant.
pub(crate) fn workflow_task_queue(scope: &Scope<'_>, options: &WorkflowOptions) -> Option<String> {
    if !options.task_queue.is_empty() {
        Some(literal::string(&options.task_queue))
    } else {
        scope.service.task_queue().map(|_| scope.names.task_queue())
    }
}

/// Statements filling unset fields of `opts` from the workflow's options and
/// the provider defaults. On an expression error the enclosing function
/// returns `failed, fmt.Errorf(...)`.
pub(crate) fn workflow_defaults(
    f: &mut GoFile<'_>,
    scope: &Scope<'_>,
    workflow: Entity<'_, WorkflowOptions>,
    target: WorkflowTarget,
    opts: &str,
    failed: &str,
) -> fmt::Result {
    let names = scope.names;
    let options = workflow.options;
    let name_const = names.workflow_name(workflow.name());

    if let Some(queue) = workflow_task_queue(scope, options) {
        f.block(&format!("if {opts}.TaskQueue == \"\""), |f| {
            cw_writeln!(f, "{opts}.TaskQueue = {queue}")
        })?;
    }

    if !options.id.is_empty() {
        let id_field = target.id_field();
        let eval = f.qual(Pkg::Expression, "EvalExpression");
        let errorf = f.qual(Pkg::Fmt, "Errorf");
        let expr = names.id_expression(workflow.name());
        f.block(&format!("if {opts}.{id_field} == \"\""), |f| {
            cw_writeln!(f, "id, err := {eval}({expr}, req.ProtoReflect())")?;
            f.block("if err != nil", |f| {
                cw_writeln!(
                    f,
                    "return {failed}, {errorf}(\"error evaluating id expression for %q workflow: %w\", {name_const}, err)"
                )
            })?;
            cw_writeln!(f, "{opts}.{id_field} = id")
        })?;
    }

    let policy = IdReusePolicy::try_from(options.id_reuse_policy)
        .ok()
        .filter(|policy| *policy != IdReusePolicy::Unspecified)
        .unwrap_or(scope.defaults.workflow_id_reuse_policy);
    if policy != IdReusePolicy::Unspecified {
        let unspecified = f.qual(Pkg::Enums, IdReusePolicy::Unspecified.as_str_name());
        let value = f.qual(Pkg::Enums, policy.as_str_name());
        f.block(
            &format!("if {opts}.WorkflowIDReusePolicy == {unspecified}"),
            |f| cw_writeln!(f, "{opts}.WorkflowIDReusePolicy = {value}"),
        )?;
    }

    let run_timeout = options
        .run_timeout
        .as_ref()
        .map(literal::nanos)
        .unwrap_or_else(|| literal::std_nanos(scope.defaults.workflow_run_timeout));
    default_duration(f, opts, "WorkflowRunTimeout", Some(run_timeout))?;
    default_duration(
        f,
        opts,
        "WorkflowExecutionTimeout",
        options.execution_timeout.as_ref().map(literal::nanos),
    )?;
    default_duration(
        f,
        opts,
        "WorkflowTaskTimeout",
        options.task_timeout.as_ref().map(literal::nanos),
    )?;

    if let Some(policy) = &options.retry_policy {
        default_retry_policy(f, opts, policy)?;
    }

    if !options.search_attributes.is_empty() {
        let eval = f.qual(Pkg::Expression, "EvalSearchAttributes");
        let errorf = f.qual(Pkg::Fmt, "Errorf");
        let mapping = names.search_attributes_mapping(workflow.name());
        f.block(&format!("if {opts}.SearchAttributes == nil"), |f| {
            cw_writeln!(f, "sa, err := {eval}({mapping}, req.ProtoReflect())")?;
            f.block("if err != nil", |f| {
                cw_writeln!(
                    f,
                    "return {failed}, {errorf}(\"error evaluating search attributes for %q workflow: %w\", {name_const}, err)"
                )
            })?;
            cw_writeln!(f, "{opts}.SearchAttributes = sa")
        })?;
    }

    Ok(())
}
