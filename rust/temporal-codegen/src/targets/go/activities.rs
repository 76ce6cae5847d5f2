//! Activities: the implementation interface, registration, futures and the
//! four invocation helpers on the workflow resources.

use std::fmt;

use temporal_schema::{ActivityOptions, RetryPolicy};

use super::literal;
use super::options::{default_duration, default_retry_policy};
use super::{GoFile, Pkg, Scope, decode_result, doc, func_type, input_arg, input_param, results};
use crate::cw_writeln;
use crate::model::Entity;

/// `func(context.Context, *In) (*Out, error)`, the activity function type.
fn activity_fn(f: &GoFile<'_>, a: Entity<'_, ActivityOptions>) -> String {
    let ctx = f.qual(Pkg::Context, "Context");
    func_type(f, &ctx, a.method)
}

/// The `SActivities` interface.
pub fn interface(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let iface = scope.names.activities_interface();
    cw_writeln!(
        f,
        "// {iface} describes available {} activities",
        scope.service.full_name()
    )?;
    f.block(&format!("type {iface} interface"), |f| {
        for (i, a) in scope.service.activities().enumerate() {
            if i > 0 {
                f.blank_line()?;
            }
            let method = scope.names.method(a.name());
            doc(
                f,
                &format!(
                    "{method} implements a(n) {} activity",
                    scope.qualified(a.name())
                ),
                a.method,
            )?;
            let ctx = f.qual(Pkg::Context, "Context");
            let params = input_param(f, a.method, "req");
            let returns = results(f, a.method.output.as_ref());
            cw_writeln!(f, "{method}(ctx {ctx}{params}) {returns}")?;
        }
        Ok(())
    })?;
    f.blank_line()
}

/// `RegisterSActivities` and one `RegisterSXActivity` per activity.
pub fn registration(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let registry = f.qual(Pkg::Worker, "ActivityRegistry");

    cw_writeln!(
        f,
        "// {} registers {} activities with the given worker",
        names.register_activities(),
        scope.service.full_name()
    )?;
    f.block(
        &format!(
            "func {}(r {registry}, activities {})",
            names.register_activities(),
            names.activities_interface()
        ),
        |f| {
            for a in scope.service.activities() {
                cw_writeln!(
                    f,
                    "{}(r, activities.{})",
                    names.register_activity(a.name()),
                    names.method(a.name())
                )?;
            }
            Ok(())
        },
    )?;
    f.blank_line()?;

    for a in scope.service.activities() {
        let register = names.register_activity(a.name());
        let register_options = f.qual(Pkg::Activity, "RegisterOptions");
        let fn_ty = activity_fn(f, a);
        cw_writeln!(
            f,
            "// {register} registers a {} activity with the given worker",
            scope.qualified(a.name())
        )?;
        f.block(&format!("func {register}(r {registry}, fn {fn_ty})"), |f| {
            f.composite(
                &format!("r.RegisterActivityWithOptions(fn, {register_options}"),
                "})",
                |f| cw_writeln!(f, "Name: {},", names.activity_name(a.name())),
            )
        })?;
        f.blank_line()?;
    }
    Ok(())
}

/// The `SXFuture` type.
pub fn future(scope: &Scope<'_>, a: Entity<'_, ActivityOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let future = scope.names.activity_future(a.name());
    let wf_future = f.qual(Pkg::Workflow, "Future");
    let wf_ctx = f.qual(Pkg::Workflow, "Context");
    let selector = f.qual(Pkg::Workflow, "Selector");

    cw_writeln!(
        f,
        "// {future} describes a(n) {} activity execution",
        scope.qualified(a.name())
    )?;
    f.block(&format!("type {future} struct"), |f| {
        cw_writeln!(f, "Future {wf_future}")
    })?;
    f.blank_line()?;

    f.writeln("// Get blocks on the activity's completion, returning the response")?;
    let returns = results(f, a.method.output.as_ref());
    f.block(
        &format!("func (f *{future}) Get(ctx {wf_ctx}) {returns}"),
        |f| decode_result(f, a.method.output.as_ref(), "f.Future.Get(ctx, "),
    )?;
    f.blank_line()?;

    f.writeln("// Select adds the activity's completion to the selector, callback can be nil")?;
    f.block(
        &format!("func (f *{future}) Select(sel {selector}, fn func(*{future})) {selector}"),
        |f| {
            f.composite(
                &format!("return sel.AddFuture(f.Future, func({wf_future}) "),
                "})",
                |f| f.block("if fn != nil", |f| f.writeln("fn(f)")),
            )
        },
    )?;
    f.blank_line()
}

/// Retry policy applied when the caller set none: the schema's, else one
/// capped at the default attempt count.
fn retry_policy(scope: &Scope<'_>, a: Entity<'_, ActivityOptions>) -> RetryPolicy {
    a.options.retry_policy.clone().unwrap_or_else(|| RetryPolicy {
        max_attempts: scope.defaults.activity_max_attempts,
        ..Default::default()
    })
}

/// Timeouts shared by remote and local activity options.
fn close_timeouts(
    scope: &Scope<'_>,
    a: Entity<'_, ActivityOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let options = a.options;
    default_duration(
        f,
        "opts",
        "StartToCloseTimeout",
        options.start_to_close_timeout.as_ref().map(literal::nanos),
    )?;
    default_duration(
        f,
        "opts",
        "ScheduleToCloseTimeout",
        options.schedule_to_close_timeout.as_ref().map(literal::nanos),
    )?;
    if options.start_to_close_timeout.is_none() && options.schedule_to_close_timeout.is_none() {
        let value = literal::duration(literal::std_nanos(
            scope.defaults.activity_schedule_to_close_timeout,
        ));
        f.block(
            "if opts.StartToCloseTimeout == 0 && opts.ScheduleToCloseTimeout == 0",
            |f| cw_writeln!(f, "opts.ScheduleToCloseTimeout = {value}"),
        )?;
    }
    Ok(())
}

/// `X`, `XAsync`, `XLocal` and `XLocalAsync` on the workflow resources.
pub fn resource_methods(
    scope: &Scope<'_>,
    a: Entity<'_, ActivityOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let resources = names.workflow_resources();
    let method = names.method(a.name());
    let qualified = scope.qualified(a.name());
    let future = names.activity_future(a.name());
    let name_const = names.activity_name(a.name());
    let wf_ctx = f.qual(Pkg::Workflow, "Context");
    let params = input_param(f, a.method, "req");
    let req = input_arg(a.method, "req");
    let returns = results(f, a.method.output.as_ref());
    let fn_ty = activity_fn(f, a);
    let policy = retry_policy(scope, a);

    // Remote.
    let activity_opts = f.qual(Pkg::Workflow, "ActivityOptions");
    cw_writeln!(f, "// {method} executes a(n) {qualified} activity and blocks until it completes")?;
    f.block(
        &format!(
            "func (r {resources}) {method}(ctx {wf_ctx}{params}, options ...{activity_opts}) {returns}"
        ),
        |f| cw_writeln!(f, "return r.{method}Async(ctx{req}, options...).Get(ctx)"),
    )?;
    f.blank_line()?;

    cw_writeln!(f, "// {method}Async executes a(n) {qualified} activity and returns a future")?;
    let get_opts = f.qual(Pkg::Workflow, "GetActivityOptions");
    let with_opts = f.qual(Pkg::Workflow, "WithActivityOptions");
    let execute = f.qual(Pkg::Workflow, "ExecuteActivity");
    f.block(
        &format!(
            "func (r {resources}) {method}Async(ctx {wf_ctx}{params}, options ...{activity_opts}) *{future}"
        ),
        |f| {
            cw_writeln!(f, "var opts {activity_opts}")?;
            f.writeln("if len(options) > 0 {")?;
            {
                let _indent = f.indent();
                f.writeln("opts = options[0]")?;
            }
            f.writeln("} else {")?;
            {
                let _indent = f.indent();
                cw_writeln!(f, "opts = {get_opts}(ctx)")?;
            }
            f.writeln("}")?;
            if !a.options.task_queue.is_empty() {
                let queue = literal::string(&a.options.task_queue);
                f.block("if opts.TaskQueue == \"\"", |f| {
                    cw_writeln!(f, "opts.TaskQueue = {queue}")
                })?;
            }
            default_retry_policy(f, "opts", &policy)?;
            default_duration(
                f,
                "opts",
                "ScheduleToStartTimeout",
                a.options.schedule_to_start_timeout.as_ref().map(literal::nanos),
            )?;
            default_duration(
                f,
                "opts",
                "HeartbeatTimeout",
                a.options.heartbeat_timeout.as_ref().map(literal::nanos),
            )?;
            close_timeouts(scope, a, f)?;
            cw_writeln!(f, "ctx = {with_opts}(ctx, opts)")?;
            cw_writeln!(
                f,
                "return &{future}{{Future: {execute}(ctx, {name_const}{req})}}"
            )
        },
    )?;
    f.blank_line()?;

    // Local.
    let local_opts = f.qual(Pkg::Workflow, "LocalActivityOptions");
    cw_writeln!(f, "// {method}Local executes a(n) {qualified} activity locally and blocks until it completes")?;
    f.block(
        &format!(
            "func (r {resources}) {method}Local(ctx {wf_ctx}{params}, fn {fn_ty}, options ...{local_opts}) {returns}"
        ),
        |f| {
            cw_writeln!(
                f,
                "return r.{method}LocalAsync(ctx{req}, fn, options...).Get(ctx)"
            )
        },
    )?;
    f.blank_line()?;

    cw_writeln!(f, "// {method}LocalAsync executes a(n) {qualified} activity locally and returns a future")?;
    let get_local = f.qual(Pkg::Workflow, "GetLocalActivityOptions");
    let with_local = f.qual(Pkg::Workflow, "WithLocalActivityOptions");
    let execute_local = f.qual(Pkg::Workflow, "ExecuteLocalActivity");
    f.block(
        &format!(
            "func (r {resources}) {method}LocalAsync(ctx {wf_ctx}{params}, fn {fn_ty}, options ...{local_opts}) *{future}"
        ),
        |f| {
            cw_writeln!(f, "var opts {local_opts}")?;
            f.writeln("if len(options) > 0 {")?;
            {
                let _indent = f.indent();
                f.writeln("opts = options[0]")?;
            }
            f.writeln("} else {")?;
            {
                let _indent = f.indent();
                cw_writeln!(f, "opts = {get_local}(ctx)")?;
            }
            f.writeln("}")?;
            default_retry_policy(f, "opts", &policy)?;
            close_timeouts(scope, a, f)?;
            cw_writeln!(f, "ctx = {with_local}(ctx, opts)")?;
            cw_writeln!(f, "var act any = {name_const}")?;
            f.block("if fn != nil", |f| f.writeln("act = fn"))?;
            cw_writeln!(
                f,
                "return &{future}{{Future: {execute_local}(ctx, act{req})}}"
            )
        },
    )?;
    f.blank_line()
}
