//! Child workflow helpers and the child run type.

use std::fmt;

use temporal_schema::WorkflowOptions;

use super::options::{WorkflowTarget, workflow_defaults};
use super::{GoFile, Pkg, Scope, decode_result, fail, input_arg, input_param, results};
use crate::cw_writeln;
use crate::model::Entity;

fn child_params(f: &GoFile<'_>, w: Entity<'_, WorkflowOptions>) -> String {
    format!(
        "ctx {}{}, options ...{}",
        f.qual(Pkg::Workflow, "Context"),
        input_param(f, w.method, "req"),
        f.qual(Pkg::Workflow, "ChildWorkflowOptions")
    )
}

/// `SXChild`, `SXChildAsync` and the child options builder.
pub fn functions(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let qualified = scope.qualified(w.name());
    let child = names.child(w.name());
    let child_async = names.child_async(w.name());
    let child_run = names.child_run(w.name());
    let helper = names.child_workflow_options(w.name());
    let params = child_params(f, w);
    let req = input_arg(w.method, "req");
    let output = w.method.output.as_ref();
    let returns = results(f, output);

    cw_writeln!(f, "// {child} executes a child {qualified} workflow and blocks until it completes")?;
    f.block(&format!("func {child}({params}) {returns}"), |f| {
        cw_writeln!(f, "childRun, err := {child_async}(ctx{req}, options...)")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return childRun.Get(ctx)")
    })?;
    f.blank_line()?;

    let with_child = f.qual(Pkg::Workflow, "WithChildOptions");
    let execute = f.qual(Pkg::Workflow, "ExecuteChildWorkflow");
    cw_writeln!(f, "// {child_async} starts a child {qualified} workflow")?;
    f.block(
        &format!("func {child_async}({params}) (*{child_run}, error)"),
        |f| {
            cw_writeln!(f, "opts, err := {helper}(ctx{req}, options...)")?;
            f.block("if err != nil", |f| f.writeln("return nil, err"))?;
            cw_writeln!(f, "ctx = {with_child}(ctx, opts)")?;
            cw_writeln!(
                f,
                "return &{child_run}{{Future: {execute}(ctx, {}{req})}}, nil",
                names.workflow_name(w.name())
            )
        },
    )?;
    f.blank_line()?;

    let opts_ty = f.qual(Pkg::Workflow, "ChildWorkflowOptions");
    let get_opts = f.qual(Pkg::Workflow, "GetChildWorkflowOptions");
    cw_writeln!(f, "// {helper} fills unset child options for a(n) {qualified} workflow")?;
    f.block(&format!("func {helper}({params}) ({opts_ty}, error)"), |f| {
        cw_writeln!(f, "var opts {opts_ty}")?;
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
        workflow_defaults(f, scope, w, WorkflowTarget::Child, "opts", "opts")?;
        f.writeln("return opts, nil")
    })?;
    f.blank_line()
}

/// The `SXChildRun` type.
pub fn run(scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let child_run = names.child_run(w.name());
    let future = f.qual(Pkg::Workflow, "ChildWorkflowFuture");
    let wf_future = f.qual(Pkg::Workflow, "Future");
    let wf_ctx = f.qual(Pkg::Workflow, "Context");
    let selector = f.qual(Pkg::Workflow, "Selector");
    let execution = f.qual(Pkg::Workflow, "Execution");
    let recv = format!("r *{child_run}");

    cw_writeln!(
        f,
        "// {child_run} describes a child {} workflow run",
        scope.qualified(w.name())
    )?;
    f.block(&format!("type {child_run} struct"), |f| {
        cw_writeln!(f, "Future {future}")
    })?;
    f.blank_line()?;

    f.writeln("// Get blocks until the workflow is completed, returning the response value")?;
    let returns = results(f, w.method.output.as_ref());
    f.block(&format!("func ({recv}) Get(ctx {wf_ctx}) {returns}"), |f| {
        decode_result(f, w.method.output.as_ref(), "r.Future.Get(ctx, ")
    })?;
    f.blank_line()?;

    f.writeln("// Select adds this completion to the selector, callback can be nil")?;
    f.block(
        &format!("func ({recv}) Select(sel {selector}, fn func(*{child_run})) {selector}"),
        |f| {
            f.composite(
                &format!("return sel.AddFuture(r.Future, func({wf_future}) "),
                "})",
                |f| f.block("if fn != nil", |f| f.writeln("fn(r)")),
            )
        },
    )?;
    f.blank_line()?;

    f.writeln("// SelectStart adds waiting for start to the selector, callback can be nil")?;
    f.block(
        &format!("func ({recv}) SelectStart(sel {selector}, fn func(*{child_run})) {selector}"),
        |f| {
            f.composite(
                &format!(
                    "return sel.AddFuture(r.Future.GetChildWorkflowExecution(), func({wf_future}) "
                ),
                "})",
                |f| f.block("if fn != nil", |f| f.writeln("fn(r)")),
            )
        },
    )?;
    f.blank_line()?;

    f.writeln("// WaitStart waits for the child workflow to start")?;
    f.block(
        &format!("func ({recv}) WaitStart(ctx {wf_ctx}) (*{execution}, error)"),
        |f| {
            cw_writeln!(f, "var exec {execution}")?;
            f.block(
                "if err := r.Future.GetChildWorkflowExecution().Get(ctx, &exec); err != nil",
                |f| f.writeln("return nil, err"),
            )?;
            f.writeln("return &exec, nil")
        },
    )?;

    for s in &w.options.signal {
        let s = scope.service.signal(&s.r#ref);
        let method = names.method(s.name());
        let params = input_param(f, s.method, "input");
        let value = if s.method.input.is_some() { "input" } else { "nil" };
        f.blank_line()?;
        cw_writeln!(
            f,
            "// {method} sends a(n) {} signal to the child workflow",
            scope.qualified(s.name())
        )?;
        f.block(
            &format!("func ({recv}) {method}(ctx {wf_ctx}{params}) {wf_future}"),
            |f| {
                cw_writeln!(
                    f,
                    "return r.Future.SignalChildWorkflow(ctx, {}, {value})",
                    names.signal_name(s.name())
                )
            },
        )?;
    }
    f.blank_line()
}

/// `XChild` and `XChildAsync` on the workflow resources.
pub fn resource_methods(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let resources = names.workflow_resources();
    let method = names.method(w.name());
    let qualified = scope.qualified(w.name());
    let params = child_params(f, w);
    let req = input_arg(w.method, "req");
    let returns = results(f, w.method.output.as_ref());

    cw_writeln!(f, "// {method}Child executes a child {qualified} workflow and blocks until it completes")?;
    f.block(
        &format!("func (r {resources}) {method}Child({params}) {returns}"),
        |f| cw_writeln!(f, "return {}(ctx{req}, options...)", names.child(w.name())),
    )?;
    f.blank_line()?;

    cw_writeln!(f, "// {method}ChildAsync starts a child {qualified} workflow")?;
    f.block(
        &format!(
            "func (r {resources}) {method}ChildAsync({params}) (*{}, error)",
            names.child_run(w.name())
        ),
        |f| {
            cw_writeln!(
                f,
                "return {}(ctx{req}, options...)",
                names.child_async(w.name())
            )
        },
    )?;
    f.blank_line()
}
