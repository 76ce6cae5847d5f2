//! The worker surface: workflow interfaces, inputs, builders and registration.

use std::fmt;

use temporal_schema::WorkflowOptions;

use super::{GoFile, Pkg, Scope, doc, fail, func_type, input_param, ptr, results};
use crate::cw_writeln;
use crate::model::Entity;

/// `func(workflow.Context, *SXInput) (SX, error)`.
fn constructor_type(f: &GoFile<'_>, scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>) -> String {
    format!(
        "func({}, *{}) ({}, error)",
        f.qual(Pkg::Workflow, "Context"),
        scope.names.workflow_input(w.name()),
        scope.names.workflow_interface(w.name())
    )
}

/// The `SWorkflows` interface of workflow constructors.
pub fn workflows_interface(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let iface = names.workflows_interface();
    cw_writeln!(
        f,
        "// {iface} provides methods for initializing new {} workflow values",
        scope.service.full_name()
    )?;
    f.block(&format!("type {iface} interface"), |f| {
        let ctx = f.qual(Pkg::Workflow, "Context");
        for (i, w) in scope.service.workflows().enumerate() {
            if i > 0 {
                f.blank_line()?;
            }
            let target = names.workflow_interface(w.name());
            cw_writeln!(
                f,
                "// {} initializes a new a(n) {target} implementation",
                names.method(w.name())
            )?;
            cw_writeln!(
                f,
                "{}(ctx {ctx}, input *{}) ({target}, error)",
                names.method(w.name()),
                names.workflow_input(w.name())
            )?;
        }
        Ok(())
    })?;
    f.blank_line()
}

/// `RegisterSWorkflows` and one `RegisterSXWorkflow` per workflow.
pub fn registration(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let full_name = scope.service.full_name();
    let registry = f.qual(Pkg::Worker, "WorkflowRegistry");

    cw_writeln!(
        f,
        "// {} registers {full_name} workflows with the given worker",
        names.register_workflows()
    )?;
    f.block(
        &format!(
            "func {}(r {registry}, workflows {})",
            names.register_workflows(),
            names.workflows_interface()
        ),
        |f| {
            for w in scope.service.workflows() {
                cw_writeln!(
                    f,
                    "{}(r, workflows.{})",
                    names.register_workflow(w.name()),
                    names.method(w.name())
                )?;
            }
            Ok(())
        },
    )?;
    f.blank_line()?;

    let register_options = f.qual(Pkg::Workflow, "RegisterOptions");
    for w in scope.service.workflows() {
        let register = names.register_workflow(w.name());
        cw_writeln!(
            f,
            "// {register} registers a {} workflow with the given worker",
            scope.qualified(w.name())
        )?;
        let ctor = constructor_type(f, scope, w);
        f.block(&format!("func {register}(r {registry}, wf {ctor})"), |f| {
            f.composite(
                &format!(
                    "r.RegisterWorkflowWithOptions({}(wf), {register_options}",
                    names.workflow_builder(w.name())
                ),
                "})",
                |f| cw_writeln!(f, "Name: {},", names.workflow_name(w.name())),
            )
        })?;
        f.blank_line()?;
    }
    Ok(())
}

/// The `SWorkflowResources` type. Its methods come from the activity,
/// signal and child workflow emitters.
pub fn resources(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let resources = scope.names.workflow_resources();
    cw_writeln!(
        f,
        "// {resources} provides workflow helpers for invoking {} activities, child workflows and external signals",
        scope.service.full_name()
    )?;
    cw_writeln!(f, "type {resources} struct{{}}")?;
    f.blank_line()
}

/// `buildSX`, adapting a workflow constructor into a workflow function.
pub fn builder(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let service = scope.service;
    let build = names.workflow_builder(w.name());
    let output = w.method.output.as_ref();
    let wf_ctx = f.qual(Pkg::Workflow, "Context");
    let ctor = constructor_type(f, scope, w);
    let workflow_fn = func_type(f, &wf_ctx, w.method);

    cw_writeln!(
        f,
        "// {build} converts a {} workflow implementation into a workflow function",
        names.workflow_interface(w.name())
    )?;
    f.block(&format!("func {build}(ctor {ctor}) {workflow_fn}"), |f| {
        let params = input_param(f, w.method, "req");
        let returns = results(f, output);
        f.block(
            &format!("return func(ctx {wf_ctx}{params}) {returns}"),
            |f| {
                let get_channel = f.qual(Pkg::Workflow, "GetSignalChannel");
                f.composite(
                    &format!("input := &{}", names.workflow_input(w.name())),
                    "}",
                    |f| {
                        if w.method.input.is_some() {
                            f.writeln("Req: req,")?;
                        }
                        for s in &w.options.signal {
                            f.composite(
                                &format!(
                                    "{}: &{}",
                                    names.method(&s.r#ref),
                                    names.signal_wrapper(&s.r#ref)
                                ),
                                "},",
                                |f| {
                                    cw_writeln!(
                                        f,
                                        "Channel: {get_channel}(ctx, {}),",
                                        names.signal_name(&s.r#ref)
                                    )
                                },
                            )?;
                        }
                        Ok(())
                    },
                )?;
                f.writeln("wf, err := ctor(ctx, input)")?;
                f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;

                for q in &w.options.query {
                    let q = service.query(&q.r#ref);
                    let set = f.qual(Pkg::Workflow, "SetQueryHandler");
                    f.block(
                        &format!(
                            "if err := {set}(ctx, {}, wf.{}); err != nil",
                            names.query_name(q.name()),
                            names.method(q.name())
                        ),
                        |f| cw_writeln!(f, "return {}", fail(output)),
                    )?;
                }

                for u in &w.options.update {
                    let u = service.update(&u.r#ref);
                    let handler_opts = f.qual(Pkg::Workflow, "UpdateHandlerOptions");
                    let set = f.qual(Pkg::Workflow, "SetUpdateHandlerWithOptions");
                    let method = names.method(u.name());
                    f.block("", |f| {
                        cw_writeln!(f, "opts := {handler_opts}{{}}")?;
                        if u.options.validate {
                            cw_writeln!(f, "opts.Validator = wf.Validate{method}")?;
                        }
                        f.block(
                            &format!(
                                "if err := {set}(ctx, {}, wf.{method}, opts); err != nil",
                                names.update_name(u.name())
                            ),
                            |f| cw_writeln!(f, "return {}", fail(output)),
                        )
                    })?;
                }

                let req = if w.method.input.is_some() { ", req" } else { "" };
                cw_writeln!(f, "return wf.Execute(ctx{req})")
            },
        )
    })?;
    f.blank_line()
}

/// The `SX` workflow interface.
pub fn workflow_interface(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let service = scope.service;
    let iface = names.workflow_interface(w.name());
    let qualified = scope.qualified(w.name());
    let wf_ctx = f.qual(Pkg::Workflow, "Context");

    doc(
        f,
        &format!("{iface} describes a(n) {qualified} workflow implementation"),
        w.method,
    )?;
    f.block(&format!("type {iface} interface"), |f| {
        cw_writeln!(f, "// Execute defines the entrypoint to a(n) {qualified} workflow")?;
        let params = input_param(f, w.method, "req");
        let returns = results(f, w.method.output.as_ref());
        cw_writeln!(f, "Execute(ctx {wf_ctx}{params}) {returns}")?;

        for q in &w.options.query {
            let q = service.query(&q.r#ref);
            f.blank_line()?;
            doc(
                f,
                &format!(
                    "{} implements a(n) {} query handler",
                    names.method(q.name()),
                    scope.qualified(q.name())
                ),
                q.method,
            )?;
            let params = match &q.method.input {
                Some(input) => format!("req {}", ptr(f, input)),
                None => String::new(),
            };
            let returns = results(f, q.method.output.as_ref());
            cw_writeln!(f, "{}({params}) {returns}", names.method(q.name()))?;
        }

        for u in &w.options.update {
            let u = service.update(&u.r#ref);
            let method = names.method(u.name());
            let qualified = scope.qualified(u.name());
            let params = input_param(f, u.method, "req");
            if u.options.validate {
                f.blank_line()?;
                cw_writeln!(f, "// Validate{method} validates a(n) {qualified} update")?;
                cw_writeln!(f, "Validate{method}(ctx {wf_ctx}{params}) error")?;
            }
            f.blank_line()?;
            doc(
                f,
                &format!("{method} implements a(n) {qualified} update handler"),
                u.method,
            )?;
            let returns = results(f, u.method.output.as_ref());
            cw_writeln!(f, "{method}(ctx {wf_ctx}{params}) {returns}")?;
        }
        Ok(())
    })?;
    f.blank_line()
}

/// The `SXInput` struct passed to workflow constructors.
pub fn input(scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let input = names.workflow_input(w.name());
    cw_writeln!(
        f,
        "// {input} describes the input to a(n) {} workflow constructor",
        scope.qualified(w.name())
    )?;
    f.block(&format!("type {input} struct"), |f| {
        f.writeln(&names.workflow_resources())?;
        if let Some(req) = &w.method.input {
            let ty = ptr(f, req);
            cw_writeln!(f, "Req {ty}")?;
        }
        for s in &w.options.signal {
            cw_writeln!(
                f,
                "{} *{}",
                names.method(&s.r#ref),
                names.signal_wrapper(&s.r#ref)
            )?;
        }
        Ok(())
    })?;
    f.blank_line()
}
