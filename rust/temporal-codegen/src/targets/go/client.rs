//! The client surface: client interface and implementation, run handles and
//! update handles.
//!
//! Method signatures live in [`sig`] because the test client and test run
//! types implement the same interfaces.

use std::fmt;

use temporal_schema::{QueryOptions, SignalOptions, SignalRef, UpdateOptions, WorkflowOptions};

use super::options::{WorkflowTarget, workflow_defaults};
use super::{GoFile, Pkg, Scope, decode_result, doc, fail, input_arg, input_or_nil, input_param};
use crate::cw_writeln;
use crate::model::Entity;

/// Signatures shared by the client and test harness emitters.
pub(crate) mod sig {
    use temporal_schema::{QueryOptions, SignalOptions, SignalRef, UpdateOptions, WorkflowOptions};

    use super::super::{GoFile, Pkg, Scope, handle_results, input_param, results};
    use crate::model::Entity;

    fn start_opts(f: &GoFile<'_>) -> String {
        format!(", opts ...*{}", f.qual(Pkg::Client, "StartWorkflowOptions"))
    }

    fn ctx(f: &GoFile<'_>) -> String {
        format!("ctx {}", f.qual(Pkg::Context, "Context"))
    }

    pub fn workflow(f: &GoFile<'_>, scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>) -> String {
        format!(
            "{}({}{}{}) {}",
            scope.names.method(w.name()),
            ctx(f),
            input_param(f, w.method, "req"),
            start_opts(f),
            results(f, w.method.output.as_ref())
        )
    }

    pub fn workflow_async(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        w: Entity<'_, WorkflowOptions>,
    ) -> String {
        format!(
            "{}Async({}{}{}) {}",
            scope.names.method(w.name()),
            ctx(f),
            input_param(f, w.method, "req"),
            start_opts(f),
            handle_results(&scope.names.workflow_run_interface(w.name()))
        )
    }

    pub fn workflow_get(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        w: Entity<'_, WorkflowOptions>,
    ) -> String {
        format!(
            "Get{}({}, workflowID string, runID string) {}",
            scope.names.method(w.name()),
            ctx(f),
            handle_results(&scope.names.workflow_run_interface(w.name()))
        )
    }

    pub fn with_signal_name(scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>, s: &SignalRef) -> String {
        format!(
            "{}With{}",
            scope.names.method(w.name()),
            scope.names.method(&s.r#ref)
        )
    }

    fn with_signal_params(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        w: Entity<'_, WorkflowOptions>,
        s: &SignalRef,
    ) -> String {
        let signal = scope.service.signal(&s.r#ref);
        format!(
            "{}{}{}{}",
            ctx(f),
            input_param(f, w.method, "req"),
            input_param(f, signal.method, "signal"),
            start_opts(f)
        )
    }

    pub fn with_signal(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        w: Entity<'_, WorkflowOptions>,
        s: &SignalRef,
    ) -> String {
        format!(
            "{}({}) {}",
            with_signal_name(scope, w, s),
            with_signal_params(f, scope, w, s),
            results(f, w.method.output.as_ref())
        )
    }

    pub fn with_signal_async(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        w: Entity<'_, WorkflowOptions>,
        s: &SignalRef,
    ) -> String {
        format!(
            "{}Async({}) {}",
            with_signal_name(scope, w, s),
            with_signal_params(f, scope, w, s),
            handle_results(&scope.names.workflow_run_interface(w.name()))
        )
    }

    pub fn query(f: &GoFile<'_>, scope: &Scope<'_>, q: Entity<'_, QueryOptions>) -> String {
        format!(
            "{}({}, workflowID string, runID string{}) {}",
            scope.names.method(q.name()),
            ctx(f),
            input_param(f, q.method, "req"),
            results(f, q.method.output.as_ref())
        )
    }

    pub fn signal(f: &GoFile<'_>, scope: &Scope<'_>, s: Entity<'_, SignalOptions>) -> String {
        format!(
            "{}({}, workflowID string, runID string{}) error",
            scope.names.method(s.name()),
            ctx(f),
            input_param(f, s.method, "signal")
        )
    }

    pub fn update(f: &GoFile<'_>, scope: &Scope<'_>, u: Entity<'_, UpdateOptions>) -> String {
        format!(
            "{}({}, workflowID string, runID string{}) {}",
            scope.names.method(u.name()),
            ctx(f),
            input_param(f, u.method, "req"),
            results(f, u.method.output.as_ref())
        )
    }

    pub fn update_async(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        u: Entity<'_, UpdateOptions>,
    ) -> String {
        format!(
            "{}Async({}, workflowID string, runID string{}) {}",
            scope.names.method(u.name()),
            ctx(f),
            input_param(f, u.method, "req"),
            handle_results(&scope.names.update_handle_interface(u.name()))
        )
    }

    pub fn update_get(f: &GoFile<'_>, scope: &Scope<'_>, u: Entity<'_, UpdateOptions>) -> String {
        format!(
            "Get{}({}, workflowID string, runID string, updateID string) {}",
            scope.names.method(u.name()),
            ctx(f),
            handle_results(&scope.names.update_handle_interface(u.name()))
        )
    }

    // Run handle methods.

    pub fn run_get(f: &GoFile<'_>, w: Entity<'_, WorkflowOptions>) -> String {
        format!("Get({}) {}", ctx(f), results(f, w.method.output.as_ref()))
    }

    pub fn run_query(f: &GoFile<'_>, scope: &Scope<'_>, q: Entity<'_, QueryOptions>) -> String {
        format!(
            "{}({}{}) {}",
            scope.names.method(q.name()),
            ctx(f),
            input_param(f, q.method, "req"),
            results(f, q.method.output.as_ref())
        )
    }

    pub fn run_signal(f: &GoFile<'_>, scope: &Scope<'_>, s: Entity<'_, SignalOptions>) -> String {
        format!(
            "{}({}{}) error",
            scope.names.method(s.name()),
            ctx(f),
            input_param(f, s.method, "signal")
        )
    }

    pub fn run_update(f: &GoFile<'_>, scope: &Scope<'_>, u: Entity<'_, UpdateOptions>) -> String {
        format!(
            "{}({}{}) {}",
            scope.names.method(u.name()),
            ctx(f),
            input_param(f, u.method, "req"),
            results(f, u.method.output.as_ref())
        )
    }

    pub fn run_update_async(
        f: &GoFile<'_>,
        scope: &Scope<'_>,
        u: Entity<'_, UpdateOptions>,
    ) -> String {
        format!(
            "{}Async({}{}) {}",
            scope.names.method(u.name()),
            ctx(f),
            input_param(f, u.method, "req"),
            handle_results(&scope.names.update_handle_interface(u.name()))
        )
    }

    pub fn handle_get(f: &GoFile<'_>, u: Entity<'_, UpdateOptions>) -> String {
        format!("Get({}) {}", ctx(f), results(f, u.method.output.as_ref()))
    }
}

fn start_signals(w: Entity<'_, WorkflowOptions>) -> impl Iterator<Item = &SignalRef> {
    w.options.signal.iter().filter(|s| s.start)
}

/// The `SClient` interface.
pub fn interface(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let service = scope.service;
    let full_name = service.full_name();
    cw_writeln!(
        f,
        "// {} describes a client for a(n) {full_name} worker",
        scope.names.client_interface()
    )?;
    f.block(
        &format!("type {} interface", scope.names.client_interface()),
        |f| {
            let mut first = true;
            let mut gap = |f: &mut GoFile<'_>| {
                if first {
                    first = false;
                    Ok(())
                } else {
                    f.blank_line()
                }
            };

            for w in service.workflows() {
                let method = scope.names.method(w.name());
                let qualified = scope.qualified(w.name());
                gap(f)?;
                doc(
                    f,
                    &format!("{method} executes a(n) {qualified} workflow and blocks until error or response is received"),
                    w.method,
                )?;
                let line = sig::workflow(f, scope, w);
                f.writeln(&line)?;
                f.blank_line()?;
                cw_writeln!(f, "// {method}Async starts a(n) {qualified} workflow and returns a handle to the workflow run")?;
                let line = sig::workflow_async(f, scope, w);
                f.writeln(&line)?;
                f.blank_line()?;
                cw_writeln!(f, "// Get{method} retrieves a handle to an existing {qualified} workflow execution")?;
                let line = sig::workflow_get(f, scope, w);
                f.writeln(&line)?;
                for s in start_signals(w) {
                    let name = sig::with_signal_name(scope, w, s);
                    let signal = scope.qualified(&s.r#ref);
                    f.blank_line()?;
                    cw_writeln!(f, "// {name} sends a(n) {signal} signal to a(n) {qualified} workflow, starting it if necessary, and blocks until the workflow completes")?;
                    let line = sig::with_signal(f, scope, w, s);
                    f.writeln(&line)?;
                    f.blank_line()?;
                    cw_writeln!(f, "// {name}Async sends a(n) {signal} signal to a(n) {qualified} workflow, starting it if necessary, and returns a handle to the workflow run")?;
                    let line = sig::with_signal_async(f, scope, w, s);
                    f.writeln(&line)?;
                }
            }

            for q in service.queries() {
                gap(f)?;
                doc(
                    f,
                    &format!(
                        "{} sends a(n) {} query to an existing workflow",
                        scope.names.method(q.name()),
                        scope.qualified(q.name())
                    ),
                    q.method,
                )?;
                let line = sig::query(f, scope, q);
                f.writeln(&line)?;
            }

            for s in service.signals() {
                gap(f)?;
                doc(
                    f,
                    &format!(
                        "{} sends a(n) {} signal to an existing workflow",
                        scope.names.method(s.name()),
                        scope.qualified(s.name())
                    ),
                    s.method,
                )?;
                let line = sig::signal(f, scope, s);
                f.writeln(&line)?;
            }

            for u in service.updates() {
                let method = scope.names.method(u.name());
                let qualified = scope.qualified(u.name());
                gap(f)?;
                doc(
                    f,
                    &format!("{method} sends a(n) {qualified} update to an existing workflow and blocks until it completes"),
                    u.method,
                )?;
                let line = sig::update(f, scope, u);
                f.writeln(&line)?;
                f.blank_line()?;
                cw_writeln!(f, "// {method}Async sends a(n) {qualified} update to an existing workflow and returns once it is accepted")?;
                let line = sig::update_async(f, scope, u);
                f.writeln(&line)?;
                f.blank_line()?;
                cw_writeln!(f, "// Get{method} retrieves a handle to an existing {qualified} update")?;
                let line = sig::update_get(f, scope, u);
                f.writeln(&line)?;
            }
            Ok(())
        },
    )?;
    f.blank_line()
}

/// The client struct, its constructor and the per-workflow start option builders.
pub fn implementation(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let full_name = scope.service.full_name();
    let iface = names.client_interface();
    let imp = names.client_impl();
    let sdk_client = f.qual(Pkg::Client, "Client");

    cw_writeln!(f, "// {imp} implements a temporal client for a {full_name} service")?;
    f.block(&format!("type {imp} struct"), |f| {
        cw_writeln!(f, "client {sdk_client}")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// {} initializes a new {full_name} client", names.client_constructor())?;
    f.block(
        &format!("func {}(c {sdk_client}) {iface}", names.client_constructor()),
        |f| cw_writeln!(f, "return &{imp}{{client: c}}"),
    )?;
    f.blank_line()?;

    for w in scope.service.workflows() {
        start_options(scope, w, f)?;
    }
    Ok(())
}

fn start_options(scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let helper = scope.names.start_workflow_options(w.name());
    let opts_ty = f.qual(Pkg::Client, "StartWorkflowOptions");
    cw_writeln!(
        f,
        "// {helper} fills unset start options for a(n) {} workflow",
        scope.qualified(w.name())
    )?;
    let params = input_param(f, w.method, "req");
    let params = params.trim_start_matches(", ");
    let sep = if params.is_empty() { "" } else { ", " };
    f.block(
        &format!("func {helper}({params}{sep}opts ...*{opts_ty}) (*{opts_ty}, error)"),
        |f| {
            cw_writeln!(f, "options := {opts_ty}{{}}")?;
            f.block("if len(opts) > 0 && opts[0] != nil", |f| {
                f.writeln("options = *opts[0]")
            })?;
            workflow_defaults(f, scope, w, WorkflowTarget::Start, "options", "nil")?;
            f.writeln("return &options, nil")
        },
    )?;
    f.blank_line()
}

/// `W`, `WAsync`, `GetW` and the signal-with-start variants on the client struct.
pub fn workflow_methods(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let imp = names.client_impl();
    let method = names.method(w.name());
    let qualified = scope.qualified(w.name());
    let run_impl = names.workflow_run_impl(w.name());
    let output = w.method.output.as_ref();
    let req = input_arg(w.method, "req");

    cw_writeln!(f, "// {method} executes a(n) {qualified} workflow and blocks until error or response is received")?;
    let line = sig::workflow(f, scope, w);
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        cw_writeln!(f, "run, err := c.{method}Async(ctx{req}, opts...)")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return run.Get(ctx)")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// {method}Async starts a(n) {qualified} workflow and returns a handle to the workflow run")?;
    let line = sig::workflow_async(f, scope, w);
    let helper = names.start_workflow_options(w.name());
    let name_const = names.workflow_name(w.name());
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        let args = input_arg(w.method, "req");
        let args = args.trim_start_matches(", ");
        let sep = if args.is_empty() { "" } else { ", " };
        cw_writeln!(f, "options, err := {helper}({args}{sep}opts...)")?;
        f.block("if err != nil", |f| f.writeln("return nil, err"))?;
        cw_writeln!(
            f,
            "run, err := c.client.ExecuteWorkflow(ctx, *options, {name_const}{req})"
        )?;
        f.block("if err != nil", |f| f.writeln("return nil, err"))?;
        cw_writeln!(f, "return &{run_impl}{{client: c, run: run}}, nil")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// Get{method} retrieves a handle to an existing {qualified} workflow execution")?;
    let line = sig::workflow_get(f, scope, w);
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        cw_writeln!(
            f,
            "return &{run_impl}{{client: c, run: c.client.GetWorkflow(ctx, workflowID, runID)}}, nil"
        )
    })?;
    f.blank_line()?;

    for s in start_signals(w) {
        with_signal_methods(scope, w, s, f)?;
    }
    Ok(())
}

fn with_signal_methods(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    s: &SignalRef,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let imp = names.client_impl();
    let name = sig::with_signal_name(scope, w, s);
    let qualified = scope.qualified(w.name());
    let signal_qualified = scope.qualified(&s.r#ref);
    let signal = scope.service.signal(&s.r#ref);
    let req = input_arg(w.method, "req");
    let sig_arg = input_arg(signal.method, "signal");
    let output = w.method.output.as_ref();

    cw_writeln!(f, "// {name} sends a(n) {signal_qualified} signal to a(n) {qualified} workflow, starting it if necessary, and blocks until the workflow completes")?;
    let line = sig::with_signal(f, scope, w, s);
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        cw_writeln!(f, "run, err := c.{name}Async(ctx{req}{sig_arg}, opts...)")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return run.Get(ctx)")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// {name}Async sends a(n) {signal_qualified} signal to a(n) {qualified} workflow, starting it if necessary, and returns a handle to the workflow run")?;
    let line = sig::with_signal_async(f, scope, w, s);
    let helper = names.start_workflow_options(w.name());
    let run_impl = names.workflow_run_impl(w.name());
    let workflow_const = names.workflow_name(w.name());
    let signal_const = names.signal_name(&s.r#ref);
    let signal_value = input_or_nil(signal.method, "signal");
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        let args = req.trim_start_matches(", ");
        let sep = if args.is_empty() { "" } else { ", " };
        cw_writeln!(f, "options, err := {helper}({args}{sep}opts...)")?;
        f.block("if err != nil", |f| f.writeln("return nil, err"))?;
        if w.options.id.is_empty() {
            let new_id = f.qual(Pkg::Uuid, "NewString");
            f.block("if options.ID == \"\"", |f| {
                cw_writeln!(f, "options.ID = {new_id}()")
            })?;
        }
        cw_writeln!(
            f,
            "run, err := c.client.SignalWithStartWorkflow(ctx, options.ID, {signal_const}, {signal_value}, *options, {workflow_const}{req})"
        )?;
        f.block("if err != nil", |f| f.writeln("return nil, err"))?;
        cw_writeln!(f, "return &{run_impl}{{client: c, run: run}}, nil")
    })?;
    f.blank_line()
}

/// The query method on the client struct.
pub fn query_method(scope: &Scope<'_>, q: Entity<'_, QueryOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let imp = scope.names.client_impl();
    let method = scope.names.method(q.name());
    let name_const = scope.names.query_name(q.name());
    let req = input_arg(q.method, "req");

    cw_writeln!(
        f,
        "// {method} sends a(n) {} query to an existing workflow",
        scope.qualified(q.name())
    )?;
    let line = sig::query(f, scope, q);
    f.block(&format!("func (c *{imp}) {line}"), |f| match &q.method.output {
        Some(output) => {
            let ty = f.message(output);
            cw_writeln!(
                f,
                "val, err := c.client.QueryWorkflow(ctx, workflowID, runID, {name_const}{req})"
            )?;
            f.writeln("if err != nil {")?;
            {
                let _indent = f.indent();
                f.writeln("return nil, err")?;
            }
            f.writeln("} else if !val.HasValue() {")?;
            {
                let _indent = f.indent();
                f.writeln("return nil, nil")?;
            }
            f.writeln("}")?;
            cw_writeln!(f, "var resp {ty}")?;
            f.block("if err := val.Get(&resp); err != nil", |f| {
                f.writeln("return nil, err")
            })?;
            f.writeln("return &resp, nil")
        }
        None => {
            cw_writeln!(
                f,
                "_, err := c.client.QueryWorkflow(ctx, workflowID, runID, {name_const}{req})"
            )?;
            f.writeln("return err")
        }
    })?;
    f.blank_line()
}

/// The signal method on the client struct.
pub fn signal_method(
    scope: &Scope<'_>,
    s: Entity<'_, SignalOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let imp = scope.names.client_impl();
    let method = scope.names.method(s.name());
    let name_const = scope.names.signal_name(s.name());
    let value = input_or_nil(s.method, "signal");

    cw_writeln!(
        f,
        "// {method} sends a(n) {} signal to an existing workflow",
        scope.qualified(s.name())
    )?;
    let line = sig::signal(f, scope, s);
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        cw_writeln!(
            f,
            "return c.client.SignalWorkflow(ctx, workflowID, runID, {name_const}, {value})"
        )
    })?;
    f.blank_line()
}

/// `U`, `UAsync` and `GetU` on the client struct.
pub fn update_methods(
    scope: &Scope<'_>,
    u: Entity<'_, UpdateOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let imp = names.client_impl();
    let method = names.method(u.name());
    let qualified = scope.qualified(u.name());
    let handle_impl = names.update_handle_impl(u.name());
    let name_const = names.update_name(u.name());
    let req = input_arg(u.method, "req");
    let output = u.method.output.as_ref();

    cw_writeln!(f, "// {method} sends a(n) {qualified} update to an existing workflow and blocks until it completes")?;
    let line = sig::update(f, scope, u);
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        cw_writeln!(f, "handle, err := c.{method}Async(ctx, workflowID, runID{req})")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return handle.Get(ctx)")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// {method}Async sends a(n) {qualified} update to an existing workflow and returns once it is accepted")?;
    let line = sig::update_async(f, scope, u);
    let update_opts = f.qual(Pkg::Client, "UpdateWorkflowOptions");
    let accepted = f.qual(Pkg::Client, "WorkflowUpdateStageAccepted");
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        f.composite(&format!("options := {update_opts}"), "}", |f| {
            f.writeln("WorkflowID: workflowID,")?;
            f.writeln("RunID: runID,")?;
            cw_writeln!(f, "UpdateName: {name_const},")?;
            if u.method.input.is_some() {
                f.writeln("Args: []any{req},")?;
            }
            cw_writeln!(f, "WaitForStage: {accepted},")
        })?;
        if !u.options.id.is_empty() {
            let eval = f.qual(Pkg::Expression, "EvalExpression");
            let errorf = f.qual(Pkg::Fmt, "Errorf");
            let expr = names.id_expression(u.name());
            cw_writeln!(f, "id, err := {eval}({expr}, req.ProtoReflect())")?;
            f.block("if err != nil", |f| {
                cw_writeln!(
                    f,
                    "return nil, {errorf}(\"error evaluating id expression for %q update: %w\", {name_const}, err)"
                )
            })?;
            f.writeln("options.UpdateID = id")?;
        }
        f.writeln("handle, err := c.client.UpdateWorkflow(ctx, options)")?;
        f.block("if err != nil", |f| f.writeln("return nil, err"))?;
        cw_writeln!(f, "return &{handle_impl}{{client: c, handle: handle}}, nil")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// Get{method} retrieves a handle to an existing {qualified} update")?;
    let line = sig::update_get(f, scope, u);
    let get_opts = f.qual(Pkg::Client, "GetWorkflowUpdateHandleOptions");
    f.block(&format!("func (c *{imp}) {line}"), |f| {
        f.composite(
            &format!("handle := c.client.GetWorkflowUpdateHandle({get_opts}"),
            "})",
            |f| {
                f.writeln("WorkflowID: workflowID,")?;
                f.writeln("RunID: runID,")?;
                f.writeln("UpdateID: updateID,")
            },
        )?;
        cw_writeln!(f, "return &{handle_impl}{{client: c, handle: handle}}, nil")
    })?;
    f.blank_line()
}

/// Methods every run handle shares, written into an interface body.
fn run_interface_methods(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    f.writeln("// ID returns the workflow ID")?;
    f.writeln("ID() string")?;
    f.blank_line()?;
    f.writeln("// RunID returns the workflow instance ID")?;
    f.writeln("RunID() string")?;
    f.blank_line()?;
    f.writeln("// Get blocks until the workflow is complete and returns the result")?;
    let line = sig::run_get(f, w);
    f.writeln(&line)?;

    for q in &w.options.query {
        let q = scope.service.query(&q.r#ref);
        f.blank_line()?;
        cw_writeln!(
            f,
            "// {} executes a(n) {} query",
            scope.names.method(q.name()),
            scope.qualified(q.name())
        )?;
        let line = sig::run_query(f, scope, q);
        f.writeln(&line)?;
    }
    for s in &w.options.signal {
        let s = scope.service.signal(&s.r#ref);
        f.blank_line()?;
        cw_writeln!(
            f,
            "// {} sends a(n) {} signal",
            scope.names.method(s.name()),
            scope.qualified(s.name())
        )?;
        let line = sig::run_signal(f, scope, s);
        f.writeln(&line)?;
    }
    for u in &w.options.update {
        let u = scope.service.update(&u.r#ref);
        let method = scope.names.method(u.name());
        let qualified = scope.qualified(u.name());
        f.blank_line()?;
        cw_writeln!(f, "// {method} updates a(n) {qualified} workflow and blocks until it completes")?;
        let line = sig::run_update(f, scope, u);
        f.writeln(&line)?;
        f.blank_line()?;
        cw_writeln!(f, "// {method}Async updates a(n) {qualified} workflow and returns once the update is accepted")?;
        let line = sig::run_update_async(f, scope, u);
        f.writeln(&line)?;
    }
    Ok(())
}

/// Delegating run methods shared by the SDK-backed and test run types.
///
/// `recv` is the receiver clause, e.g. `r *exampleTransferRun`.
pub(crate) fn run_delegates(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    recv: &str,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    for q in &w.options.query {
        let q = scope.service.query(&q.r#ref);
        let method = scope.names.method(q.name());
        let req = input_arg(q.method, "req");
        f.blank_line()?;
        cw_writeln!(f, "// {method} executes a(n) {} query", scope.qualified(q.name()))?;
        let line = sig::run_query(f, scope, q);
        f.block(&format!("func ({recv}) {line}"), |f| {
            cw_writeln!(f, "return r.client.{method}(ctx, r.ID(), \"\"{req})")
        })?;
    }
    for s in &w.options.signal {
        let s = scope.service.signal(&s.r#ref);
        let method = scope.names.method(s.name());
        let arg = input_arg(s.method, "signal");
        f.blank_line()?;
        cw_writeln!(f, "// {method} sends a(n) {} signal", scope.qualified(s.name()))?;
        let line = sig::run_signal(f, scope, s);
        f.block(&format!("func ({recv}) {line}"), |f| {
            cw_writeln!(f, "return r.client.{method}(ctx, r.ID(), \"\"{arg})")
        })?;
    }
    for u in &w.options.update {
        let u = scope.service.update(&u.r#ref);
        let method = scope.names.method(u.name());
        let qualified = scope.qualified(u.name());
        let req = input_arg(u.method, "req");
        f.blank_line()?;
        cw_writeln!(f, "// {method} updates a(n) {qualified} workflow and blocks until it completes")?;
        let line = sig::run_update(f, scope, u);
        f.block(&format!("func ({recv}) {line}"), |f| {
            cw_writeln!(f, "return r.client.{method}(ctx, r.ID(), \"\"{req})")
        })?;
        f.blank_line()?;
        cw_writeln!(f, "// {method}Async updates a(n) {qualified} workflow and returns once the update is accepted")?;
        let line = sig::run_update_async(f, scope, u);
        f.block(&format!("func ({recv}) {line}"), |f| {
            cw_writeln!(f, "return r.client.{method}Async(ctx, r.ID(), \"\"{req})")
        })?;
    }
    Ok(())
}

/// The run handle interface and its SDK-backed implementation.
pub fn run_handle(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let iface = names.workflow_run_interface(w.name());
    let imp = names.workflow_run_impl(w.name());
    let qualified = scope.qualified(w.name());
    let run_ty = f.qual(Pkg::Client, "WorkflowRun");

    cw_writeln!(f, "// {iface} describes a(n) {qualified} workflow run")?;
    f.block(&format!("type {iface} interface"), |f| {
        run_interface_methods(scope, w, f)
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// {imp} provides an {iface} implementation")?;
    f.block(&format!("type {imp} struct"), |f| {
        cw_writeln!(f, "client *{}", names.client_impl())?;
        cw_writeln!(f, "run {run_ty}")
    })?;
    f.blank_line()?;

    let recv = format!("r *{imp}");
    f.writeln("// ID returns the workflow ID")?;
    f.block(&format!("func ({recv}) ID() string"), |f| {
        f.writeln("return r.run.GetID()")
    })?;
    f.blank_line()?;
    f.writeln("// RunID returns the workflow instance ID")?;
    f.block(&format!("func ({recv}) RunID() string"), |f| {
        f.writeln("return r.run.GetRunID()")
    })?;
    f.blank_line()?;
    f.writeln("// Get blocks until the workflow is complete and returns the result")?;
    let line = sig::run_get(f, w);
    let output = w.method.output.clone();
    f.block(&format!("func ({recv}) {line}"), |f| {
        decode_result(f, output.as_ref(), "r.run.Get(ctx, ")
    })?;
    run_delegates(scope, w, &recv, f)?;
    f.blank_line()
}

/// The update handle interface and its SDK-backed implementation.
pub fn update_handle(
    scope: &Scope<'_>,
    u: Entity<'_, UpdateOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let iface = names.update_handle_interface(u.name());
    let imp = names.update_handle_impl(u.name());
    let handle_ty = f.qual(Pkg::Client, "WorkflowUpdateHandle");

    cw_writeln!(
        f,
        "// {iface} describes a(n) {} update",
        scope.qualified(u.name())
    )?;
    f.block(&format!("type {iface} interface"), |f| {
        f.writeln("// WorkflowID returns the workflow ID")?;
        f.writeln("WorkflowID() string")?;
        f.blank_line()?;
        f.writeln("// RunID returns the workflow instance ID")?;
        f.writeln("RunID() string")?;
        f.blank_line()?;
        f.writeln("// UpdateID returns the update ID")?;
        f.writeln("UpdateID() string")?;
        f.blank_line()?;
        f.writeln("// Get blocks until the update completes and returns the result")?;
        let line = sig::handle_get(f, u);
        f.writeln(&line)
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// {imp} provides an {iface} implementation")?;
    f.block(&format!("type {imp} struct"), |f| {
        cw_writeln!(f, "client *{}", names.client_impl())?;
        cw_writeln!(f, "handle {handle_ty}")
    })?;
    f.blank_line()?;

    let recv = format!("h *{imp}");
    for (method, call) in [
        ("WorkflowID", "WorkflowID"),
        ("RunID", "RunID"),
        ("UpdateID", "UpdateID"),
    ] {
        cw_writeln!(f, "// {method} returns the {} ID", id_subject(method))?;
        f.block(&format!("func ({recv}) {method}() string"), |f| {
            cw_writeln!(f, "return h.handle.{call}()")
        })?;
        f.blank_line()?;
    }

    f.writeln("// Get blocks until the update completes and returns the result")?;
    let line = sig::handle_get(f, u);
    let output = u.method.output.clone();
    f.block(&format!("func ({recv}) {line}"), |f| {
        decode_result(f, output.as_ref(), "h.handle.Get(ctx, ")
    })?;
    f.blank_line()
}

fn id_subject(method: &str) -> &'static str {
    match method {
        "WorkflowID" => "workflow",
        "RunID" => "workflow instance",
        _ => "update",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;
    use crate::model::{Features, Service};
    use temporal_schema::{MessageRef, MethodDescriptor, ServiceDescriptor, SignalRef};

    fn service() -> Service {
        let descriptor = ServiceDescriptor::new("example.v1", "Example")
            .with_method(
                MethodDescriptor::new("Transfer")
                    .with_input(MessageRef::local("example.v1.TransferRequest"))
                    .with_output(MessageRef::local("example.v1.TransferResponse"))
                    .with_workflow(WorkflowOptions {
                        signal: vec![SignalRef {
                            r#ref: "LeaseAcquired".to_string(),
                            start: true,
                        }],
                        ..Default::default()
                    }),
            )
            .with_method(
                MethodDescriptor::new("LeaseAcquired")
                    .with_signal(SignalOptions::default()),
            );
        Service::build(&descriptor, Features::default()).unwrap()
    }

    #[test]
    fn signal_without_input_passes_nil() {
        let service = service();
        let defaults = Defaults::default();
        let scope = Scope::new(&service, &defaults);
        let vocabulary = Default::default();
        let mut f = GoFile::new(&vocabulary);
        signal_method(&scope, service.signal("LeaseAcquired"), &mut f).unwrap();
        let body = f.finish().unwrap().body;
        assert!(body.contains(
            "func (c *exampleClient) LeaseAcquired(ctx context.Context, workflowID string, runID string) error {"
        ));
        assert!(body.contains(
            "return c.client.SignalWorkflow(ctx, workflowID, runID, ExampleLeaseAcquiredSignalName, nil)"
        ));
    }

    #[test]
    fn signal_with_start_falls_back_to_random_id() {
        let service = service();
        let defaults = Defaults::default();
        let scope = Scope::new(&service, &defaults);
        let vocabulary = Default::default();
        let mut f = GoFile::new(&vocabulary);
        let workflow = service.workflows().next().unwrap();
        workflow_methods(&scope, workflow, &mut f).unwrap();
        let unit = f.finish().unwrap();
        assert!(unit.body.contains("options.ID = uuid.NewString()"));
        assert!(unit.body.contains(
            "run, err := c.client.SignalWithStartWorkflow(ctx, options.ID, ExampleLeaseAcquiredSignalName, nil, *options, ExampleTransferWorkflowName, req)"
        ));
        assert!(unit.imports.contains_key("github.com/google/uuid"));
    }
}
