//! The test harness: a client implementation backed by the SDK's test
//! workflow environment, plus test run and update handle types.

use std::fmt;

use temporal_schema::{QueryOptions, SignalOptions, SignalRef, UpdateOptions, WorkflowOptions};

use super::client::{run_delegates, sig};
use super::{GoFile, Pkg, Scope, fail, input_arg, input_or_nil, ptr};
use crate::cw_writeln;
use crate::model::Entity;

/// The `STestClient` type and its constructor.
pub fn client(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let test_client = names.test_client();
    let env = f.qual(Pkg::Testsuite, "TestWorkflowEnvironment");

    cw_writeln!(
        f,
        "// {test_client} provides a(n) {} implementation backed by a test workflow environment",
        names.client_interface()
    )?;
    f.block(&format!("type {test_client} struct"), |f| {
        cw_writeln!(f, "env *{env}")?;
        cw_writeln!(f, "workflows {}", names.workflows_interface())
    })?;
    f.blank_line()?;
    cw_writeln!(
        f,
        "var _ {} = &{test_client}{{}}",
        names.client_interface()
    )?;
    f.blank_line()?;

    cw_writeln!(
        f,
        "// {} initializes a new {test_client} value",
        names.test_client_constructor()
    )?;
    f.block(
        &format!(
            "func {}(env *{env}, workflows {}) *{test_client}",
            names.test_client_constructor(),
            names.workflows_interface()
        ),
        |f| cw_writeln!(f, "return &{test_client}{{env, workflows}}"),
    )?;
    f.blank_line()
}

/// Client methods for one workflow on the test client.
pub fn workflow_methods(
    scope: &Scope<'_>,
    w: Entity<'_, WorkflowOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let test_client = names.test_client();
    let method = names.method(w.name());
    let output = w.method.output.as_ref();
    let req = input_arg(w.method, "req");
    let test_run = names.test_workflow_run(w.name());
    let helper = names.start_workflow_options(w.name());

    cw_writeln!(
        f,
        "// {method} executes a(n) {} workflow in the test environment",
        scope.qualified(w.name())
    )?;
    let line = sig::workflow(f, scope, w);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        cw_writeln!(f, "run, err := c.{method}Async(ctx{req}, opts...)")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return run.Get(ctx)")
    })?;
    f.blank_line()?;

    cw_writeln!(
        f,
        "// {method}Async executes a(n) {} workflow in the test environment",
        scope.qualified(w.name())
    )?;
    let line = sig::workflow_async(f, scope, w);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        let args = req.trim_start_matches(", ");
        let sep = if args.is_empty() { "" } else { ", " };
        cw_writeln!(f, "options, err := {helper}({args}{sep}opts...)")?;
        f.block("if err != nil", |f| f.writeln("return nil, err"))?;
        f.composite(&format!("return &{test_run}"), "}, nil", |f| {
            f.writeln("client: c,")?;
            f.writeln("env: c.env,")?;
            f.writeln("opts: options,")?;
            if w.method.input.is_some() {
                f.writeln("req: req,")?;
            }
            f.writeln("workflows: c.workflows,")
        })
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// Get{method} is not supported by the test client")?;
    let line = sig::workflow_get(f, scope, w);
    let new_error = f.qual(Pkg::Errors, "New");
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        cw_writeln!(
            f,
            "return nil, {new_error}(\"Get{method} is not supported in the test environment\")"
        )
    })?;
    f.blank_line()?;

    for s in w.options.signal.iter().filter(|s| s.start) {
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
    let test_client = names.test_client();
    let name = sig::with_signal_name(scope, w, s);
    let signal = scope.service.signal(&s.r#ref);
    let req = input_arg(w.method, "req");
    let sig_arg = input_arg(signal.method, "signal");
    let output = w.method.output.as_ref();

    cw_writeln!(
        f,
        "// {name} sends a(n) {} signal to a(n) {} workflow, starting it if necessary",
        scope.qualified(&s.r#ref),
        scope.qualified(w.name())
    )?;
    let line = sig::with_signal(f, scope, w, s);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        cw_writeln!(f, "run, err := c.{name}Async(ctx{req}{sig_arg}, opts...)")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return run.Get(ctx)")
    })?;
    f.blank_line()?;

    cw_writeln!(
        f,
        "// {name}Async sends a(n) {} signal to a(n) {} workflow, starting it if necessary",
        scope.qualified(&s.r#ref),
        scope.qualified(w.name())
    )?;
    let line = sig::with_signal_async(f, scope, w, s);
    let signal_const = names.signal_name(&s.r#ref);
    let value = input_or_nil(signal.method, "signal");
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        f.composite("c.env.RegisterDelayedCallback(func() ", "}, 0)", |f| {
            cw_writeln!(f, "c.env.SignalWorkflow({signal_const}, {value})")
        })?;
        cw_writeln!(
            f,
            "return c.{}Async(ctx{req}, opts...)",
            names.method(w.name())
        )
    })?;
    f.blank_line()
}

/// The query method on the test client.
pub fn query_method(scope: &Scope<'_>, q: Entity<'_, QueryOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let test_client = scope.names.test_client();
    let method = scope.names.method(q.name());
    let name_const = scope.names.query_name(q.name());
    let req = input_arg(q.method, "req");

    cw_writeln!(f, "// {method} executes a {} query", scope.qualified(q.name()))?;
    let line = sig::query(f, scope, q);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        match &q.method.output {
            Some(output) => {
                let ty = f.message(output);
                cw_writeln!(f, "val, err := c.env.QueryWorkflow({name_const}{req})")?;
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
                cw_writeln!(f, "var result {ty}")?;
                f.block("if err := val.Get(&result); err != nil", |f| {
                    f.writeln("return nil, err")
                })?;
                f.writeln("return &result, nil")
            }
            None => {
                cw_writeln!(f, "_, err := c.env.QueryWorkflow({name_const}{req})")?;
                f.writeln("return err")
            }
        }
    })?;
    f.blank_line()
}

/// The signal method on the test client.
pub fn signal_method(
    scope: &Scope<'_>,
    s: Entity<'_, SignalOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let test_client = scope.names.test_client();
    let method = scope.names.method(s.name());
    let value = input_or_nil(s.method, "signal");

    cw_writeln!(f, "// {method} executes a {} signal", scope.qualified(s.name()))?;
    let line = sig::signal(f, scope, s);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        cw_writeln!(
            f,
            "c.env.SignalWorkflow({}, {value})",
            scope.names.signal_name(s.name())
        )?;
        f.writeln("return nil")
    })?;
    f.blank_line()
}

/// `U`, `UAsync` and `GetU` on the test client.
pub fn update_methods(
    scope: &Scope<'_>,
    u: Entity<'_, UpdateOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let test_client = names.test_client();
    let method = names.method(u.name());
    let name_const = names.update_name(u.name());
    let test_handle = names.test_update_handle(u.name());
    let req = input_arg(u.method, "req");
    let output = u.method.output.as_ref();

    cw_writeln!(
        f,
        "// {method} executes a(n) {} update in the test environment",
        scope.qualified(u.name())
    )?;
    let line = sig::update(f, scope, u);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        cw_writeln!(f, "handle, err := c.{method}Async(ctx, workflowID, runID{req})")?;
        f.block("if err != nil", |f| cw_writeln!(f, "return {}", fail(output)))?;
        f.writeln("return handle.Get(ctx)")
    })?;
    f.blank_line()?;

    cw_writeln!(
        f,
        "// {method}Async executes a(n) {} update in the test environment",
        scope.qualified(u.name())
    )?;
    let line = sig::update_async(f, scope, u);
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        if u.options.id.is_empty() {
            let new_id = f.qual(Pkg::Uuid, "NewString");
            cw_writeln!(f, "updateID := {new_id}()")?;
        } else {
            let eval = f.qual(Pkg::Expression, "EvalExpression");
            let errorf = f.qual(Pkg::Fmt, "Errorf");
            cw_writeln!(
                f,
                "updateID, err := {eval}({}, req.ProtoReflect())",
                names.id_expression(u.name())
            )?;
            f.block("if err != nil", |f| {
                cw_writeln!(
                    f,
                    "return nil, {errorf}(\"error evaluating id expression for %q update: %w\", {name_const}, err)"
                )
            })?;
        }
        f.composite(&format!("uc := &{test_handle}"), "}", |f| {
            f.writeln("client: c,")?;
            f.writeln("runID: runID,")?;
            f.writeln("updateID: updateID,")?;
            f.writeln("workflowID: workflowID,")
        })?;
        cw_writeln!(f, "c.env.UpdateWorkflow({name_const}, updateID, uc{req})")?;
        f.writeln("return uc, nil")
    })?;
    f.blank_line()?;

    cw_writeln!(f, "// Get{method} is not supported by the test client")?;
    let line = sig::update_get(f, scope, u);
    let new_error = f.qual(Pkg::Errors, "New");
    f.block(&format!("func (c *{test_client}) {line}"), |f| {
        cw_writeln!(
            f,
            "return nil, {new_error}(\"Get{method} is not supported in the test environment\")"
        )
    })?;
    f.blank_line()
}

/// The `testSXRun` type.
pub fn run(scope: &Scope<'_>, w: Entity<'_, WorkflowOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let names = scope.names;
    let test_run = names.test_workflow_run(w.name());
    let env = f.qual(Pkg::Testsuite, "TestWorkflowEnvironment");
    let start_opts = f.qual(Pkg::Client, "StartWorkflowOptions");
    let new_error = f.qual(Pkg::Errors, "New");
    let recv = format!("r *{test_run}");

    cw_writeln!(
        f,
        "// {test_run} provides convenience methods for a(n) {} workflow in the test environment",
        w.name()
    )?;
    f.block(&format!("type {test_run} struct"), |f| {
        cw_writeln!(f, "client *{}", names.test_client())?;
        cw_writeln!(f, "env *{env}")?;
        cw_writeln!(f, "opts *{start_opts}")?;
        if let Some(input) = &w.method.input {
            let ty = ptr(f, input);
            cw_writeln!(f, "req {ty}")?;
        }
        cw_writeln!(f, "workflows {}", names.workflows_interface())
    })?;
    f.blank_line()?;
    cw_writeln!(
        f,
        "var _ {} = &{test_run}{{}}",
        names.workflow_run_interface(w.name())
    )?;
    f.blank_line()?;

    cw_writeln!(f, "// Get retrieves a test {} workflow result", scope.qualified(w.name()))?;
    let line = sig::run_get(f, w);
    let output = w.method.output.as_ref();
    f.block(&format!("func ({recv}) {line}"), |f| {
        let req = input_arg(w.method, "r.req");
        cw_writeln!(
            f,
            "r.env.ExecuteWorkflow({}(r.workflows.{}){req})",
            names.workflow_builder(w.name()),
            names.method(w.name())
        )?;
        f.block("if !r.env.IsWorkflowCompleted()", |f| {
            let value = if output.is_some() { "nil, " } else { "" };
            cw_writeln!(f, "return {value}{new_error}(\"workflow in progress\")")
        })?;
        f.block("if err := r.env.GetWorkflowError(); err != nil", |f| {
            cw_writeln!(f, "return {}", fail(output))
        })?;
        match output {
            Some(output) => {
                let ty = f.message(output);
                cw_writeln!(f, "var result {ty}")?;
                f.block("if err := r.env.GetWorkflowResult(&result); err != nil", |f| {
                    f.writeln("return nil, err")
                })?;
                f.writeln("return &result, nil")
            }
            None => f.writeln("return nil"),
        }
    })?;
    f.blank_line()?;

    f.writeln("// ID returns a test workflow ID")?;
    f.block(&format!("func ({recv}) ID() string"), |f| {
        f.writeln("return r.opts.ID")
    })?;
    f.blank_line()?;
    f.writeln("// RunID returns an empty run ID in the test environment")?;
    f.block(&format!("func ({recv}) RunID() string"), |f| {
        f.writeln("return \"\"")
    })?;
    run_delegates(scope, w, &recv, f)?;
    f.blank_line()
}

/// The `testSXHandle` type, which also receives the test environment's
/// update callbacks.
pub fn update_handle(
    scope: &Scope<'_>,
    u: Entity<'_, UpdateOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let names = scope.names;
    let test_handle = names.test_update_handle(u.name());
    let recv = format!("h *{test_handle}");
    let output = u.method.output.as_ref();

    cw_writeln!(
        f,
        "// {test_handle} provides a(n) {} implementation for the test environment",
        names.update_handle_interface(u.name())
    )?;
    f.block(&format!("type {test_handle} struct"), |f| {
        cw_writeln!(f, "client *{}", names.test_client())?;
        f.writeln("err error")?;
        if let Some(output) = output {
            let ty = ptr(f, output);
            cw_writeln!(f, "resp {ty}")?;
        }
        f.writeln("runID string")?;
        f.writeln("updateID string")?;
        f.writeln("workflowID string")
    })?;
    f.blank_line()?;
    cw_writeln!(
        f,
        "var _ {} = &{test_handle}{{}}",
        names.update_handle_interface(u.name())
    )?;
    f.blank_line()?;

    f.writeln("// Accept implements a test environment update callback")?;
    f.block(&format!("func ({recv}) Accept()"), |_| Ok(()))?;
    f.blank_line()?;
    f.writeln("// Reject implements a test environment update callback")?;
    f.block(&format!("func ({recv}) Reject(err error)"), |f| {
        f.writeln("h.err = err")
    })?;
    f.blank_line()?;
    f.writeln("// Complete implements a test environment update callback")?;
    match output {
        Some(output) => {
            let ty = ptr(f, output);
            let errorf = f.qual(Pkg::Fmt, "Errorf");
            let name_const = names.update_name(u.name());
            f.block(&format!("func ({recv}) Complete(success any, err error)"), |f| {
                f.block("if err != nil", |f| {
                    f.writeln("h.err = err")?;
                    f.writeln("return")
                })?;
                cw_writeln!(f, "result, ok := success.({ty})")?;
                f.block("if !ok", |f| {
                    cw_writeln!(
                        f,
                        "h.err = {errorf}(\"unexpected %q update result type: %T\", {name_const}, success)"
                    )?;
                    f.writeln("return")
                })?;
                f.writeln("h.resp = result")
            })?;
        }
        None => {
            f.block(&format!("func ({recv}) Complete(_ any, err error)"), |f| {
                f.writeln("h.err = err")
            })?;
        }
    }
    f.blank_line()?;

    f.writeln("// Get returns the update result")?;
    let line = sig::handle_get(f, u);
    f.block(&format!("func ({recv}) {line}"), |f| {
        if output.is_some() {
            f.writeln("return h.resp, h.err")
        } else {
            f.writeln("return h.err")
        }
    })?;
    f.blank_line()?;

    for (method, field) in [
        ("RunID", "runID"),
        ("UpdateID", "updateID"),
        ("WorkflowID", "workflowID"),
    ] {
        cw_writeln!(f, "// {method} implementation")?;
        f.block(&format!("func ({recv}) {method}() string"), |f| {
            cw_writeln!(f, "return h.{field}")
        })?;
        f.blank_line()?;
    }
    Ok(())
}
