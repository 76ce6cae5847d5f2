//! Signal channel wrappers and external signal helpers.

use std::fmt;

use temporal_schema::SignalOptions;

use super::{GoFile, Pkg, Scope, input_or_nil, input_param};
use crate::cw_writeln;
use crate::model::Entity;

/// The `SXSignal` wrapper type with `Receive`, `ReceiveAsync` and `Select`.
pub fn wrapper(scope: &Scope<'_>, s: Entity<'_, SignalOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let wrapper = scope.names.signal_wrapper(s.name());
    let qualified = scope.qualified(s.name());
    let channel = f.qual(Pkg::Workflow, "ReceiveChannel");
    let wf_ctx = f.qual(Pkg::Workflow, "Context");
    let selector = f.qual(Pkg::Workflow, "Selector");
    let recv = format!("s *{wrapper}");

    cw_writeln!(f, "// {wrapper} describes a(n) {qualified} signal")?;
    f.block(&format!("type {wrapper} struct"), |f| {
        cw_writeln!(f, "Channel {channel}")
    })?;
    f.blank_line()?;

    match &s.method.input {
        Some(input) => {
            let ty = f.message(input);

            cw_writeln!(f, "// Receive blocks until a(n) {qualified} signal is received")?;
            f.block(
                &format!("func ({recv}) Receive(ctx {wf_ctx}) (*{ty}, bool)"),
                |f| {
                    cw_writeln!(f, "var resp {ty}")?;
                    f.writeln("more := s.Channel.Receive(ctx, &resp)")?;
                    f.writeln("return &resp, more")
                },
            )?;
            f.blank_line()?;

            cw_writeln!(f, "// ReceiveAsync checks for a(n) {qualified} signal without blocking")?;
            f.block(&format!("func ({recv}) ReceiveAsync() *{ty}"), |f| {
                cw_writeln!(f, "var resp {ty}")?;
                f.block("if ok := s.Channel.ReceiveAsync(&resp); !ok", |f| {
                    f.writeln("return nil")
                })?;
                f.writeln("return &resp")
            })?;
            f.blank_line()?;

            cw_writeln!(f, "// Select checks for a(n) {qualified} signal without blocking")?;
            f.block(
                &format!("func ({recv}) Select(sel {selector}, fn func(*{ty})) {selector}"),
                |f| {
                    f.composite(
                        &format!("return sel.AddReceive(s.Channel, func({channel}, bool) "),
                        "})",
                        |f| {
                            f.writeln("req := s.ReceiveAsync()")?;
                            f.block("if fn != nil", |f| f.writeln("fn(req)"))
                        },
                    )
                },
            )?;
        }
        None => {
            cw_writeln!(f, "// Receive blocks until a(n) {qualified} signal is received")?;
            f.block(&format!("func ({recv}) Receive(ctx {wf_ctx}) bool"), |f| {
                f.writeln("return s.Channel.Receive(ctx, nil)")
            })?;
            f.blank_line()?;

            cw_writeln!(f, "// ReceiveAsync checks for a(n) {qualified} signal without blocking")?;
            f.block(&format!("func ({recv}) ReceiveAsync() bool"), |f| {
                f.writeln("return s.Channel.ReceiveAsync(nil)")
            })?;
            f.blank_line()?;

            cw_writeln!(f, "// Select checks for a(n) {qualified} signal without blocking")?;
            f.block(
                &format!("func ({recv}) Select(sel {selector}, fn func()) {selector}"),
                |f| {
                    f.composite(
                        &format!("return sel.AddReceive(s.Channel, func({channel}, bool) "),
                        "})",
                        |f| {
                            f.writeln("s.ReceiveAsync()")?;
                            f.block("if fn != nil", |f| f.writeln("fn()"))
                        },
                    )
                },
            )?;
        }
    }
    f.blank_line()
}

fn external_params(f: &GoFile<'_>, s: Entity<'_, SignalOptions>) -> String {
    format!(
        "ctx {}, workflowID string, runID string{}",
        f.qual(Pkg::Workflow, "Context"),
        input_param(f, s.method, "req")
    )
}

/// The `SXExternal` free function.
pub fn external(scope: &Scope<'_>, s: Entity<'_, SignalOptions>, f: &mut GoFile<'_>) -> fmt::Result {
    let external = scope.names.signal_external(s.name());
    let signal_external = f.qual(Pkg::Workflow, "SignalExternalWorkflow");
    let params = external_params(f, s);
    cw_writeln!(
        f,
        "// {external} sends a(n) {} signal to an existing workflow",
        scope.qualified(s.name())
    )?;
    f.block(&format!("func {external}({params}) error"), |f| {
        cw_writeln!(
            f,
            "return {signal_external}(ctx, workflowID, runID, {}, {}).Get(ctx, nil)",
            scope.names.signal_name(s.name()),
            input_or_nil(s.method, "req")
        )
    })?;
    f.blank_line()
}

/// The `XExternal` method on the workflow resources.
pub fn resource_method(
    scope: &Scope<'_>,
    s: Entity<'_, SignalOptions>,
    f: &mut GoFile<'_>,
) -> fmt::Result {
    let method = format!("{}External", scope.names.method(s.name()));
    let params = external_params(f, s);
    let req = if s.method.input.is_some() { ", req" } else { "" };
    cw_writeln!(
        f,
        "// {method} sends a(n) {} signal to an existing workflow",
        scope.qualified(s.name())
    )?;
    f.block(
        &format!(
            "func (r {}) {method}({params}) error",
            scope.names.workflow_resources()
        ),
        |f| {
            cw_writeln!(
                f,
                "return {}(ctx, workflowID, runID{req})",
                scope.names.signal_external(s.name())
            )
        },
    )?;
    f.blank_line()
}
