//! Go declaration emitters.
//!
//! Every emitter appends to a [`GoFile`] and reads the validated
//! [`Service`] through a [`Scope`]. Emitters never fail on their own: the
//! only error is the sink's `fmt::Error`, and a model inconsistency (an
//! entity that validation should have rejected) is a generator bug and
//! panics.

pub mod activities;
pub mod child;
pub mod client;
pub mod constants;
mod file;
pub mod literal;
mod options;
pub mod signals;
pub mod testing;
mod vocabulary;
pub mod worker;

use std::fmt;

use temporal_schema::{MessageRef, MethodDescriptor};

pub use file::{GoFile, GoUnit, ImportConflict, add_import};
pub use vocabulary::{GoImport, Pkg, Vocabulary};

use crate::config::Defaults;
use crate::model::Service;
use crate::names::Names;

/// What every emitter reads: the model, its names and the provider defaults.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    pub service: &'a Service,
    pub names: &'a Names,
    pub defaults: &'a Defaults,
}

impl<'a> Scope<'a> {
    pub fn new(service: &'a Service, defaults: &'a Defaults) -> Self {
        Scope {
            service,
            names: service.names(),
            defaults,
        }
    }

    /// `example.v1.Example.Transfer`, used in generated doc comments.
    pub fn qualified(&self, entity: &str) -> String {
        format!("{}.{entity}", self.service.full_name())
    }
}

/// `*Message`.
pub(crate) fn ptr(f: &GoFile<'_>, message: &MessageRef) -> String {
    format!("*{}", f.message(message))
}

/// `, name *Input` when the method takes input, otherwise nothing.
pub(crate) fn input_param(f: &GoFile<'_>, method: &MethodDescriptor, name: &str) -> String {
    match &method.input {
        Some(input) => format!(", {name} {}", ptr(f, input)),
        None => String::new(),
    }
}

/// `, name` when the method takes input, otherwise nothing.
pub(crate) fn input_arg(method: &MethodDescriptor, name: &str) -> String {
    if method.input.is_some() {
        format!(", {name}")
    } else {
        String::new()
    }
}

/// `name` when the method takes input, otherwise `nil`.
pub(crate) fn input_or_nil<'n>(method: &MethodDescriptor, name: &'n str) -> &'n str {
    if method.input.is_some() { name } else { "nil" }
}

/// `(*Output, error)` or `error`.
pub(crate) fn results(f: &GoFile<'_>, output: Option<&MessageRef>) -> String {
    match output {
        Some(output) => format!("({}, error)", ptr(f, output)),
        None => "error".to_string(),
    }
}

/// `(handle, error)` for a handle type.
pub(crate) fn handle_results(handle: &str) -> String {
    format!("({handle}, error)")
}

/// The values to return alongside `err` for a `results` signature.
pub(crate) fn fail(output: Option<&MessageRef>) -> &'static str {
    if output.is_some() { "nil, err" } else { "err" }
}

/// A `func(...)` type for a handler taking `ctx_type` and the method input.
pub(crate) fn func_type(f: &GoFile<'_>, ctx_type: &str, method: &MethodDescriptor) -> String {
    let input = match &method.input {
        Some(input) => format!(", {}", ptr(f, input)),
        None => String::new(),
    };
    format!(
        "func({ctx_type}{input}) {}",
        results(f, method.output.as_ref())
    )
}

/// Writes `summary` and, when present, the method's schema documentation.
pub(crate) fn doc(f: &mut GoFile<'_>, summary: &str, method: &MethodDescriptor) -> fmt::Result {
    f.comment(summary)?;
    if let Some(doc) = method.doc.as_deref().map(str::trim_end).filter(|d| !d.is_empty()) {
        f.writeln("//")?;
        f.comment(doc)?;
    }
    Ok(())
}

/// Decodes the response of a future-like value into a fresh message and
/// returns it, or returns the bare error when there is no output.
///
/// `get` is the Go call prefix up to the destination argument, e.g.
/// `r.run.Get(ctx, ` for `r.run.Get(ctx, &resp)`.
pub(crate) fn decode_result(
    f: &mut GoFile<'_>,
    output: Option<&MessageRef>,
    get: &str,
) -> fmt::Result {
    match output {
        Some(output) => {
            let ty = f.message(output);
            crate::cw_writeln!(f, "var resp {ty}")?;
            f.block(&format!("if err := {get}&resp); err != nil"), |f| {
                f.writeln("return nil, err")
            })?;
            f.writeln("return &resp, nil")
        }
        None => crate::cw_writeln!(f, "return {get}nil)"),
    }
}
