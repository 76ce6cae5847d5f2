//! Orchestrates the Go emitters for one service.
//!
//! Emission order is fixed and every emitter walks the model in name order,
//! so the rendered unit depends only on the model's contents.

use std::fmt;

use tracing::debug;

use crate::config::Config;
use crate::model::Service;
use crate::targets::go::{
    GoFile, GoUnit, Scope, activities, child, client, constants, signals, testing, worker,
};

/// Renders validated services with an injected configuration.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    config: &'a Config,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Renderer { config }
    }

    /// Renders every declaration for `service` into one unit.
    ///
    /// Fails only if two referenced Go packages share an import alias.
    pub fn render(&self, service: &Service) -> Result<GoUnit, crate::GenerateError> {
        let mut f = GoFile::new(&self.config.vocabulary);
        let scope = Scope::new(service, &self.config.defaults);
        emit(&scope, &mut f)?;
        let unit = f.finish()?;
        debug!(
            service = service.full_name(),
            bytes = unit.body.len(),
            imports = unit.imports.len(),
            "rendered service"
        );
        Ok(unit)
    }
}

fn emit(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let service = scope.service;

    constants::emit(scope, f)?;

    client::interface(scope, f)?;
    client::implementation(scope, f)?;
    for w in service.workflows() {
        client::workflow_methods(scope, w, f)?;
    }
    for q in service.queries() {
        client::query_method(scope, q, f)?;
    }
    for s in service.signals() {
        client::signal_method(scope, s, f)?;
    }
    for u in service.updates() {
        client::update_methods(scope, u, f)?;
    }
    for w in service.workflows() {
        client::run_handle(scope, w, f)?;
    }
    for u in service.updates() {
        client::update_handle(scope, u, f)?;
    }

    worker::workflows_interface(scope, f)?;
    worker::registration(scope, f)?;

    worker::resources(scope, f)?;
    for a in service.activities() {
        activities::resource_methods(scope, a, f)?;
    }
    for s in service.signals() {
        signals::resource_method(scope, s, f)?;
    }
    for w in service.workflows() {
        child::resource_methods(scope, w, f)?;
    }

    for w in service.workflows() {
        worker::builder(scope, w, f)?;
        worker::workflow_interface(scope, w, f)?;
        worker::input(scope, w, f)?;
        child::functions(scope, w, f)?;
        child::run(scope, w, f)?;
    }

    for s in service.signals() {
        signals::wrapper(scope, s, f)?;
        signals::external(scope, s, f)?;
    }

    activities::interface(scope, f)?;
    activities::registration(scope, f)?;
    for a in service.activities() {
        activities::future(scope, a, f)?;
    }

    testing::client(scope, f)?;
    for w in service.workflows() {
        testing::workflow_methods(scope, w, f)?;
    }
    for q in service.queries() {
        testing::query_method(scope, q, f)?;
    }
    for s in service.signals() {
        testing::signal_method(scope, s, f)?;
    }
    for u in service.updates() {
        testing::update_methods(scope, u, f)?;
    }
    for w in service.workflows() {
        testing::run(scope, w, f)?;
    }
    for u in service.updates() {
        testing::update_handle(scope, u, f)?;
    }
    Ok(())
}
