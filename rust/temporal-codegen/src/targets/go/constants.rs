//! Name constants, the task queue constant and parsed expression variables.

use std::fmt;

use temporal_schema::MethodDescriptor;

use super::{GoFile, Pkg, Scope, literal};
use crate::cw_writeln;

/// The registered name of an entity: its option name, else the method's
/// fully-qualified schema name.
pub fn registered_name(option: &str, method: &MethodDescriptor) -> String {
    if option.is_empty() {
        method.full_name.clone()
    } else {
        option.to_string()
    }
}

pub fn emit(scope: &Scope<'_>, f: &mut GoFile<'_>) -> fmt::Result {
    let service = scope.service;
    let names = scope.names;
    let full_name = service.full_name();

    if let Some(queue) = service.task_queue() {
        cw_writeln!(
            f,
            "// {} is the default task queue for a {full_name} worker",
            names.task_queue()
        )?;
        cw_writeln!(f, "const {} = {}", names.task_queue(), literal::string(queue))?;
        f.blank_line()?;
    }

    let workflows: Vec<(String, String)> = service
        .workflows()
        .map(|w| {
            (
                names.workflow_name(w.name()),
                registered_name(&w.options.name, w.method),
            )
        })
        .collect();
    name_group(f, &format!("{full_name} workflow names"), &workflows)?;

    let mut ids: Vec<(String, String)> = service
        .workflows()
        .filter(|w| !w.options.id.is_empty())
        .map(|w| (names.id_expression(w.name()), w.options.id.clone()))
        .collect();
    ids.extend(
        service
            .updates()
            .filter(|u| !u.options.id.is_empty())
            .map(|u| (names.id_expression(u.name()), u.options.id.clone())),
    );
    expression_group(
        f,
        &format!("{full_name} id expressions"),
        "MustParseExpression",
        &ids,
    )?;

    let mappings: Vec<(String, String)> = service
        .workflows()
        .filter(|w| !w.options.search_attributes.is_empty())
        .map(|w| {
            (
                names.search_attributes_mapping(w.name()),
                w.options.search_attributes.clone(),
            )
        })
        .collect();
    expression_group(
        f,
        &format!("{full_name} search attribute mappings"),
        "MustParseMapping",
        &mappings,
    )?;

    let activities: Vec<(String, String)> = service
        .activities()
        .map(|a| {
            (
                names.activity_name(a.name()),
                registered_name(&a.options.name, a.method),
            )
        })
        .collect();
    name_group(f, &format!("{full_name} activity names"), &activities)?;

    let queries: Vec<(String, String)> = service
        .queries()
        .map(|q| {
            (
                names.query_name(q.name()),
                registered_name(&q.options.name, q.method),
            )
        })
        .collect();
    name_group(f, &format!("{full_name} query names"), &queries)?;

    let signals: Vec<(String, String)> = service
        .signals()
        .map(|s| {
            (
                names.signal_name(s.name()),
                registered_name(&s.options.name, s.method),
            )
        })
        .collect();
    name_group(f, &format!("{full_name} signal names"), &signals)?;

    let updates: Vec<(String, String)> = service
        .updates()
        .map(|u| {
            (
                names.update_name(u.name()),
                registered_name(&u.options.name, u.method),
            )
        })
        .collect();
    name_group(f, &format!("{full_name} update names"), &updates)
}

fn name_group(f: &mut GoFile<'_>, title: &str, entries: &[(String, String)]) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    f.comment(title)?;
    f.group("const", |f| {
        for (ident, value) in entries {
            cw_writeln!(f, "{ident} = {}", literal::string(value))?;
        }
        Ok(())
    })?;
    f.blank_line()
}

fn expression_group(
    f: &mut GoFile<'_>,
    title: &str,
    parse: &str,
    entries: &[(String, String)],
) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    let parse = f.qual(Pkg::Expression, parse);
    f.comment(title)?;
    f.group("var", |f| {
        for (ident, source) in entries {
            cw_writeln!(f, "{ident} = {parse}({})", literal::string(source))?;
        }
        Ok(())
    })?;
    f.blank_line()
}
