//! Identifier resolution for generated Go declarations.
//!
//! Every generated identifier is a pure function of the service name and the
//! entity (method) name. Exported identifiers are UpperCamelCase, unexported
//! ones lowerCamelCase, both produced by `heck` over the concatenated parts.
//!
//! Because distinct entities can map to the same identifier (a workflow named
//! `FooSignal` and a signal named `Foo` both yield `<Svc>FooSignal`),
//! [`declarations`] enumerates everything the renderer will declare so the
//! model can reject collisions before emission.

use std::collections::BTreeMap;

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use temporal_schema::Role;

use crate::model::{Service, ValidationError};

/// Identifier factory for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names {
    service: String,
}

impl Names {
    pub fn new(service_name: &str) -> Self {
        Names {
            service: service_name.to_upper_camel_case(),
        }
    }

    /// The service's Go name, used as the prefix of every package-level identifier.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Go method name for an entity (e.g., the `Transfer` in `client.Transfer(...)`).
    pub fn method(&self, entity: &str) -> String {
        entity.to_upper_camel_case()
    }

    fn exported(&self, parts: &[&str]) -> String {
        let mut joined = self.service.clone();
        for part in parts {
            joined.push_str(&part.to_upper_camel_case());
        }
        joined.to_upper_camel_case()
    }

    fn unexported(&self, parts: &[&str]) -> String {
        self.exported(parts).to_lower_camel_case()
    }

    // Constants and expression variables.

    pub fn task_queue(&self) -> String {
        self.exported(&["TaskQueue"])
    }

    pub fn workflow_name(&self, workflow: &str) -> String {
        self.exported(&[workflow, "WorkflowName"])
    }

    pub fn activity_name(&self, activity: &str) -> String {
        self.exported(&[activity, "ActivityName"])
    }

    pub fn query_name(&self, query: &str) -> String {
        self.exported(&[query, "QueryName"])
    }

    pub fn signal_name(&self, signal: &str) -> String {
        self.exported(&[signal, "SignalName"])
    }

    pub fn update_name(&self, update: &str) -> String {
        self.exported(&[update, "UpdateName"])
    }

    /// ID expression variable for a workflow or update.
    pub fn id_expression(&self, entity: &str) -> String {
        self.exported(&[entity, "IdExpression"])
    }

    pub fn search_attributes_mapping(&self, workflow: &str) -> String {
        self.exported(&[workflow, "SearchAttributesMapping"])
    }

    // Client surface.

    pub fn client_interface(&self) -> String {
        self.exported(&["Client"])
    }

    pub fn client_impl(&self) -> String {
        self.unexported(&["Client"])
    }

    pub fn client_constructor(&self) -> String {
        format!("New{}", self.client_interface())
    }

    pub fn start_workflow_options(&self, workflow: &str) -> String {
        self.unexported(&[workflow, "StartWorkflowOptions"])
    }

    pub fn workflow_run_interface(&self, workflow: &str) -> String {
        self.exported(&[workflow, "Run"])
    }

    pub fn workflow_run_impl(&self, workflow: &str) -> String {
        self.unexported(&[workflow, "Run"])
    }

    pub fn update_handle_interface(&self, update: &str) -> String {
        self.exported(&[update, "Handle"])
    }

    pub fn update_handle_impl(&self, update: &str) -> String {
        self.unexported(&[update, "Handle"])
    }

    // Worker surface.

    pub fn workflows_interface(&self) -> String {
        self.exported(&["Workflows"])
    }

    pub fn register_workflows(&self) -> String {
        format!("Register{}", self.workflows_interface())
    }

    pub fn register_workflow(&self, workflow: &str) -> String {
        format!("Register{}", self.exported(&[workflow, "Workflow"]))
    }

    pub fn workflow_builder(&self, workflow: &str) -> String {
        format!("build{}", self.exported(&[workflow]))
    }

    pub fn workflow_interface(&self, workflow: &str) -> String {
        self.exported(&[workflow])
    }

    pub fn workflow_input(&self, workflow: &str) -> String {
        self.exported(&[workflow, "Input"])
    }

    pub fn workflow_resources(&self) -> String {
        self.exported(&["WorkflowResources"])
    }

    pub fn child_run(&self, workflow: &str) -> String {
        self.exported(&[workflow, "ChildRun"])
    }

    pub fn child(&self, workflow: &str) -> String {
        self.exported(&[workflow, "Child"])
    }

    pub fn child_async(&self, workflow: &str) -> String {
        self.exported(&[workflow, "ChildAsync"])
    }

    pub fn child_workflow_options(&self, workflow: &str) -> String {
        self.unexported(&[workflow, "ChildWorkflowOptions"])
    }

    pub fn signal_wrapper(&self, signal: &str) -> String {
        self.exported(&[signal, "Signal"])
    }

    pub fn signal_external(&self, signal: &str) -> String {
        self.exported(&[signal, "External"])
    }

    pub fn activities_interface(&self) -> String {
        self.exported(&["Activities"])
    }

    pub fn register_activities(&self) -> String {
        format!("Register{}", self.activities_interface())
    }

    pub fn register_activity(&self, activity: &str) -> String {
        format!("Register{}", self.exported(&[activity, "Activity"]))
    }

    pub fn activity_future(&self, activity: &str) -> String {
        self.exported(&[activity, "Future"])
    }

    // Test harness.

    pub fn test_client(&self) -> String {
        self.exported(&["TestClient"])
    }

    pub fn test_client_constructor(&self) -> String {
        format!("New{}", self.test_client())
    }

    pub fn test_workflow_run(&self, workflow: &str) -> String {
        format!("test{}", self.workflow_run_interface(workflow))
    }

    pub fn test_update_handle(&self, update: &str) -> String {
        format!("test{}", self.update_handle_interface(update))
    }
}

/// A generated identifier together with the scope it lives in and the
/// entity responsible for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// `"package"` or the Go type whose method/field set holds the identifier.
    pub namespace: String,
    pub identifier: String,
    /// Human-readable owner, e.g. `workflow "Transfer"`.
    pub owner: String,
}

struct Collector {
    declarations: Vec<Declaration>,
}

impl Collector {
    fn add(&mut self, namespace: &str, identifier: String, owner: &str) {
        self.declarations.push(Declaration {
            namespace: namespace.to_string(),
            identifier,
            owner: owner.to_string(),
        });
    }
}

fn owner(role: Role, name: &str) -> String {
    format!("{role} {name:?}")
}

/// Lists every identifier the renderer declares for `service`.
pub fn declarations(service: &Service) -> Vec<Declaration> {
    let names = service.names();
    let mut c = Collector {
        declarations: Vec::new(),
    };
    const PACKAGE: &str = "package";
    let svc = format!("service {:?}", service.name());

    let client = names.client_interface();
    let resources = names.workflow_resources();

    // Service-wide declarations.
    if service.task_queue().is_some() {
        c.add(PACKAGE, names.task_queue(), &svc);
    }
    for ident in [
        names.client_interface(),
        names.client_impl(),
        names.client_constructor(),
        names.workflows_interface(),
        names.register_workflows(),
        names.workflow_resources(),
        names.activities_interface(),
        names.register_activities(),
        names.test_client(),
        names.test_client_constructor(),
    ] {
        c.add(PACKAGE, ident, &svc);
    }

    for workflow in service.workflows() {
        let name = workflow.name();
        let who = owner(Role::Workflow, name);
        let method = names.method(name);

        c.add(PACKAGE, names.workflow_name(name), &who);
        if !workflow.options.id.is_empty() {
            c.add(PACKAGE, names.id_expression(name), &who);
        }
        if !workflow.options.search_attributes.is_empty() {
            c.add(PACKAGE, names.search_attributes_mapping(name), &who);
        }
        for ident in [
            names.start_workflow_options(name),
            names.workflow_run_interface(name),
            names.workflow_run_impl(name),
            names.register_workflow(name),
            names.workflow_builder(name),
            names.workflow_interface(name),
            names.workflow_input(name),
            names.child_run(name),
            names.child(name),
            names.child_async(name),
            names.child_workflow_options(name),
            names.test_workflow_run(name),
        ] {
            c.add(PACKAGE, ident, &who);
        }

        c.add(&client, method.clone(), &who);
        c.add(&client, format!("{method}Async"), &who);
        c.add(&client, format!("Get{method}"), &who);
        for signal in workflow.options.signal.iter().filter(|s| s.start) {
            let with = format!("{method}With{}", names.method(&signal.r#ref));
            c.add(&client, format!("{with}Async"), &who);
            c.add(&client, with, &who);
        }

        c.add(&resources, format!("{method}Child"), &who);
        c.add(&resources, format!("{method}ChildAsync"), &who);

        let run = names.workflow_run_interface(name);
        for ident in ["ID", "RunID", "Get"] {
            c.add(&run, ident.to_string(), &svc);
        }
        let iface = names.workflow_interface(name);
        c.add(&iface, "Execute".to_string(), &svc);
        let input = names.workflow_input(name);
        c.add(&input, resources.clone(), &svc);
        if service.method(name).input.is_some() {
            c.add(&input, "Req".to_string(), &svc);
        }
        let child_run = names.child_run(name);
        for ident in ["Future", "Get", "Select", "SelectStart", "WaitStart"] {
            c.add(&child_run, ident.to_string(), &svc);
        }

        for query in &workflow.options.query {
            let who = owner(Role::Query, &query.r#ref);
            let method = names.method(&query.r#ref);
            c.add(&run, method.clone(), &who);
            c.add(&iface, method, &who);
        }
        for signal in &workflow.options.signal {
            let who = owner(Role::Signal, &signal.r#ref);
            let method = names.method(&signal.r#ref);
            c.add(&run, method.clone(), &who);
            c.add(&input, method.clone(), &who);
            c.add(&child_run, method, &who);
        }
        for update in &workflow.options.update {
            let who = owner(Role::Update, &update.r#ref);
            let method = names.method(&update.r#ref);
            c.add(&run, format!("{method}Async"), &who);
            if service
                .updates()
                .any(|u| u.name() == update.r#ref && u.options.validate)
            {
                c.add(&iface, format!("Validate{method}"), &who);
            }
            c.add(&run, method.clone(), &who);
            c.add(&iface, method, &who);
        }
    }

    for activity in service.activities() {
        let name = activity.name();
        let who = owner(Role::Activity, name);
        let method = names.method(name);
        for ident in [
            names.activity_name(name),
            names.register_activity(name),
            names.activity_future(name),
        ] {
            c.add(PACKAGE, ident, &who);
        }
        for suffix in ["", "Async", "Local", "LocalAsync"] {
            c.add(&resources, format!("{method}{suffix}"), &who);
        }
    }

    for query in service.queries() {
        let name = query.name();
        let who = owner(Role::Query, name);
        c.add(PACKAGE, names.query_name(name), &who);
        c.add(&client, names.method(name), &who);
    }

    for signal in service.signals() {
        let name = signal.name();
        let who = owner(Role::Signal, name);
        c.add(PACKAGE, names.signal_name(name), &who);
        c.add(PACKAGE, names.signal_wrapper(name), &who);
        c.add(PACKAGE, names.signal_external(name), &who);
        c.add(&client, names.method(name), &who);
        c.add(&resources, format!("{}External", names.method(name)), &who);
    }

    for update in service.updates() {
        let name = update.name();
        let who = owner(Role::Update, name);
        let method = names.method(name);
        c.add(PACKAGE, names.update_name(name), &who);
        if !update.options.id.is_empty() {
            c.add(PACKAGE, names.id_expression(name), &who);
        }
        for ident in [
            names.update_handle_interface(name),
            names.update_handle_impl(name),
            names.test_update_handle(name),
        ] {
            c.add(PACKAGE, ident, &who);
        }
        c.add(&client, format!("{method}Async"), &who);
        c.add(&client, format!("Get{method}"), &who);
        c.add(&client, method, &who);
    }

    c.declarations
}

/// Reports every identifier declared more than once within a namespace.
pub fn collisions(service: &Service) -> Vec<ValidationError> {
    let mut seen: BTreeMap<(String, String), String> = BTreeMap::new();
    let mut errors = Vec::new();
    for decl in declarations(service) {
        let key = (decl.namespace, decl.identifier);
        match seen.get(&key) {
            Some(first) => errors.push(ValidationError::IdentifierCollision {
                namespace: key.0.clone(),
                identifier: key.1.clone(),
                first: first.clone(),
                second: decl.owner,
            }),
            None => {
                seen.insert(key, decl.owner);
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn exported_and_unexported_conventions() {
        let names = Names::new("Example");
        assert_eq!(names.client_interface(), "ExampleClient");
        assert_eq!(names.client_impl(), "exampleClient");
        assert_eq!(names.client_constructor(), "NewExampleClient");
        assert_eq!(names.workflow_run_interface("Transfer"), "ExampleTransferRun");
        assert_eq!(names.workflow_run_impl("Transfer"), "exampleTransferRun");
        assert_eq!(names.workflow_builder("Transfer"), "buildExampleTransfer");
        assert_eq!(names.test_workflow_run("Transfer"), "testExampleTransferRun");
    }

    #[test]
    fn constants_follow_entity_kind() {
        let names = Names::new("Example");
        assert_snapshot!(names.workflow_name("Transfer"), @"ExampleTransferWorkflowName");
        assert_snapshot!(names.activity_name("Deposit"), @"ExampleDepositActivityName");
        assert_snapshot!(names.signal_name("LeaseAcquired"), @"ExampleLeaseAcquiredSignalName");
        assert_snapshot!(names.query_name("Status"), @"ExampleStatusQueryName");
        assert_snapshot!(names.update_name("SetRate"), @"ExampleSetRateUpdateName");
        assert_snapshot!(names.id_expression("Transfer"), @"ExampleTransferIdExpression");
    }

    #[test]
    fn casing_is_normalized() {
        let names = Names::new("example_service");
        assert_eq!(names.service(), "ExampleService");
        assert_eq!(names.method("create_order"), "CreateOrder");
        assert_eq!(
            names.workflow_interface("create_order"),
            "ExampleServiceCreateOrder"
        );
        assert_eq!(
            names.register_workflow("SomeWorkflow1"),
            "RegisterExampleServiceSomeWorkflow1Workflow"
        );
    }

    #[test]
    fn names_are_pure() {
        let a = Names::new("Example");
        let b = Names::new("Example");
        assert_eq!(a.signal_wrapper("Foo"), b.signal_wrapper("Foo"));
        assert_eq!(a, b);
    }
}
