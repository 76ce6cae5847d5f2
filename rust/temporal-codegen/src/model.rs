//! The validated model of one Temporal service.
//!
//! [`Service::build`] classifies every method of a [`ServiceDescriptor`] by
//! the option blocks it carries, then checks the cross references between
//! workflows and their queries, signals and updates. Emitters only ever see a
//! model that passed validation, and iterate it in alphabetical order so the
//! generated code does not depend on declaration order.

use std::collections::BTreeMap;
use std::fmt;

use temporal_schema::{
    ActivityOptions, MethodDescriptor, QueryOptions, Role, RoleOptions, ServiceDescriptor,
    SignalOptions, UpdateOptions, WorkflowOptions,
};
use tracing::debug;

use crate::names::{self, Names};

/// Generator feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Extract and emit workflow updates. When off, `temporal.v1.update`
    /// options are ignored entirely.
    pub updates: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features { updates: true }
    }
}

/// The set of roles attached to one method.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    const EXCLUSIVE: u8 =
        Self::bit(Role::Query) | Self::bit(Role::Signal) | Self::bit(Role::Update);

    const fn bit(role: Role) -> u8 {
        1 << role as u8
    }

    pub fn only(role: Role) -> Self {
        RoleSet(Self::bit(role))
    }

    pub fn contains(self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= Self::bit(role);
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }

    /// Queries, signals and updates cannot share a method with any other role.
    fn conflicts_with(self, role: Role) -> bool {
        !self.is_empty() && (Self::EXCLUSIVE & Self::bit(role) != 0 || self.0 & Self::EXCLUSIVE != 0)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for role in self.iter() {
            if !first {
                f.write_str(" and ")?;
            }
            f.write_str(role.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A method that carries at least one role.
#[derive(Debug, Clone)]
pub struct Method {
    pub descriptor: MethodDescriptor,
    pub roles: RoleSet,
}

/// One role of one method: the method plus that role's options.
#[derive(Debug)]
pub struct Entity<'a, O> {
    pub method: &'a MethodDescriptor,
    pub options: &'a O,
}

impl<O> Clone for Entity<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for Entity<'_, O> {}

impl<'a, O> Entity<'a, O> {
    /// The method name as declared in the schema.
    pub fn name(&self) -> &'a str {
        &self.method.name
    }
}

/// A validated service.
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    full_name: String,
    doc: Option<String>,
    task_queue: Option<String>,
    features: Features,
    names: Names,
    methods: BTreeMap<String, Method>,
    activities: BTreeMap<String, ActivityOptions>,
    workflows: BTreeMap<String, WorkflowOptions>,
    queries: BTreeMap<String, QueryOptions>,
    signals: BTreeMap<String, SignalOptions>,
    updates: BTreeMap<String, UpdateOptions>,
}

impl Service {
    /// Classifies and validates a service.
    ///
    /// A role conflict on a single method aborts immediately. Every other
    /// problem is collected and reported together in [`ModelError::Invalid`].
    pub fn build(descriptor: &ServiceDescriptor, features: Features) -> Result<Self, ModelError> {
        let mut service = Service {
            name: descriptor.name.clone(),
            full_name: descriptor.full_name.clone(),
            doc: descriptor.doc.clone(),
            task_queue: descriptor
                .options
                .as_ref()
                .map(|options| options.task_queue.clone())
                .filter(|queue| !queue.is_empty()),
            features,
            names: Names::new(&descriptor.name),
            methods: BTreeMap::new(),
            activities: BTreeMap::new(),
            workflows: BTreeMap::new(),
            queries: BTreeMap::new(),
            signals: BTreeMap::new(),
            updates: BTreeMap::new(),
        };

        for method in &descriptor.methods {
            let mut roles = RoleSet::default();
            for role in Role::ALL {
                if role == Role::Update && !features.updates {
                    continue;
                }
                let Some(options) = method.options.get(role) else {
                    continue;
                };
                if roles.conflicts_with(role) {
                    return Err(ModelError::RoleConflict {
                        method: method.name.clone(),
                        role,
                        existing: roles,
                    });
                }
                roles.insert(role);

                let key = method.name.clone();
                match options {
                    RoleOptions::Activity(options) => {
                        service.activities.insert(key, options.clone());
                    }
                    RoleOptions::Workflow(options) => {
                        service.workflows.insert(key, normalize(options, features));
                    }
                    RoleOptions::Query(options) => {
                        service.queries.insert(key, options.clone());
                    }
                    RoleOptions::Signal(options) => {
                        service.signals.insert(key, options.clone());
                    }
                    RoleOptions::Update(options) => {
                        service.updates.insert(key, options.clone());
                    }
                }
            }

            if !roles.is_empty() {
                service.methods.insert(
                    method.name.clone(),
                    Method {
                        descriptor: method.clone(),
                        roles,
                    },
                );
            }
        }

        let errors = service.validate();
        if !errors.is_empty() {
            return Err(ModelError::Invalid(errors));
        }

        debug!(
            service = %service.full_name,
            activities = service.activities.len(),
            workflows = service.workflows.len(),
            queries = service.queries.len(),
            signals = service.signals.len(),
            updates = service.updates.len(),
            "built service model"
        );
        Ok(service)
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for workflow in self.workflows() {
            let name = workflow.name();
            let refs = workflow
                .options
                .query
                .iter()
                .map(|q| (Role::Query, &q.r#ref, self.queries.contains_key(&q.r#ref)))
                .chain(
                    workflow.options.signal.iter().map(|s| {
                        (Role::Signal, &s.r#ref, self.signals.contains_key(&s.r#ref))
                    }),
                )
                .chain(
                    workflow.options.update.iter().map(|u| {
                        (Role::Update, &u.r#ref, self.updates.contains_key(&u.r#ref))
                    }),
                );
            for (role, reference, defined) in refs {
                if !defined {
                    errors.push(ValidationError::UndefinedReference {
                        workflow: name.to_string(),
                        role,
                        reference: reference.clone(),
                    });
                }
            }

            if workflow.method.input.is_none() {
                if !workflow.options.id.is_empty() {
                    errors.push(ValidationError::ExpressionWithoutInput {
                        role: Role::Workflow,
                        method: name.to_string(),
                        expression: "id",
                    });
                }
                if !workflow.options.search_attributes.is_empty() {
                    errors.push(ValidationError::ExpressionWithoutInput {
                        role: Role::Workflow,
                        method: name.to_string(),
                        expression: "search attributes",
                    });
                }
            }
        }

        for signal in self.signals() {
            if self.roles(signal.name()) != RoleSet::only(Role::Signal) {
                continue;
            }
            if let Some(output) = &signal.method.output {
                errors.push(ValidationError::SignalWithOutput {
                    signal: signal.name().to_string(),
                    output: output.full_name.clone(),
                });
            }
        }

        for query in self.queries() {
            if query.method.output.is_none() {
                errors.push(ValidationError::QueryWithoutOutput {
                    query: query.name().to_string(),
                });
            }
        }

        for update in self.updates() {
            if update.method.input.is_none() && !update.options.id.is_empty() {
                errors.push(ValidationError::ExpressionWithoutInput {
                    role: Role::Update,
                    method: update.name().to_string(),
                    expression: "id",
                });
            }
        }

        errors.extend(names::collisions(self));
        errors
    }

    /// Service name as declared (e.g., "Example").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified service name (e.g., "example.v1.Example").
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Default task queue from the service options.
    pub fn task_queue(&self) -> Option<&str> {
        self.task_queue.as_deref()
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    /// True if no method carries a role.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Looks up a method that carries a role.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not part of the model. Emitters only ask for names
    /// they got from the model itself, so a miss is a generator bug.
    pub fn method(&self, name: &str) -> &MethodDescriptor {
        match self.methods.get(name) {
            Some(method) => &method.descriptor,
            None => panic!("service {} has no method {name:?}", self.full_name),
        }
    }

    pub fn roles(&self, name: &str) -> RoleSet {
        self.methods
            .get(name)
            .map(|method| method.roles)
            .unwrap_or_default()
    }

    fn entities<'a, O>(
        &'a self,
        map: &'a BTreeMap<String, O>,
    ) -> impl Iterator<Item = Entity<'a, O>> + 'a {
        map.iter().map(|(name, options)| Entity {
            method: self.method(name),
            options,
        })
    }

    fn entity<'a, O>(&'a self, map: &'a BTreeMap<String, O>, role: Role, name: &str) -> Entity<'a, O> {
        match map.get(name) {
            Some(options) => Entity {
                method: self.method(name),
                options,
            },
            None => panic!("service {} has no {role} {name:?}", self.full_name),
        }
    }

    pub fn activities(&self) -> impl Iterator<Item = Entity<'_, ActivityOptions>> {
        self.entities(&self.activities)
    }

    /// Workflows in name order. Their query, signal and update references
    /// are sorted by name too.
    pub fn workflows(&self) -> impl Iterator<Item = Entity<'_, WorkflowOptions>> {
        self.entities(&self.workflows)
    }

    pub fn queries(&self) -> impl Iterator<Item = Entity<'_, QueryOptions>> {
        self.entities(&self.queries)
    }

    pub fn signals(&self) -> impl Iterator<Item = Entity<'_, SignalOptions>> {
        self.entities(&self.signals)
    }

    pub fn updates(&self) -> impl Iterator<Item = Entity<'_, UpdateOptions>> {
        self.entities(&self.updates)
    }

    pub fn query(&self, name: &str) -> Entity<'_, QueryOptions> {
        self.entity(&self.queries, Role::Query, name)
    }

    pub fn signal(&self, name: &str) -> Entity<'_, SignalOptions> {
        self.entity(&self.signals, Role::Signal, name)
    }

    pub fn update(&self, name: &str) -> Entity<'_, UpdateOptions> {
        self.entity(&self.updates, Role::Update, name)
    }
}

fn normalize(options: &WorkflowOptions, features: Features) -> WorkflowOptions {
    let mut options = options.clone();
    options.query.sort_by(|a, b| a.r#ref.cmp(&b.r#ref));
    options.signal.sort_by(|a, b| a.r#ref.cmp(&b.r#ref));
    options.update.sort_by(|a, b| a.r#ref.cmp(&b.r#ref));
    if !features.updates {
        options.update.clear();
    }
    options
}

/// Why a service could not be modeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A method carries a role that cannot be combined with the ones it
    /// already has.
    RoleConflict {
        method: String,
        role: Role,
        existing: RoleSet,
    },

    /// The service was classified but failed validation.
    Invalid(Vec<ValidationError>),
}

impl ModelError {
    /// The individual validation failures, empty for a role conflict.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            ModelError::Invalid(errors) => errors,
            ModelError::RoleConflict { .. } => &[],
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::RoleConflict {
                method,
                role,
                existing,
            } => write!(
                f,
                "method {method:?}: role conflict: cannot be declared as a {role}, already declared as {existing}"
            ),
            ModelError::Invalid(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UndefinedReference {
        workflow: String,
        role: Role,
        reference: String,
    },
    SignalWithOutput {
        signal: String,
        output: String,
    },
    /// Query handlers always return a value.
    QueryWithoutOutput {
        query: String,
    },
    ExpressionWithoutInput {
        role: Role,
        method: String,
        expression: &'static str,
    },
    IdentifierCollision {
        namespace: String,
        identifier: String,
        first: String,
        second: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UndefinedReference {
                workflow,
                role,
                reference,
            } => write!(
                f,
                "workflow {workflow:?} references undefined {role}: {reference:?}"
            ),
            ValidationError::SignalWithOutput { signal, output } => write!(
                f,
                "expected signal {signal:?} output to be {}, got: {output}",
                temporal_schema::EMPTY_MESSAGE
            ),
            ValidationError::QueryWithoutOutput { query } => write!(
                f,
                "query {query:?} has no output, expected a message other than {}",
                temporal_schema::EMPTY_MESSAGE
            ),
            ValidationError::ExpressionWithoutInput {
                role,
                method,
                expression,
            } => write!(
                f,
                "{role} {method:?} declares a(n) {expression} expression but has no input"
            ),
            ValidationError::IdentifierCollision {
                namespace,
                identifier,
                first,
                second,
            } => write!(
                f,
                "generated identifier {identifier:?} in {namespace} is declared by both {first} and {second}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
