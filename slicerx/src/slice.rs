//! Assembly of a slice from its declarative description.
//!
//! ```
//! use serde_json::json;
//! use slicerx::{NamingMode, Slice};
//!
//! let slice = Slice::builder("items")
//!     .operations(["add", "remove", "clear"])
//!     .naming(NamingMode::Prefixed)
//!     .build()
//!     .unwrap();
//!
//! let add = slice.command("itemsAdd").unwrap();
//! let state = slice.reduce(slice.initial_state(), &add.action(json!(1)));
//! assert_eq!(slice.selectors().select_all(&state), vec![json!(1)]);
//! ```

use crate::container::{build_transitions, Container, Transition};
use crate::entity_index::EntityIndex;
use crate::error::SliceError;
use crate::lifecycle::TaskSignal;
use crate::operation::{ContainerKind, NamingMode, Operation};
use crate::selectors::Selectors;
use crate::slice_state::SliceState;
use crate::task::AsyncTask;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// The declarative part of a slice description, as it appears in JSON.
///
/// Custom transitions and async tasks are code and are attached through
/// [`SliceBuilder`] after [`SliceOptions::into_builder`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceOptions {
    pub name: String,
    #[serde(default)]
    pub container_kind: ContainerKind,
    #[serde(default)]
    pub initial_value: Option<Value>,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub naming_mode: NamingMode,
    #[serde(default)]
    pub strict: bool,
}

impl SliceOptions {
    pub fn from_json(json: &str) -> Result<Self, SliceError> {
        serde_json::from_str(json).map_err(|e| SliceError::InvalidOptions(e.to_string()))
    }

    pub fn into_builder(self) -> SliceBuilder {
        let mut builder = Slice::builder(self.name)
            .kind(self.container_kind)
            .operations(self.operations)
            .naming(self.naming_mode)
            .strict(self.strict);
        if let Some(value) = self.initial_value {
            builder = builder.initial_value(value);
        }
        builder
    }
}

enum Initial {
    Container(Container),
    Value(Value),
}

pub struct SliceBuilder {
    name: String,
    kind: ContainerKind,
    initial: Option<Initial>,
    operations: Vec<String>,
    custom: Vec<(String, Transition)>,
    naming: NamingMode,
    tasks: Vec<AsyncTask>,
    strict: bool,
}

impl SliceBuilder {
    fn new(name: String) -> Self {
        SliceBuilder {
            name,
            kind: ContainerKind::default(),
            initial: None,
            operations: Vec::new(),
            custom: Vec::new(),
            naming: NamingMode::default(),
            tasks: Vec::new(),
            strict: false,
        }
    }

    pub fn kind(mut self, kind: ContainerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn initial(mut self, container: impl Into<Container>) -> Self {
        self.initial = Some(Initial::Container(container.into()));
        self
    }

    /// Initial value as JSON: an array for collections; a `{entities, ids}` object, an
    /// array of entities or `null` for normalized indexes.
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial = Some(Initial::Value(value));
        self
    }

    pub fn operations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations.extend(names.into_iter().map(Into::into));
        self
    }

    /// Registers a caller-written transition under `name`. A custom transition sharing
    /// a command name with a vocabulary operation replaces it.
    pub fn custom<F>(mut self, name: impl Into<String>, transition: F) -> Self
    where
        F: Fn(Container, &Value) -> Container + Send + Sync + 'static,
    {
        self.custom.push((name.into(), Transition::new(transition)));
        self
    }

    pub fn naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    /// Registers an async task. Any task turns on the lifecycle fields.
    pub fn task(mut self, task: AsyncTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Reject unknown operation names instead of skipping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Result<Slice, SliceError> {
        if self.name.is_empty() {
            return Err(SliceError::EmptyName);
        }
        let initial = self.initial_container()?;

        if self.strict {
            if let Some(unknown) = self.operations.iter().find(|name| {
                !Operation::parse(name).is_some_and(|op| op.supports(self.kind))
            }) {
                return Err(SliceError::UnknownOperation {
                    operation: unknown.clone(),
                    kind: format!("{:?}", self.kind),
                });
            }
        }

        let mut commands: Vec<Command> = build_transitions(&self.operations, self.kind)
            .into_iter()
            .map(|(operation, transition)| Command {
                name: self.naming.resolve(&self.name, operation.name()),
                kind: CommandKind::Operation(operation),
                transition: Some(transition),
            })
            .collect();

        for (custom_name, transition) in self.custom {
            let name = self.naming.resolve(&self.name, &custom_name);
            match commands.iter_mut().find(|command| command.name == name) {
                Some(existing) => {
                    existing.kind = CommandKind::Custom;
                    existing.transition = Some(transition);
                }
                None => commands.push(Command {
                    name,
                    kind: CommandKind::Custom,
                    transition: Some(transition),
                }),
            }
        }

        for task in &self.tasks {
            if commands.iter().any(|command| command.name == task.name()) {
                return Err(SliceError::DuplicateCommand(task.name().to_string()));
            }
            commands.push(Command {
                name: task.name().to_string(),
                kind: CommandKind::Task,
                transition: None,
            });
        }

        let lookup = commands
            .iter()
            .enumerate()
            .map(|(position, command)| (command.name.clone(), position))
            .collect();

        debug!(
            slice = %self.name,
            kind = ?self.kind,
            commands = commands.len(),
            tasks = self.tasks.len(),
            "slice assembled"
        );

        Ok(Slice {
            selectors: Selectors::new(self.kind, !self.tasks.is_empty()),
            name: self.name,
            kind: self.kind,
            initial,
            commands,
            lookup,
            tasks: self.tasks,
        })
    }

    fn initial_container(&self) -> Result<Container, SliceError> {
        match &self.initial {
            None => Ok(Container::empty(self.kind)),
            Some(Initial::Container(container)) if container.kind() == self.kind => {
                Ok(container.clone())
            }
            Some(Initial::Container(container)) => Err(SliceError::InvalidInitialValue(format!(
                "expected a {:?} container, got {:?}",
                self.kind,
                container.kind()
            ))),
            Some(Initial::Value(value)) => container_from_value(self.kind, value),
        }
    }
}

fn container_from_value(kind: ContainerKind, value: &Value) -> Result<Container, SliceError> {
    match (kind, value) {
        (_, Value::Null) => Ok(Container::empty(kind)),
        (ContainerKind::Collection, Value::Array(items)) => Ok(Container::Collection(items.clone())),
        (ContainerKind::NormalizedIndex, Value::Array(entities)) => Ok(Container::Index(
            EntityIndex::from_entities(entities.iter().cloned()),
        )),
        (ContainerKind::NormalizedIndex, Value::Object(_)) => serde_json::from_value(value.clone())
            .map(Container::Index)
            .map_err(|e| SliceError::InvalidInitialValue(e.to_string())),
        (kind, other) => Err(SliceError::InvalidInitialValue(format!(
            "{other} is not a valid {kind:?} value"
        ))),
    }
}

/// What a command triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Operation(Operation),
    Custom,
    /// Starts the async task of the same name; the slice itself only sees its signals.
    Task,
}

#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    kind: CommandKind,
    transition: Option<Transition>,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn action(&self, payload: impl Into<Value>) -> Action {
        Action::command(self.name.clone(), payload)
    }
}

/// Something the host runtime hands to [`Slice::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Command { command: String, payload: Value },
    Lifecycle { task: String, signal: TaskSignal },
}

impl Action {
    pub fn command(command: impl Into<String>, payload: impl Into<Value>) -> Self {
        Action::Command {
            command: command.into(),
            payload: payload.into(),
        }
    }

    pub fn lifecycle(task: impl Into<String>, signal: TaskSignal) -> Self {
        Action::Lifecycle {
            task: task.into(),
            signal,
        }
    }

    /// `command` for commands, `task/pending|fulfilled|rejected` for signals.
    pub fn type_name(&self) -> String {
        match self {
            Action::Command { command, .. } => command.clone(),
            Action::Lifecycle { task, signal } => format!("{task}/{}", signal.name()),
        }
    }
}

/// An assembled slice: initial state, commands, reducer and selectors.
#[derive(Debug)]
pub struct Slice {
    name: String,
    kind: ContainerKind,
    initial: Container,
    commands: Vec<Command>,
    lookup: HashMap<String, usize>,
    tasks: Vec<AsyncTask>,
    selectors: Selectors,
}

impl Slice {
    pub fn builder(name: impl Into<String>) -> SliceBuilder {
        SliceBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Whether the slice carries lifecycle fields.
    pub fn is_tracked(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn initial_state(&self) -> SliceState {
        if self.is_tracked() {
            SliceState::tracked(self.initial.clone())
        } else {
            SliceState::Plain(self.initial.clone())
        }
    }

    /// Commands in registration order: vocabulary operations, custom transitions, tasks.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.lookup.get(name).and_then(|&position| self.commands.get(position))
    }

    pub fn task(&self, name: &str) -> Option<&AsyncTask> {
        self.tasks.iter().find(|task| task.name() == name)
    }

    pub fn tasks(&self) -> &[AsyncTask] {
        &self.tasks
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Computes the next state. Actions the slice does not know leave the state as is.
    pub fn reduce(&self, state: SliceState, action: &Action) -> SliceState {
        match action {
            Action::Command { command, payload } => {
                match self.command(command).and_then(|c| c.transition.as_ref()) {
                    Some(transition) => {
                        trace!(slice = %self.name, command = %command, "applying command");
                        state.map_data(|data| transition.apply(data, payload))
                    }
                    None => {
                        debug!(slice = %self.name, command = %command, "ignoring command without a transition");
                        state
                    }
                }
            }
            Action::Lifecycle { task, signal } => {
                if self.task(task).is_some() {
                    trace!(slice = %self.name, action = %action.type_name(), "applying task signal");
                    state.signal(signal)
                } else {
                    debug!(slice = %self.name, task = %task, "ignoring signal from unregistered task");
                    state
                }
            }
        }
    }
}
