use crate::entity_index::{self, EntityIndex};
use crate::operation::{ContainerKind, Operation};
use crate::collection;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The element data a slice owns, in one of the two supported shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Container {
    Collection(Vec<Value>),
    Index(EntityIndex),
}

impl Container {
    /// The empty container of the given kind.
    pub fn empty(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Collection => Container::Collection(Vec::new()),
            ContainerKind::NormalizedIndex => Container::Index(EntityIndex::new()),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Collection(_) => ContainerKind::Collection,
            Container::Index(_) => ContainerKind::NormalizedIndex,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Container::Collection(items) => items.len(),
            Container::Index(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in display order.
    pub fn to_vec(&self) -> Vec<Value> {
        match self {
            Container::Collection(items) => items.clone(),
            Container::Index(index) => index.iter().cloned().collect(),
        }
    }

    pub fn as_index(&self) -> Option<&EntityIndex> {
        match self {
            Container::Index(index) => Some(index),
            Container::Collection(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Container::Collection(items) => Value::Array(items.clone()),
            Container::Index(index) => index.to_value(),
        }
    }

    /// Runs a vocabulary operation against this container.
    ///
    /// An operation outside the vocabulary of the container's kind leaves it unchanged.
    pub fn apply(self, operation: Operation, payload: &Value) -> Self {
        if !operation.supports(self.kind()) {
            return self;
        }
        match self {
            Container::Collection(items) => {
                Container::Collection(collection::apply(operation, items, payload))
            }
            Container::Index(index) => Container::Index(entity_index::apply(operation, index, payload)),
        }
    }
}

impl From<Vec<Value>> for Container {
    fn from(items: Vec<Value>) -> Self {
        Container::Collection(items)
    }
}

impl From<EntityIndex> for Container {
    fn from(index: EntityIndex) -> Self {
        Container::Index(index)
    }
}

/// Anything that exposes a slice's element data.
pub trait HasContainer {
    fn container(&self) -> &Container;
}

impl HasContainer for Container {
    fn container(&self) -> &Container {
        self
    }
}

/// Replaces the top-level fields of `target` with those of `changes`.
///
/// Returns `false`, leaving `target` untouched, when either side is not an object.
pub(crate) fn shallow_merge(target: &mut Value, changes: &Value) -> bool {
    match (target.as_object_mut(), changes.as_object()) {
        (Some(fields), Some(patch)) => {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
            true
        }
        _ => false,
    }
}

type TransitionFn = dyn Fn(Container, &Value) -> Container + Send + Sync;

/// A pure function from the current container and a payload to the next container.
#[derive(Clone)]
pub struct Transition(Arc<TransitionFn>);

impl Transition {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Container, &Value) -> Container + Send + Sync + 'static,
    {
        Transition(Arc::new(f))
    }

    /// The transition performing `operation`.
    pub fn for_operation(operation: Operation) -> Self {
        Transition::new(move |container, payload| container.apply(operation, payload))
    }

    pub fn apply(&self, container: Container, payload: &Value) -> Container {
        (self.0)(container, payload)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transition")
    }
}

/// Builds the transitions for the requested operation names, in request order.
///
/// Names that are not part of the vocabulary for `kind` are skipped without error, and a
/// repeated name keeps its first position.
pub fn build_transitions<I, S>(names: I, kind: ContainerKind) -> Vec<(Operation, Transition)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut transitions = Vec::new();
    for name in names {
        let name = name.as_ref();
        match Operation::parse(name).filter(|op| op.supports(kind)) {
            Some(operation) => {
                if seen.insert(operation) {
                    transitions.push((operation, Transition::for_operation(operation)));
                }
            }
            None => debug!(operation = name, ?kind, "skipping operation outside the vocabulary"),
        }
    }
    transitions
}
