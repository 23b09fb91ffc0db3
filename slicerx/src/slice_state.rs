use crate::container::{Container, HasContainer};
use crate::lifecycle::{HasLifecycle, Lifecycle, TaskSignal};
use crate::State;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Field that holds the element sequence of a tracked collection.
pub const ITEMS_FIELD: &str = "items";

/// The full representation of a slice.
///
/// A slice without async tasks holds its container as is. A slice with tasks also
/// carries the lifecycle fields; transitions only ever see `data`.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceState {
    Plain(Container),
    Tracked { data: Container, lifecycle: Lifecycle },
}

impl State for SliceState {}

impl SliceState {
    pub fn tracked(data: Container) -> Self {
        SliceState::Tracked {
            data,
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self, SliceState::Tracked { .. })
    }

    pub fn data(&self) -> &Container {
        match self {
            SliceState::Plain(data) | SliceState::Tracked { data, .. } => data,
        }
    }

    /// Replaces the container through `transition`, keeping any lifecycle fields.
    pub fn map_data<F>(self, transition: F) -> Self
    where
        F: FnOnce(Container) -> Container,
    {
        match self {
            SliceState::Plain(data) => SliceState::Plain(transition(data)),
            SliceState::Tracked { data, lifecycle } => SliceState::Tracked {
                data: transition(data),
                lifecycle,
            },
        }
    }

    /// Applies a task signal. Untracked states are returned unchanged.
    pub fn signal(self, signal: &TaskSignal) -> Self {
        match self {
            SliceState::Tracked { data, lifecycle } => SliceState::Tracked {
                data,
                lifecycle: lifecycle.after(signal),
            },
            plain => plain,
        }
    }

    /// The JSON shape of the representation.
    ///
    /// A tracked collection nests its sequence under `items` next to the lifecycle
    /// fields; a tracked index gets the lifecycle fields beside `entities` and `ids`.
    pub fn to_value(&self) -> Value {
        match self {
            SliceState::Plain(data) => data.to_value(),
            SliceState::Tracked { data, lifecycle } => {
                let mut fields = match data.to_value() {
                    Value::Object(fields) => fields,
                    items => {
                        let mut fields = Map::new();
                        fields.insert(ITEMS_FIELD.to_string(), items);
                        fields
                    }
                };
                fields.insert("loading".to_string(), Value::Bool(lifecycle.loading));
                fields.insert(
                    "error".to_string(),
                    lifecycle.error.clone().map_or(Value::Null, Value::String),
                );
                fields.insert(
                    "status".to_string(),
                    Value::String(lifecycle.status.as_str().to_string()),
                );
                Value::Object(fields)
            }
        }
    }
}

impl Serialize for SliceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl HasContainer for SliceState {
    fn container(&self) -> &Container {
        self.data()
    }
}

impl HasLifecycle for SliceState {
    fn lifecycle(&self) -> Option<&Lifecycle> {
        match self {
            SliceState::Plain(_) => None,
            SliceState::Tracked { lifecycle, .. } => Some(lifecycle),
        }
    }
}
