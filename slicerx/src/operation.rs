use crate::error::SliceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field targeted by `increment` and `toggle` when the payload names none.
pub const DEFAULT_FIELD: &str = "value";

/// Amount added by `increment` when the payload names none.
pub const DEFAULT_AMOUNT: i64 = 1;

/// The fixed operation vocabulary a slice can request by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Add,
    Remove,
    Clear,
    Update,
    Set,
    AddMany,
    RemoveMany,
    Upsert,
    /// Normalized-index only.
    Increment,
    /// Normalized-index only.
    Toggle,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Add,
        Operation::Remove,
        Operation::Clear,
        Operation::Update,
        Operation::Set,
        Operation::AddMany,
        Operation::RemoveMany,
        Operation::Upsert,
        Operation::Increment,
        Operation::Toggle,
    ];

    /// Looks up an operation by its vocabulary name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Clear => "clear",
            Operation::Update => "update",
            Operation::Set => "set",
            Operation::AddMany => "addMany",
            Operation::RemoveMany => "removeMany",
            Operation::Upsert => "upsert",
            Operation::Increment => "increment",
            Operation::Toggle => "toggle",
        }
    }

    /// Whether the operation exists in the vocabulary of `kind`.
    pub fn supports(&self, kind: ContainerKind) -> bool {
        match self {
            Operation::Increment | Operation::Toggle => kind == ContainerKind::NormalizedIndex,
            _ => true,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of the state a slice manages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerKind {
    /// An ordered sequence of elements.
    #[default]
    Collection,
    /// An id → entity mapping plus an id order.
    NormalizedIndex,
}

impl FromStr for ContainerKind {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collection" => Ok(ContainerKind::Collection),
            "normalizedIndex" => Ok(ContainerKind::NormalizedIndex),
            other => Err(SliceError::UnknownContainerKind(other.to_string())),
        }
    }
}

/// How command names are derived from operation names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamingMode {
    /// The bare operation name: `add`.
    #[default]
    Short,
    /// Slice name followed by the capitalized operation name: `itemsAdd`.
    Prefixed,
}

impl NamingMode {
    pub fn resolve(&self, slice_name: &str, operation: &str) -> String {
        match self {
            NamingMode::Short => operation.to_string(),
            NamingMode::Prefixed => format!("{slice_name}{}", capitalize(operation)),
        }
    }
}

impl FromStr for NamingMode {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(NamingMode::Short),
            "prefixed" => Ok(NamingMode::Prefixed),
            other => Err(SliceError::UnknownNamingMode(other.to_string())),
        }
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
