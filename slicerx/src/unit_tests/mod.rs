use crate::{ContainerKind, Slice, SliceState};
use serde_json::{json, Value};

mod slice_state_test;
mod slice_store_test;
mod stream_ext_test;

/// A collection slice with the full collection vocabulary.
pub fn collection_slice() -> Slice {
    Slice::builder("items")
        .operations([
            "add",
            "remove",
            "clear",
            "update",
            "set",
            "addMany",
            "removeMany",
            "upsert",
        ])
        .build()
        .unwrap()
}

/// A normalized-index slice with the full index vocabulary.
pub fn index_slice() -> Slice {
    Slice::builder("todos")
        .kind(ContainerKind::NormalizedIndex)
        .operations([
            "add",
            "remove",
            "clear",
            "update",
            "set",
            "addMany",
            "removeMany",
            "upsert",
            "increment",
            "toggle",
        ])
        .build()
        .unwrap()
}

/// Applies commands in order, starting from the slice's initial state.
pub fn run(slice: &Slice, commands: &[(&str, Value)]) -> SliceState {
    commands
        .iter()
        .fold(slice.initial_state(), |state, (name, payload)| {
            let action = slice.command(name).unwrap().action(payload.clone());
            slice.reduce(state, &action)
        })
}

pub fn todo(id: &str, title: &str) -> Value {
    json!({"id": id, "title": title, "done": false})
}
