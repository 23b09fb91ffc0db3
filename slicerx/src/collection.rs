//! Transition logic for collection-kind slices.
//!
//! A collection is an ordered `Vec<Value>`. Duplicates are allowed; only `upsert` looks
//! elements up by identifier.

use crate::container::shallow_merge;
use crate::identity::{has_id, is_identifier_bearing, EntityId, ID_FIELD};
use crate::operation::Operation;
use serde_json::Value;
use std::collections::HashSet;

/// Applies one vocabulary operation to a collection.
///
/// Total over every payload: anything that does not fit the operation's payload shape
/// returns the collection unchanged.
pub(crate) fn apply(operation: Operation, items: Vec<Value>, payload: &Value) -> Vec<Value> {
    match operation {
        Operation::Add => add(items, payload),
        Operation::Remove => remove(items, payload),
        Operation::Clear => Vec::new(),
        Operation::Update => update(items, payload),
        Operation::Set => set(items, payload),
        Operation::AddMany => add_many(items, payload),
        Operation::RemoveMany => remove_many(items, payload),
        Operation::Upsert => upsert(items, payload),
        Operation::Increment | Operation::Toggle => items,
    }
}

fn add(mut items: Vec<Value>, payload: &Value) -> Vec<Value> {
    items.push(payload.clone());
    items
}

fn remove(mut items: Vec<Value>, payload: &Value) -> Vec<Value> {
    if is_identifier_bearing(payload) {
        let target = &payload[ID_FIELD];
        items.retain(|item| !id_matches(item, target));
    } else {
        items.retain(|item| item != payload);
    }
    items
}

// Ids compare after normalization in every collection operation, so `1` matches `"1"`
// as it does in the index. Ids that cannot be normalized (`null`, objects) only match by
// raw equality.
fn id_matches(item: &Value, target: &Value) -> bool {
    match EntityId::from_value(target) {
        Some(id) => has_id(item, &id),
        None => item.get(ID_FIELD) == Some(target),
    }
}

fn update(mut items: Vec<Value>, payload: &Value) -> Vec<Value> {
    let Some(fields) = payload.as_object() else {
        return items;
    };

    if let Some(at) = fields.get("at") {
        let Some(value) = fields.get("value") else {
            return items;
        };
        if let Some(slot) = at
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| items.get_mut(index))
        {
            *slot = value.clone();
        }
        return items;
    }

    if let (Some(target), Some(changes)) = (fields.get(ID_FIELD), fields.get("changes")) {
        if let Some(item) = items.iter_mut().find(|item| id_matches(item, target)) {
            shallow_merge(item, changes);
        }
    }
    items
}

fn set(items: Vec<Value>, payload: &Value) -> Vec<Value> {
    match payload {
        Value::Null => Vec::new(),
        Value::Array(replacement) => replacement.clone(),
        _ => items,
    }
}

fn add_many(mut items: Vec<Value>, payload: &Value) -> Vec<Value> {
    if let Value::Array(extra) = payload {
        items.extend(extra.iter().cloned());
    }
    items
}

fn remove_many(mut items: Vec<Value>, payload: &Value) -> Vec<Value> {
    let Some(targets) = payload.as_array() else {
        return items;
    };
    let Some(first) = targets.first() else {
        return items;
    };

    if is_identifier_bearing(first) {
        let ids: HashSet<EntityId> = targets.iter().filter_map(EntityId::of).collect();
        items.retain(|item| !EntityId::of(item).is_some_and(|id| ids.contains(&id)));
    } else {
        items.retain(|item| !targets.contains(item));
    }
    items
}

fn upsert(mut items: Vec<Value>, payload: &Value) -> Vec<Value> {
    let incoming = match payload {
        Value::Array(many) => many.as_slice(),
        single => std::slice::from_ref(single),
    };

    for entity in incoming {
        let existing = EntityId::of(entity)
            .and_then(|id| items.iter().position(|item| has_id(item, &id)));
        match existing {
            Some(position) => items[position] = entity.clone(),
            None => items.push(entity.clone()),
        }
    }
    items
}
