//! The normalized-index representation and its transition logic.

use crate::container::shallow_merge;
use crate::identity::EntityId;
use crate::operation::{Operation, DEFAULT_AMOUNT, DEFAULT_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashSet};

/// Entities keyed by normalized id, plus the order they were first added in.
///
/// Invariant: `ids` holds no duplicates and names exactly the keys of `entities`.
/// Every constructor and every transition preserves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntityIndex")]
pub struct EntityIndex {
    entities: BTreeMap<EntityId, Value>,
    ids: Vec<EntityId>,
}

#[derive(Deserialize)]
struct RawEntityIndex {
    entities: BTreeMap<EntityId, Value>,
    ids: Vec<EntityId>,
}

impl From<RawEntityIndex> for EntityIndex {
    fn from(raw: RawEntityIndex) -> Self {
        EntityIndex::from_parts(raw.entities, raw.ids)
    }
}

/// The canonical empty normalized index.
pub fn entity_index() -> EntityIndex {
    EntityIndex::new()
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from caller-supplied parts, repairing it into the invariant:
    /// ids without an entity and repeated ids are dropped, entities missing from `ids`
    /// are appended in key order.
    pub fn from_parts(entities: BTreeMap<EntityId, Value>, ids: Vec<EntityId>) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut ordered: Vec<EntityId> = ids
            .into_iter()
            .filter(|id| entities.contains_key(id) && seen.insert(id.clone()))
            .collect();
        for id in entities.keys() {
            if !seen.contains(id) {
                ordered.push(id.clone());
            }
        }
        EntityIndex {
            entities,
            ids: ordered,
        }
    }

    /// Builds an index by upserting each entity in turn.
    pub fn from_entities<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut index = EntityIndex::new();
        for entity in entities {
            index.upsert(entity);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn entities(&self) -> &BTreeMap<EntityId, Value> {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Inserts or replaces an entity by its `id`. Returns `false` when the entity has no
    /// usable identifier.
    pub fn upsert(&mut self, entity: Value) -> bool {
        let Some(id) = EntityId::of(&entity) else {
            return false;
        };
        if self.entities.insert(id.clone(), entity).is_none() {
            self.ids.push(id);
        }
        true
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<Value> {
        let removed = self.entities.remove(id)?;
        self.ids.retain(|existing| existing != id);
        Some(removed)
    }

    /// Shallow-merges `changes` onto an entity. The entity stays under its key even if
    /// `changes` carries a different `id`.
    pub fn update(&mut self, id: &EntityId, changes: &Value) -> bool {
        self.entities
            .get_mut(id)
            .is_some_and(|entity| shallow_merge(entity, changes))
    }

    /// Adds `amount` to a numeric field. No-op unless the field currently holds a number.
    pub fn increment(&mut self, id: &EntityId, field: &str, amount: &Number) -> bool {
        let Some(slot) = self
            .entities
            .get_mut(id)
            .and_then(|entity| entity.get_mut(field))
        else {
            return false;
        };
        let Value::Number(current) = slot else {
            return false;
        };
        match add_numbers(current, amount) {
            Some(sum) => {
                *slot = Value::Number(sum);
                true
            }
            None => false,
        }
    }

    /// Flips a boolean field. No-op unless the field currently holds a boolean.
    pub fn toggle(&mut self, id: &EntityId, field: &str) -> bool {
        match self
            .entities
            .get_mut(id)
            .and_then(|entity| entity.get_mut(field))
        {
            Some(Value::Bool(flag)) => {
                *flag = !*flag;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.ids.clear();
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn add_numbers(current: &Number, amount: &Number) -> Option<Number> {
    if let (Some(a), Some(b)) = (current.as_i64(), amount.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Some(Number::from(sum));
        }
    }
    Number::from_f64(current.as_f64()? + amount.as_f64()?)
}

/// Applies one vocabulary operation to a normalized index.
///
/// Total over every payload: anything that does not fit the operation's payload shape
/// returns the index unchanged.
pub(crate) fn apply(operation: Operation, mut index: EntityIndex, payload: &Value) -> EntityIndex {
    match operation {
        Operation::Add | Operation::AddMany | Operation::Upsert => {
            for entity in one_or_many(payload) {
                index.upsert(entity.clone());
            }
        }
        Operation::Remove | Operation::RemoveMany => {
            for target in one_or_many(payload) {
                let id = match target {
                    Value::Object(_) => EntityId::of(target),
                    scalar => EntityId::from_value(scalar),
                };
                if let Some(id) = id {
                    index.remove(&id);
                }
            }
        }
        Operation::Update => {
            if let (Some(id), Some(changes)) = (EntityId::of(payload), payload.get("changes")) {
                index.update(&id, changes);
            }
        }
        Operation::Clear => index.clear(),
        Operation::Set => return set(index, payload),
        Operation::Increment => {
            if let Some(id) = EntityId::of(payload) {
                let field = field_of(payload);
                let amount = match payload.get("amount") {
                    None | Some(Value::Null) => Some(Number::from(DEFAULT_AMOUNT)),
                    Some(Value::Number(n)) => Some(n.clone()),
                    Some(_) => None,
                };
                if let Some(amount) = amount {
                    index.increment(&id, field, &amount);
                }
            }
        }
        Operation::Toggle => {
            if let Some(id) = EntityId::of(payload) {
                index.toggle(&id, field_of(payload));
            }
        }
    }
    index
}

fn set(index: EntityIndex, payload: &Value) -> EntityIndex {
    match payload {
        Value::Null => EntityIndex::new(),
        Value::Array(entities) => EntityIndex::from_entities(entities.iter().cloned()),
        Value::Object(_) => serde_json::from_value(payload.clone()).unwrap_or(index),
        _ => index,
    }
}

fn one_or_many(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(many) => many.as_slice(),
        single => std::slice::from_ref(single),
    }
}

fn field_of(payload: &Value) -> &str {
    payload
        .get("field")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_FIELD)
}
