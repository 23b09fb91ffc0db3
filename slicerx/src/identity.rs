use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Field every entity exposes its identifier under.
pub const ID_FIELD: &str = "id";

/// A normalized entity identifier.
///
/// Identifiers are always string keys: numeric identifiers are rendered in their decimal
/// form, so `1` and `"1"` address the same entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Normalizes a JSON scalar into an identifier.
    ///
    /// Returns `None` for `null`, arrays and objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(EntityId(s.clone())),
            Value::Number(n) => Some(EntityId(render_number(n))),
            Value::Bool(b) => Some(EntityId(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Reads and normalizes the `id` field of an object.
    pub fn of(entity: &Value) -> Option<Self> {
        entity.get(ID_FIELD).and_then(EntityId::from_value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Integral floats render without a fraction so `1.0` and `1` share a key.
fn render_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId(value)
    }
}

macro_rules! entity_id_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for EntityId {
            fn from(value: $t) -> Self {
                EntityId(value.to_string())
            }
        })*
    };
}

entity_id_from_int!(i32, i64, u32, u64, usize);

/// Whether a payload is "identifier-bearing": a JSON object exposing an `id` key.
///
/// This is the single shape check that decides between value-based and
/// identifier-based filtering for `remove` and `removeMany`. The key only has to be
/// present; its value may be anything, `null` included.
pub fn is_identifier_bearing(payload: &Value) -> bool {
    payload
        .as_object()
        .is_some_and(|object| object.contains_key(ID_FIELD))
}

/// Whether `entity` carries an identifier equal to `id` after normalization.
pub(crate) fn has_id(entity: &Value, id: &EntityId) -> bool {
    EntityId::of(entity).is_some_and(|own| &own == id)
}
