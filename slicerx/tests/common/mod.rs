use serde_json::{json, Value};
use slicerx::{ContainerKind, Slice};

#[allow(dead_code)]
pub fn collection(operations: &[&str]) -> Slice {
    Slice::builder("items")
        .operations(operations.iter().copied())
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn index(operations: &[&str]) -> Slice {
    Slice::builder("entities")
        .kind(ContainerKind::NormalizedIndex)
        .operations(operations.iter().copied())
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn entity(id: u8, value: i64) -> Value {
    json!({"id": id, "value": value})
}
