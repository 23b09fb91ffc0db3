use crate::{Container, EntityIndex, Lifecycle, Phase, SliceState, TaskSignal};
use serde_json::json;

#[test]
fn test_plain_shapes() {
    let collection = SliceState::Plain(Container::Collection(vec![json!(1)]));
    assert_eq!(collection.to_value(), json!([1]));

    let index = SliceState::Plain(Container::Index(EntityIndex::from_entities([json!({"id": "a"})])));
    assert_eq!(
        index.to_value(),
        json!({"entities": {"a": {"id": "a"}}, "ids": ["a"]})
    );
}

#[test]
fn test_tracked_collection_wraps_items() {
    let state = SliceState::tracked(Container::Collection(vec![json!(1), json!(2)]));
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({"items": [1, 2], "loading": false, "error": null, "status": "idle"})
    );
}

#[test]
fn test_tracked_index_adds_fields_alongside() {
    let state = SliceState::Tracked {
        data: Container::Index(EntityIndex::new()),
        lifecycle: Lifecycle {
            loading: false,
            error: Some("nope".to_string()),
            status: Phase::Rejected,
        },
    };
    assert_eq!(
        state.to_value(),
        json!({"entities": {}, "ids": [], "loading": false, "error": "nope", "status": "rejected"})
    );
}

#[test]
fn test_signal_on_plain_state_is_ignored() {
    let state = SliceState::Plain(Container::Collection(vec![]));
    assert_eq!(state.clone().signal(&TaskSignal::Started), state);
}

#[test]
fn test_map_data_keeps_lifecycle() {
    let state = SliceState::tracked(Container::Collection(vec![])).signal(&TaskSignal::Started);
    let state = state.map_data(|_| Container::Collection(vec![json!("x")]));
    assert!(state.is_tracked());
    assert_eq!(state.data(), &Container::Collection(vec![json!("x")]));
    assert_eq!(state.to_value()["status"], json!("pending"));
}
