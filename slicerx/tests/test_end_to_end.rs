mod common;

use serde_json::{json, Value};
use slicerx::{
    AsyncError, AsyncTask, NamingMode, Phase, Slice, SliceOptions, SliceStore,
};

#[test]
fn test_collection_add_remove_clear() {
    let slice = common::collection(&["add", "remove", "clear"]);
    let mut state = slice.initial_state();
    for (name, payload) in [("add", json!(1)), ("add", json!(2)), ("remove", json!(1))] {
        state = slice.reduce(state, &slice.command(name).unwrap().action(payload));
    }
    assert_eq!(slice.selectors().select_all(&state), vec![json!(2)]);

    state = slice.reduce(state, &slice.command("clear").unwrap().action(Value::Null));
    assert_eq!(slice.selectors().select_all(&state), Vec::<Value>::new());
    assert_eq!(slice.selectors().select_count(&state), 0);
}

#[test]
fn test_index_add_same_id_twice() {
    let slice = common::index(&["add"]);
    let add = slice.command("add").unwrap();
    let state = slice.reduce(slice.initial_state(), &add.action(json!({"id": "a", "name": "A"})));
    let state = slice.reduce(state, &add.action(json!({"id": "a", "name": "Z"})));

    let index = slice.selectors().index().unwrap();
    assert_eq!(
        index.select_by_id(&state, "a"),
        Some(json!({"id": "a", "name": "Z"}))
    );
    assert_eq!(slice.selectors().select_count(&state), 1);
}

#[test]
fn test_prefixed_names_and_bogus_operation() {
    let slice = Slice::builder("items")
        .operations(["add", "bogus"])
        .naming(NamingMode::Prefixed)
        .build()
        .unwrap();
    let names: Vec<&str> = slice.commands().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["itemsAdd"]);
}

#[tokio::test]
async fn test_store_with_fetch_task() -> Result<(), AsyncError> {
    let slice = SliceOptions::from_json(
        r#"{"name": "users", "containerKind": "normalizedIndex", "operations": ["set", "update"]}"#,
    )
    .unwrap()
    .into_builder()
    .task(AsyncTask::new("fetchUsers", |_| async {
        Ok::<_, AsyncError>(json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Linus"}]))
    }))
    .build()
    .unwrap();
    let store = SliceStore::new(slice);

    store.run_task("fetchUsers", Value::Null).await.unwrap()?;
    let state = store.await_state().await?;
    let lifecycle = store.slice().selectors().lifecycle().unwrap();
    assert_eq!(lifecycle.select_status(&state), Phase::Fulfilled);
    assert_eq!(store.slice().selectors().select_count(&state), 0);

    // Storing fetched data is the caller's job
    store.send("set", json!([{"id": 1, "name": "Ada"}]))?;
    store.send("update", json!({"id": 1, "changes": {"name": "Ada L."}}))?;
    let state = store.await_state().await?;
    assert_eq!(
        state.to_value(),
        json!({
            "entities": {"1": {"id": 1, "name": "Ada L."}},
            "ids": ["1"],
            "loading": false,
            "error": null,
            "status": "fulfilled"
        })
    );
    Ok(())
}
