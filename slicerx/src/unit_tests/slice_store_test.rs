use crate::unit_tests::todo;
use crate::{
    Action, AsyncError, AsyncTask, ContainerKind, EntityId, Phase, Rejection, Slice, SliceStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

fn todo_store(release: Arc<Notify>) -> SliceStore {
    let slice = Slice::builder("todos")
        .kind(ContainerKind::NormalizedIndex)
        .operations(["add", "remove", "toggle"])
        .task(AsyncTask::new("fetchTodos", move |_| {
            let release = release.clone();
            async move {
                release.notified().await;
                Ok::<_, AsyncError>(json!([]))
            }
        }))
        .task(AsyncTask::new("saveTodo", |argument: Value| async move {
            let has_title = argument.get("title").and_then(Value::as_str).is_some();
            if has_title {
                Ok(argument)
            } else {
                Err(Rejection::with_value("title is required"))
            }
        }))
        .build()
        .unwrap();
    SliceStore::new(slice)
}

#[tokio::test]
async fn test_dispatch_runs_reducer() -> Result<(), AsyncError> {
    let store = todo_store(Arc::new(Notify::new()));
    store.send("add", todo("a", "A"))?;
    store.send("add", todo("b", "B"))?;
    store.dispatch(Action::command("toggle", json!({"id": "a", "field": "done"})))?;
    store.send("remove", json!("b"))?;

    let state = store.await_state().await?;
    let index = store.slice().selectors().index().unwrap();
    assert_eq!(index.select_ids(&state), vec![EntityId::from("a")]);
    assert_eq!(
        index.select_by_id(&state, "a"),
        Some(json!({"id": "a", "title": "A", "done": true}))
    );
    Ok(())
}

#[tokio::test]
async fn test_send_unknown_command_fails() {
    let store = todo_store(Arc::new(Notify::new()));
    assert_eq!(
        store.send("bogus", Value::Null),
        Err(AsyncError::error("unknown command: bogus"))
    );
}

#[tokio::test]
async fn test_task_goes_pending_then_fulfilled() -> Result<(), AsyncError> {
    let release = Arc::new(Notify::new());
    let store = todo_store(release.clone());
    let lifecycle = *store.slice().selectors().lifecycle().unwrap();

    assert_eq!(lifecycle.select_status(&store.get_state()), Phase::Idle);

    let handle = store.run_task("fetchTodos", Value::Null);
    loop {
        let state = store.await_state().await?;
        if lifecycle.select_status(&state) == Phase::Pending {
            assert!(lifecycle.select_loading(&state));
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }

    release.notify_one();
    handle.await.unwrap()?;

    let state = store.await_state().await?;
    assert_eq!(lifecycle.select_status(&state), Phase::Fulfilled);
    assert!(!lifecycle.select_loading(&state));
    assert_eq!(lifecycle.select_error(&state), None);
    Ok(())
}

#[tokio::test]
async fn test_task_rejection_becomes_failure_reason() -> Result<(), AsyncError> {
    let store = todo_store(Arc::new(Notify::new()));
    let lifecycle = *store.slice().selectors().lifecycle().unwrap();

    store.run_task("saveTodo", json!({"id": "x"})).await.unwrap()?;
    let state = store.await_state().await?;
    assert_eq!(lifecycle.select_status(&state), Phase::Rejected);
    assert_eq!(
        lifecycle.select_error(&state),
        Some("title is required".to_string())
    );

    store
        .run_task("saveTodo", json!({"id": "x", "title": "X"}))
        .await
        .unwrap()?;
    let state = store.await_state().await?;
    assert_eq!(lifecycle.select_status(&state), Phase::Fulfilled);
    assert_eq!(lifecycle.select_error(&state), None);
    // Resolved values are not merged into the container
    assert_eq!(store.slice().selectors().select_count(&state), 0);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_task_is_rejected() -> Result<(), AsyncError> {
    let store = todo_store(Arc::new(Notify::new()));
    let token = CancellationToken::new();
    let handle = store.run_task_cancellable("fetchTodos", Value::Null, token.clone());
    sleep(Duration::from_millis(5)).await;
    token.cancel();
    handle.await.unwrap()?;

    let state = store.await_state().await?;
    let lifecycle = store.slice().selectors().lifecycle().unwrap();
    assert_eq!(lifecycle.select_status(&state), Phase::Rejected);
    assert_eq!(
        lifecycle.select_error(&state),
        Some("Task was cancelled!".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_timed_out_task_is_rejected() -> Result<(), AsyncError> {
    let store = todo_store(Arc::new(Notify::new()));
    store
        .run_task_with_timeout("fetchTodos", Value::Null, Duration::from_millis(5))
        .await
        .unwrap()?;

    let state = store.await_state().await?;
    let lifecycle = store.slice().selectors().lifecycle().unwrap();
    assert_eq!(
        lifecycle.select_error(&state),
        Some("deadline has elapsed!".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_task_errors() {
    let store = todo_store(Arc::new(Notify::new()));
    let result = store.run_task("nope", Value::Null).await.unwrap();
    assert_eq!(result, Err(AsyncError::error("unknown task: nope")));
    assert_eq!(store.get_state(), store.slice().initial_state());
}

#[tokio::test]
async fn test_send_task_command_starts_task() -> Result<(), AsyncError> {
    let store = todo_store(Arc::new(Notify::new()));
    store.send("saveTodo", json!({"title": 1}))?;

    let lifecycle = *store.slice().selectors().lifecycle().unwrap();
    loop {
        let state = store.await_state().await?;
        if lifecycle.select_status(&state).is_settled() {
            assert_eq!(lifecycle.select_status(&state), Phase::Rejected);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}
