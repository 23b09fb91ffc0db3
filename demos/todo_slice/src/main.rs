use crate::tracing_setup::tracing_init;
use futures_signals::signal::SignalExt;
use serde_json::{json, Value};
use slicerx::{
    AsyncError, AsyncTask, Container, EntityIndex, HasLifecycle, Phase, Rejection, SliceOptions,
    SliceStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

mod tracing_setup;

const OPTIONS: &str = r#"{
    "name": "todos",
    "containerKind": "normalizedIndex",
    "operations": ["add", "remove", "toggle", "clear", "archive"],
    "namingMode": "prefixed"
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init()?;

    let attempts = Arc::new(AtomicUsize::new(0));
    let slice = SliceOptions::from_json(OPTIONS)?
        .into_builder()
        .custom("completeAll", |container, _| match container {
            Container::Index(index) => {
                let done: Vec<Value> = index
                    .iter()
                    .map(|todo| {
                        let mut todo = todo.clone();
                        if let Some(fields) = todo.as_object_mut() {
                            fields.insert("done".to_string(), Value::Bool(true));
                        }
                        todo
                    })
                    .collect();
                Container::Index(EntityIndex::from_entities(done))
            }
            other => other,
        })
        .task(AsyncTask::new("syncTodos", move |todos: Value| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                sleep(Duration::from_millis(500)).await;
                if attempt == 0 {
                    Err(Rejection::with_value("server unavailable"))
                } else {
                    Ok(todos)
                }
            }
        }))
        .build()?;

    for command in slice.commands() {
        info!("  Main thread | command {:<16} {:?}", command.name(), command.kind());
    }

    let store = Arc::new(SliceStore::new(slice));
    let store_clone = store.clone();

    tokio::task::spawn(async move {
        for (id, title) in [(1, "Build a Todo App"), (2, "Read Rust Book"), (3, "Have breakfast")] {
            store_clone.send("todosAdd", json!({"id": id, "title": title, "done": false}))?;
        }
        sleep(Duration::from_millis(300)).await;
        store_clone.send("todosToggle", json!({"id": 3, "field": "done"}))?;
        sleep(Duration::from_millis(300)).await;
        store_clone.send("todosRemove", json!(2))?;
        sleep(Duration::from_millis(300)).await;

        let snapshot = store_clone.await_state().await?.data().to_value();
        store_clone
            .run_task("syncTodos", snapshot.clone())
            .await
            .map_err(|e| AsyncError::error(e.to_string()))??;
        sleep(Duration::from_millis(300)).await;
        store_clone.send("todosCompleteAll", Value::Null)?;
        store_clone
            .run_task("syncTodos", snapshot)
            .await
            .map_err(|e| AsyncError::error(e.to_string()))??;
        sleep(Duration::from_millis(300)).await;
        store_clone.send("todosClear", Value::Null)?;
        Ok::<(), AsyncError>(())
    });

    let selectors = *store.slice().selectors();
    store
        .store()
        .to_signal()
        .stop_if(move |state| {
            selectors.select_count(state) == 0
                && state.lifecycle().is_some_and(|l| l.status == Phase::Fulfilled)
        })
        .for_each(move |state| {
            let lifecycle = state.lifecycle().cloned().unwrap_or_default();
            info!(
                "  Main thread | status: {:<9} loading: {:<5} todos: {}",
                lifecycle.status.as_str(),
                lifecycle.loading,
                state.data().to_value()
            );
            if let Some(reason) = lifecycle.error {
                warn!("  Main thread | last sync failed: {}", reason);
            }
            async {}
        })
        .await;

    info!("=================================");
    info!("  Main thread | Finish");
    Ok(())
}
