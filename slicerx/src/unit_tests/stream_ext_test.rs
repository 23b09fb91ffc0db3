use crate::{
    AsyncError, AsyncTask, HasLifecycle, Lifecycle, Phase, Slice, SliceStore, SliceStreamExt,
    State, StateStore,
};
use futures::StreamExt;
use futures_signals::signal::SignalExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

#[derive(Clone, Debug, Default, PartialEq)]
struct Progress {
    data: i32,
}

impl State for Progress {}

#[tokio::test]
async fn test_stop_if_ends_after_matching_item() -> Result<(), AsyncError> {
    let store = Arc::new(StateStore::new(Progress::default()));

    let store_clone = store.clone();
    tokio::spawn(async move {
        for data in 1..=5 {
            tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
            store_clone.set_state(move |_| Progress { data })?;
        }
        Ok::<(), AsyncError>(())
    });

    let seen: Vec<i32> = store
        .to_stream()
        .stop_if(|state| state.data >= 3)
        .map(|state| state.data)
        .collect()
        .await;

    assert_eq!(seen.last(), Some(&3));
    assert!(seen.iter().all(|data| *data <= 3));
    Ok(())
}

#[tokio::test]
async fn test_stop_if_on_finished_stream() {
    let items: Vec<i32> = futures::stream::iter(vec![1, 2])
        .stop_if(|&value| value > 5)
        .collect()
        .await;
    assert_eq!(items, vec![1, 2]);
}

#[tokio::test]
async fn test_stop_if_with_signal() {
    let items: Vec<i32> = futures_signals::signal::always(7)
        .to_stream()
        .stop_if(|&value| value == 7)
        .collect()
        .await;
    assert_eq!(items, vec![7]);
}

fn gated_store(release: Arc<Notify>) -> SliceStore {
    let slice = Slice::builder("items")
        .task(AsyncTask::new("load", move |_| {
            let release = release.clone();
            async move {
                release.notified().await;
                Some(json!(["a"]))
            }
        }))
        .build()
        .unwrap();
    SliceStore::new(slice)
}

async fn wait_for_phase(store: &SliceStore, phase: Phase) -> Result<(), AsyncError> {
    loop {
        let state = store.await_state().await?;
        if state.lifecycle().map(|l| l.status) == Some(phase) {
            return Ok(());
        }
        sleep(Duration::from_millis(1)).await;
    }
}

fn collect_phases(store: &SliceStore) -> JoinHandle<Vec<Phase>> {
    let states = store.store().to_stream().until_settled();
    tokio::spawn(
        states
            .map(|state| state.lifecycle().map(|l| l.status).unwrap_or_default())
            .collect::<Vec<Phase>>(),
    )
}

#[tokio::test]
async fn test_until_settled_follows_a_task() -> Result<(), AsyncError> {
    let release = Arc::new(Notify::new());
    let store = gated_store(release.clone());
    let phases = collect_phases(&store);

    store.send("load", json!(null))?;
    wait_for_phase(&store, Phase::Pending).await?;
    sleep(Duration::from_millis(5)).await;
    release.notify_one();

    let phases = timeout(Duration::from_secs(5), phases).await.unwrap().unwrap();
    assert!(phases.contains(&Phase::Pending));
    assert_eq!(phases.last(), Some(&Phase::Fulfilled));
    Ok(())
}

#[tokio::test]
async fn test_until_settled_waits_for_a_repeated_task() -> Result<(), AsyncError> {
    let release = Arc::new(Notify::new());
    let store = gated_store(release.clone());

    store.send("load", json!(null))?;
    release.notify_one();
    wait_for_phase(&store, Phase::Fulfilled).await?;

    let phases = collect_phases(&store);
    sleep(Duration::from_millis(5)).await;
    assert!(!phases.is_finished());

    store.send("load", json!(null))?;
    wait_for_phase(&store, Phase::Pending).await?;
    sleep(Duration::from_millis(5)).await;
    release.notify_one();

    let phases = timeout(Duration::from_secs(5), phases).await.unwrap().unwrap();
    assert_eq!(phases.first(), Some(&Phase::Fulfilled));
    assert!(phases.contains(&Phase::Pending));
    assert_eq!(phases.last(), Some(&Phase::Fulfilled));
    Ok(())
}

#[tokio::test]
async fn test_until_settled_ignores_settled_states_before_pending() {
    let rejected = Lifecycle {
        loading: false,
        error: Some("x".to_string()),
        status: Phase::Rejected,
    };
    let pending = Lifecycle {
        loading: true,
        error: None,
        status: Phase::Pending,
    };
    let fulfilled = Lifecycle {
        loading: false,
        error: None,
        status: Phase::Fulfilled,
    };
    let items: Vec<Lifecycle> = futures::stream::iter(vec![
        rejected.clone(),
        pending.clone(),
        fulfilled.clone(),
        Lifecycle::default(),
    ])
    .until_settled()
    .collect()
    .await;
    assert_eq!(items, vec![rejected, pending, fulfilled]);
}
