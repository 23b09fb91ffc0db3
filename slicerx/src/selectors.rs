//! Read-only views over a slice's state.
//!
//! Which selectors exist depends on how the slice was assembled: every slice can read
//! all elements and count them, normalized-index slices add id-based reads, and slices
//! with async tasks add the lifecycle reads.

use crate::container::HasContainer;
use crate::identity::EntityId;
use crate::lifecycle::{HasLifecycle, Phase};
use crate::operation::ContainerKind;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorName {
    All,
    Count,
    Ids,
    Entities,
    ById,
    Loading,
    Error,
    Status,
}

impl SelectorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorName::All => "selectAll",
            SelectorName::Count => "selectCount",
            SelectorName::Ids => "selectIds",
            SelectorName::Entities => "selectEntities",
            SelectorName::ById => "selectById",
            SelectorName::Loading => "selectLoading",
            SelectorName::Error => "selectError",
            SelectorName::Status => "selectStatus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selectors {
    index: Option<IndexSelectors>,
    lifecycle: Option<LifecycleSelectors>,
}

impl Selectors {
    pub(crate) fn new(kind: ContainerKind, tracked: bool) -> Self {
        Selectors {
            index: (kind == ContainerKind::NormalizedIndex).then_some(IndexSelectors),
            lifecycle: tracked.then_some(LifecycleSelectors),
        }
    }

    /// Every element in display order.
    pub fn select_all<S: HasContainer>(&self, state: &S) -> Vec<Value> {
        state.container().to_vec()
    }

    pub fn select_count<S: HasContainer>(&self, state: &S) -> usize {
        state.container().len()
    }

    /// Id-based selectors, present for normalized-index slices.
    pub fn index(&self) -> Option<&IndexSelectors> {
        self.index.as_ref()
    }

    /// Lifecycle selectors, present for slices with async tasks.
    pub fn lifecycle(&self) -> Option<&LifecycleSelectors> {
        self.lifecycle.as_ref()
    }

    pub fn names(&self) -> Vec<SelectorName> {
        let mut names = vec![SelectorName::All, SelectorName::Count];
        if self.index.is_some() {
            names.extend([SelectorName::Ids, SelectorName::Entities, SelectorName::ById]);
        }
        if self.lifecycle.is_some() {
            names.extend([SelectorName::Loading, SelectorName::Error, SelectorName::Status]);
        }
        names
    }

    pub fn contains(&self, name: SelectorName) -> bool {
        self.names().contains(&name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSelectors;

impl IndexSelectors {
    pub fn select_ids<S: HasContainer>(&self, state: &S) -> Vec<EntityId> {
        state
            .container()
            .as_index()
            .map(|index| index.ids().to_vec())
            .unwrap_or_default()
    }

    pub fn select_entities<S: HasContainer>(&self, state: &S) -> BTreeMap<EntityId, Value> {
        state
            .container()
            .as_index()
            .map(|index| index.entities().clone())
            .unwrap_or_default()
    }

    pub fn select_by_id<S: HasContainer>(&self, state: &S, id: impl Into<EntityId>) -> Option<Value> {
        let id = id.into();
        state
            .container()
            .as_index()
            .and_then(|index| index.get(id.as_str()))
            .cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSelectors;

impl LifecycleSelectors {
    pub fn select_loading<S: HasLifecycle>(&self, state: &S) -> bool {
        state.lifecycle().is_some_and(|lifecycle| lifecycle.loading)
    }

    pub fn select_error<S: HasLifecycle>(&self, state: &S) -> Option<String> {
        state.lifecycle().and_then(|lifecycle| lifecycle.error.clone())
    }

    pub fn select_status<S: HasLifecycle>(&self, state: &S) -> Phase {
        state
            .lifecycle()
            .map(|lifecycle| lifecycle.status)
            .unwrap_or_default()
    }
}
