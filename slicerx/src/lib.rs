//! Declarative state slices for reactive MVI stores.
//!
//! A [`Slice`] is assembled from a name, an initial value and a list of operation names.
//! It provides the reducer, the commands that drive it and the selectors that read its
//! state. Slices manage either an ordered collection or a normalized id index, and
//! registering an [`AsyncTask`] adds busy/error/status lifecycle fields to either shape.
//! [`SliceStore`] hosts a slice on a [`StateStore`].

mod async_error;
mod collection;
mod container;
mod entity_index;
mod error;
mod identity;
mod lifecycle;
mod operation;
mod selectors;
mod slice;
mod slice_state;
mod slice_store;
mod state_store;
mod stream_ext;
mod task;

#[cfg(test)]
mod unit_tests;

pub use async_error::*;
pub use container::{build_transitions, Container, HasContainer, Transition};
pub use entity_index::{entity_index, EntityIndex};
pub use error::SliceError;
pub use identity::{is_identifier_bearing, EntityId, ID_FIELD};
pub use lifecycle::*;
pub use operation::*;
pub use selectors::*;
pub use slice::*;
pub use slice_state::*;
pub use slice_store::*;
pub use state_store::*;
pub use stream_ext::*;
pub use task::*;

pub trait State: Clone + Send + Sync + 'static {}
