//! Builder for constructing a [`Coordinator`].
//!
//! The resource set is fixed here, once; there is no way to add or remove
//! slots afterwards, and no implicit teardown.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::coordinator::Coordinator;
use crate::error::BuildError;
use crate::resources::ResourceRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Coordinator`] with optional subscribers.
///
/// ## Example
/// ```
/// use slotvisor::{Coordinator, ResourceFn};
///
/// let coordinator = Coordinator::builder()
///     .add_resource(ResourceFn::arc("lathe", || {}))
///     .add_resource(ResourceFn::arc("press", || {}))
///     .build()
///     .unwrap();
///
/// assert_eq!(coordinator.slot_count(), 2);
/// ```
pub struct CoordinatorBuilder {
    resources: Vec<ResourceRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CoordinatorBuilder {
    pub(crate) fn new() -> Self {
        Self {
            resources: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Adds one resource to the slot table.
    pub fn add_resource(mut self, resource: ResourceRef) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds every resource from an iterator.
    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceRef>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive coordination events (entries, switches, cycle
    /// rotations, turns, departures) synchronously on the acting thread.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the resource set and builds the coordinator.
    ///
    /// # Errors
    /// - [`BuildError::NoResources`] for an empty set
    /// - [`BuildError::DuplicateResource`] when two resources share a name
    pub fn build(self) -> Result<Arc<Coordinator>, BuildError> {
        if self.resources.is_empty() {
            return Err(BuildError::NoResources);
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.name().to_owned()) {
                return Err(BuildError::DuplicateResource {
                    name: resource.name().to_owned(),
                });
            }
        }

        let subscribers = SubscriberSet::new(self.subscribers);
        Ok(Arc::new(Coordinator::from_parts(self.resources, subscribers)))
    }
}

impl Coordinator {
    /// Starts building a coordinator.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }
}
