//! # Resource abstractions.
//!
//! This module provides the external-resource seam:
//! - [`Resource`] - trait for the exclusive, reusable units the coordinator
//!   guards
//! - [`ResourceFn`] - closure-backed resource implementation
//! - [`ResourceRef`] - shared reference to a resource (`Arc<dyn Resource>`)

mod resource;
mod resource_fn;

pub use resource::Resource;
pub use resource_fn::{ResourceFn, ResourceRef};
