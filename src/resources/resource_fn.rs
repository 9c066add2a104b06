//! # Closure-backed resource (`ResourceFn`)
//!
//! [`ResourceFn`] wraps a plain closure as a [`Resource`]. Handy for tests,
//! demos, and resources whose action is a single call into the surrounding
//! system. State shared between turns goes into the closure's captures,
//! explicitly (`Arc<...>` as needed).
//!
//! ## Example
//! ```rust
//! use slotvisor::{Resource, ResourceFn, ResourceRef};
//!
//! let r: ResourceRef = ResourceFn::arc("lathe", || {
//!     // spin the lathe...
//! });
//!
//! assert_eq!(r.name(), "lathe");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::resources::resource::Resource;

/// Shared reference to a resource.
pub type ResourceRef = Arc<dyn Resource>;

/// Closure-backed resource implementation.
pub struct ResourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ResourceFn<F> {
    /// Creates a new closure-backed resource.
    ///
    /// Prefer [`ResourceFn::arc`] when you immediately need a
    /// [`ResourceRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the resource and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use slotvisor::{Resource, ResourceFn, ResourceRef};
    ///
    /// let r: ResourceRef = ResourceFn::arc("bench", || {});
    /// assert_eq!(r.name(), "bench");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Resource for ResourceFn<F>
where
    F: Fn() + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn perform(&self) {
        (self.f)()
    }
}
