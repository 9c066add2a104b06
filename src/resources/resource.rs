//! # The external resource trait.
//!
//! A [`Resource`] is one exclusive, reusable unit guarded by the
//! coordinator. The coordinator treats it as opaque: it only needs a stable
//! [`name`](Resource::name) to address it and a blocking
//! [`perform`](Resource::perform) to invoke once per occupancy turn.

/// # One exclusive, reusable unit.
///
/// A `Resource` has a stable [`name`](Resource::name) and an opaque
/// [`perform`](Resource::perform) action. The coordinator guarantees that
/// `perform` calls of consecutive occupants of the same resource are
/// strictly ordered and never run concurrently.
///
/// # Example
/// ```
/// use slotvisor::Resource;
///
/// struct Press;
///
/// impl Resource for Press {
///     fn name(&self) -> &str { "press" }
///
///     fn perform(&self) {
///         // operate the press...
///     }
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    /// Returns a stable, human-readable resource name.
    ///
    /// Names identify resources in [`Coordinator`](crate::Coordinator)
    /// operations and must be unique within one coordinator (validated at
    /// build time).
    fn name(&self) -> &str;

    /// Performs the externally visible action of one occupancy turn.
    ///
    /// May block for as long as it needs; the coordinator's fairness window
    /// assumes it eventually returns. Runs with mutual exclusion against
    /// `perform` calls of other occupants of the same resource, so interior
    /// mutability behind the shared reference is safe here.
    fn perform(&self);
}
