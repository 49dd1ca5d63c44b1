//! Message trait for dispatched values.

/// A marker trait for values that travel through a dispatch pipeline.
///
/// Messages must be `Send + Sync + 'static` so registries and middleware can
/// be shared by a host store.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Loaded { id: u64 }
///
/// impl Message for Loaded {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Everything dispatched through Transit must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

