//! Listener return values.

use crate::error::BoxError;

/// What a listener asks the middleware to do with the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookResult {
    /// Keep going: the event is forwarded unless it carries the stop marker.
    #[default]
    Next,
    /// Swallow the event once every listener ran.
    Stop,
}

/// Trait for converting a listener's return value into a [`HookResult`].
///
/// # Default Implementations
///
/// - `()` → `Next`
/// - `bool` → `true` = Stop, `false` = Next
/// - `HookResult` → As is
/// - `Result<T, E>` → Delegates to inner `T` or propagates the error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a listener",
    label = "missing `IntoHookResult` implementation",
    note = "Listeners return `()`, `bool`, `HookResult` or a `Result` of those."
)]
pub trait IntoHookResult {
    /// Convert into propagation behavior and optional error.
    fn into_hook_result(self) -> Result<HookResult, BoxError>;
}

impl IntoHookResult for () {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(HookResult::Next)
    }
}

impl IntoHookResult for bool {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(if self {
            HookResult::Stop
        } else {
            HookResult::Next
        })
    }
}

impl IntoHookResult for HookResult {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(self)
    }
}

impl<T, E> IntoHookResult for Result<T, E>
where
    T: IntoHookResult,
    E: Into<BoxError>,
{
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        match self {
            Ok(t) => t.into_hook_result(),
            Err(e) => Err(e.into()),
        }
    }
}
