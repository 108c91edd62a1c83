//! Liveness probe trait abstraction.

use async_trait::async_trait;

/// A single reachability check against the backend.
///
/// Causes of failure are not distinguished: a non-success status and a
/// transport error both report `false`.
///
/// # Example
///
/// ```ignore
/// use clearpath::traits::HealthProbe;
///
/// async fn is_up<P: HealthProbe>(probe: &P) -> bool {
///     probe.probe().await
/// }
/// ```
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> bool;
}
