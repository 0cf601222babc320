//! Location provider seam.

use tokio::sync::mpsc;

/// The kinds of location provider a platform may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Satellite positioning. Preferred when available.
    Satellite,
    /// Network-derived positioning, the fallback.
    Network,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Satellite => write!(f, "satellite"),
            ProviderKind::Network => write!(f, "network"),
        }
    }
}

/// Identifies one active location subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// One position fix from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub accuracy_m: f32,
    pub speed_mps: f32,
    /// Provider that produced this fix.
    pub provider: ProviderKind,
}

/// What to subscribe to and how often.
///
/// The thresholds are delivery filters applied by the platform: a fix is
/// delivered only after at least `min_interval_ms` has passed and the
/// position moved at least `min_distance_m` since the last delivery. They
/// are fixed for the life of a subscription; changing them means
/// unsubscribing and subscribing again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRequest {
    pub provider: ProviderKind,
    pub min_interval_ms: u64,
    pub min_distance_m: f32,
}

/// A live subscription: its identity plus the channel fixes arrive on.
///
/// The platform closes the channel if the subscription dies on its side.
pub struct LocationSubscription {
    pub id: SubscriptionId,
    pub fixes: mpsc::Receiver<LocationFix>,
}

/// Access to the host's location providers.
pub trait LocationSource: Send + Sync {
    /// True if the given provider is currently available for subscription.
    fn provider_available(&self, kind: ProviderKind) -> bool;

    /// Opens a subscription matching the request.
    fn subscribe(&self, request: LocationRequest) -> LocationSubscription;

    /// Closes the subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
