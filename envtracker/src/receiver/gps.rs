//! Gps receiver.
//!
//! Subscribes to push location fixes rather than polling. Satellite
//! positioning is preferred, network positioning is the fallback, and if
//! neither provider is available registration gives up without retrying.
//! Delivery thresholds are fixed at subscribe time, so a parameter change
//! is applied by tearing the subscription down and building a new one.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::GpsParams;
use crate::listener::ListenerRegistry;
use crate::platform::{
    LocationRequest, LocationSource, LocationSubscription, ProviderKind, SubscriptionId,
};
use crate::reading::Reading;

use super::SourceReceiver;

pub(crate) struct GpsReceiver {
    location: Arc<dyn LocationSource>,
    listeners: Arc<ListenerRegistry>,
    params: GpsParams,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    subscription: Option<SubscriptionId>,
}

impl GpsReceiver {
    pub(crate) fn new(
        location: Arc<dyn LocationSource>,
        listeners: Arc<ListenerRegistry>,
        params: GpsParams,
    ) -> Self {
        Self {
            location,
            listeners,
            params,
            cancel: CancellationToken::new(),
            task: None,
            subscription: None,
        }
    }

    fn pick_provider(&self) -> Option<ProviderKind> {
        if self.location.provider_available(ProviderKind::Satellite) {
            Some(ProviderKind::Satellite)
        } else if self.location.provider_available(ProviderKind::Network) {
            Some(ProviderKind::Network)
        } else {
            None
        }
    }
}

impl SourceReceiver for GpsReceiver {
    type Params = GpsParams;

    async fn register(&mut self) {
        debug!("Registering gps receiver");
        let Some(provider) = self.pick_provider() else {
            warn!("No location provider available");
            return;
        };

        let request = LocationRequest {
            provider,
            min_interval_ms: self.params.min_interval_ms,
            min_distance_m: self.params.min_distance_m,
        };
        let LocationSubscription { id, mut fixes } = self.location.subscribe(request);
        self.subscription = Some(id);
        debug!(
            %provider,
            min_interval_ms = request.min_interval_ms,
            min_distance_m = request.min_distance_m,
            "Subscribed to location fixes"
        );

        self.cancel = CancellationToken::new();
        let listeners = Arc::clone(&self.listeners);
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    fix = fixes.recv() => match fix {
                        Some(fix) => {
                            debug!(provider = %fix.provider, "Location fix received");
                            listeners.dispatch_location(Reading::now(fix));
                        }
                        None => break,
                    },
                }
            }
        }));
    }

    async fn unregister(&mut self) {
        debug!("Unregistering gps receiver");
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Gps receiver task failed: {}", e);
            }
        }
        if let Some(id) = self.subscription.take() {
            self.location.unsubscribe(id);
        }
    }

    async fn reload_configuration(&mut self, params: GpsParams) {
        if self.params == params {
            info!("Gps configuration unchanged, not reloading");
            return;
        }
        debug!(
            min_interval_ms = params.min_interval_ms,
            min_distance_m = params.min_distance_m,
            "Reloading gps configuration"
        );
        self.params = params;
        // New thresholds only apply through a fresh subscription.
        self.unregister().await;
        self.register().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::GpsLocationListener;
    use crate::platform::LocationFix;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct MockLocation {
        satellite: bool,
        network: bool,
        subscribes: AtomicUsize,
        unsubscribes: AtomicUsize,
        last_request: Mutex<Option<LocationRequest>>,
        last_unsubscribed: Mutex<Option<SubscriptionId>>,
        fix_tx: Mutex<Option<mpsc::Sender<LocationFix>>>,
        next_id: AtomicU64,
    }

    impl MockLocation {
        fn new(satellite: bool, network: bool) -> Self {
            Self {
                satellite,
                network,
                subscribes: AtomicUsize::new(0),
                unsubscribes: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                last_unsubscribed: Mutex::new(None),
                fix_tx: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }
        }

        fn push_fix(&self, fix: LocationFix) {
            let tx = self.fix_tx.lock().unwrap().clone();
            tx.expect("no active subscription")
                .try_send(fix)
                .expect("fix channel full");
        }
    }

    impl LocationSource for MockLocation {
        fn provider_available(&self, kind: ProviderKind) -> bool {
            match kind {
                ProviderKind::Satellite => self.satellite,
                ProviderKind::Network => self.network,
            }
        }

        fn subscribe(&self, request: LocationRequest) -> LocationSubscription {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            let (tx, rx) = mpsc::channel(16);
            *self.fix_tx.lock().unwrap() = Some(tx);
            LocationSubscription {
                id: SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst)),
                fixes: rx,
            }
        }

        fn unsubscribe(&self, id: SubscriptionId) {
            self.unsubscribes.fetch_add(1, Ordering::SeqCst);
            *self.last_unsubscribed.lock().unwrap() = Some(id);
        }
    }

    struct RecordingGpsListener {
        readings: Mutex<Vec<Reading<LocationFix>>>,
    }

    impl GpsLocationListener for RecordingGpsListener {
        fn on_location(&self, reading: Reading<LocationFix>) {
            self.readings.lock().unwrap().push(reading);
        }
    }

    fn fix(provider: ProviderKind) -> LocationFix {
        LocationFix {
            latitude: 52.52,
            longitude: 13.405,
            altitude_m: 34.0,
            accuracy_m: 8.0,
            speed_mps: 1.4,
            provider,
        }
    }

    async fn wait_for(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not met in time");
    }

    #[tokio::test]
    async fn test_fixes_forwarded_to_listener() {
        let location = Arc::new(MockLocation::new(true, false));
        let listeners = Arc::new(ListenerRegistry::new());
        let listener = Arc::new(RecordingGpsListener {
            readings: Mutex::new(Vec::new()),
        });
        listeners.set_gps_listener(listener.clone());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        location.push_fix(fix(ProviderKind::Satellite));
        wait_for(|| !listener.readings.lock().unwrap().is_empty()).await;
        receiver.unregister().await;

        let readings = listener.readings.lock().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].payload.latitude, 52.52);
        assert!(readings[0].timestamp_ms > 0);
    }

    #[tokio::test]
    async fn test_prefers_satellite_provider() {
        let location = Arc::new(MockLocation::new(true, true));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        receiver.unregister().await;

        let request = location.last_request.lock().unwrap().unwrap();
        assert_eq!(request.provider, ProviderKind::Satellite);
    }

    #[tokio::test]
    async fn test_falls_back_to_network_provider() {
        let location = Arc::new(MockLocation::new(false, true));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        receiver.unregister().await;

        let request = location.last_request.lock().unwrap().unwrap();
        assert_eq!(request.provider, ProviderKind::Network);
    }

    #[tokio::test]
    async fn test_no_provider_means_no_subscription() {
        let location = Arc::new(MockLocation::new(false, false));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        // Unregister after a dead registration must be harmless.
        receiver.unregister().await;

        assert_eq!(location.subscribes.load(Ordering::SeqCst), 0);
        assert_eq!(location.unsubscribes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_request_carries_thresholds() {
        let location = Arc::new(MockLocation::new(true, false));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver =
            GpsReceiver::new(location.clone(), listeners, GpsParams::new(7_000, 10.0));

        receiver.register().await;
        receiver.unregister().await;

        let request = location.last_request.lock().unwrap().unwrap();
        assert_eq!(request.min_interval_ms, 7_000);
        assert_eq!(request.min_distance_m, 10.0);
    }

    #[tokio::test]
    async fn test_unregister_closes_subscription() {
        let location = Arc::new(MockLocation::new(true, false));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        receiver.unregister().await;

        assert_eq!(location.unsubscribes.load(Ordering::SeqCst), 1);
        assert_eq!(
            *location.last_unsubscribed.lock().unwrap(),
            Some(SubscriptionId(1))
        );
    }

    #[tokio::test]
    async fn test_reload_with_same_params_keeps_subscription() {
        let location = Arc::new(MockLocation::new(true, false));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        receiver.reload_configuration(GpsParams::default()).await;
        receiver.unregister().await;

        assert_eq!(location.subscribes.load(Ordering::SeqCst), 1);
        assert_eq!(location.unsubscribes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reload_with_new_params_resubscribes() {
        let location = Arc::new(MockLocation::new(true, false));
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver = GpsReceiver::new(location.clone(), listeners, GpsParams::default());

        receiver.register().await;
        receiver.reload_configuration(GpsParams::new(1_000, 25.0)).await;

        assert_eq!(location.subscribes.load(Ordering::SeqCst), 2);
        assert_eq!(location.unsubscribes.load(Ordering::SeqCst), 1);
        let request = location.last_request.lock().unwrap().unwrap();
        assert_eq!(request.min_interval_ms, 1_000);
        assert_eq!(request.min_distance_m, 25.0);

        receiver.unregister().await;
        assert_eq!(location.unsubscribes.load(Ordering::SeqCst), 2);
    }
}
