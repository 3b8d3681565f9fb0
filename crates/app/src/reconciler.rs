//! Reconciliation loop: populate, pull, settle.
//!
//! Each cycle syncs the store with the registry, reads hardware state for
//! every device (plus whatever its state providers report), and publishes
//! whatever changed. Failures are logged per device and never stop the loop.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use homectl_domain::capability::StateMap;
use homectl_domain::device::Device;
use homectl_domain::error::{ControlError, RemoteError, VendorError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::factory::DeviceFactory;
use crate::ports::{DeviceRegistry, EventPublisher, StateProvider, VendorAdapter, VendorPayload};
use crate::store::DeviceStore;

/// Outcome of the populate phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub added: usize,
    /// Known devices rebuilt because their header changed.
    pub refreshed: usize,
    pub removed: usize,
}

/// Outcome of the pull phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Outcome of a whole cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// `None` when the registry could not be reached.
    pub populate: Option<PopulateReport>,
    pub pull: PullReport,
    pub published: usize,
}

/// What one device's pull brought back.
struct Pulled {
    payload: VendorPayload,
    provided: StateMap,
}

/// Keeps the store in line with the registry and the hardware.
pub struct Reconciler<R, V, S, P> {
    controller_name: String,
    factory: DeviceFactory,
    store: Arc<DeviceStore>,
    registry: R,
    vendor: V,
    providers: S,
    publisher: P,
    vendor_timeout: Duration,
    remote_timeout: Duration,
}

impl<R, V, S, P> Reconciler<R, V, S, P>
where
    R: DeviceRegistry + Send + Sync,
    V: VendorAdapter + Send + Sync,
    S: StateProvider + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        controller_name: impl Into<String>,
        factory: DeviceFactory,
        store: Arc<DeviceStore>,
        registry: R,
        vendor: V,
        providers: S,
        publisher: P,
        vendor_timeout: Duration,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            controller_name: controller_name.into(),
            factory,
            store,
            registry,
            vendor,
            providers,
            publisher,
            vendor_timeout,
            remote_timeout,
        }
    }

    /// Sync the store with the registry.
    ///
    /// New headers become devices. Known devices whose header changed are
    /// rebuilt through [`DeviceStore::upsert`] and keep their local state.
    /// Devices the registry no longer lists are removed.
    ///
    /// # Errors
    ///
    /// Returns the [`RemoteError`] when the registry cannot be read; the
    /// store is left untouched.
    #[tracing::instrument(skip(self), fields(controller = %self.controller_name))]
    pub async fn populate(&self) -> Result<PopulateReport, RemoteError> {
        let headers = self.registry.list_devices(&self.controller_name).await?;
        let listed: HashSet<&str> = headers.iter().map(|h| h.identifier.as_str()).collect();

        let mut report = PopulateReport::default();
        for identifier in self.store.identifiers() {
            if !listed.contains(identifier.as_str()) {
                self.store.remove(&identifier);
                tracing::info!(device = %identifier, "device no longer registered, removed");
                report.removed += 1;
            }
        }

        let mut seen = HashSet::with_capacity(headers.len());
        for header in &headers {
            if !seen.insert(header.identifier.as_str()) {
                tracing::warn!(device = %header.identifier, "skipping duplicate header");
                continue;
            }
            match self.store.find_by_id(&header.identifier) {
                None => match self.store.insert(self.factory.build(header.clone())) {
                    Ok(()) => report.added += 1,
                    Err(err) => tracing::warn!(%err, "skipping duplicate header"),
                },
                Some(known) if known.header() != header => {
                    self.store.upsert(self.factory.build(header.clone()));
                    tracing::info!(device = %header.identifier, "registry header changed, device rebuilt");
                    report.refreshed += 1;
                }
                Some(_) => {}
            }
        }
        Ok(report)
    }

    /// Read hardware state for every stored device, concurrently.
    ///
    /// Devices with state providers also ask each of them, in declaration
    /// order; their answers override the vendor's and a later provider wins
    /// over an earlier one. Any failing source fails the whole device.
    #[tracing::instrument(skip(self))]
    pub async fn pull(&self) -> PullReport {
        let devices = self.store.find_all();
        let results = join_all(devices.iter().map(|device| self.fetch(device))).await;

        let mut report = PullReport::default();
        for (device, result) in devices.iter().zip(results) {
            let pulled = match result {
                Ok(pulled) => pulled,
                Err(err) => {
                    tracing::warn!(device = %device.identifier(), error = %err, "failed to pull state");
                    report.failed += 1;
                    continue;
                }
            };
            match self.store.update(device.identifier(), |d| {
                d.apply_remote_state(&pulled.payload);
                d.merge_state(&pulled.provided);
            }) {
                Ok(()) => report.succeeded += 1,
                Err(err) => {
                    tracing::debug!(%err, "device removed during pull");
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn fetch(&self, device: &Device) -> Result<Pulled, ControlError> {
        let payload = tokio::time::timeout(
            self.vendor_timeout,
            self.vendor.fetch_state(device.attributes()),
        )
        .await
        .map_err(|_| VendorError::Timeout(self.vendor_timeout))??;
        let provided = self.provided_state(device).await?;
        Ok(Pulled { payload, provided })
    }

    async fn provided_state(&self, device: &Device) -> Result<StateMap, RemoteError> {
        let mut state = StateMap::new();
        for provider in &device.header().state_providers {
            let provided = tokio::time::timeout(
                self.remote_timeout,
                self.providers.provided_state(provider, device.identifier()),
            )
            .await
            .map_err(|_| RemoteError::Timeout {
                target: provider.clone(),
            })??;
            state.extend(provided);
        }
        Ok(state)
    }

    /// Flush the store and publish the resulting events.
    pub async fn settle(&self) -> usize {
        self.store.settle(&self.publisher).await
    }

    /// Run populate, pull and settle once.
    pub async fn run_cycle(&self) -> CycleReport {
        let populate = match self.populate().await {
            Ok(report) => Some(report),
            Err(err) => {
                tracing::warn!(error = %err, "registry unavailable, keeping known devices");
                None
            }
        };
        let pull = self.pull().await;
        let published = self.settle().await;
        tracing::debug!(
            devices = self.store.len(),
            pulled = pull.succeeded,
            failed = pull.failed,
            published,
            "reconciliation cycle complete"
        );
        CycleReport {
            populate,
            pull,
            published,
        }
    }
}

impl<R, V, S, P> Reconciler<R, V, S, P>
where
    R: DeviceRegistry + Send + Sync + 'static,
    V: VendorAdapter + Send + Sync + 'static,
    S: StateProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Run a cycle now and then every `interval`, forever.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use homectl_domain::capability::BaseShape;
    use homectl_domain::event::DeviceEvent;
    use homectl_domain::header::DeviceHeader;
    use serde_json::json;

    use super::*;
    use crate::testing::{
        CONTROLLER, FakeRegistry, FakeStateProvider, FakeVendor, RecordingPublisher, header,
    };

    type TestReconciler = Reconciler<
        Arc<FakeRegistry>,
        Arc<FakeVendor>,
        Arc<FakeStateProvider>,
        Arc<RecordingPublisher>,
    >;

    struct Harness {
        store: Arc<DeviceStore>,
        registry: Arc<FakeRegistry>,
        vendor: Arc<FakeVendor>,
        providers: Arc<FakeStateProvider>,
        publisher: Arc<RecordingPublisher>,
        reconciler: TestReconciler,
    }

    fn harness(registry: FakeRegistry, vendor: FakeVendor) -> Harness {
        harness_with_providers(registry, vendor, FakeStateProvider::default())
    }

    fn harness_with_providers(
        registry: FakeRegistry,
        vendor: FakeVendor,
        providers: FakeStateProvider,
    ) -> Harness {
        let store = Arc::new(DeviceStore::new());
        let registry = Arc::new(registry);
        let vendor = Arc::new(vendor);
        let providers = Arc::new(providers);
        let publisher = Arc::new(RecordingPublisher::default());
        let reconciler = Reconciler::new(
            CONTROLLER,
            DeviceFactory::new(BaseShape::Light),
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&vendor),
            Arc::clone(&providers),
            Arc::clone(&publisher),
            Duration::from_millis(50),
            Duration::from_millis(50),
        );
        Harness {
            store,
            registry,
            vendor,
            providers,
            publisher,
            reconciler,
        }
    }

    fn provided(identifier: &str, providers: &[&str]) -> DeviceHeader {
        let mut header = header(identifier, &[]);
        header.state_providers = providers.iter().map(|p| (*p).to_string()).collect();
        header
    }

    #[tokio::test]
    async fn should_publish_added_colour_light_after_first_cycle() {
        let h = harness(
            FakeRegistry::with(vec![header("light1", &["color"])]),
            FakeVendor::default().with_state("light1", json!({ "hue": 0, "saturation": 0 })),
        );

        let report = h.reconciler.run_cycle().await;

        assert_eq!(report.pull, PullReport { succeeded: 1, failed: 0 });
        let events = h.publisher.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let DeviceEvent::DeviceAdded { identifier, state } = &events[0].payload else {
            panic!("expected device-added, got {:?}", events[0]);
        };
        assert_eq!(identifier, "light1");
        assert_eq!(state["color"], json!({ "hue": 0, "saturation": 0 }));
    }

    #[tokio::test]
    async fn should_publish_nothing_when_second_cycle_sees_no_change() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[])]),
            FakeVendor::default().with_state("lamp", json!({ "on": true })),
        );
        h.reconciler.run_cycle().await;
        let report = h.reconciler.run_cycle().await;
        assert_eq!(report.published, 0);
        assert_eq!(h.publisher.topics(), ["device-added.lamp"]);
    }

    #[tokio::test]
    async fn should_leave_known_devices_alone_when_header_unchanged() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[])]),
            FakeVendor::default().with_state("lamp", json!({ "brightness": 42 })),
        );
        h.reconciler.run_cycle().await;

        let populate = h.reconciler.populate().await.unwrap();

        assert_eq!(populate, PopulateReport::default());
        let lamp = h.store.find_by_id("lamp").unwrap();
        assert_eq!(lamp.property("brightness"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn should_rebuild_changed_header_and_keep_local_state() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[])]),
            FakeVendor::default().with_state("lamp", json!({ "brightness": 42 })),
        );
        h.reconciler.run_cycle().await;
        h.registry.set(vec![header("lamp", &["color"])]);

        let populate = h.reconciler.populate().await.unwrap();

        assert_eq!(
            populate,
            PopulateReport {
                added: 0,
                refreshed: 1,
                removed: 0
            }
        );
        let lamp = h.store.find_by_id("lamp").unwrap();
        assert_eq!(lamp.property("brightness"), Some(&json!(42)));
        assert!(lamp.schema().contains("color"));
        assert_eq!(h.reconciler.settle().await, 1);
        assert_eq!(h.publisher.topics(), ["device-added.lamp", "device-changed.lamp"]);
    }

    #[tokio::test]
    async fn should_remove_devices_dropped_from_registry() {
        let h = harness(
            FakeRegistry::with(vec![header("a", &[]), header("b", &[])]),
            FakeVendor::default(),
        );
        h.reconciler.run_cycle().await;
        h.registry.set(vec![header("b", &[])]);

        let report = h.reconciler.run_cycle().await;

        assert_eq!(
            report.populate,
            Some(PopulateReport {
                added: 0,
                refreshed: 0,
                removed: 1
            })
        );
        assert_eq!(h.store.identifiers(), ["b"]);
        assert!(h.publisher.topics().contains(&"device-removed.a".to_string()));
    }

    #[tokio::test]
    async fn should_skip_duplicate_headers() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[]), header("lamp", &["rgb"])]),
            FakeVendor::default(),
        );
        let report = h.reconciler.populate().await.unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn should_continue_cycle_when_registry_fails() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[])]),
            FakeVendor::default().with_state("lamp", json!({ "on": false })),
        );
        h.reconciler.run_cycle().await;
        h.registry.failing.store(true, Ordering::SeqCst);
        h.vendor
            .states
            .lock()
            .unwrap()
            .insert("lamp".to_string(), crate::testing::payload(json!({ "on": true })));

        let report = h.reconciler.run_cycle().await;

        assert!(report.populate.is_none());
        assert_eq!(report.pull.succeeded, 1);
        assert_eq!(h.publisher.topics(), ["device-added.lamp", "device-changed.lamp"]);
    }

    #[tokio::test]
    async fn should_keep_last_known_state_when_pull_fails_or_times_out() {
        let h = harness(
            FakeRegistry::with(vec![header("ok", &[]), header("down", &[]), header("slow", &[])]),
            FakeVendor::default()
                .with_state("ok", json!({ "on": true }))
                .with_state("down", json!({ "on": true }))
                .with_state("slow", json!({ "on": true })),
        );
        h.vendor.failing.lock().unwrap().insert("down".to_string());
        h.vendor.hanging.lock().unwrap().insert("slow".to_string());

        let report = h.reconciler.run_cycle().await;

        assert_eq!(report.pull, PullReport { succeeded: 1, failed: 2 });
        assert_eq!(h.store.find_by_id("ok").unwrap().property("power"), Some(&json!(true)));
        assert_eq!(h.store.find_by_id("down").unwrap().property("power"), Some(&json!(null)));
        assert_eq!(h.store.find_by_id("slow").unwrap().property("power"), Some(&json!(null)));
    }

    #[tokio::test]
    async fn should_merge_provided_state_over_vendor_payload() {
        let h = harness_with_providers(
            FakeRegistry::with(vec![provided("amp", &["service.first", "service.second"])]),
            FakeVendor::default().with_state("amp", json!({ "on": false, "brightness": 10 })),
            FakeStateProvider::default()
                .with_state("service.first", "amp", json!({ "power": true, "brightness": 5 }))
                .with_state("service.second", "amp", json!({ "brightness": 7 })),
        );

        let report = h.reconciler.run_cycle().await;

        assert_eq!(report.pull, PullReport { succeeded: 1, failed: 0 });
        let amp = h.store.find_by_id("amp").unwrap();
        assert_eq!(amp.property("power"), Some(&json!(true)));
        assert_eq!(amp.property("brightness"), Some(&json!(7)));
        assert_eq!(
            *h.providers.requests.lock().unwrap(),
            [
                ("service.first".to_string(), "amp".to_string()),
                ("service.second".to_string(), "amp".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn should_fail_pull_when_a_state_provider_fails() {
        let h = harness_with_providers(
            FakeRegistry::with(vec![provided("amp", &["service.ir"]), header("lamp", &[])]),
            FakeVendor::default()
                .with_state("amp", json!({ "on": true }))
                .with_state("lamp", json!({ "on": true })),
            FakeStateProvider::default(),
        );
        h.providers
            .failing
            .lock()
            .unwrap()
            .insert("service.ir".to_string());

        let report = h.reconciler.run_cycle().await;

        assert_eq!(report.pull, PullReport { succeeded: 1, failed: 1 });
        assert_eq!(h.store.find_by_id("amp").unwrap().property("power"), Some(&json!(null)));
        assert_eq!(h.store.find_by_id("lamp").unwrap().property("power"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn should_not_ask_providers_for_devices_without_any() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[])]),
            FakeVendor::default().with_state("lamp", json!({ "on": true })),
        );

        h.reconciler.run_cycle().await;

        assert!(h.providers.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_run_first_cycle_immediately_when_spawned() {
        let h = harness(
            FakeRegistry::with(vec![header("lamp", &[])]),
            FakeVendor::default(),
        );
        let publisher = Arc::clone(&h.publisher);
        let handle = Arc::new(h.reconciler).spawn(Duration::from_secs(3600));

        for _ in 0..100 {
            if !publisher.topics().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(publisher.topics(), ["device-added.lamp"]);
    }
}
