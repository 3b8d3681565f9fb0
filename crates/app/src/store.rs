//! In-memory device store with diffing flush.
//!
//! Mutations are invisible to subscribers until [`DeviceStore::flush`]
//! compares every live device against the snapshot taken by the previous
//! flush and reports one transition per identifier. [`DeviceStore::settle`]
//! pairs a flush with publication so events leave in flush order.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use homectl_domain::device::Device;
use homectl_domain::error::{DuplicateIdentifierError, NotFoundError};
use homectl_domain::event::DeviceEvent;
use serde_json::Value;

use crate::event_bus::publish_events;
use crate::ports::EventPublisher;

#[derive(Debug, Default)]
struct Inner {
    devices: BTreeMap<String, Device>,
    snapshots: BTreeMap<String, Value>,
}

/// Keyed collection of devices shared between the loop and request handlers.
///
/// A single lock guards the whole store and is never held across an await.
#[derive(Debug, Default)]
pub struct DeviceStore {
    inner: Mutex<Inner>,
    settling: tokio::sync::Mutex<()>,
}

impl DeviceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a device that is not stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateIdentifierError`] if the identifier is taken.
    pub fn insert(&self, device: Device) -> Result<(), DuplicateIdentifierError> {
        let mut inner = self.lock();
        if inner.devices.contains_key(device.identifier()) {
            return Err(DuplicateIdentifierError {
                identifier: device.identifier().to_string(),
            });
        }
        inner
            .devices
            .insert(device.identifier().to_string(), device);
        Ok(())
    }

    /// Insert a device, or replace the stored one with the same identifier.
    ///
    /// A replacement keeps the stored values of every property it still
    /// describes. Returns `true` when a device was replaced.
    pub fn upsert(&self, mut device: Device) -> bool {
        let mut inner = self.lock();
        let previous = inner.devices.get(device.identifier());
        if let Some(previous) = previous {
            device.merge_state(previous.state());
        }
        let replaced = previous.is_some();
        inner
            .devices
            .insert(device.identifier().to_string(), device);
        replaced
    }

    /// Run `f` against a stored device in place.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if no device has this identifier.
    pub fn update<F, T>(&self, identifier: &str, f: F) -> Result<T, NotFoundError>
    where
        F: FnOnce(&mut Device) -> T,
    {
        let mut inner = self.lock();
        let device = inner
            .devices
            .get_mut(identifier)
            .ok_or_else(|| NotFoundError {
                entity: "device",
                id: identifier.to_string(),
            })?;
        Ok(f(device))
    }

    /// Drop a device. Its snapshot stays until the next flush reports the removal.
    pub fn remove(&self, identifier: &str) -> Option<Device> {
        self.lock().devices.remove(identifier)
    }

    #[must_use]
    pub fn find_by_id(&self, identifier: &str) -> Option<Device> {
        self.lock().devices.get(identifier).cloned()
    }

    /// Every stored device, ordered by identifier.
    #[must_use]
    pub fn find_all(&self) -> Vec<Device> {
        self.lock().devices.values().cloned().collect()
    }

    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.lock().devices.keys().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.lock().devices.contains_key(identifier)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().devices.is_empty()
    }

    /// Diff live devices against the previous snapshots and replace them.
    ///
    /// Emits `device-added` for unseen identifiers, `device-changed` where the
    /// serialised form differs, and `device-removed` for snapshots with no
    /// live device.
    pub fn flush(&self) -> Vec<DeviceEvent> {
        let mut inner = self.lock();
        let current: BTreeMap<String, Value> = inner
            .devices
            .iter()
            .map(|(identifier, device)| (identifier.clone(), device.to_json()))
            .collect();
        let previous = std::mem::take(&mut inner.snapshots);

        let mut events = Vec::new();
        for (identifier, state) in &current {
            match previous.get(identifier) {
                None => events.push(DeviceEvent::DeviceAdded {
                    identifier: identifier.clone(),
                    state: state.clone(),
                }),
                Some(before) if before != state => events.push(DeviceEvent::DeviceChanged {
                    identifier: identifier.clone(),
                    previous: before.clone(),
                    state: state.clone(),
                }),
                Some(_) => {}
            }
        }
        for (identifier, before) in previous {
            if !current.contains_key(&identifier) {
                events.push(DeviceEvent::DeviceRemoved {
                    identifier,
                    previous: before,
                });
            }
        }

        inner.snapshots = current;
        events
    }

    /// Flush and publish the resulting events.
    ///
    /// Concurrent callers are queued, so a later flush is never published
    /// ahead of an earlier one. Returns how many events were published.
    pub async fn settle<P: EventPublisher>(&self, publisher: &P) -> usize {
        let _settling = self.settling.lock().await;
        let events = self.flush();
        publish_events(publisher, events).await
    }
}
