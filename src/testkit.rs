//! Test doubles for the platform collaborators.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::Mutex;

use crate::error::{PermissionError, PresentationError, ProviderError, StorageError};
use crate::foreground::ForegroundPresenter;
use crate::location::provider::{
    EventSink, LocationProvider, PollingConfig, ProviderEvent, SubscriptionId,
};
use crate::permission::oracle::PermissionOracle;
use crate::permission::request::PermissionRequest;
use crate::storage::memory::MemorySampleStore;
use crate::storage::models::LocationSample;
use crate::storage::store::SampleStore;

/// Permission oracle whose answers are set by the test.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    granted: Mutex<HashMap<String, bool>>,
    rationale: Mutex<HashMap<String, bool>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<Vec<String>>>,
    settings_opened: Mutex<usize>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_granted(&self, id: &str, granted: bool) {
        self.granted.lock().insert(id.to_string(), granted);
    }

    pub fn set_rationale(&self, id: &str, rationale: bool) {
        self.rationale.lock().insert(id.to_string(), rationale);
    }

    pub fn fail_queries_for(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<Vec<String>> {
        self.requests.lock().last().cloned()
    }

    pub fn settings_opened(&self) -> usize {
        *self.settings_opened.lock()
    }

    fn check(&self, id: &str) -> Result<(), PermissionError> {
        if self.failing.lock().contains(id) {
            return Err(PermissionError::Query {
                id: id.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

impl PermissionOracle for ScriptedOracle {
    fn is_granted(&self, id: &str) -> Result<bool, PermissionError> {
        self.check(id)?;
        Ok(self.granted.lock().get(id).copied().unwrap_or(false))
    }

    fn should_show_rationale(&self, id: &str) -> Result<bool, PermissionError> {
        self.check(id)?;
        Ok(self.rationale.lock().get(id).copied().unwrap_or(false))
    }

    fn request_permissions(&self, requests: &[PermissionRequest]) -> Result<(), PermissionError> {
        self.requests
            .lock()
            .push(requests.iter().map(|r| r.id().to_string()).collect());
        Ok(())
    }

    fn open_settings(&self) -> Result<(), PermissionError> {
        *self.settings_opened.lock() += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ManualProviderState {
    next_id: u64,
    active: HashMap<SubscriptionId, EventSink>,
    every_sink: Vec<EventSink>,
    fail_next: Option<ProviderError>,
    on_subscribe: Option<ProviderEvent>,
    last_config: Option<PollingConfig>,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
}

type SubscribeHook = Box<dyn FnOnce() + Send>;

/// Location provider driven by the test thread.
#[derive(Default)]
pub struct ManualProvider {
    state: Mutex<ManualProviderState>,
    during_subscribe: Mutex<Option<SubscribeHook>>,
}

impl fmt::Debug for ManualProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualProvider")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_subscribe(&self, err: ProviderError) {
        self.state.lock().fail_next = Some(err);
    }

    /// Deliver `event` from inside the next `subscribe` call.
    pub fn deliver_on_subscribe(&self, event: ProviderEvent) {
        self.state.lock().on_subscribe = Some(event);
    }

    /// Run `hook` inside the next `subscribe`, after the sink is registered.
    pub fn run_during_next_subscribe(&self, hook: impl FnOnce() + Send + 'static) {
        *self.during_subscribe.lock() = Some(Box::new(hook));
    }

    /// Deliver to every active subscription.
    pub fn deliver(&self, event: ProviderEvent) {
        let sinks: Vec<EventSink> = self.state.lock().active.values().cloned().collect();
        for sink in sinks {
            sink.deliver(event.clone());
        }
    }

    /// Deliver to every sink ever handed over, unsubscribed ones included.
    pub fn deliver_to_every_sink(&self, event: ProviderEvent) {
        let sinks = self.state.lock().every_sink.clone();
        for sink in sinks {
            sink.deliver(event.clone());
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().active.len()
    }

    pub fn last_config(&self) -> Option<PollingConfig> {
        self.state.lock().last_config.clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state.lock().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.state.lock().unsubscribe_calls
    }
}

impl LocationProvider for ManualProvider {
    fn subscribe(
        &self,
        config: &PollingConfig,
        sink: EventSink,
    ) -> Result<SubscriptionId, ProviderError> {
        let (id, pending_event) = {
            let mut state = self.state.lock();
            state.subscribe_calls += 1;
            if let Some(err) = state.fail_next.take() {
                return Err(err);
            }
            state.next_id += 1;
            let id = SubscriptionId(state.next_id);
            state.active.insert(id, sink.clone());
            state.every_sink.push(sink.clone());
            state.last_config = Some(config.clone());
            (id, state.on_subscribe.take())
        };

        if let Some(event) = pending_event {
            sink.deliver(event);
        }
        let hook = self.during_subscribe.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut state = self.state.lock();
        state.unsubscribe_calls += 1;
        state.active.remove(&id);
    }
}

/// Memory store that rejects its first `n` appends.
#[derive(Debug, Default)]
pub struct FailingStore {
    remaining_failures: Mutex<usize>,
    inner: MemorySampleStore,
}

impl FailingStore {
    pub fn failing_first(n: usize) -> Self {
        Self {
            remaining_failures: Mutex::new(n),
            inner: MemorySampleStore::new(),
        }
    }
}

impl SampleStore for FailingStore {
    fn append(&self, samples: &[LocationSample]) -> Result<(), StorageError> {
        let mut remaining = self.remaining_failures.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(StorageError::Rejected("disk full".to_string()));
        }
        self.inner.append(samples)
    }

    fn query_all(&self) -> Result<Vec<LocationSample>, StorageError> {
        self.inner.query_all()
    }

    fn query_latest(&self, n: usize) -> Result<Vec<LocationSample>, StorageError> {
        self.inner.query_latest(n)
    }

    fn count(&self) -> Result<u64, StorageError> {
        self.inner.count()
    }

    fn delete(&self, id: i64) -> Result<bool, StorageError> {
        self.inner.delete(id)
    }
}

/// Presenter that records announcements and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub announcements: Mutex<Vec<(String, String)>>,
    pub withdrawals: Mutex<usize>,
    pub fail: Mutex<bool>,
}

impl ForegroundPresenter for RecordingPresenter {
    fn announce(&self, title: &str, text: &str) -> Result<(), PresentationError> {
        if *self.fail.lock() {
            return Err(PresentationError("foreground start not allowed".to_string()));
        }
        self.announcements
            .lock()
            .push((title.to_string(), text.to_string()));
        Ok(())
    }

    fn withdraw(&self) {
        *self.withdrawals.lock() += 1;
    }
}
