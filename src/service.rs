//! Tracking service host.
//!
//! Owns one permission gate, one sampler, the sample store and the
//! foreground presenter. The sampler may only be started once the gate
//! reports `Granted`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::{NotificationConfig, TrackerConfig};
use crate::counter::TickCounter;
use crate::error::{PermissionError, ServiceError, StorageError};
use crate::foreground::ForegroundPresenter;
use crate::location::provider::{LocationProvider, PollingConfig};
use crate::location::sampler::{LocationSampler, SamplerPhase};
use crate::logging::structured::LogContext;
use crate::permission::gate::{GatePhase, GateView, PermissionGate};
use crate::permission::oracle::PermissionOracle;
use crate::storage::memory::MemorySampleStore;
use crate::storage::models::LocationSample;
use crate::storage::sqlite::SqliteSampleStore;
use crate::storage::store::SampleStore;
use crate::{log_error, log_info, log_warn};

/// Snapshot for a UI or supervisor to poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub gate_phase: GatePhase,
    pub is_running: bool,
    pub last_error: Option<String>,
    /// `None` when the store could not be read.
    pub sample_count: Option<u64>,
}

pub struct TrackingService<O> {
    gate: Mutex<PermissionGate<O>>,
    sampler: LocationSampler,
    store: Arc<dyn SampleStore>,
    presenter: Arc<dyn ForegroundPresenter>,
    polling: PollingConfig,
    notification: NotificationConfig,
    counter: TickCounter,
    counter_interval: Duration,
    /// True between a successful announce and the matching withdraw.
    announced: Mutex<bool>,
    ctx: LogContext,
}

impl<O: PermissionOracle> TrackingService<O> {
    pub fn new(
        oracle: O,
        provider: Arc<dyn LocationProvider>,
        store: Arc<dyn SampleStore>,
        presenter: Arc<dyn ForegroundPresenter>,
        config: &TrackerConfig,
    ) -> Result<Self, StorageError> {
        let sampler = LocationSampler::new(provider, Arc::clone(&store))?;
        Ok(Self {
            gate: Mutex::new(PermissionGate::new(oracle, config.permissions.iter().map(String::as_str))),
            sampler,
            store,
            presenter,
            polling: config.polling.clone(),
            notification: config.notification.clone(),
            counter: TickCounter::new(),
            counter_interval: Duration::from_millis(config.counter_interval_ms),
            announced: Mutex::new(false),
            ctx: LogContext::new("tracking_service"),
        })
    }

    /// Build a service, opening the store named by `config.database_path`.
    pub fn from_config(
        oracle: O,
        provider: Arc<dyn LocationProvider>,
        presenter: Arc<dyn ForegroundPresenter>,
        config: &TrackerConfig,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid tracker configuration")?;

        let store: Arc<dyn SampleStore> = match &config.database_path {
            Some(path) => Arc::new(
                SqliteSampleStore::open(path)
                    .with_context(|| format!("failed to open sample store {}", path.display()))?,
            ),
            None => Arc::new(MemorySampleStore::new()),
        };

        Self::new(oracle, provider, store, presenter, config).context("failed to start sample writer")
    }

    pub fn initialize_permissions(&self) -> Result<GatePhase, PermissionError> {
        self.gate.lock().initialize()
    }

    pub fn request_permissions(&self) -> Result<(), PermissionError> {
        self.gate.lock().request_permissions()
    }

    pub fn on_permission_result(
        &self,
        results: &HashMap<String, bool>,
    ) -> Result<GatePhase, PermissionError> {
        self.gate.lock().on_request_result(results)
    }

    /// Re-check permissions after the host returns from the background.
    ///
    /// Stops the sampler if location access was revoked meanwhile.
    pub fn on_resume(&self) -> Result<GatePhase, ServiceError> {
        let phase = self.gate.lock().on_resume()?;
        if phase != GatePhase::Granted && self.sampler.phase() != SamplerPhase::Stopped {
            log_warn!(self.ctx, "SERVICE_PERMISSION_REVOKED", phase = phase.as_str());
            self.stop();
        }
        Ok(phase)
    }

    pub fn open_settings(&self) -> Result<(), PermissionError> {
        self.gate.lock().open_settings()
    }

    pub fn gate_view(&self) -> GateView {
        self.gate.lock().view()
    }

    /// Announce to the foreground presenter and start sampling.
    ///
    /// A no-op while a previous start is still announced.
    pub fn start(&self) -> Result<(), ServiceError> {
        let phase = self.gate.lock().phase();
        if phase != GatePhase::Granted {
            log_warn!(self.ctx, "SERVICE_START_REFUSED", phase = phase.as_str());
            return Err(ServiceError::NotPermitted(phase));
        }

        {
            let mut announced = self.announced.lock();
            if *announced {
                return Ok(());
            }
            if let Err(err) = self
                .presenter
                .announce(&self.notification.title, &self.notification.text)
            {
                log_error!(self.ctx, "SERVICE_FOREGROUND_FAILED", error = err.to_string());
                return Err(err.into());
            }
            *announced = true;
        }

        // The provider may call back into stop() from inside subscribe, so
        // the announce lock is released before starting the sampler.
        if let Err(err) = self.sampler.start(&self.polling) {
            self.withdraw();
            return Err(err.into());
        }

        if self.sampler.phase() == SamplerPhase::Stopped {
            log_info!(self.ctx, "SERVICE_START_SUPERSEDED");
            self.withdraw();
            return Ok(());
        }
        log_info!(self.ctx, "SERVICE_STARTED");
        Ok(())
    }

    /// Stop sampling and withdraw the announcement. Idempotent.
    pub fn stop(&self) {
        self.sampler.stop();
        if self.withdraw() {
            log_info!(self.ctx, "SERVICE_STOPPED");
        }
    }

    fn withdraw(&self) -> bool {
        let was_announced = std::mem::replace(&mut *self.announced.lock(), false);
        if was_announced {
            self.presenter.withdraw();
        }
        was_announced
    }

    pub fn status(&self) -> ServiceStatus {
        let sampler = self.sampler.state();
        let sample_count = match self.store.count() {
            Ok(count) => Some(count),
            Err(err) => {
                log_warn!(self.ctx, "SERVICE_COUNT_FAILED", error = err.to_string());
                None
            }
        };

        ServiceStatus {
            gate_phase: self.gate.lock().phase(),
            is_running: sampler.is_running,
            last_error: sampler.last_error,
            sample_count,
        }
    }

    /// Start the tick counter at the configured interval.
    pub fn start_counter(&self) -> std::io::Result<()> {
        self.counter.start(self.counter_interval)
    }

    pub fn counter(&self) -> &TickCounter {
        &self.counter
    }

    pub fn sampler(&self) -> &LocationSampler {
        &self.sampler
    }

    pub fn store(&self) -> Arc<dyn SampleStore> {
        Arc::clone(&self.store)
    }

    /// Newest `n` samples, newest first.
    pub fn latest_samples(&self, n: usize) -> Result<Vec<LocationSample>, StorageError> {
        self.store.query_latest(n)
    }
}
