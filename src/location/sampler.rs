//! Location sampler.
//!
//! State machine: `Stopped -> Starting -> Running -> Stopped`.
//!
//! Every `start()` bumps a generation counter and hands the provider a sink
//! bound to that generation. `stop()` bumps it again, so a sink from an
//! earlier run is inert even if the provider keeps delivering into it.
//! Fix conversion and enqueueing happen under the state lock, which makes
//! queue order equal arrival order across concurrent deliveries.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{SamplerError, StorageError};
use crate::logging::structured::LogContext;
use crate::pipeline::context::SessionContext;
use crate::pipeline::ingestion::{samples_from_fixes, Trail};
use crate::pipeline::writer::SampleWriter;
use crate::storage::store::SampleStore;
use crate::{log_debug, log_error, log_info, log_warn};

use super::fix::LocationFix;
use super::provider::{EventSink, LocationProvider, PollingConfig, ProviderEvent, SubscriptionId};

/// Recorded in `last_error` when the provider reports no location.
pub const LOCATION_UNAVAILABLE: &str = "location unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SamplerPhase {
    Stopped,
    Starting,
    Running,
}

/// Point-in-time view of a sampler for hosts to poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplerState {
    pub phase: SamplerPhase,
    pub is_running: bool,
    pub last_error: Option<String>,
    pub session_id: Option<String>,
    pub fixes_received: u64,
    pub current_location: Option<LocationFix>,
}

#[derive(Debug)]
struct SamplerInner {
    phase: SamplerPhase,
    last_error: Option<String>,
    generation: u64,
    subscription: Option<SubscriptionId>,
    session: Option<SessionContext>,
    trail: Trail,
    fixes_received: u64,
    current_location: Option<LocationFix>,
}

impl SamplerInner {
    fn new() -> Self {
        Self {
            phase: SamplerPhase::Stopped,
            last_error: None,
            generation: 0,
            subscription: None,
            session: None,
            trail: Trail::new(),
            fixes_received: 0,
            current_location: None,
        }
    }

    fn log_context(&self) -> LogContext {
        match &self.session {
            Some(session) => session.log_context("sampler"),
            None => LogContext::new("sampler"),
        }
    }
}

pub struct LocationSampler {
    provider: Arc<dyn LocationProvider>,
    inner: Arc<Mutex<SamplerInner>>,
    writer: Arc<SampleWriter>,
}

impl LocationSampler {
    /// Create a stopped sampler writing into `store`.
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        store: Arc<dyn SampleStore>,
    ) -> Result<Self, StorageError> {
        let inner = Arc::new(Mutex::new(SamplerInner::new()));

        let failure_state = Arc::clone(&inner);
        let writer = SampleWriter::spawn(store, move |err| {
            failure_state.lock().last_error = Some(err.to_string());
        })?;

        Ok(Self {
            provider,
            inner,
            writer: Arc::new(writer),
        })
    }

    /// Subscribe to the provider. A no-op while already starting or running.
    pub fn start(&self, config: &PollingConfig) -> Result<(), SamplerError> {
        let (generation, ctx) = {
            let mut inner = self.inner.lock();
            if inner.phase != SamplerPhase::Stopped {
                log_debug!(inner.log_context(), "SAMPLER_START_IGNORED", phase = inner.phase);
                return Ok(());
            }
            if let Err(err) = config.validate() {
                let err = SamplerError::from(err);
                inner.last_error = Some(err.to_string());
                log_error!(inner.log_context(), "SAMPLER_CONFIG_INVALID", error = err.to_string());
                return Err(err);
            }

            let session = SessionContext::new(config);
            inner.phase = SamplerPhase::Starting;
            inner.generation += 1;
            inner.trail = Trail::new();
            inner.session = Some(session);
            (inner.generation, inner.log_context())
        };

        log_info!(
            ctx,
            "SAMPLER_START",
            accuracy = config.desired_accuracy,
            min_interval_ms = config.min_interval_ms,
            max_interval_ms = config.max_interval_ms,
            max_delay_ms = config.max_delay_ms
        );

        // The provider may deliver synchronously from inside subscribe, so the
        // state lock must not be held here.
        let result = self.provider.subscribe(config, self.sink_for(generation));

        let mut inner = self.inner.lock();
        match result {
            Ok(id) => {
                if inner.generation != generation {
                    // stop() ran while we were subscribing.
                    drop(inner);
                    self.provider.unsubscribe(id);
                    log_info!(ctx, "SAMPLER_START_SUPERSEDED");
                    return Ok(());
                }
                inner.phase = SamplerPhase::Running;
                inner.subscription = Some(id);
                inner.last_error = None;
                log_info!(ctx, "SAMPLER_RUNNING", subscription = id.0);
                Ok(())
            }
            Err(err) => {
                let err = SamplerError::from(err);
                if inner.generation == generation {
                    inner.phase = SamplerPhase::Stopped;
                    inner.session = None;
                    inner.generation += 1;
                    inner.last_error = Some(err.to_string());
                }
                log_error!(ctx, "SAMPLER_SUBSCRIBE_FAILED", error = err.to_string());
                Err(err)
            }
        }
    }

    /// Unsubscribe. In-flight appends are left to finish on their own.
    pub fn stop(&self) {
        let (subscription, ctx) = {
            let mut inner = self.inner.lock();
            if inner.phase == SamplerPhase::Stopped {
                return;
            }
            let ctx = inner.log_context();
            inner.phase = SamplerPhase::Stopped;
            inner.generation += 1;
            inner.session = None;
            (inner.subscription.take(), ctx)
        };

        if let Some(id) = subscription {
            self.provider.unsubscribe(id);
        }
        log_info!(ctx, "SAMPLER_STOPPED", subscription = subscription.map(|id| id.0));
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().phase == SamplerPhase::Running
    }

    pub fn phase(&self) -> SamplerPhase {
        self.inner.lock().phase
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Most recent fix received in any run.
    pub fn current_location(&self) -> Option<LocationFix> {
        self.inner.lock().current_location.clone()
    }

    pub fn state(&self) -> SamplerState {
        let inner = self.inner.lock();
        SamplerState {
            phase: inner.phase,
            is_running: inner.phase == SamplerPhase::Running,
            last_error: inner.last_error.clone(),
            session_id: inner.session.as_ref().map(|s| s.session_id.clone()),
            fixes_received: inner.fixes_received,
            current_location: inner.current_location.clone(),
        }
    }

    /// Wait until every sample accepted so far has reached the store.
    pub fn flush(&self) {
        self.writer.flush();
    }

    fn sink_for(&self, generation: u64) -> EventSink {
        let inner = Arc::clone(&self.inner);
        let writer = Arc::clone(&self.writer);
        EventSink::new(move |event| handle_event(&inner, &writer, generation, event))
    }
}

impl Drop for LocationSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_event(
    inner: &Mutex<SamplerInner>,
    writer: &SampleWriter,
    generation: u64,
    event: ProviderEvent,
) {
    let mut inner = inner.lock();
    let ctx = inner.log_context();
    if inner.generation != generation || inner.phase == SamplerPhase::Stopped {
        log_debug!(ctx, "SAMPLER_EVENT_DROPPED", generation = generation, current = inner.generation);
        return;
    }

    match event {
        ProviderEvent::FixReceived(fixes) => {
            if fixes.is_empty() {
                return;
            }
            inner.last_error = None;
            inner.fixes_received += fixes.len() as u64;
            inner.current_location = fixes.last().cloned();

            let samples = samples_from_fixes(&fixes, &mut inner.trail, &ctx);
            if let Err(err) = writer.enqueue(&ctx, samples) {
                log_warn!(ctx, "SAMPLER_ENQUEUE_FAILED", error = err.to_string());
                inner.last_error = Some(err.to_string());
            }
        }
        ProviderEvent::AvailabilityChanged(available) => {
            log_debug!(ctx, "SAMPLER_AVAILABILITY", available = available);
            if !available {
                log_warn!(ctx, "SAMPLER_LOCATION_UNAVAILABLE");
                inner.last_error = Some(LOCATION_UNAVAILABLE.to_string());
            }
        }
    }
}
