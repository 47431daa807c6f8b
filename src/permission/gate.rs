//! Permission gate state machine.
//!
//! Decision order on every recompute:
//! 1. every requested id granted -> `Granted`
//! 2. any id with a rationale flag -> `WaitingForUserAction`
//! 3. request round-trip outstanding (or not yet initialized) -> `Initializing`
//! 4. otherwise -> `Degraded` (silently denied)
//!
//! Grant state is always re-queried from the oracle, never inferred.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::PermissionError;
use crate::logging::structured::LogContext;
use crate::{log_debug, log_info, log_warn};

use super::oracle::PermissionOracle;
use super::request::{PermissionRequest, PermissionStatus};

/// What the gate currently allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GatePhase {
    Initializing,
    WaitingForUserAction,
    Granted,
    Degraded,
}

impl GatePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatePhase::Initializing => "initializing",
            GatePhase::WaitingForUserAction => "waiting_for_user_action",
            GatePhase::Granted => "granted",
            GatePhase::Degraded => "degraded",
        }
    }
}

/// What the host should render for the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    /// Protected content.
    Content,
    /// Explain why these ids are needed, with an action that calls
    /// `PermissionGate::request_permissions`.
    Rationale { permissions: Vec<PermissionRequest> },
    /// Waiting for the system prompt to come back.
    Progress,
    /// Fallback with an action that calls `PermissionGate::open_settings`.
    Degraded,
}

pub struct PermissionGate<O> {
    oracle: O,
    requested: Vec<PermissionRequest>,
    status: HashMap<String, PermissionStatus>,
    phase: GatePhase,
    initialized: bool,
    request_pending: bool,
    ctx: LogContext,
}

impl<O: PermissionOracle> PermissionGate<O> {
    /// Duplicate ids are collapsed, keeping the first occurrence.
    pub fn new<I, R>(oracle: O, requested: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<PermissionRequest>,
    {
        let mut ordered: Vec<PermissionRequest> = Vec::new();
        for request in requested.into_iter().map(Into::into) {
            if !ordered.contains(&request) {
                ordered.push(request);
            }
        }

        let status = ordered
            .iter()
            .map(|r| (r.id().to_string(), PermissionStatus::default()))
            .collect();

        Self {
            oracle,
            requested: ordered,
            status,
            phase: GatePhase::Initializing,
            initialized: false,
            request_pending: false,
            ctx: LogContext::new("permission_gate"),
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn requested(&self) -> &[PermissionRequest] {
        &self.requested
    }

    pub fn status(&self, id: &str) -> Option<PermissionStatus> {
        self.status.get(id).copied()
    }

    /// Status of every requested id, in request order.
    pub fn statuses(&self) -> impl Iterator<Item = (&PermissionRequest, PermissionStatus)> + '_ {
        self.requested
            .iter()
            .map(|r| (r, self.status.get(r.id()).copied().unwrap_or_default()))
    }

    pub fn is_request_pending(&self) -> bool {
        self.request_pending
    }

    pub fn all_granted(&self) -> bool {
        self.status.values().all(|s| s.is_granted())
    }

    pub fn any_should_show_rationale(&self) -> bool {
        self.status.values().any(|s| s.should_show_rationale())
    }

    /// Populate status from the oracle and pick the initial phase.
    ///
    /// When nothing is granted and nothing needs explaining, the system prompt
    /// is launched immediately and the phase stays `Initializing` until
    /// `on_request_result` arrives.
    pub fn initialize(&mut self) -> Result<GatePhase, PermissionError> {
        log::trace!("{} GATE_INITIALIZE requested={}", self.ctx, self.requested.len());

        let mut next = HashMap::with_capacity(self.requested.len());
        for request in &self.requested {
            let granted = self.oracle.is_granted(request.id())?;
            let mut status = PermissionStatus::default();
            status.set_granted(granted);
            if !granted {
                status.set_rationale(self.oracle.should_show_rationale(request.id())?);
            }
            next.insert(request.id().to_string(), status);
        }
        self.status = next;
        self.initialized = true;

        if !self.all_granted() && !self.any_should_show_rationale() {
            log_debug!(self.ctx, "GATE_AUTO_REQUEST", reason = "no_rationale");
            self.request_permissions()?;
        }

        Ok(self.recompute())
    }

    /// Launch the system prompt for every requested id.
    pub fn request_permissions(&mut self) -> Result<(), PermissionError> {
        self.oracle.request_permissions(&self.requested)?;
        self.request_pending = true;
        log_info!(
            self.ctx,
            "GATE_REQUEST_LAUNCHED",
            ids = self.requested.iter().map(|r| r.id()).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Apply the outcome of a permission prompt.
    ///
    /// Denied ids get their rationale signal re-queried; granted ids have it
    /// cleared. Ids that were never requested are ignored.
    pub fn on_request_result(
        &mut self,
        results: &HashMap<String, bool>,
    ) -> Result<GatePhase, PermissionError> {
        for id in results.keys() {
            if !self.status.contains_key(id) {
                log_warn!(self.ctx, "GATE_RESULT_UNKNOWN_ID", id = id);
            }
        }

        let mut updates = Vec::new();
        for request in &self.requested {
            let Some(&granted) = results.get(request.id()) else {
                continue;
            };
            let rationale = if granted {
                false
            } else {
                self.oracle.should_show_rationale(request.id())?
            };
            updates.push((request.id().to_string(), granted, rationale));
        }

        for (id, granted, rationale) in updates {
            let status = self.status.entry(id.clone()).or_default();
            status.set_granted(granted);
            status.set_rationale(rationale);
            log_debug!(self.ctx, "GATE_RESULT", id = id, granted = granted, rationale = rationale);
        }
        self.request_pending = false;

        Ok(self.recompute())
    }

    /// Re-query grant state after returning from the background.
    ///
    /// Rationale flags are only touched for ids whose grant state changed.
    pub fn on_resume(&mut self) -> Result<GatePhase, PermissionError> {
        let mut changes = Vec::new();
        for request in &self.requested {
            let granted = self.oracle.is_granted(request.id())?;
            let previous = self.status.get(request.id()).copied().unwrap_or_default();
            if previous.is_granted() == granted {
                continue;
            }
            let rationale = if granted {
                false
            } else {
                self.oracle.should_show_rationale(request.id())?
            };
            changes.push((request.id().to_string(), granted, rationale));
        }

        for (id, granted, rationale) in changes {
            let status = self.status.entry(id.clone()).or_default();
            status.set_granted(granted);
            status.set_rationale(rationale);
            log_info!(self.ctx, "GATE_RESUME_CHANGED", id = id, granted = granted);
        }

        Ok(self.recompute())
    }

    pub fn open_settings(&self) -> Result<(), PermissionError> {
        log_info!(self.ctx, "GATE_OPEN_SETTINGS");
        self.oracle.open_settings()
    }

    pub fn view(&self) -> GateView {
        match self.phase {
            GatePhase::Granted => GateView::Content,
            GatePhase::WaitingForUserAction => GateView::Rationale {
                permissions: self
                    .statuses()
                    .filter(|(_, s)| s.should_show_rationale())
                    .map(|(r, _)| r.clone())
                    .collect(),
            },
            GatePhase::Initializing => GateView::Progress,
            GatePhase::Degraded => GateView::Degraded,
        }
    }

    fn recompute(&mut self) -> GatePhase {
        let next = if self.all_granted() {
            GatePhase::Granted
        } else if self.any_should_show_rationale() {
            GatePhase::WaitingForUserAction
        } else if self.request_pending || !self.initialized {
            GatePhase::Initializing
        } else {
            GatePhase::Degraded
        };

        if next != self.phase {
            log_info!(
                self.ctx,
                "GATE_PHASE_CHANGED",
                from = self.phase.as_str(),
                to = next.as_str()
            );
        }
        self.phase = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::permission::request::{ACCESS_FINE_LOCATION, POST_NOTIFICATIONS};
    use crate::testkit::ScriptedOracle;

    const FINE_LOCATION: &str = "FINE_LOCATION";
    const NOTIFICATIONS: &str = "NOTIFICATIONS";

    fn results(entries: &[(&str, bool)]) -> HashMap<String, bool> {
        entries
            .iter()
            .map(|(id, granted)| (id.to_string(), *granted))
            .collect()
    }

    #[test]
    fn test_initialize_all_granted() {
        let oracle = ScriptedOracle::new();
        oracle.set_granted(FINE_LOCATION, true);
        oracle.set_granted(NOTIFICATIONS, true);

        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION, NOTIFICATIONS]);
        assert_eq!(gate.initialize().unwrap(), GatePhase::Granted);
        assert_eq!(gate.view(), GateView::Content);
        assert_eq!(oracle.request_count(), 0);
    }

    #[test]
    fn test_initialize_requests_then_waits_for_rationale() {
        let oracle = ScriptedOracle::new();
        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION, NOTIFICATIONS]);

        assert_eq!(gate.initialize().unwrap(), GatePhase::Initializing);
        assert_eq!(gate.view(), GateView::Progress);
        assert_eq!(oracle.request_count(), 1);
        assert_eq!(
            oracle.last_request(),
            Some(vec![FINE_LOCATION.to_string(), NOTIFICATIONS.to_string()])
        );

        oracle.set_granted(FINE_LOCATION, true);
        oracle.set_rationale(NOTIFICATIONS, true);
        let phase = gate
            .on_request_result(&results(&[(FINE_LOCATION, true), (NOTIFICATIONS, false)]))
            .unwrap();

        assert_eq!(phase, GatePhase::WaitingForUserAction);
        assert!(gate.status(FINE_LOCATION).unwrap().is_granted());
        assert!(gate.status(NOTIFICATIONS).unwrap().should_show_rationale());
        assert_eq!(
            gate.view(),
            GateView::Rationale {
                permissions: vec![PermissionRequest::new(NOTIFICATIONS)]
            }
        );
    }

    #[test]
    fn test_initialize_with_rationale_does_not_request() {
        let oracle = ScriptedOracle::new();
        oracle.set_rationale(FINE_LOCATION, true);

        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION]);
        assert_eq!(gate.initialize().unwrap(), GatePhase::WaitingForUserAction);
        assert_eq!(oracle.request_count(), 0);
    }

    #[test]
    fn test_silent_denial_degrades() {
        let oracle = ScriptedOracle::new();
        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION]);
        gate.initialize().unwrap();

        let phase = gate
            .on_request_result(&results(&[(FINE_LOCATION, false)]))
            .unwrap();
        assert_eq!(phase, GatePhase::Degraded);
        assert_eq!(gate.view(), GateView::Degraded);

        gate.open_settings().unwrap();
        assert_eq!(oracle.settings_opened(), 1);
    }

    #[test]
    fn test_all_granted_beats_stale_rationale() {
        let oracle = ScriptedOracle::new();
        oracle.set_rationale(FINE_LOCATION, true);
        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION, NOTIFICATIONS]);
        gate.initialize().unwrap();

        oracle.set_granted(FINE_LOCATION, true);
        oracle.set_granted(NOTIFICATIONS, true);
        let phase = gate
            .on_request_result(&results(&[(FINE_LOCATION, true), (NOTIFICATIONS, true)]))
            .unwrap();
        assert_eq!(phase, GatePhase::Granted);
    }

    #[test]
    fn test_resume_picks_up_settings_change() {
        let oracle = ScriptedOracle::new();
        let mut gate = PermissionGate::new(&oracle, [ACCESS_FINE_LOCATION, POST_NOTIFICATIONS]);
        gate.initialize().unwrap();
        gate.on_request_result(&results(&[
            (ACCESS_FINE_LOCATION, false),
            (POST_NOTIFICATIONS, false),
        ]))
        .unwrap();
        assert_eq!(gate.phase(), GatePhase::Degraded);

        // User flips both switches in system settings, then comes back.
        oracle.set_granted(ACCESS_FINE_LOCATION, true);
        oracle.set_granted(POST_NOTIFICATIONS, true);
        assert_eq!(gate.on_resume().unwrap(), GatePhase::Granted);

        oracle.set_granted(POST_NOTIFICATIONS, false);
        oracle.set_rationale(POST_NOTIFICATIONS, true);
        assert_eq!(gate.on_resume().unwrap(), GatePhase::WaitingForUserAction);
    }

    #[test]
    fn test_resume_keeps_progress_while_request_pending() {
        let oracle = ScriptedOracle::new();
        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION]);
        gate.initialize().unwrap();
        assert!(gate.is_request_pending());

        assert_eq!(gate.on_resume().unwrap(), GatePhase::Initializing);
    }

    #[test]
    fn test_unknown_result_ids_are_ignored() {
        let oracle = ScriptedOracle::new();
        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION]);
        gate.initialize().unwrap();

        let phase = gate
            .on_request_result(&results(&[(FINE_LOCATION, true), ("CAMERA", true)]))
            .unwrap();
        assert_eq!(phase, GatePhase::Granted);
        assert!(gate.status("CAMERA").is_none());
    }

    #[test]
    fn test_query_failure_propagates() {
        let oracle = ScriptedOracle::new();
        oracle.fail_queries_for(NOTIFICATIONS);
        let mut gate = PermissionGate::new(&oracle, [FINE_LOCATION, NOTIFICATIONS]);

        let err = gate.initialize().unwrap_err();
        assert!(matches!(err, PermissionError::Query { ref id, .. } if id == NOTIFICATIONS));
        assert_eq!(gate.phase(), GatePhase::Initializing);
        assert!(!gate.status(FINE_LOCATION).unwrap().is_granted());
    }

    #[test]
    fn test_duplicate_requests_collapse() {
        let oracle = ScriptedOracle::new();
        let gate = PermissionGate::new(&oracle, [FINE_LOCATION, FINE_LOCATION, NOTIFICATIONS]);
        assert_eq!(gate.requested().len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Result(Vec<(bool, bool)>),
        Resume(Vec<(bool, bool)>),
    }

    fn step_strategy(ids: usize) -> impl Strategy<Value = Step> {
        let outcome = prop::collection::vec((any::<bool>(), any::<bool>()), ids);
        prop_oneof![
            outcome.clone().prop_map(Step::Result),
            outcome.prop_map(Step::Resume),
        ]
    }

    proptest! {
        #[test]
        fn prop_phase_tracks_grants(steps in prop::collection::vec(step_strategy(3), 1..12)) {
            let ids = ["A", "B", "C"];
            let oracle = ScriptedOracle::new();
            let mut gate = PermissionGate::new(&oracle, ids);
            gate.initialize().unwrap();

            for step in steps {
                let outcome = match &step {
                    Step::Result(o) | Step::Resume(o) => o.clone(),
                };
                for (id, (granted, rationale)) in ids.iter().zip(outcome.iter()) {
                    oracle.set_granted(id, *granted);
                    oracle.set_rationale(id, *rationale);
                }
                match step {
                    Step::Result(_) => {
                        let map = ids
                            .iter()
                            .zip(outcome.iter())
                            .map(|(id, (granted, _))| (id.to_string(), *granted))
                            .collect();
                        gate.on_request_result(&map).unwrap();
                    }
                    Step::Resume(_) => {
                        gate.on_resume().unwrap();
                    }
                }

                let all_granted = ids.iter().all(|id| gate.status(id).unwrap().is_granted());
                prop_assert_eq!(gate.phase() == GatePhase::Granted, all_granted);
                for id in ids {
                    let status = gate.status(id).unwrap();
                    if status.is_granted() {
                        prop_assert!(!status.should_show_rationale());
                    }
                }
            }
        }

        #[test]
        fn prop_resume_is_idempotent(outcome in prop::collection::vec((any::<bool>(), any::<bool>()), 3)) {
            let ids = ["A", "B", "C"];
            let oracle = ScriptedOracle::new();
            let mut gate = PermissionGate::new(&oracle, ids);
            gate.initialize().unwrap();
            for (id, (granted, rationale)) in ids.iter().zip(outcome.iter()) {
                oracle.set_granted(id, *granted);
                oracle.set_rationale(id, *rationale);
            }

            let first_phase = gate.on_resume().unwrap();
            let first: Vec<_> = gate.statuses().map(|(_, s)| s).collect();
            let second_phase = gate.on_resume().unwrap();
            let second: Vec<_> = gate.statuses().map(|(_, s)| s).collect();

            prop_assert_eq!(first_phase, second_phase);
            prop_assert_eq!(first, second);
        }
    }
}
