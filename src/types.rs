use std::collections::HashMap;

use serde::Serialize;

/// A running EC2 instance as seen by the sweep: id plus its tag map.
///
/// The AWS tag list is converted to a map at the adapter boundary so the
/// exclusion policy stays independent of the provider representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub tags: HashMap<String, String>,
}

/// One observable action taken or skipped for one instance in one region.
/// Appended in chronological order; immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SweepEvent {
    Stopping { region: String, instance_id: String },
    Stopped { region: String, instance_id: String },
    SkippedExcluded { region: String, instance_id: String },
}

impl SweepEvent {
    pub fn instance_id(&self) -> &str {
        match self {
            Self::Stopping { instance_id, .. }
            | Self::Stopped { instance_id, .. }
            | Self::SkippedExcluded { instance_id, .. } => instance_id,
        }
    }
}

/// Result of sweeping one region.
///
/// A listing failure produces zero events and exactly one error. A stop
/// failure mid-loop leaves the events recorded so far in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionOutcome {
    pub region: String,
    pub events: Vec<SweepEvent>,
    pub error: Option<String>,
}

impl RegionOutcome {
    pub fn stopped_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SweepEvent::Stopped { .. }))
            .count()
    }
}

/// Account-wide sweep result. Outcomes keep the region enumeration order.
///
/// The stopped count and error list are recomputed from the outcomes on
/// every call rather than stored, so they cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepResult {
    pub account: String,
    pub outcomes: Vec<RegionOutcome>,
}

impl SweepResult {
    pub fn stopped_count(&self) -> usize {
        self.outcomes.iter().map(RegionOutcome::stopped_count).sum()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.error.as_deref())
            .collect()
    }
}

/// JSON summary printed on stdout when the job finishes.
#[derive(Debug, Serialize)]
pub struct ExecutionSummary {
    pub status: String,
    pub message: String,
    pub account: String,
    pub regions_swept: usize,
    pub instances_stopped: usize,
    pub error_count: usize,
    pub notified: bool,
    pub total_execution_time_seconds: f64,
}
