//! Schema types for the four dashboard endpoints.
//!
//! These mirror the JSON served by the MediSurge backend. Every field the
//! dashboard reads is optional: the backend is allowed to omit anything, and
//! the display layer substitutes documented defaults (see [`crate::data::display`]).
//! Unknown fields are ignored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Domain;

/// A parsed response from one of the dashboard endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Dashboard(DashboardSummary),
    Agents(AgentStatus),
    Metrics(SystemMetrics),
    Timeline(CrisisTimeline),
}

impl Payload {
    /// The domain this payload belongs to.
    pub fn domain(&self) -> Domain {
        match self {
            Payload::Dashboard(_) => Domain::Dashboard,
            Payload::Agents(_) => Domain::Agents,
            Payload::Metrics(_) => Domain::Metrics,
            Payload::Timeline(_) => Domain::Timeline,
        }
    }
}

// ---------------------------------------------------------------------------
// dashboard summary
// ---------------------------------------------------------------------------

/// Response of the dashboard summary endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub system_status: Option<String>,
    pub monitoring_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
    pub alerts: Option<Alerts>,
    pub predictions: Option<Predictions>,
    pub resources: Option<Resources>,
    pub insurance: Option<Insurance>,
    pub staff: Option<Staff>,
    pub pharmaceutical: Option<Pharmaceutical>,
    pub communication: Option<Communication>,
}

/// Current alert state as reported by the prediction agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alerts {
    /// Raw alert level string, e.g. `"HIGH"`.
    pub current_level: Option<String>,
    pub active_predictions: Option<u32>,
    /// Absolute time of the next predicted surge.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub next_surge: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub total_patients_expected: Option<u32>,
    pub baseline_patients: Option<u32>,
    pub surge_percentage: Option<f64>,
    pub confidence: Option<f64>,
    pub primary_condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub staff_coverage: Option<f64>,
    pub equipment_adequacy: Option<f64>,
    pub budget_utilization: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insurance {
    pub preauth_rate: Option<f64>,
    pub patients_covered: Option<u32>,
    pub processing_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub activated_count: Option<u32>,
    pub available_pool: Option<u32>,
    pub response_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pharmaceutical {
    pub supply_status: Option<String>,
    pub partners_engaged: Option<u32>,
    pub medicines_secured: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Communication {
    pub advisories_sent: Option<u32>,
    pub total_reach: Option<u64>,
    pub engagement_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// agent status
// ---------------------------------------------------------------------------

/// Response of the agent status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Agent key (e.g. `"reverse911"`) to reported state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: BTreeMap<String, AgentState>,
    pub system_health: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// State of a single agent.
///
/// Older backends report a bare boolean; newer ones an object with a
/// free-form `status` string plus agent-specific extras. Anything else is
/// kept as raw JSON and judged by truthiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentState {
    Flag(bool),
    Detailed(AgentDetail),
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDetail {
    pub status: Option<String>,
}

/// Status strings that mean an agent is not running.
const INACTIVE_STATUSES: &[&str] = &["inactive", "offline", "stopped", "error", "failed", "down"];

impl AgentState {
    /// Whether this agent should be shown as running.
    pub fn is_active(&self) -> bool {
        match self {
            AgentState::Flag(active) => *active,
            AgentState::Detailed(detail) => match detail.status.as_deref() {
                Some(status) => {
                    let status = status.trim().to_ascii_lowercase();
                    !INACTIVE_STATUSES.contains(&status.as_str())
                }
                None => false,
            },
            AgentState::Other(value) => match value {
                Value::Null => false,
                Value::Bool(active) => *active,
                Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                Value::String(status) => {
                    let status = status.trim().to_ascii_lowercase();
                    !status.is_empty() && !INACTIVE_STATUSES.contains(&status.as_str())
                }
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// system metrics
// ---------------------------------------------------------------------------

/// Response of the system metrics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub performance: Option<Performance>,
    pub impact: Option<Impact>,
    pub capacity: Option<Capacity>,
    pub financial: Option<Financial>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub prediction_accuracy: Option<f64>,
    /// Human-readable, e.g. `"3.2 hours"`.
    pub average_response_time: Option<String>,
    /// Human-readable, e.g. `"99.8%"`.
    pub system_uptime: Option<String>,
    pub agent_success_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub lives_protected: Option<u64>,
    pub emergency_visits_prevented: Option<u64>,
    pub wait_time_reduction: Option<f64>,
    pub stockouts_prevented: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub max_patients_handleable: Option<u64>,
    pub current_capacity_usage: Option<f64>,
    pub staff_availability: Option<f64>,
    pub equipment_utilization: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financial {
    pub total_budget: Option<f64>,
    pub allocated: Option<f64>,
    pub insurance_covered: Option<f64>,
    pub out_of_pocket_reduced: Option<f64>,
}

// ---------------------------------------------------------------------------
// crisis timeline
// ---------------------------------------------------------------------------

/// Response of the crisis timeline endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrisisTimeline {
    pub total_events: Option<u64>,
    /// Events in the order the backend returned them. Never re-sorted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Vec<TimelineEvent>,
}

/// One step of the crisis response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_event_status")]
    pub status: EventStatus,
}

/// Progress of a timeline event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Pending,
    Processing,
    InProgress,
    Completed,
}

impl EventStatus {
    /// Parse a backend status string; anything unrecognised is `Pending`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => EventStatus::Processing,
            "in_progress" | "in-progress" => EventStatus::InProgress,
            "completed" => EventStatus::Completed,
            _ => EventStatus::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// lenient field parsers
// ---------------------------------------------------------------------------

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`2025-01-01T12:00:00Z`) and the naive ISO-8601 form the
/// backend emits (`2025-01-01T12:00:00.123456`), which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<chrono::NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

// An explicit `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// An unparseable timestamp is treated as absent rather than failing the payload.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

fn lenient_event_status<'de, D>(deserializer: D) -> Result<EventStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .map(EventStatus::parse)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_dashboard_summary() {
        let json = r#"{
            "system_status": "operational",
            "monitoring_active": true,
            "last_updated": "2025-03-01T10:00:00.250000",
            "alerts": {
                "current_level": "HIGH",
                "active_predictions": 2,
                "next_surge": "2025-03-03T10:00:00"
            },
            "predictions": {
                "total_patients_expected": 342,
                "baseline_patients": 120,
                "surge_percentage": 185.4,
                "confidence": 91.2,
                "primary_condition": "Respiratory Illness"
            },
            "resources": { "staff_coverage": 88.0 },
            "pharmaceutical": { "supply_status": "adequate", "partners_engaged": 5 }
        }"#;

        let summary: DashboardSummary = serde_json::from_str(json).unwrap();
        let alerts = summary.alerts.as_ref().unwrap();
        assert_eq!(alerts.current_level.as_deref(), Some("HIGH"));
        assert_eq!(alerts.active_predictions, Some(2));
        assert_eq!(
            alerts.next_surge,
            Some(Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap())
        );
        assert_eq!(summary.predictions.as_ref().unwrap().total_patients_expected, Some(342));
        assert_eq!(summary.resources.as_ref().unwrap().equipment_adequacy, None);
        assert!(summary.insurance.is_none());
        assert!(summary.last_updated.is_some());
    }

    #[test]
    fn test_empty_object_is_valid_summary() {
        let summary: DashboardSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary, DashboardSummary::default());
    }

    #[test]
    fn test_unparseable_timestamp_is_absent() {
        let json = r#"{ "current_level": "LOW", "next_surge": "soon" }"#;
        let alerts: Alerts = serde_json::from_str(json).unwrap();
        assert!(alerts.next_surge.is_none());
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let ts = parse_timestamp("2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_agent_state_forms() {
        let json = r#"{
            "agents": {
                "orchestrator": true,
                "surveillance": { "status": "monitoring", "last_scan": "2025-03-01T10:00:00" },
                "prediction": { "status": "Offline" },
                "resource": false,
                "insurance": {}
            },
            "system_health": "operational"
        }"#;

        let status: AgentStatus = serde_json::from_str(json).unwrap();
        assert!(status.agents["orchestrator"].is_active());
        assert!(status.agents["surveillance"].is_active());
        assert!(!status.agents["prediction"].is_active());
        assert!(!status.agents["resource"].is_active());
        assert!(!status.agents["insurance"].is_active());
    }

    #[test]
    fn test_unexpected_agent_values_do_not_reject_payload() {
        let json = r#"{
            "agents": {
                "orchestrator": true,
                "prediction": null,
                "resource": "active",
                "communication": "stopped",
                "insurance": 1,
                "reverse911": 0,
                "pharmaceutical": "",
                "surveillance": ["scanning"]
            }
        }"#;

        let status: AgentStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.agents.len(), 8);
        assert!(status.agents["orchestrator"].is_active());
        assert!(!status.agents["prediction"].is_active());
        assert!(status.agents["resource"].is_active());
        assert!(!status.agents["communication"].is_active());
        assert!(status.agents["insurance"].is_active());
        assert!(!status.agents["reverse911"].is_active());
        assert!(!status.agents["pharmaceutical"].is_active());
        assert!(status.agents["surveillance"].is_active());
    }

    #[test]
    fn test_null_collections_read_as_empty() {
        let status: AgentStatus = serde_json::from_str(r#"{ "agents": null }"#).unwrap();
        assert!(status.agents.is_empty());

        let timeline: CrisisTimeline = serde_json::from_str(r#"{ "timeline": null }"#).unwrap();
        assert!(timeline.timeline.is_empty());
    }

    #[test]
    fn test_null_event_fields_do_not_reject_timeline() {
        let json = r#"{
            "timeline": [
                { "agent": null, "event": "Threat detected", "status": "completed" },
                { "agent": "Resource", "event": null, "time": 1740823200, "status": 3 }
            ]
        }"#;

        let timeline: CrisisTimeline = serde_json::from_str(json).unwrap();
        assert_eq!(timeline.timeline.len(), 2);
        assert_eq!(timeline.timeline[0].agent, "");
        assert_eq!(timeline.timeline[0].event, "Threat detected");
        assert_eq!(timeline.timeline[0].status, EventStatus::Completed);
        assert_eq!(timeline.timeline[1].agent, "Resource");
        assert_eq!(timeline.timeline[1].event, "");
        assert!(timeline.timeline[1].time.is_none());
        assert_eq!(timeline.timeline[1].status, EventStatus::Pending);
    }

    #[test]
    fn test_timeline_preserves_order_and_tolerates_unknown_status() {
        let json = r#"{
            "total_events": 3,
            "timeline": [
                {
                    "time": "2025-03-01T10:05:00",
                    "agent": "Prediction",
                    "event": "Surge predicted",
                    "status": "completed"
                },
                {
                    "time": "2025-03-01T10:00:00",
                    "agent": "Surveillance",
                    "event": "Threat detected",
                    "status": "in_progress"
                },
                { "agent": "Insurance", "event": "Pre-auth", "status": "queued" }
            ]
        }"#;

        let timeline: CrisisTimeline = serde_json::from_str(json).unwrap();
        let agents: Vec<&str> = timeline.timeline.iter().map(|e| e.agent.as_str()).collect();
        assert_eq!(agents, vec!["Prediction", "Surveillance", "Insurance"]);
        assert_eq!(timeline.timeline[0].status, EventStatus::Completed);
        assert_eq!(timeline.timeline[1].status, EventStatus::InProgress);
        assert_eq!(timeline.timeline[2].status, EventStatus::Pending);
        assert!(timeline.timeline[2].time.is_none());
    }

    #[test]
    fn test_payload_domain() {
        assert_eq!(
            Payload::Metrics(SystemMetrics::default()).domain(),
            Domain::Metrics
        );
        assert_eq!(
            Payload::Timeline(CrisisTimeline::default()).domain(),
            Domain::Timeline
        );
    }
}
