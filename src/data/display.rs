//! Display-ready values with documented fallbacks for absent fields.
//!
//! Each widget reads its section of a payload through one of these mappings.
//! A field the backend omitted gets its default; a field that is present is
//! shown as-is, zero included.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::derived::{round_half_up, AlertLevel, StatusBand, SupplyStatus};
use super::view_model::ViewModel;
use crate::source::payload::{
    AgentStatus, Communication, Impact, Insurance, Performance, Pharmaceutical, Predictions,
    Resources, Staff, TimelineEvent,
};
use crate::source::{Domain, ErrorKind};

/// The eight agents the dashboard always lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKey {
    Orchestrator,
    Surveillance,
    Prediction,
    Resource,
    Communication,
    Insurance,
    Reverse911,
    Pharmaceutical,
}

impl AgentKey {
    pub const ALL: [AgentKey; 8] = [
        AgentKey::Orchestrator,
        AgentKey::Surveillance,
        AgentKey::Prediction,
        AgentKey::Resource,
        AgentKey::Communication,
        AgentKey::Insurance,
        AgentKey::Reverse911,
        AgentKey::Pharmaceutical,
    ];

    /// Key used in the agent status payload.
    pub fn key(self) -> &'static str {
        match self {
            AgentKey::Orchestrator => "orchestrator",
            AgentKey::Surveillance => "surveillance",
            AgentKey::Prediction => "prediction",
            AgentKey::Resource => "resource",
            AgentKey::Communication => "communication",
            AgentKey::Insurance => "insurance",
            AgentKey::Reverse911 => "reverse911",
            AgentKey::Pharmaceutical => "pharmaceutical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentKey::Orchestrator => "Orchestrator",
            AgentKey::Surveillance => "Surveillance",
            AgentKey::Prediction => "Prediction",
            AgentKey::Resource => "Resource",
            AgentKey::Communication => "Communication",
            AgentKey::Insurance => "Insurance",
            AgentKey::Reverse911 => "Reverse 911",
            AgentKey::Pharmaceutical => "Pharmaceutical",
        }
    }

    pub fn role(self) -> &'static str {
        match self {
            AgentKey::Orchestrator => "System Coordinator",
            AgentKey::Surveillance => "Data Monitor",
            AgentKey::Prediction => "Surge Forecaster",
            AgentKey::Resource => "Resource Planner",
            AgentKey::Communication => "Public Advisory",
            AgentKey::Insurance => "Pre-Authorization",
            AgentKey::Reverse911 => "Staff Activation",
            AgentKey::Pharmaceutical => "Supply Chain",
        }
    }
}

/// One row of the agent roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentEntry {
    pub key: AgentKey,
    pub label: &'static str,
    pub role: &'static str,
    pub active: bool,
}

/// Build the fixed roster from an agent status payload.
///
/// Agents the payload does not mention are inactive.
pub fn agent_roster(status: Option<&AgentStatus>) -> Vec<AgentEntry> {
    AgentKey::ALL
        .iter()
        .map(|&key| AgentEntry {
            key,
            label: key.label(),
            role: key.role(),
            active: status
                .and_then(|s| s.agents.get(key.key()))
                .is_some_and(|state| state.is_active()),
        })
        .collect()
}

/// A rounded percentage and its threshold band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gauge {
    pub percent: i64,
    pub band: StatusBand,
}

impl Gauge {
    /// A gauge where higher is better.
    pub fn of(percent: f64) -> Self {
        Self {
            percent: round_half_up(percent) as i64,
            band: StatusBand::classify(percent),
        }
    }

    /// A gauge where lower is better; banded on the remaining headroom.
    pub fn of_utilization(percent: f64) -> Self {
        Self {
            percent: round_half_up(percent) as i64,
            band: StatusBand::classify(100.0 - percent),
        }
    }
}

fn pct(value: Option<f64>, default: f64) -> i64 {
    round_half_up(value.unwrap_or(default)) as i64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionDisplay {
    pub total_patients_expected: u32,
    pub baseline_patients: u32,
    pub surge_percentage: i64,
    pub confidence: i64,
    pub primary_condition: String,
}

impl PredictionDisplay {
    pub fn from_section(section: Option<&Predictions>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            total_patients_expected: s.total_patients_expected.unwrap_or(342),
            baseline_patients: s.baseline_patients.unwrap_or(120),
            surge_percentage: pct(s.surge_percentage, 185.0),
            confidence: pct(s.confidence, 87.0),
            primary_condition: s
                .primary_condition
                .unwrap_or_else(|| "Respiratory".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDisplay {
    pub staff_coverage: Gauge,
    pub equipment_adequacy: Gauge,
    pub budget_utilization: Gauge,
}

impl ResourceDisplay {
    pub fn from_section(section: Option<&Resources>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            staff_coverage: Gauge::of(s.staff_coverage.unwrap_or(92.0)),
            equipment_adequacy: Gauge::of(s.equipment_adequacy.unwrap_or(95.0)),
            budget_utilization: Gauge::of_utilization(s.budget_utilization.unwrap_or(46.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsuranceDisplay {
    pub preauth_rate: i64,
    pub patients_covered: u32,
    pub processing_status: Option<String>,
}

impl InsuranceDisplay {
    pub fn from_section(section: Option<&Insurance>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            preauth_rate: pct(s.preauth_rate, 87.0),
            patients_covered: s.patients_covered.unwrap_or(298),
            processing_status: s.processing_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffDisplay {
    pub activated_count: u32,
    pub available_pool: u32,
    pub response_rate: i64,
}

impl StaffDisplay {
    pub fn from_section(section: Option<&Staff>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            activated_count: s.activated_count.unwrap_or(12),
            available_pool: s.available_pool.unwrap_or(38),
            response_rate: pct(s.response_rate, 83.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PharmacyDisplay {
    pub supply_status: SupplyStatus,
    pub partners_engaged: u32,
    pub medicines_secured: i64,
}

impl PharmacyDisplay {
    pub fn from_section(section: Option<&Pharmaceutical>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            supply_status: SupplyStatus::from_status(s.supply_status.as_deref()),
            partners_engaged: s.partners_engaged.unwrap_or(5),
            medicines_secured: pct(s.medicines_secured, 92.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunicationDisplay {
    pub advisories_sent: u32,
    pub total_reach: u64,
    pub engagement_rate: f64,
}

impl CommunicationDisplay {
    pub fn from_section(section: Option<&Communication>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            advisories_sent: s.advisories_sent.unwrap_or(0),
            total_reach: s.total_reach.unwrap_or(0),
            engagement_rate: s.engagement_rate.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceDisplay {
    pub prediction_accuracy: f64,
    pub average_response_time: String,
    pub system_uptime: String,
    pub agent_success_rate: f64,
}

impl PerformanceDisplay {
    pub fn from_section(section: Option<&Performance>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            prediction_accuracy: s.prediction_accuracy.unwrap_or(87.3),
            average_response_time: s
                .average_response_time
                .unwrap_or_else(|| "3.2h".to_string()),
            system_uptime: s.system_uptime.unwrap_or_else(|| "99.8%".to_string()),
            agent_success_rate: s.agent_success_rate.unwrap_or(94.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactDisplay {
    pub lives_protected: u64,
    pub emergency_visits_prevented: u64,
    pub wait_time_reduction: f64,
    pub stockouts_prevented: u64,
}

impl ImpactDisplay {
    pub fn from_section(section: Option<&Impact>) -> Self {
        let s = section.cloned().unwrap_or_default();
        Self {
            lives_protected: s.lives_protected.unwrap_or(1000),
            emergency_visits_prevented: s.emergency_visits_prevented.unwrap_or(300),
            wait_time_reduction: s.wait_time_reduction.unwrap_or(60.0),
            stockouts_prevented: s.stockouts_prevented.unwrap_or(8),
        }
    }
}

/// Timeline events in backend order, with a total count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineDisplay {
    pub total_events: u64,
    pub events: Vec<TimelineEvent>,
}

/// Fetch state of one domain, for status indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainState {
    pub domain: Domain,
    pub state: &'static str,
    pub error: Option<ErrorKind>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Everything a render pass needs, derived from one view model at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    pub revision: u64,
    pub alert_level: AlertLevel,
    pub banner_visible: bool,
    pub active_predictions: u32,
    pub hours_until_surge: i64,
    pub predictions: PredictionDisplay,
    pub resources: ResourceDisplay,
    pub insurance: InsuranceDisplay,
    pub staff: StaffDisplay,
    pub pharmacy: PharmacyDisplay,
    pub communication: CommunicationDisplay,
    pub agents: Vec<AgentEntry>,
    pub performance: PerformanceDisplay,
    pub impact: ImpactDisplay,
    pub timeline: TimelineDisplay,
    pub domains: Vec<DomainState>,
}

impl ViewModel {
    pub fn predictions(&self) -> PredictionDisplay {
        let dashboard = self.dashboard.display_data();
        PredictionDisplay::from_section(dashboard.and_then(|d| d.predictions.as_ref()))
    }

    pub fn resources(&self) -> ResourceDisplay {
        let dashboard = self.dashboard.display_data();
        ResourceDisplay::from_section(dashboard.and_then(|d| d.resources.as_ref()))
    }

    pub fn insurance(&self) -> InsuranceDisplay {
        let dashboard = self.dashboard.display_data();
        InsuranceDisplay::from_section(dashboard.and_then(|d| d.insurance.as_ref()))
    }

    pub fn staff(&self) -> StaffDisplay {
        let dashboard = self.dashboard.display_data();
        StaffDisplay::from_section(dashboard.and_then(|d| d.staff.as_ref()))
    }

    pub fn pharmacy(&self) -> PharmacyDisplay {
        let dashboard = self.dashboard.display_data();
        PharmacyDisplay::from_section(dashboard.and_then(|d| d.pharmaceutical.as_ref()))
    }

    pub fn communication(&self) -> CommunicationDisplay {
        let dashboard = self.dashboard.display_data();
        CommunicationDisplay::from_section(dashboard.and_then(|d| d.communication.as_ref()))
    }

    pub fn agent_roster(&self) -> Vec<AgentEntry> {
        agent_roster(self.agents.display_data())
    }

    pub fn performance(&self) -> PerformanceDisplay {
        let metrics = self.metrics.display_data();
        PerformanceDisplay::from_section(metrics.and_then(|m| m.performance.as_ref()))
    }

    pub fn impact(&self) -> ImpactDisplay {
        let metrics = self.metrics.display_data();
        ImpactDisplay::from_section(metrics.and_then(|m| m.impact.as_ref()))
    }

    /// Timeline events; `total_events` falls back to the number received.
    pub fn timeline_display(&self) -> TimelineDisplay {
        match self.timeline.display_data() {
            Some(t) => TimelineDisplay {
                total_events: t.total_events.unwrap_or(t.timeline.len() as u64),
                events: t.timeline.clone(),
            },
            None => TimelineDisplay {
                total_events: 0,
                events: Vec::new(),
            },
        }
    }

    pub fn domain_states(&self) -> Vec<DomainState> {
        Domain::ALL
            .iter()
            .map(|&domain| DomainState {
                domain,
                state: self.state_label(domain),
                error: self.error_for(domain).map(|e| e.kind()),
                last_fetched_at: self.last_fetched_at(domain),
            })
            .collect()
    }

    /// Compute every derived value for a render at `now`.
    pub fn digest(&self, now: DateTime<Utc>) -> Digest {
        Digest {
            revision: self.revision,
            alert_level: self.alert_level(),
            banner_visible: self.banner_visible(),
            active_predictions: self.active_predictions(),
            hours_until_surge: self.hours_until_surge(now),
            predictions: self.predictions(),
            resources: self.resources(),
            insurance: self.insurance(),
            staff: self.staff(),
            pharmacy: self.pharmacy(),
            communication: self.communication(),
            agents: self.agent_roster(),
            performance: self.performance(),
            impact: self.impact(),
            timeline: self.timeline_display(),
            domains: self.domain_states(),
        }
    }
}
