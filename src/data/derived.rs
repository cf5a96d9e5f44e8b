//! Presentation state computed from a view model at read time.
//!
//! Nothing here is stored: every value is recomputed from the current
//! [`ViewModel`] whenever a render pass asks for it. Time-dependent values take
//! `now` explicitly so they never go stale inside a published model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::view_model::ViewModel;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Severity of the current crisis alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Band a raw level string. Total: anything unrecognised is `Low`.
    ///
    /// ```
    /// use medisurge_monitor::AlertLevel;
    ///
    /// assert_eq!(AlertLevel::from_level("HIGH"), AlertLevel::High);
    /// assert_eq!(AlertLevel::from_level(" critical "), AlertLevel::Critical);
    /// assert_eq!(AlertLevel::from_level("UNKNOWN"), AlertLevel::Low);
    /// ```
    pub fn from_level(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MEDIUM" => AlertLevel::Medium,
            "HIGH" => AlertLevel::High,
            "CRITICAL" => AlertLevel::Critical,
            _ => AlertLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    /// Whether the alert banner should be shown for this level.
    pub fn is_elevated(&self) -> bool {
        *self != AlertLevel::Low
    }
}

/// Threshold classification of a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    Good,
    Warning,
    Critical,
}

impl StatusBand {
    pub const GOOD_AT: f64 = 90.0;
    pub const WARNING_AT: f64 = 70.0;

    /// `good` at 90 and above, `warning` at 70 and above, else `critical`.
    pub fn classify(percent: f64) -> Self {
        if percent >= Self::GOOD_AT {
            StatusBand::Good
        } else if percent >= Self::WARNING_AT {
            StatusBand::Warning
        } else {
            StatusBand::Critical
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            StatusBand::Good => "OK",
            StatusBand::Warning => "WARN",
            StatusBand::Critical => "CRIT",
        }
    }
}

/// Reported pharmaceutical supply state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    Sufficient,
    Adequate,
    Low,
    Critical,
}

impl SupplyStatus {
    /// Absent means `Sufficient`; an unrecognised string is treated as `Critical`.
    pub fn from_status(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return SupplyStatus::Sufficient;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "sufficient" => SupplyStatus::Sufficient,
            "adequate" => SupplyStatus::Adequate,
            "low" => SupplyStatus::Low,
            _ => SupplyStatus::Critical,
        }
    }

    pub fn band(&self) -> StatusBand {
        match self {
            SupplyStatus::Sufficient | SupplyStatus::Adequate => StatusBand::Good,
            SupplyStatus::Low => StatusBand::Warning,
            SupplyStatus::Critical => StatusBand::Critical,
        }
    }
}

/// Round half-up: `5.5 -> 6`, `-2.5 -> -2`.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Whole hours from `now` until `target`, rounded half-up.
///
/// Negative for targets in the past; not clamped.
///
/// ```
/// use chrono::{Duration, Utc};
/// use medisurge_monitor::data::hours_until;
///
/// let now = Utc::now();
/// assert_eq!(hours_until(now + Duration::minutes(330), now), 6);
/// assert_eq!(hours_until(now - Duration::hours(2), now), -2);
/// ```
pub fn hours_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds() as f64;
    round_half_up(millis / MILLIS_PER_HOUR) as i64
}

impl ViewModel {
    /// Current alert level, `Low` when the dashboard has no level.
    pub fn alert_level(&self) -> AlertLevel {
        self.dashboard
            .display_data()
            .and_then(|d| d.alerts.as_ref())
            .and_then(|a| a.current_level.as_deref())
            .map(AlertLevel::from_level)
            .unwrap_or_default()
    }

    pub fn active_predictions(&self) -> u32 {
        self.dashboard
            .display_data()
            .and_then(|d| d.alerts.as_ref())
            .and_then(|a| a.active_predictions)
            .unwrap_or(0)
    }

    /// Hours until the next predicted surge; 0 when none is known.
    pub fn hours_until_surge(&self, now: DateTime<Utc>) -> i64 {
        self.dashboard
            .display_data()
            .and_then(|d| d.alerts.as_ref())
            .and_then(|a| a.next_surge)
            .map(|surge| hours_until(surge, now))
            .unwrap_or(0)
    }

    pub fn banner_visible(&self) -> bool {
        self.alert_level().is_elevated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Aggregator;
    use crate::source::payload::{Alerts, DashboardSummary};
    use crate::source::{Domain, FetchError, Payload};
    use chrono::Duration;

    fn view_with(alerts: Alerts) -> std::sync::Arc<ViewModel> {
        let mut agg = Aggregator::new();
        let ticket = agg.issue(Domain::Dashboard).unwrap();
        agg.update(
            ticket,
            Ok(Payload::Dashboard(DashboardSummary {
                alerts: Some(alerts),
                ..Default::default()
            })),
        )
        .unwrap()
    }

    #[test]
    fn test_alert_level_banding() {
        assert_eq!(AlertLevel::from_level("LOW"), AlertLevel::Low);
        assert_eq!(AlertLevel::from_level("MEDIUM"), AlertLevel::Medium);
        assert_eq!(AlertLevel::from_level("High"), AlertLevel::High);
        assert_eq!(AlertLevel::from_level("CRITICAL"), AlertLevel::Critical);
        assert_eq!(AlertLevel::from_level("UNKNOWN"), AlertLevel::Low);
        assert_eq!(AlertLevel::from_level(""), AlertLevel::Low);
    }

    #[test]
    fn test_alert_level_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&AlertLevel::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn test_status_band_boundaries() {
        assert_eq!(StatusBand::classify(100.0), StatusBand::Good);
        assert_eq!(StatusBand::classify(90.0), StatusBand::Good);
        assert_eq!(StatusBand::classify(89.999), StatusBand::Warning);
        assert_eq!(StatusBand::classify(70.0), StatusBand::Warning);
        assert_eq!(StatusBand::classify(69.999), StatusBand::Critical);
        assert_eq!(StatusBand::classify(0.0), StatusBand::Critical);
    }

    #[test]
    fn test_hours_until() {
        let now = Utc::now();
        assert_eq!(hours_until(now + Duration::minutes(330), now), 6);
        assert_eq!(hours_until(now - Duration::hours(2), now), -2);
        assert_eq!(hours_until(now + Duration::minutes(149), now), 2);
        assert_eq!(hours_until(now, now), 0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(5.5), 6.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(85.4), 85.0);
    }

    #[test]
    fn test_supply_status() {
        assert_eq!(SupplyStatus::from_status(None), SupplyStatus::Sufficient);
        assert_eq!(SupplyStatus::from_status(Some("adequate")), SupplyStatus::Adequate);
        assert_eq!(SupplyStatus::from_status(Some("LOW")), SupplyStatus::Low);
        assert_eq!(SupplyStatus::from_status(Some("depleted")), SupplyStatus::Critical);
        assert_eq!(SupplyStatus::Low.band(), StatusBand::Warning);
    }

    #[test]
    fn test_empty_view_derives_defaults() {
        let view = ViewModel::empty();
        assert_eq!(view.alert_level(), AlertLevel::Low);
        assert_eq!(view.active_predictions(), 0);
        assert_eq!(view.hours_until_surge(Utc::now()), 0);
        assert!(!view.banner_visible());
    }

    #[test]
    fn test_view_derives_from_dashboard() {
        let now = Utc::now();
        let view = view_with(Alerts {
            current_level: Some("HIGH".into()),
            active_predictions: Some(0),
            next_surge: Some(now + Duration::minutes(330)),
        });

        assert_eq!(view.alert_level(), AlertLevel::High);
        assert!(view.banner_visible());
        assert_eq!(view.active_predictions(), 0);
        assert_eq!(view.hours_until_surge(now), 6);
        // Recomputed against a later clock, not cached
        assert_eq!(view.hours_until_surge(now + Duration::hours(3)), 3);
    }

    #[test]
    fn test_failed_refresh_keeps_last_level() {
        let mut agg = Aggregator::new();
        let first = agg.issue(Domain::Dashboard).unwrap();
        agg.update(
            first,
            Ok(Payload::Dashboard(DashboardSummary {
                alerts: Some(Alerts {
                    current_level: Some("CRITICAL".into()),
                    ..Default::default()
                }),
                ..Default::default()
            })),
        )
        .unwrap();
        let second = agg.issue(Domain::Dashboard).unwrap();
        let view = agg.update(second, Err(FetchError::Timeout)).unwrap();

        assert!(view.dashboard.error().is_some());
        assert_eq!(view.alert_level(), AlertLevel::Critical);
    }
}
