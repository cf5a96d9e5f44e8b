//! Refresh cadence per domain.

use std::time::Duration;

use anyhow::Result;

use crate::data::duration::{format_duration, parse_duration};
use crate::source::Domain;

/// How often a domain is refreshed while its view is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fetch on mount, then on every tick of this period.
    Every(Duration),
    /// Fetch once on mount only.
    OnMount,
}

impl Cadence {
    /// Parse `"once"`, `"on_mount"`, `"off"` or a duration such as `"15s"`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" | "on_mount" | "off" => Ok(Cadence::OnMount),
            other => Ok(Cadence::Every(parse_duration(other)?)),
        }
    }

    /// The repeat period, if any.
    pub fn period(&self) -> Option<Duration> {
        match self {
            Cadence::Every(period) => Some(*period),
            Cadence::OnMount => None,
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cadence::Every(period) => write!(f, "every {}", format_duration(*period)),
            Cadence::OnMount => f.write_str("once"),
        }
    }
}

/// Refresh policy of one domain. Fixed for the life of a mounted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub cadence: Cadence,
}

impl RefreshPolicy {
    pub fn every(period: Duration) -> Self {
        Self {
            cadence: Cadence::Every(period),
        }
    }

    pub fn on_mount() -> Self {
        Self {
            cadence: Cadence::OnMount,
        }
    }
}

/// Policies for every domain a view polls. A domain without a policy is not polled.
///
/// The default polls the dashboard every 30 seconds and agents every 15
/// seconds; metrics and timeline are fetched once on mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySet {
    policies: [Option<RefreshPolicy>; 4],
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::empty()
            .with(Domain::Dashboard, RefreshPolicy::every(Duration::from_secs(30)))
            .with(Domain::Agents, RefreshPolicy::every(Duration::from_secs(15)))
            .with(Domain::Metrics, RefreshPolicy::on_mount())
            .with(Domain::Timeline, RefreshPolicy::on_mount())
    }
}

impl PolicySet {
    /// A set that polls nothing.
    pub fn empty() -> Self {
        Self {
            policies: [None; 4],
        }
    }

    /// Set the policy for `domain`.
    pub fn with(mut self, domain: Domain, policy: RefreshPolicy) -> Self {
        self.policies[domain.index()] = Some(policy);
        self
    }

    /// Stop polling `domain`.
    pub fn without(mut self, domain: Domain) -> Self {
        self.policies[domain.index()] = None;
        self
    }

    pub fn get(&self, domain: Domain) -> Option<RefreshPolicy> {
        self.policies[domain.index()]
    }

    /// Domains with a policy, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Domain, RefreshPolicy)> + '_ {
        Domain::ALL
            .into_iter()
            .filter_map(|domain| self.get(domain).map(|policy| (domain, policy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let set = PolicySet::default();
        assert_eq!(
            set.get(Domain::Dashboard),
            Some(RefreshPolicy::every(Duration::from_secs(30)))
        );
        assert_eq!(
            set.get(Domain::Agents),
            Some(RefreshPolicy::every(Duration::from_secs(15)))
        );
        assert_eq!(set.get(Domain::Metrics), Some(RefreshPolicy::on_mount()));
        assert_eq!(set.get(Domain::Timeline), Some(RefreshPolicy::on_mount()));
        assert_eq!(set.iter().count(), 4);
    }

    #[test]
    fn test_without_removes_domain() {
        let set = PolicySet::default().without(Domain::Timeline);
        assert!(set.get(Domain::Timeline).is_none());
        let domains: Vec<Domain> = set.iter().map(|(d, _)| d).collect();
        assert_eq!(domains, vec![Domain::Dashboard, Domain::Agents, Domain::Metrics]);
    }

    #[test]
    fn test_parse_cadence() {
        assert_eq!(Cadence::parse("once").unwrap(), Cadence::OnMount);
        assert_eq!(Cadence::parse("ON_MOUNT").unwrap(), Cadence::OnMount);
        assert_eq!(
            Cadence::parse("15s").unwrap(),
            Cadence::Every(Duration::from_secs(15))
        );
        assert_eq!(
            Cadence::parse("2m").unwrap(),
            Cadence::Every(Duration::from_secs(120))
        );
        assert!(Cadence::parse("sometimes").is_err());
    }

    #[test]
    fn test_cadence_display() {
        assert_eq!(Cadence::Every(Duration::from_secs(15)).to_string(), "every 15.0s");
        assert_eq!(Cadence::OnMount.to_string(), "once");
    }
}
