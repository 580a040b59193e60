//! Root catalog definition and the catalog lookup contract

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::error::CatalogError;
use super::metric::{MetricDefinition, MetricMap};
use crate::error::ParseError;

/// Organization identifier
pub type OrgId = i64;

/// Which family of timeseries metrics a lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricScope {
    /// Metrics recorded per content item
    Content,
    /// Metrics recorded per organization
    Org,
}

/// Read-only source of metric definitions per organization.
///
/// Implementations must be free of side effects: the compiler may call these
/// methods any number of times for one query.
pub trait MetricCatalog {
    /// Stored (non-computed) metrics of an organization
    fn metrics_for(&self, org: OrgId, scope: MetricScope) -> Result<MetricMap, CatalogError>;

    /// Computed metrics of an organization
    fn computed_metrics_for(&self, org: OrgId, scope: MetricScope) -> Result<MetricMap, CatalogError>;
}

/// A catalog of organizations and their timeseries metrics, usually loaded from YAML
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub orgs: Vec<OrgMetrics>,
}

/// The metrics one organization tracks
#[derive(Debug, Deserialize)]
pub struct OrgMetrics {
    pub id: OrgId,
    pub name: Option<String>,
    /// Per-content-item timeseries metrics
    #[serde(default)]
    pub content_metrics: Vec<MetricDefinition>,
    /// Organization-level timeseries metrics
    #[serde(default)]
    pub org_metrics: Vec<MetricDefinition>,
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        crate::parser::parse_file(path)
    }

    /// Get an organization by id
    pub fn get_org(&self, id: OrgId) -> Option<&OrgMetrics> {
        self.orgs.iter().find(|o| o.id == id)
    }

    /// Check that org ids and metric names within one scope are unique
    pub fn validate(&self) -> Result<(), ParseError> {
        let mut seen_orgs = HashSet::new();
        for org in &self.orgs {
            if !seen_orgs.insert(org.id) {
                return Err(ParseError::DuplicateOrg(org.id));
            }
            for scope in [MetricScope::Content, MetricScope::Org] {
                let mut seen = HashSet::new();
                for metric in org.metrics(scope) {
                    if !seen.insert(metric.name.as_str()) {
                        return Err(ParseError::DuplicateMetric {
                            org: org.id,
                            metric: metric.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn collect(
        &self,
        org: OrgId,
        scope: MetricScope,
        computed: bool,
    ) -> Result<MetricMap, CatalogError> {
        let org = self.get_org(org).ok_or(CatalogError::OrgNotFound(org))?;
        Ok(org
            .metrics(scope)
            .iter()
            .filter(|m| m.computed == computed)
            .map(|m| (m.name.clone(), m.clone()))
            .collect())
    }
}

impl OrgMetrics {
    /// All metric definitions in a scope, stored and computed
    pub fn metrics(&self, scope: MetricScope) -> &[MetricDefinition] {
        match scope {
            MetricScope::Content => &self.content_metrics,
            MetricScope::Org => &self.org_metrics,
        }
    }
}

impl MetricCatalog for Catalog {
    fn metrics_for(&self, org: OrgId, scope: MetricScope) -> Result<MetricMap, CatalogError> {
        self.collect(org, scope, false)
    }

    fn computed_metrics_for(&self, org: OrgId, scope: MetricScope) -> Result<MetricMap, CatalogError> {
        self.collect(org, scope, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Aggregation, MetricKind};

    const YAML: &str = r#"
orgs:
  - id: 1
    name: newsroom
    content_metrics:
      - { name: pageviews, kind: count, aggregation: sum }
      - { name: twitter_shares, kind: cumulative, aggregation: max }
      - { name: engagement, kind: count, aggregation: avg, computed: true }
    org_metrics:
      - { name: fb_page_likes, kind: cumulative, aggregation: sum }
"#;

    fn catalog() -> Catalog {
        crate::parser::parse_str(YAML).unwrap()
    }

    #[test]
    fn test_metrics_for_excludes_computed() {
        let metrics = catalog().metrics_for(1, MetricScope::Content).unwrap();
        let names: Vec<_> = metrics.keys().cloned().collect();
        assert_eq!(names, vec!["pageviews", "twitter_shares"]);
        let shares = &metrics["twitter_shares"];
        assert_eq!(shares.kind, MetricKind::Cumulative);
        assert_eq!(shares.aggregation, Aggregation::Max);
    }

    #[test]
    fn test_computed_metrics_for() {
        let computed = catalog().computed_metrics_for(1, MetricScope::Content).unwrap();
        assert_eq!(computed.len(), 1);
        assert!(computed["engagement"].computed);
    }

    #[test]
    fn test_scopes_are_separate() {
        let org = catalog().metrics_for(1, MetricScope::Org).unwrap();
        assert_eq!(org.keys().collect::<Vec<_>>(), vec!["fb_page_likes"]);
    }

    #[test]
    fn test_unknown_org() {
        let err = catalog().metrics_for(99, MetricScope::Content).unwrap_err();
        assert!(matches!(err, CatalogError::OrgNotFound(99)));
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let yaml = r#"
orgs:
  - id: 1
    content_metrics:
      - { name: pageviews, kind: count, aggregation: sum }
      - { name: pageviews, kind: count, aggregation: max }
"#;
        let err = crate::parser::parse_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateMetric { org: 1, .. }));
    }

    #[test]
    fn test_duplicate_org_rejected() {
        let yaml = "orgs:\n  - id: 3\n  - id: 3\n";
        let err = crate::parser::parse_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateOrg(3)));
    }
}
