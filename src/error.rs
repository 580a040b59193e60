//! Error types for tsquery

use crate::catalog::{CatalogError, OrgId};
use crate::config::SettingsError;
use crate::emitter::EmitError;
use crate::executor::ExecuteError;
use crate::planner::PlanError;
use crate::query::ConfigError;

/// Errors that can occur while loading a metric catalog
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The same organization id appears twice
    #[error("Organization {0} is defined more than once")]
    DuplicateOrg(OrgId),
    /// The same metric name appears twice in one scope of an organization
    #[error("Metric '{metric}' is defined more than once for organization {org}")]
    DuplicateMetric { org: OrgId, metric: String },
}

/// Any failure between receiving a query and consuming its rows
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}
