//! Catalog lookup errors

use super::registry::OrgId;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No organization with this id in the catalog
    #[error("Organization {0} not found in metric catalog")]
    OrgNotFound(OrgId),
}
