use thiserror::Error;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur in the pricing domain.
///
/// Only malformed requests and catalog collaborator failures surface here.
/// Odd catalog data degrades to `uncategorized` or "no price" instead.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Requested resource kind is not a known subcategory
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    /// Requested category is not a known category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Usage tier is not one of small, medium, large, extra_large
    #[error("Invalid usage tier: {0}")]
    InvalidUsageTier(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The catalog collaborator failed to supply entries
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl PricingError {
    /// True for errors caused by the caller's request rather than the catalog.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, PricingError::Catalog(_))
    }

    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            PricingError::UnknownResourceKind(_) => "unknown_resource_kind",
            PricingError::UnknownCategory(_) => "unknown_category",
            PricingError::InvalidUsageTier(_) => "invalid_usage_tier",
            PricingError::InvalidInput(_) => "invalid_input",
            PricingError::Catalog(_) => "catalog",
        }
    }
}

impl From<validator::ValidationErrors> for PricingError {
    fn from(err: validator::ValidationErrors) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}
