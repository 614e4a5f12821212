//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a one-line message with a hint where one helps.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProviderNotConfigured(_) => {
            format!("{}\nhint: set provider.api_key or AUTOPILOT__PROVIDER__API_KEY", e)
        }
        ApiError::CatalogError(_) => format!("{}\nhint: check catalog.path in config", e),
        _ => e.to_string(),
    }
}
