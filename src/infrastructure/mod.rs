//! Concrete portal adapters and the startup wiring that registers them.

pub mod http;
pub mod illinois;
pub mod in_memory;
pub mod iowa;
pub mod nebraska;
pub mod ohio;
pub mod wisconsin;

use crate::application::registry::SourceRegistry;
use crate::config::AppConfig;
use crate::error::Result;
use crate::infrastructure::http::PortalClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds the source registry from configuration: one shared HTTP client,
/// one finder/payer pair per configured portal section.
pub fn build_registry(config: &AppConfig) -> Result<SourceRegistry> {
    let client = http::build_client(Duration::from_millis(config.lookup.http_timeout_ms))?;
    let mut registry = SourceRegistry::new();

    if let Some(portal) = &config.sources.illinois {
        let portal = PortalClient::new(client.clone(), &portal.base_url, portal.api_key.clone());
        registry.register_finder(Arc::new(illinois::IllinoisClerkFinder::new(portal.clone())));
        registry.register_payer(Arc::new(illinois::IllinoisClerkPayer::new(portal)))?;
    }
    if let Some(portal) = &config.sources.nebraska_campus {
        let portal = PortalClient::new(client.clone(), &portal.base_url, portal.api_key.clone());
        registry.register_finder(Arc::new(nebraska::CampusParkingFinder::new(portal)));
    }
    if let Some(portal) = &config.sources.lincoln_city {
        let portal = PortalClient::new(client.clone(), &portal.base_url, portal.api_key.clone());
        registry.register_finder(Arc::new(nebraska::CityTreasurerFinder::new(portal.clone())));
        registry.register_payer(Arc::new(nebraska::CityTreasurerPayer::new(portal)))?;
    }
    if let Some(portal) = &config.sources.ohio_state {
        let portal = PortalClient::new(client.clone(), &portal.base_url, portal.api_key.clone());
        registry.register_finder(Arc::new(ohio::CampusParcFinder::new(portal)));
    }
    if let Some(portal) = &config.sources.iowa_dot {
        let portal = PortalClient::new(client.clone(), &portal.base_url, portal.api_key.clone());
        registry.register_finder(Arc::new(iowa::DotExportFinder::new(portal)));
    }
    if let Some(portal) = &config.sources.madison_court {
        let portal = PortalClient::new(client.clone(), &portal.base_url, portal.api_key.clone());
        registry.register_finder(Arc::new(wisconsin::MunicipalCourtFinder::new(portal.clone())));
        registry.register_payer(Arc::new(wisconsin::MunicipalCourtPayer::new(portal)))?;
    }

    info!(
        finders = registry.finder_count(),
        jurisdictions = registry.jurisdictions().len(),
        "source registry built"
    );
    Ok(registry)
}
