use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{credential, Config};
use crate::error::MealbotError;
use crate::search::LocationEnricher;

const ENRICHMENT_PATH: &str = "/v2/address/locationEnrichment.json";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: State,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct State {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct EnrichmentResponse {
    #[serde(default)]
    locations: Vec<GeoLocation>,
}

/// Resolves free-text places to a canonical city and state via FullContact.
#[derive(Debug, Clone)]
pub struct FullContactClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FullContactClient {
    pub fn new(http: &Client, config: &Config) -> Self {
        Self {
            http: http.clone(),
            base_url: config.endpoints.full_contact.trim_end_matches('/').to_string(),
            api_key: config.full_contact_key.clone(),
        }
    }

    pub async fn location_enrichment(&self, place: &str) -> Result<Vec<GeoLocation>, MealbotError> {
        info!("Enriching location {:?}", place);
        let api_key = credential(&self.api_key, "FULL_CONTACT_KEY")?;
        let url = format!("{}{}", self.base_url, ENRICHMENT_PATH);

        let response = self
            .http
            .get(&url)
            .query(&[("place", place), ("apiKey", api_key)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!("FullContact returned {}: {}", status, body);
            return Err(MealbotError::LocationLookup);
        }

        let enrichment = response.json::<EnrichmentResponse>().await?;
        debug!("FullContact locations for {:?}: {:?}", place, enrichment.locations);
        Ok(enrichment.locations)
    }
}

#[async_trait]
impl LocationEnricher for FullContactClient {
    async fn enrich(&self, place: &str) -> Result<Vec<GeoLocation>, MealbotError> {
        self.location_enrichment(place).await
    }
}
