use async_trait::async_trait;
use log::{info, warn};

use crate::error::MealbotError;
use crate::fullcontact::GeoLocation;
use crate::intent::QueryParams;
use crate::yelp::{Business, SearchResponse};

/// Turns free text like "Boulder" into canonical city/state candidates.
#[async_trait]
pub trait LocationEnricher: Send + Sync {
    async fn enrich(&self, place: &str) -> Result<Vec<GeoLocation>, MealbotError>;
}

/// Looks up businesses serving `food` in `city`, `state`.
#[async_trait]
pub trait BusinessSearch: Send + Sync {
    async fn search(&self, city: &str, state: &str, food: &str) -> Result<SearchResponse, MealbotError>;
}

/// Result of a place search. "Nothing matched" and "a provider failed" are
/// answered differently: the first still gets a reply, the second aborts.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(Vec<Business>),
    NotFound,
    Failed(MealbotError),
}

impl SearchOutcome {
    /// Businesses to render, `None` for the empty-state page. Failures are returned as errors.
    pub fn into_places(self) -> Result<Option<Vec<Business>>, MealbotError> {
        match self {
            SearchOutcome::Found(places) => Ok(Some(places)),
            SearchOutcome::NotFound => Ok(None),
            SearchOutcome::Failed(err) => Err(err),
        }
    }
}

impl From<SearchResponse> for SearchOutcome {
    fn from(response: SearchResponse) -> Self {
        match response.businesses {
            Some(businesses) if !businesses.is_empty() => SearchOutcome::Found(businesses),
            _ => SearchOutcome::NotFound,
        }
    }
}

pub struct SearchOrchestrator<'a> {
    enricher: &'a dyn LocationEnricher,
    search: &'a dyn BusinessSearch,
}

impl<'a> SearchOrchestrator<'a> {
    pub fn new(enricher: &'a dyn LocationEnricher, search: &'a dyn BusinessSearch) -> Self {
        Self { enricher, search }
    }

    /// Resolves the requested location, then searches around the first match.
    pub async fn search_places(&self, params: &QueryParams) -> SearchOutcome {
        self.search_places_in(&params.location, &params.food).await
    }

    pub async fn search_places_in(&self, place: &str, food: &str) -> SearchOutcome {
        let locations = match self.enricher.enrich(place).await {
            Ok(locations) => locations,
            Err(err) => {
                warn!("could not resolve location {:?}: {}", place, err);
                return SearchOutcome::Failed(err);
            }
        };

        let Some(location) = locations.first() else {
            warn!("no locations matched {:?}, nothing to search", place);
            return SearchOutcome::NotFound;
        };

        info!(
            "Resolved {:?} to {}, {}",
            place, location.city, location.state.name
        );

        match self.search.search(&location.city, &location.state.name, food).await {
            Ok(response) => SearchOutcome::from(response),
            Err(err) => {
                warn!("could not search places: {}", err);
                SearchOutcome::Failed(err)
            }
        }
    }
}
