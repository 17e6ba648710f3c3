use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, trace, warn};

use crate::address::AddressComponents;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::geo::SearchArea;

const DETAILS_FIELDS: &str = "address_component,formatted_address";

/// One raw hit from a nearby search, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCandidate {
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceDetails {
    pub components: AddressComponents,
    pub formatted_address: Option<String>,
}

/// Single-shot, fail-soft access to the places provider. Every failure class
/// comes back as an empty value; retrying is the caller's business.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn search_places(&self, area: SearchArea, query: &str) -> Vec<PlaceCandidate>;

    async fn place_details(&self, place_id: &str) -> Option<PlaceDetails>;
}

#[derive(Clone)]
pub struct PlacesService {
    inner: Arc<dyn PlaceLookup>,
}

impl PlacesService {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let settings = PlacesClientSettings::from_config(config)?;
        Ok(Self {
            inner: Arc::new(HttpPlacesClient::new(settings)?),
        })
    }

    pub fn from_lookup(lookup: Arc<dyn PlaceLookup>) -> Self {
        Self { inner: lookup }
    }

    pub async fn search_places(&self, area: SearchArea, query: &str) -> Vec<PlaceCandidate> {
        self.inner.search_places(area, query).await
    }

    pub async fn place_details(&self, place_id: &str) -> Option<PlaceDetails> {
        self.inner.place_details(place_id).await
    }
}

#[derive(Clone, Debug)]
pub struct PlacesClientSettings {
    pub api_key: SecretString,
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
    pub response_cache_size: usize,
}

impl PlacesClientSettings {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let api_key = config
            .google_maps_api_key
            .clone()
            .ok_or_else(|| AppError::Config("GOOGLE_MAPS_API_KEY is not set".into()))?;
        Ok(Self {
            api_key,
            base_url: config.places_api_base.trim_end_matches('/').to_string(),
            language: config.places_language.clone(),
            timeout: Duration::from_secs(config.places_timeout_secs),
            response_cache_size: config.places_response_cache_size,
        })
    }
}

pub struct HttpPlacesClient {
    http: Client,
    settings: PlacesClientSettings,
    responses: ResponseCache,
}

enum SearchOutcome {
    Results(Vec<PlaceCandidate>),
    NoResults,
    Rejected {
        status: String,
        message: Option<String>,
    },
}

impl HttpPlacesClient {
    pub fn new(settings: PlacesClientSettings) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("identity-forge/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            responses: ResponseCache::new(settings.response_cache_size),
            settings,
        })
    }

    async fn fetch_search(&self, area: SearchArea, query: &str) -> AppResult<SearchOutcome> {
        #[derive(Deserialize)]
        struct Response {
            status: String,
            #[serde(default)]
            results: Vec<ResponsePlace>,
            error_message: Option<String>,
        }

        #[derive(Deserialize)]
        struct ResponsePlace {
            place_id: Option<String>,
            formatted_address: Option<String>,
        }

        let location = area.center.as_query_param();
        let radius = area.radius_meters.to_string();
        let response = self
            .http
            .get(format!("{}/textsearch/json", self.settings.base_url))
            .query(&[
                ("query", query),
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("language", self.settings.language.as_str()),
                ("key", self.settings.api_key.expose_secret()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)?;
        let parsed: Response = response.json().await.map_err(reqwest::Error::without_url)?;

        Ok(match parsed.status.as_str() {
            "OK" if !parsed.results.is_empty() => SearchOutcome::Results(
                parsed
                    .results
                    .into_iter()
                    .map(|place| PlaceCandidate {
                        place_id: place.place_id,
                        formatted_address: place.formatted_address,
                    })
                    .collect(),
            ),
            "OK" | "ZERO_RESULTS" => SearchOutcome::NoResults,
            _ => SearchOutcome::Rejected {
                status: parsed.status,
                message: parsed.error_message,
            },
        })
    }

    async fn fetch_details(&self, place_id: &str) -> AppResult<Option<PlaceDetails>> {
        #[derive(Deserialize)]
        struct Response {
            status: String,
            result: Option<ResponseResult>,
            error_message: Option<String>,
        }

        #[derive(Deserialize)]
        struct ResponseResult {
            #[serde(default)]
            address_components: Vec<ResponseComponent>,
            formatted_address: Option<String>,
        }

        #[derive(Deserialize)]
        struct ResponseComponent {
            long_name: String,
            #[serde(default)]
            types: Vec<String>,
        }

        let response = self
            .http
            .get(format!("{}/details/json", self.settings.base_url))
            .query(&[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("language", self.settings.language.as_str()),
                ("key", self.settings.api_key.expose_secret()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)?;
        let parsed: Response = response.json().await.map_err(reqwest::Error::without_url)?;

        if parsed.status != "OK" {
            warn!(
                target: "places",
                place_id,
                status = %parsed.status,
                message = parsed.error_message.as_deref().unwrap_or_default(),
                "place details request rejected"
            );
            return Ok(None);
        }

        let Some(result) = parsed.result else {
            return Ok(None);
        };
        let mut components = AddressComponents::default();
        for component in &result.address_components {
            components.assign(&component.types, &component.long_name);
        }
        let details = PlaceDetails {
            components,
            formatted_address: result.formatted_address.filter(|a| !a.trim().is_empty()),
        };
        if details.components.is_empty() && details.formatted_address.is_none() {
            return Ok(None);
        }
        Ok(Some(details))
    }
}

#[async_trait]
impl PlaceLookup for HttpPlacesClient {
    async fn search_places(&self, area: SearchArea, query: &str) -> Vec<PlaceCandidate> {
        let key = ResponseKey::new(area, query);
        if let Some(hit) = self.responses.get(&key) {
            trace!(target: "places", location = %area.center, "search served from response cache");
            return hit;
        }

        match self.fetch_search(area, query).await {
            Ok(SearchOutcome::Results(candidates)) => {
                debug!(
                    target: "places",
                    location = %area.center,
                    radius = area.radius_meters,
                    count = candidates.len(),
                    "places search returned candidates"
                );
                self.responses.insert(key, candidates.clone());
                candidates
            }
            Ok(SearchOutcome::NoResults) => {
                warn!(
                    target: "places",
                    location = %area.center,
                    query,
                    "no places found for search"
                );
                Vec::new()
            }
            Ok(SearchOutcome::Rejected { status, message }) => {
                error!(
                    target: "places",
                    status = %status,
                    message = message.as_deref().unwrap_or_default(),
                    "places API rejected search"
                );
                Vec::new()
            }
            Err(err) => {
                error!(target: "places", error = %err, "places search failed");
                Vec::new()
            }
        }
    }

    async fn place_details(&self, place_id: &str) -> Option<PlaceDetails> {
        match self.fetch_details(place_id).await {
            Ok(details) => details,
            Err(err) => {
                error!(target: "places", place_id, error = %err, "place details request failed");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResponseKey {
    location: String,
    radius_meters: u32,
    query: String,
}

impl ResponseKey {
    fn new(area: SearchArea, query: &str) -> Self {
        Self {
            location: area.center.as_query_param(),
            radius_meters: area.radius_meters,
            query: query.to_string(),
        }
    }
}

/// Bounded memo of successful searches; the oldest key goes first.
struct ResponseCache {
    capacity: usize,
    inner: Mutex<ResponseCacheState>,
}

#[derive(Default)]
struct ResponseCacheState {
    entries: HashMap<ResponseKey, Vec<PlaceCandidate>>,
    order: VecDeque<ResponseKey>,
}

impl ResponseCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(ResponseCacheState::default()),
        }
    }

    fn get(&self, key: &ResponseKey) -> Option<Vec<PlaceCandidate>> {
        self.inner.lock().entries.get(key).cloned()
    }

    fn insert(&self, key: ResponseKey, candidates: Vec<PlaceCandidate>) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.inner.lock();
        if state.entries.insert(key.clone(), candidates).is_none() {
            state.order.push_back(key);
        }
        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
            }
        }
    }
}
