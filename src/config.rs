use std::time::Duration;
use std::{env, io};

use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;

use crate::cache::{DEFAULT_MAX_PER_COUNTRY, DEFAULT_SAVE_EVERY};

const DEFAULT_PLACES_API_BASE: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_REQUIRED_COMPONENTS: &[&str] = &["street_number", "route", "postal_code", "locality"];
const DEFAULT_PROXY_TEMPLATE: &str = "socks5://{geo}@proxy.example.com:9{port}";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub google_maps_api_key: Option<SecretString>,
    pub places_api_base: String,
    pub places_language: String,
    pub places_search_query: String,
    pub places_timeout_secs: u64,
    pub places_response_cache_size: usize,
    pub address_cache_file: String,
    pub address_cache_max_per_country: usize,
    pub address_cache_save_every: usize,
    pub cache_probability: f64,
    pub max_unique_attempts: u32,
    pub max_api_attempts: u32,
    pub retry_base_delay_secs: f64,
    pub required_components: Vec<String>,
    pub concurrency_limit: usize,
    pub record_address_attempts: u32,
    pub min_age: u32,
    pub max_age: u32,
    pub password_length: usize,
    pub proxy_template: String,
    pub proxy_port_range: (u16, u16),
}

#[derive(Clone, Debug, Serialize)]
pub struct PublicAppConfig {
    pub has_google_maps_key: bool,
    pub places_api_base: String,
    pub places_language: String,
    pub places_search_query: String,
    pub address_cache_file: String,
    pub address_cache_max_per_country: usize,
    pub cache_probability: f64,
    pub max_unique_attempts: u32,
    pub max_api_attempts: u32,
    pub retry_base_delay_secs: f64,
    pub concurrency_limit: usize,
}

/// Tuning constants the resolver consumes. Kept apart from [`AppConfig`] so
/// the resolver never touches the environment.
#[derive(Clone, Debug)]
pub struct ResolverSettings {
    pub cache_probability: f64,
    pub max_unique_attempts: u32,
    pub max_api_attempts: u32,
    pub retry_base_delay_secs: f64,
    pub search_query: String,
    pub required_components: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_probability: 0.7,
            max_unique_attempts: 10,
            max_api_attempts: 5,
            retry_base_delay_secs: 2.0,
            search_query: "residential building".into(),
            required_components: DEFAULT_REQUIRED_COMPONENTS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl ResolverSettings {
    /// `base ^ attempt` seconds; non-finite or negative results collapse to zero.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16) as i32;
        let secs = self.retry_base_delay_secs.powi(exponent);
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv_if_applicable();
        let defaults = ResolverSettings::default();
        let min_age = parse_u32("MIN_AGE", 25);
        let port_min = parse_u16("PROXY_PORT_MIN", 100);
        Self {
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from),
            places_api_base: env::var("PLACES_API_BASE")
                .unwrap_or_else(|_| DEFAULT_PLACES_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            places_language: env::var("PLACES_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            places_search_query: env::var("PLACES_SEARCH_QUERY")
                .unwrap_or_else(|_| defaults.search_query.clone()),
            places_timeout_secs: parse_u64("PLACES_TIMEOUT_SECS", 10).max(1),
            places_response_cache_size: parse_usize("PLACES_RESPONSE_CACHE_SIZE", 128),
            address_cache_file: env::var("ADDRESS_CACHE_FILE")
                .unwrap_or_else(|_| "address_cache.json".to_string()),
            address_cache_max_per_country: parse_usize(
                "ADDRESS_CACHE_MAX_PER_COUNTRY",
                DEFAULT_MAX_PER_COUNTRY,
            )
            .max(1),
            address_cache_save_every: parse_usize("ADDRESS_CACHE_SAVE_EVERY", DEFAULT_SAVE_EVERY)
                .max(1),
            cache_probability: parse_f64("CACHE_PROBABILITY", defaults.cache_probability)
                .clamp(0.0, 1.0),
            max_unique_attempts: parse_u32("MAX_UNIQUE_ATTEMPTS", defaults.max_unique_attempts)
                .max(1),
            max_api_attempts: parse_u32("MAX_API_ATTEMPTS", defaults.max_api_attempts).max(1),
            retry_base_delay_secs: parse_f64(
                "RETRY_BASE_DELAY_SECS",
                defaults.retry_base_delay_secs,
            )
            .max(0.0),
            required_components: parse_list("REQUIRED_COMPONENTS")
                .unwrap_or(defaults.required_components),
            concurrency_limit: parse_usize("CONCURRENCY_LIMIT", 20).max(1),
            record_address_attempts: parse_u32("RECORD_ADDRESS_ATTEMPTS", 10).max(1),
            min_age,
            max_age: parse_u32("MAX_AGE", 45).max(min_age),
            password_length: parse_usize("PASSWORD_LENGTH", 18).max(4),
            proxy_template: env::var("PROXY_TEMPLATE")
                .unwrap_or_else(|_| DEFAULT_PROXY_TEMPLATE.to_string()),
            proxy_port_range: (port_min, parse_u16("PROXY_PORT_MAX", 299).max(port_min)),
        }
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            cache_probability: self.cache_probability,
            max_unique_attempts: self.max_unique_attempts,
            max_api_attempts: self.max_api_attempts,
            retry_base_delay_secs: self.retry_base_delay_secs,
            search_query: self.places_search_query.clone(),
            required_components: self.required_components.clone(),
        }
    }

    pub fn public_profile(&self) -> PublicAppConfig {
        PublicAppConfig {
            has_google_maps_key: self.google_maps_api_key.is_some(),
            places_api_base: self.places_api_base.clone(),
            places_language: self.places_language.clone(),
            places_search_query: self.places_search_query.clone(),
            address_cache_file: self.address_cache_file.clone(),
            address_cache_max_per_country: self.address_cache_max_per_country,
            cache_probability: self.cache_probability,
            max_unique_attempts: self.max_unique_attempts,
            max_api_attempts: self.max_api_attempts,
            retry_base_delay_secs: self.retry_base_delay_secs,
            concurrency_limit: self.concurrency_limit,
        }
    }
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions) || parse_bool("ALLOW_DOTENV", false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

fn parse_u64(key: &str, default: u64) -> u64 {
    parse_number(key).unwrap_or(default)
}

fn parse_usize(key: &str, default: usize) -> usize {
    parse_number(key).unwrap_or(default)
}

fn parse_u32(key: &str, default: u32) -> u32 {
    parse_number(key).unwrap_or(default)
}

fn parse_u16(key: &str, default: u16) -> u16 {
    parse_number(key).unwrap_or(default)
}

fn parse_f64(key: &str, default: f64) -> f64 {
    parse_number::<f64>(key)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn parse_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}
