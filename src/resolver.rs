use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::address::{format_from_components, is_valid, normalize, strip_country_suffix};
use crate::cache::AddressCache;
use crate::config::ResolverSettings;
use crate::geo::{GeoSeed, GeoSeedTable, SearchArea};
use crate::places::{PlaceCandidate, PlaceDetails, PlacesService};

/// Cooperative cancellation for a generation run.
#[derive(Clone, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Sleeps for `delay`. Returns `false` if the run was cancelled first.
    pub async fn sleep(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.is_cancelled();
        }
        tokio::select! {
            _ = sleep(delay) => !self.is_cancelled(),
            _ = self.cancelled() => false,
        }
    }

    /// Drives `fut` to completion unless the run is cancelled first.
    pub async fn race<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            output = fut => Some(output),
            _ = self.cancelled() => None,
        }
    }
}

/// Addresses already handed out during the current run, across countries.
#[derive(Default)]
pub struct UsedAddressSet {
    inner: Mutex<HashSet<String>>,
}

impl UsedAddressSet {
    /// Marks `address` used. Returns `false` if another request already holds it.
    pub fn claim(&self, address: &str) -> bool {
        self.inner.lock().insert(address.to_string())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.inner.lock().contains(address)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ResolverStats {
    pub cache_hits: usize,
    pub remote_calls: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub exhausted: usize,
}

#[derive(Default)]
struct ResolverCounters {
    cache_hits: AtomicUsize,
    remote_calls: AtomicUsize,
    resolved: AtomicUsize,
    rejected: AtomicUsize,
    exhausted: AtomicUsize,
}

impl ResolverCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in [
            &self.cache_hits,
            &self.remote_calls,
            &self.resolved,
            &self.rejected,
            &self.exhausted,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

enum RemoteOutcome {
    Accepted(String),
    Exhausted,
    Cancelled,
}

pub struct AddressResolver {
    cache: Arc<AddressCache>,
    lookup: PlacesService,
    seeds: Arc<GeoSeedTable>,
    settings: ResolverSettings,
    used: UsedAddressSet,
    rng: Mutex<StdRng>,
    counters: ResolverCounters,
}

impl AddressResolver {
    pub fn new(
        cache: Arc<AddressCache>,
        lookup: PlacesService,
        seeds: Arc<GeoSeedTable>,
        settings: ResolverSettings,
    ) -> Self {
        Self::with_rng(cache, lookup, seeds, settings, StdRng::from_entropy())
    }

    pub fn with_rng(
        cache: Arc<AddressCache>,
        lookup: PlacesService,
        seeds: Arc<GeoSeedTable>,
        settings: ResolverSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            cache,
            lookup,
            seeds,
            settings,
            used: UsedAddressSet::default(),
            rng: Mutex::new(rng),
            counters: ResolverCounters::default(),
        }
    }

    pub fn cache(&self) -> &Arc<AddressCache> {
        &self.cache
    }

    pub fn seeds(&self) -> &GeoSeedTable {
        &self.seeds
    }

    pub fn used_addresses(&self) -> &UsedAddressSet {
        &self.used
    }

    pub fn stats(&self) -> ResolverStats {
        self.counters.snapshot()
    }

    /// Starts a generation run: forgets the addresses handed out so far and
    /// resets the counters. Call before dispatching concurrent resolutions.
    pub fn begin_run(&self) {
        self.used.clear();
        self.counters.reset();
        info!(target: "resolver", "used address set cleared for new run");
    }

    pub async fn resolve_address(&self, country_code: &str) -> Option<String> {
        self.resolve_with_cancel(country_code, &CancelSignal::new())
            .await
    }

    pub async fn resolve_with_cancel(
        &self,
        country_code: &str,
        cancel: &CancelSignal,
    ) -> Option<String> {
        self.resolve_inner(country_code, cancel, true).await
    }

    /// Warms the cache with fresh remote lookups, `count_per_country` per
    /// country, then saves it.
    pub async fn prime_cache(
        &self,
        country_codes: &[String],
        count_per_country: usize,
        cancel: &CancelSignal,
    ) -> BTreeMap<String, Vec<String>> {
        info!(
            target: "resolver",
            countries = %country_codes.join(", "),
            count_per_country,
            "priming address cache"
        );
        let mut produced = BTreeMap::new();
        'countries: for code in country_codes {
            let code = code.trim().to_ascii_uppercase();
            let mut addresses = Vec::with_capacity(count_per_country);
            for index in 1..=count_per_country {
                if cancel.is_cancelled() {
                    produced.insert(code, addresses);
                    break 'countries;
                }
                match self.resolve_inner(&code, cancel, false).await {
                    Some(address) => {
                        info!(
                            target: "resolver",
                            country = %code,
                            "primed address {index}/{count_per_country}"
                        );
                        addresses.push(address);
                    }
                    None => warn!(
                        target: "resolver",
                        country = %code,
                        "failed to prime address {index}/{count_per_country}"
                    ),
                }
            }
            produced.insert(code, addresses);
        }
        self.cache.save_async().await;
        info!(target: "resolver", "address cache priming finished");
        produced
    }

    async fn resolve_inner(
        &self,
        country_code: &str,
        cancel: &CancelSignal,
        allow_cache: bool,
    ) -> Option<String> {
        let country_code = country_code.trim().to_ascii_uppercase();
        let Some(seed) = self.seeds.seed(&country_code) else {
            error!(
                target: "resolver",
                country = %country_code,
                "no geo seeds configured for country"
            );
            return None;
        };
        let country_name = self.seeds.display_name(&country_code);

        for round in 1..=self.settings.max_unique_attempts {
            if cancel.is_cancelled() {
                debug!(target: "resolver", country = %country_code, "resolution cancelled");
                return None;
            }

            if allow_cache && self.roll_cache() {
                if let Some(address) = self.try_cache(&country_code, country_name) {
                    return Some(address);
                }
            }

            debug!(target: "resolver", country = %country_code, round, "requesting fresh address");
            match self
                .try_remote(&country_code, seed, country_name, cancel)
                .await
            {
                RemoteOutcome::Accepted(address) => return Some(address),
                RemoteOutcome::Cancelled => {
                    debug!(target: "resolver", country = %country_code, "resolution cancelled");
                    return None;
                }
                RemoteOutcome::Exhausted => {
                    warn!(
                        target: "resolver",
                        country = %country_code,
                        round,
                        max_rounds = self.settings.max_unique_attempts,
                        "remote attempts exhausted for round"
                    );
                }
            }
        }

        ResolverCounters::bump(&self.counters.exhausted);
        error!(
            target: "resolver",
            country = %country_code,
            attempts = self.settings.max_unique_attempts,
            "failed to resolve a unique address"
        );
        None
    }

    fn roll_cache(&self) -> bool {
        let probability = self.settings.cache_probability.clamp(0.0, 1.0);
        self.rng.lock().gen_bool(probability)
    }

    fn try_cache(&self, country_code: &str, country_name: Option<&str>) -> Option<String> {
        let cached = {
            let mut rng = self.rng.lock();
            self.cache.get_random(country_code, &mut *rng)
        }?;
        // entries written by older builds or by hand may still carry the country
        let address = canonicalize(&cached, country_name);
        if !is_valid(&address) {
            debug!(target: "resolver", country = %country_code, "cached address failed validation");
            return None;
        }
        if !self.used.claim(&address) {
            return None;
        }
        ResolverCounters::bump(&self.counters.cache_hits);
        info!(target: "resolver", country = %country_code, "using cached address");
        Some(address)
    }

    async fn try_remote(
        &self,
        country_code: &str,
        seed: &GeoSeed,
        country_name: Option<&str>,
        cancel: &CancelSignal,
    ) -> RemoteOutcome {
        let area = {
            let mut rng = self.rng.lock();
            seed.pick(&mut *rng)
        };
        let Some(area) = area else {
            return RemoteOutcome::Exhausted;
        };

        let max_attempts = self.settings.max_api_attempts;
        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return RemoteOutcome::Cancelled;
            }
            match cancel
                .race(self.remote_attempt(country_code, area, country_name))
                .await
            {
                None => return RemoteOutcome::Cancelled,
                Some(Some(address)) => return RemoteOutcome::Accepted(address),
                Some(None) => {}
            }

            if attempt < max_attempts {
                let delay = self.settings.backoff_delay(attempt);
                debug!(
                    target: "resolver",
                    country = %country_code,
                    attempt,
                    max_attempts,
                    "attempt failed; retrying after {:?}",
                    delay
                );
                if !cancel.sleep(delay).await {
                    return RemoteOutcome::Cancelled;
                }
            }
        }
        RemoteOutcome::Exhausted
    }

    async fn remote_attempt(
        &self,
        country_code: &str,
        area: SearchArea,
        country_name: Option<&str>,
    ) -> Option<String> {
        ResolverCounters::bump(&self.counters.remote_calls);
        let candidates = self
            .lookup
            .search_places(area, &self.settings.search_query)
            .await;
        let candidate = {
            let mut rng = self.rng.lock();
            candidates.choose(&mut *rng).cloned()
        };
        let Some(candidate) = candidate else {
            debug!(target: "resolver", location = %area.center, "no candidates near seed");
            return None;
        };

        let details = match candidate.place_id.as_deref() {
            Some(place_id) => self.lookup.place_details(place_id).await,
            None => None,
        };
        let Some(raw) = self.raw_text(&candidate, details.as_ref()) else {
            self.reject(country_code, "candidate produced no usable address");
            return None;
        };

        let address = canonicalize(&raw, country_name);
        if !is_valid(&address) {
            self.reject(country_code, "address failed validation");
            return None;
        }
        if !self.used.claim(&address) {
            self.reject(country_code, "address already used in this run");
            return None;
        }

        self.cache.add_async(country_code, &address).await;
        ResolverCounters::bump(&self.counters.resolved);
        info!(target: "resolver", country = %country_code, "resolved fresh address");
        Some(address)
    }

    fn raw_text(&self, candidate: &PlaceCandidate, details: Option<&PlaceDetails>) -> Option<String> {
        let Some(details) = details else {
            return candidate
                .formatted_address
                .clone()
                .filter(|text| has_digit(text));
        };

        let components = &details.components;
        if components.is_empty() {
            return None;
        }
        if !components.has_house_number() {
            debug!(target: "resolver", "house number missing from components");
            return None;
        }
        if components.get("route").is_none() {
            // the formatter would drop the number without a street to attach it to
            debug!(target: "resolver", "street missing from components");
            return details
                .formatted_address
                .clone()
                .filter(|text| has_digit(text));
        }
        let missing = components.missing(&self.settings.required_components);
        if !missing.is_empty() {
            debug!(target: "resolver", ?missing, "formatting with partial components");
        }

        let formatted = format_from_components(components);
        if !formatted.is_empty() {
            return Some(formatted);
        }
        details
            .formatted_address
            .clone()
            .filter(|text| has_digit(text))
    }

    fn reject(&self, country_code: &str, reason: &str) {
        ResolverCounters::bump(&self.counters.rejected);
        debug!(target: "resolver", country = %country_code, reason, "candidate rejected");
    }
}

fn canonicalize(raw: &str, country_name: Option<&str>) -> String {
    let address = normalize(raw);
    match country_name {
        Some(name) => strip_country_suffix(&address, &normalize(name)),
        None => address,
    }
}

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::{tempdir, TempDir};

    use crate::address::AddressComponents;
    use crate::geo::SeedPoint;
    use crate::places::PlaceLookup;

    use super::*;

    const TEST_POINTS: &[SeedPoint] = &[
        SeedPoint::new(40.416775, -3.703790, false),
        SeedPoint::new(40.970104, -5.663540, true),
    ];

    const US_POINTS: &[SeedPoint] = &[SeedPoint::new(40.712776, -74.005974, false)];

    fn test_seeds() -> Arc<GeoSeedTable> {
        Arc::new(GeoSeedTable::from_seeds([
            GeoSeed {
                country_code: "ES",
                default_radius_meters: 30_000,
                border_radius_meters: 20_000,
                points: TEST_POINTS,
            },
            GeoSeed {
                country_code: "US",
                default_radius_meters: 35_000,
                border_radius_meters: 25_000,
                points: US_POINTS,
            },
        ]))
    }

    fn instant_settings(cache_probability: f64) -> ResolverSettings {
        ResolverSettings {
            cache_probability,
            retry_base_delay_secs: 0.0,
            ..ResolverSettings::default()
        }
    }

    /// Replays canned responses and counts calls.
    #[derive(Default)]
    struct ScriptedLookup {
        candidates: Vec<PlaceCandidate>,
        details: Vec<Option<PlaceDetails>>,
        searches: AtomicUsize,
        detail_calls: AtomicUsize,
    }

    impl ScriptedLookup {
        fn failing() -> Self {
            Self::default()
        }

        fn with_details(details: Vec<Option<PlaceDetails>>) -> Self {
            Self {
                candidates: vec![PlaceCandidate {
                    place_id: Some("place-1".into()),
                    formatted_address: None,
                }],
                details,
                ..Self::default()
            }
        }

        fn searches(&self) -> usize {
            self.searches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlaceLookup for ScriptedLookup {
        async fn search_places(&self, _area: SearchArea, _query: &str) -> Vec<PlaceCandidate> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.candidates.clone()
        }

        async fn place_details(&self, _place_id: &str) -> Option<PlaceDetails> {
            let call = self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.details
                .get(call)
                .or_else(|| self.details.last())
                .cloned()
                .flatten()
        }
    }

    fn details(pairs: &[(&str, &str)]) -> Option<PlaceDetails> {
        let mut components = AddressComponents::default();
        for (tag, value) in pairs {
            components.assign(&[tag.to_string()], value);
        }
        Some(PlaceDetails {
            components,
            formatted_address: None,
        })
    }

    fn resolver_with(
        lookup: Arc<ScriptedLookup>,
        settings: ResolverSettings,
    ) -> (AddressResolver, TempDir) {
        let dir = tempdir().unwrap();
        let cache = Arc::new(AddressCache::new(dir.path().join("cache.json"), 1000, 10));
        let resolver = AddressResolver::with_rng(
            cache,
            PlacesService::from_lookup(lookup),
            test_seeds(),
            settings,
            StdRng::seed_from_u64(11),
        );
        (resolver, dir)
    }

    #[tokio::test]
    async fn exhausts_after_configured_rounds() {
        let lookup = Arc::new(ScriptedLookup::failing());
        let settings = ResolverSettings {
            max_unique_attempts: 4,
            max_api_attempts: 3,
            ..instant_settings(0.7)
        };
        let (resolver, _dir) = resolver_with(lookup.clone(), settings);
        resolver.begin_run();

        assert_eq!(resolver.resolve_address("ES").await, None);
        assert_eq!(lookup.searches(), 4 * 3);
        let stats = resolver.stats();
        assert_eq!(stats.exhausted, 1);
        assert_eq!(stats.remote_calls, 12);
    }

    #[tokio::test]
    async fn cached_address_is_used_once_per_run() {
        let lookup = Arc::new(ScriptedLookup::failing());
        let (resolver, _dir) = resolver_with(lookup.clone(), instant_settings(1.0));
        resolver.cache().add("ES", "Calle Mayor 10, 28013 Madrid");
        resolver.begin_run();

        assert_eq!(
            resolver.resolve_address("ES").await.as_deref(),
            Some("Calle Mayor 10, 28013 Madrid")
        );
        assert_eq!(lookup.searches(), 0);

        assert_eq!(resolver.resolve_address("ES").await, None);
        let defaults = ResolverSettings::default();
        assert_eq!(
            lookup.searches(),
            (defaults.max_unique_attempts * defaults.max_api_attempts) as usize
        );
        assert_eq!(resolver.stats().cache_hits, 1);

        // a new run may hand the cached address out again
        resolver.begin_run();
        assert!(resolver.resolve_address("ES").await.is_some());
    }

    #[tokio::test]
    async fn formats_address_from_components() {
        let lookup = Arc::new(ScriptedLookup::with_details(vec![details(&[
            ("route", "Main St"),
            ("street_number", "5"),
            ("postal_code", "10001"),
            ("locality", "Springfield"),
        ])]));
        let (resolver, _dir) = resolver_with(lookup.clone(), instant_settings(0.0));
        resolver.begin_run();

        let address = resolver.resolve_address("US").await;
        assert_eq!(address.as_deref(), Some("Main St 5, 10001 Springfield"));
        assert!(resolver.cache().contains("US", "Main St 5, 10001 Springfield"));
        assert!(resolver.used_addresses().contains("Main St 5, 10001 Springfield"));
        assert_eq!(lookup.searches(), 1);
    }

    #[tokio::test]
    async fn missing_house_number_consumes_an_attempt() {
        let lookup = Arc::new(ScriptedLookup::with_details(vec![
            details(&[
                ("route", "Main St"),
                ("postal_code", "10001"),
                ("locality", "Springfield"),
            ]),
            details(&[
                ("route", "Main St"),
                ("street_number", "7"),
                ("postal_code", "10001"),
                ("locality", "Springfield"),
            ]),
        ]));
        let (resolver, _dir) = resolver_with(lookup.clone(), instant_settings(0.0));
        resolver.begin_run();

        let address = resolver.resolve_address("US").await;
        assert_eq!(address.as_deref(), Some("Main St 7, 10001 Springfield"));
        assert_eq!(lookup.searches(), 2);
        assert_eq!(resolver.stats().rejected, 1);
    }

    #[tokio::test]
    async fn never_emits_address_without_house_number() {
        let lookup = Arc::new(ScriptedLookup::with_details(vec![details(&[
            ("route", "Main St"),
            ("postal_code", "10001"),
            ("locality", "Springfield"),
            ("administrative_area_level_1", "Illinois"),
        ])]));
        let settings = ResolverSettings {
            max_unique_attempts: 2,
            max_api_attempts: 2,
            ..instant_settings(0.0)
        };
        let (resolver, _dir) = resolver_with(lookup.clone(), settings);
        resolver.begin_run();

        assert_eq!(resolver.resolve_address("US").await, None);
        assert_eq!(lookup.searches(), 4);
        assert_eq!(resolver.cache().len("US"), 0);
    }

    #[tokio::test]
    async fn house_number_without_street_is_never_emitted() {
        let lookup = Arc::new(ScriptedLookup::with_details(vec![details(&[
            ("street_number", "5"),
            ("postal_code", "10001"),
            ("locality", "Springfield"),
            ("administrative_area_level_1", "Illinois"),
        ])]));
        let settings = ResolverSettings {
            max_unique_attempts: 2,
            max_api_attempts: 2,
            ..instant_settings(0.0)
        };
        let (resolver, _dir) = resolver_with(lookup.clone(), settings);
        resolver.begin_run();

        assert_eq!(resolver.resolve_address("US").await, None);
        assert_eq!(lookup.searches(), 4);
        assert_eq!(resolver.stats().rejected, 4);
        assert_eq!(resolver.cache().len("US"), 0);
    }

    #[tokio::test]
    async fn house_number_without_street_uses_formatted_address() {
        let mut partial = details(&[
            ("street_number", "5"),
            ("postal_code", "10001"),
            ("locality", "Springfield"),
            ("administrative_area_level_1", "Illinois"),
        ]);
        if let Some(details) = partial.as_mut() {
            details.formatted_address =
                Some("5 Main St, Springfield, IL 10001, United States".into());
        }
        let lookup = Arc::new(ScriptedLookup::with_details(vec![partial]));
        let (resolver, _dir) = resolver_with(lookup, instant_settings(0.0));
        resolver.begin_run();

        assert_eq!(
            resolver.resolve_address("US").await.as_deref(),
            Some("5 Main St, Springfield, IL 10001")
        );
    }

    #[tokio::test]
    async fn cached_entries_are_canonicalised_before_use() {
        let lookup = Arc::new(ScriptedLookup::failing());
        let (resolver, _dir) = resolver_with(lookup.clone(), instant_settings(1.0));
        resolver.cache().add("ES", "Calle de Alcalá  20, 28014 Madrid, Spain");
        resolver.begin_run();

        assert_eq!(
            resolver.resolve_address("ES").await.as_deref(),
            Some("Calle de Alcala 20, 28014 Madrid")
        );
        assert_eq!(lookup.searches(), 0);
        assert!(resolver.used_addresses().contains("Calle de Alcala 20, 28014 Madrid"));
    }

    #[tokio::test]
    async fn falls_back_to_candidate_address_and_strips_country() {
        let lookup = Arc::new(ScriptedLookup {
            candidates: vec![PlaceCandidate {
                place_id: Some("gone".into()),
                formatted_address: Some("Calle de Alcalá 20, 28014 Madrid, Spain".into()),
            }],
            details: vec![None],
            ..ScriptedLookup::default()
        });
        let (resolver, _dir) = resolver_with(lookup, instant_settings(0.0));
        resolver.begin_run();

        assert_eq!(
            resolver.resolve_address("es").await.as_deref(),
            Some("Calle de Alcala 20, 28014 Madrid")
        );
    }

    #[tokio::test]
    async fn unknown_country_returns_none_without_lookups() {
        let lookup = Arc::new(ScriptedLookup::failing());
        let (resolver, _dir) = resolver_with(lookup.clone(), instant_settings(0.7));
        resolver.begin_run();

        assert_eq!(resolver.resolve_address("XX").await, None);
        assert_eq!(lookup.searches(), 0);
    }

    #[tokio::test]
    async fn returned_addresses_are_unique_within_run() {
        let lookup = Arc::new(ScriptedLookup::with_details(vec![details(&[
            ("route", "Main St"),
            ("street_number", "5"),
            ("postal_code", "10001"),
            ("locality", "Springfield"),
        ])]));
        let settings = ResolverSettings {
            max_unique_attempts: 2,
            max_api_attempts: 2,
            ..instant_settings(0.7)
        };
        let (resolver, _dir) = resolver_with(lookup, settings);
        resolver.cache().add("US", "Broadway 1, 10004 New York");
        resolver.cache().add("US", "Wall St 11, 10005 New York");
        resolver.begin_run();

        let mut seen = HashSet::new();
        for _ in 0..6 {
            if let Some(address) = resolver.resolve_address("US").await {
                assert!(seen.insert(address), "address handed out twice");
            }
        }
        assert!(seen.len() <= 3);
    }

    #[tokio::test]
    async fn cancelled_signal_short_circuits() {
        let lookup = Arc::new(ScriptedLookup::failing());
        let settings = ResolverSettings {
            retry_base_delay_secs: 30.0,
            ..instant_settings(0.0)
        };
        let (resolver, _dir) = resolver_with(lookup.clone(), settings);
        resolver.begin_run();

        let cancel = CancelSignal::new();
        let canceller = cancel.clone();
        let started = tokio::time::Instant::now();
        let (address, ()) = tokio::join!(resolver.resolve_with_cancel("ES", &cancel), async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });
        assert_eq!(address, None);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(lookup.searches(), 1);
        assert_eq!(resolver.stats().exhausted, 0);
    }

    #[tokio::test]
    async fn prime_cache_bypasses_cached_entries() {
        let lookup = Arc::new(ScriptedLookup::with_details(vec![
            details(&[
                ("route", "Main St"),
                ("street_number", "1"),
                ("postal_code", "10001"),
                ("locality", "Springfield"),
            ]),
            details(&[
                ("route", "Main St"),
                ("street_number", "2"),
                ("postal_code", "10001"),
                ("locality", "Springfield"),
            ]),
        ]));
        let (resolver, dir) = resolver_with(lookup.clone(), instant_settings(1.0));
        resolver.cache().add("US", "Broadway 1, 10004 New York");

        let produced = resolver
            .prime_cache(&["us".to_string()], 2, &CancelSignal::new())
            .await;
        assert_eq!(
            produced.get("US").unwrap(),
            &vec![
                "Main St 1, 10001 Springfield".to_string(),
                "Main St 2, 10001 Springfield".to_string()
            ]
        );
        assert_eq!(resolver.cache().len("US"), 3);
        assert!(dir.path().join("cache.json").exists());
    }
}
