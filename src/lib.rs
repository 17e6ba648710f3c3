pub mod address;
pub mod cache;
pub mod config;
pub mod errors;
pub mod export;
pub mod geo;
pub mod identity;
pub mod places;
pub mod resolver;
mod seeds;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use crate::cache::{AddressCache, CacheSummary};
pub use crate::config::{AppConfig, PublicAppConfig, ResolverSettings};
pub use crate::errors::{AppError, AppResult};
pub use crate::export::{export_tsv, write_tsv_file};
pub use crate::geo::{Coordinate, GeoSeed, GeoSeedTable, SearchArea};
pub use crate::identity::{IdentityGenerator, IdentityRecord, IdentitySettings};
pub use crate::places::{HttpPlacesClient, PlaceLookup, PlacesService};
pub use crate::resolver::{AddressResolver, CancelSignal, ResolverStats};

/// Shared handles for one process: configuration, the persistent address
/// cache and the seed table. The remote client is built on demand since not
/// every command needs an API key.
pub struct AppContext {
    config: AppConfig,
    cache: Arc<AddressCache>,
    seeds: Arc<GeoSeedTable>,
}

impl AppContext {
    pub fn initialize() -> Self {
        init_tracing();
        Self::with_config(AppConfig::from_env())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let cache = Arc::new(AddressCache::open(
            &config.address_cache_file,
            config.address_cache_max_per_country,
            config.address_cache_save_every,
        ));
        info!(profile = ?config.public_profile(), "application context ready");
        Self {
            config,
            cache,
            seeds: Arc::new(GeoSeedTable::builtin()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AddressCache> {
        &self.cache
    }

    pub fn seeds(&self) -> &Arc<GeoSeedTable> {
        &self.seeds
    }

    pub fn resolver(&self) -> AppResult<Arc<AddressResolver>> {
        let lookup = PlacesService::new(&self.config)?;
        Ok(Arc::new(AddressResolver::new(
            Arc::clone(&self.cache),
            lookup,
            Arc::clone(&self.seeds),
            self.config.resolver_settings(),
        )))
    }

    pub fn identity_generator(&self) -> AppResult<IdentityGenerator> {
        Ok(IdentityGenerator::new(
            self.resolver()?,
            IdentitySettings::from_config(&self.config),
        ))
    }
}

pub fn init_tracing() {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,identity_forge=debug"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    });
}
