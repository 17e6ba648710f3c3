use std::sync::Arc;

use chrono::{Local, Months, NaiveDate};
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{Data, EN, FR_FR, PT_BR};
use fake::Fake;
use futures_util::{future, stream, StreamExt};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::address::normalize;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::resolver::{AddressResolver, CancelSignal};

const MAX_NAME_ATTEMPTS: usize = 100;
const PASSWORD_SYMBOLS: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const PASSWORD_ALPHANUMERIC: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const DATE_FORMAT: &str = "%d.%m.%Y";

/// One generated row. Column order matches the export layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    pub geo: String,
    pub apple_id: String,
    pub password: String,
    pub number: String,
    pub name: String,
    pub address: String,
    pub birthday: String,
    pub creation: String,
    pub proxy: String,
}

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub record_address_attempts: u32,
    pub concurrency_limit: usize,
    pub min_age: u32,
    pub max_age: u32,
    pub password_length: usize,
    pub proxy_template: String,
    pub proxy_port_range: (u16, u16),
}

impl IdentitySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            record_address_attempts: config.record_address_attempts,
            concurrency_limit: config.concurrency_limit,
            min_age: config.min_age,
            max_age: config.max_age,
            password_length: config.password_length,
            proxy_template: config.proxy_template.clone(),
            proxy_port_range: config.proxy_port_range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameLocale {
    English,
    French,
    Portuguese,
}

impl NameLocale {
    fn for_country(country_code: &str) -> Self {
        match country_code {
            "FR" => Self::French,
            "PT" | "BR" => Self::Portuguese,
            _ => Self::English,
        }
    }

    fn draw(self) -> String {
        match self {
            Self::English => draw_name(EN),
            Self::French => draw_name(FR_FR),
            Self::Portuguese => draw_name(PT_BR),
        }
    }
}

fn draw_name<L: Data + Copy>(locale: L) -> String {
    let first: String = FirstName(locale).fake();
    let last: String = LastName(locale).fake();
    normalize(&format!("{first} {last}"))
}

fn is_plain_name(name: &str) -> bool {
    name.is_ascii() && name.split_whitespace().count() == 2
}

/// A first and last name for the country, transliterated to two ASCII words.
pub fn generate_name(country_code: &str) -> String {
    let locale = NameLocale::for_country(&country_code.to_ascii_uppercase());
    let mut last_candidate = String::new();
    for candidate_locale in [locale, NameLocale::English] {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let candidate = candidate_locale.draw();
            if is_plain_name(&candidate) {
                return candidate;
            }
            last_candidate = candidate;
        }
    }
    last_candidate
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mixed-case password with a digit and a symbol, starting with an
/// alphanumeric and never repeating a character back to back.
pub fn generate_password<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    let length = length.max(4);
    let alphabet: Vec<u8> = PASSWORD_ALPHANUMERIC
        .iter()
        .chain(PASSWORD_SYMBOLS)
        .copied()
        .collect();

    loop {
        let mut password = Vec::with_capacity(length);
        while password.len() < length {
            let pool = if password.is_empty() {
                PASSWORD_ALPHANUMERIC
            } else {
                alphabet.as_slice()
            };
            let Some(&next) = pool.choose(rng) else {
                continue;
            };
            if password.last() != Some(&next) {
                password.push(next);
            }
        }

        if password.iter().any(u8::is_ascii_uppercase)
            && password.iter().any(u8::is_ascii_lowercase)
            && password.iter().any(u8::is_ascii_digit)
            && password.iter().any(|c| PASSWORD_SYMBOLS.contains(c))
        {
            return password.into_iter().map(char::from).collect();
        }
    }
}

/// A `dd.mm.YYYY` birth date for someone between `min_age` and `max_age`
/// years old on `today`.
pub fn generate_birth_date<R: Rng + ?Sized>(
    min_age: u32,
    max_age: u32,
    today: NaiveDate,
    rng: &mut R,
) -> String {
    let (min_age, max_age) = (min_age.min(max_age), max_age.max(min_age));
    let earliest = today
        .checked_sub_months(Months::new(max_age.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_sub_months(Months::new(min_age.saturating_mul(12)))
        .unwrap_or(earliest);
    let span = (latest - earliest).num_days().max(0);
    let offset = rng.gen_range(0..=span);
    (earliest + chrono::Duration::days(offset))
        .format(DATE_FORMAT)
        .to_string()
}

/// Fills `{geo}` with the lowercase country code and `{port}` with a random
/// port from the inclusive range.
pub fn generate_proxy<R: Rng + ?Sized>(
    country_code: &str,
    template: &str,
    port_range: (u16, u16),
    rng: &mut R,
) -> String {
    let (low, high) = (port_range.0.min(port_range.1), port_range.0.max(port_range.1));
    let port = rng.gen_range(low..=high);
    template
        .replace("{geo}", &country_code.to_ascii_lowercase())
        .replace("{port}", &port.to_string())
}

pub struct IdentityGenerator {
    resolver: Arc<AddressResolver>,
    settings: IdentitySettings,
    rng: Mutex<StdRng>,
}

impl IdentityGenerator {
    pub fn new(resolver: Arc<AddressResolver>, settings: IdentitySettings) -> Self {
        Self::with_rng(resolver, settings, StdRng::from_entropy())
    }

    pub fn with_rng(
        resolver: Arc<AddressResolver>,
        settings: IdentitySettings,
        rng: StdRng,
    ) -> Self {
        Self {
            resolver,
            settings,
            rng: Mutex::new(rng),
        }
    }

    pub fn resolver(&self) -> &Arc<AddressResolver> {
        &self.resolver
    }

    /// Builds `count` records for countries drawn from `country_codes`.
    /// Records in flight when `cancel` fires are dropped.
    pub async fn generate(
        &self,
        count: usize,
        country_codes: &[String],
        cancel: &CancelSignal,
    ) -> AppResult<Vec<IdentityRecord>> {
        let countries: Vec<String> = country_codes
            .iter()
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .collect();
        if countries.is_empty() {
            return Err(AppError::Config("at least one country code is required".into()));
        }

        self.resolver.begin_run();
        info!(
            target: "identity",
            count,
            countries = %countries.join(", "),
            concurrency = self.settings.concurrency_limit,
            "generating identities"
        );

        let records: Vec<IdentityRecord> = stream::iter(0..count)
            .map(|index| {
                let country = {
                    let mut rng = self.rng.lock();
                    countries.choose(&mut *rng).cloned().unwrap_or_default()
                };
                self.build_record(index, country, cancel)
            })
            .buffer_unordered(self.settings.concurrency_limit.max(1))
            .filter_map(future::ready)
            .collect()
            .await;

        self.resolver.cache().save_async().await;
        let stats = self.resolver.stats();
        info!(
            target: "identity",
            produced = records.len(),
            requested = count,
            cache_hits = stats.cache_hits,
            remote_calls = stats.remote_calls,
            cancelled = cancel.is_cancelled(),
            "identity generation finished"
        );
        Ok(records)
    }

    async fn build_record(
        &self,
        index: usize,
        country: String,
        cancel: &CancelSignal,
    ) -> Option<IdentityRecord> {
        let max_attempts = self.settings.record_address_attempts.max(1);
        let mut address = None;
        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return None;
            }
            address = self.resolver.resolve_with_cancel(&country, cancel).await;
            if address.is_some() {
                break;
            }
            info!(
                target: "identity",
                record = index,
                country = %country,
                "no address for record (attempt {attempt}/{max_attempts})"
            );
        }
        if cancel.is_cancelled() && address.is_none() {
            return None;
        }

        let address = address.unwrap_or_else(|| {
            warn!(
                target: "identity",
                record = index,
                country = %country,
                "keeping record with an empty address after {max_attempts} attempts"
            );
            String::new()
        });
        Some(self.assemble(country, address))
    }

    fn assemble(&self, country: String, address: String) -> IdentityRecord {
        let today = Local::now().date_naive();
        let name = generate_name(&country);
        let mut rng = self.rng.lock();
        IdentityRecord {
            password: generate_password(self.settings.password_length, &mut *rng),
            name,
            address,
            birthday: generate_birth_date(
                self.settings.min_age,
                self.settings.max_age,
                today,
                &mut *rng,
            ),
            proxy: generate_proxy(
                &country,
                &self.settings.proxy_template,
                self.settings.proxy_port_range,
                &mut *rng,
            ),
            geo: country,
            ..IdentityRecord::default()
        }
    }
}
