use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::seeds::{COUNTRY_NAMES, SEEDS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` with six decimals, the form the places API expects.
    pub fn as_query_param(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query_param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPoint {
    pub coordinate: Coordinate,
    pub border: bool,
}

impl SeedPoint {
    pub const fn new(lat: f64, lng: f64, border: bool) -> Self {
        Self {
            coordinate: Coordinate::new(lat, lng),
            border,
        }
    }
}

/// Sample points for one country. Points flagged `border` search with the
/// tighter border radius.
#[derive(Debug, Clone, Copy)]
pub struct GeoSeed {
    pub country_code: &'static str,
    pub default_radius_meters: u32,
    pub border_radius_meters: u32,
    pub points: &'static [SeedPoint],
}

impl GeoSeed {
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.points.iter().map(|point| point.coordinate)
    }

    pub fn border_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.points
            .iter()
            .filter(|point| point.border)
            .map(|point| point.coordinate)
    }

    pub fn radius_for(&self, point: &SeedPoint) -> u32 {
        if point.border {
            self.border_radius_meters
        } else {
            self.default_radius_meters
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SearchArea> {
        let point = self.points.choose(rng)?;
        Some(SearchArea {
            center: point.coordinate,
            radius_meters: self.radius_for(point),
        })
    }
}

/// Center and radius handed to the places search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: Coordinate,
    pub radius_meters: u32,
}

pub struct GeoSeedTable {
    seeds: HashMap<&'static str, GeoSeed>,
    names: HashMap<&'static str, &'static str>,
}

impl GeoSeedTable {
    pub fn builtin() -> Self {
        Self::from_seeds(SEEDS.iter().copied())
    }

    pub fn from_seeds(seeds: impl IntoIterator<Item = GeoSeed>) -> Self {
        let seeds = seeds
            .into_iter()
            .filter(|seed| !seed.points.is_empty())
            .map(|seed| (seed.country_code, seed))
            .collect();
        Self {
            seeds,
            names: COUNTRY_NAMES.iter().copied().collect(),
        }
    }

    pub fn seed(&self, country_code: &str) -> Option<&GeoSeed> {
        self.seeds.get(country_code)
    }

    pub fn display_name(&self, country_code: &str) -> Option<&'static str> {
        self.names.get(country_code).copied()
    }

    pub fn country_codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<_> = self.seeds.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}
