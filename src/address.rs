//! Canonical postal strings: transliteration, country suffix removal,
//! component formatting and the acceptance gate every candidate passes.

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

const MIN_ADDRESS_LEN: usize = 11;

/// Structured address parts of a place, keyed by the provider's type tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub street_number: Option<String>,
    pub route: Option<String>,
    pub postal_code: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl AddressComponents {
    /// Stores `value` under every recognised tag. Returns `false` when no tag
    /// maps to a field.
    pub fn assign(&mut self, types: &[String], value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let mut assigned = false;
        for tag in types {
            if let Some(slot) = self.slot_mut(tag) {
                *slot = Some(value.to_string());
                assigned = true;
            }
        }
        assigned
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        let value = match tag {
            "street_number" => &self.street_number,
            "route" => &self.route,
            "postal_code" => &self.postal_code,
            "locality" => &self.locality,
            "administrative_area_level_1" | "region" => &self.region,
            "country" => &self.country,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn has_house_number(&self) -> bool {
        self.get("street_number").is_some()
    }

    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .filter(|tag| self.get(tag).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn slot_mut(&mut self, tag: &str) -> Option<&mut Option<String>> {
        match tag {
            "street_number" => Some(&mut self.street_number),
            "route" => Some(&mut self.route),
            "postal_code" => Some(&mut self.postal_code),
            "locality" => Some(&mut self.locality),
            "administrative_area_level_1" => Some(&mut self.region),
            "country" => Some(&mut self.country),
            _ => None,
        }
    }
}

/// Transliterates to ASCII, collapses whitespace runs and trims.
pub fn normalize(text: &str) -> String {
    let ascii = if text.is_ascii() {
        text.to_string()
    } else {
        deunicode(text)
    };
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops a trailing `", <country>"` (case-insensitive, extra trailing commas
/// tolerated). Input without the suffix comes back unchanged.
pub fn strip_country_suffix(address: &str, country_name: &str) -> String {
    let country_name = country_name.trim();
    if country_name.is_empty() {
        return address.to_string();
    }

    let mut current = address;
    while let Some(stripped) = strip_once(current, country_name) {
        current = stripped;
    }
    if current.len() == address.len() {
        address.to_string()
    } else {
        current.to_string()
    }
}

fn strip_once<'a>(address: &'a str, country_name: &str) -> Option<&'a str> {
    let trimmed = address.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    let split = trimmed.len().checked_sub(country_name.len())?;
    if !trimmed.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = trimmed.split_at(split);
    if !tail.eq_ignore_ascii_case(country_name) {
        return None;
    }
    let head = head.trim_end();
    head.strip_suffix(',').map(str::trim_end)
}

/// `"<route> <number>, <postal> <locality>[, <region>]"`, or whatever subset
/// is available. Empty when neither a street nor postal/locality exists.
pub fn format_from_components(components: &AddressComponents) -> String {
    let street = match (components.get("route"), components.get("street_number")) {
        (Some(route), Some(number)) => Some(format!("{route} {number}")),
        (Some(route), None) => Some(route.to_string()),
        _ => None,
    };

    let area = [components.get("postal_code"), components.get("locality")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let area = (!area.is_empty()).then_some(area);

    if street.is_none() && area.is_none() {
        return String::new();
    }

    let region = components.get("region").map(str::to_string);
    [street, area, region]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
}

/// The acceptance gate: a digit, a letter, a comma and more than ten characters.
pub fn is_valid(address: &str) -> bool {
    address.chars().any(|c| c.is_ascii_digit())
        && address.chars().any(char::is_alphabetic)
        && address.contains(',')
        && address.chars().count() >= MIN_ADDRESS_LEN
}
