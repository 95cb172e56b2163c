// Derived result set: free-text search plus filter criteria over the catalog

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Service};
use crate::config::ExpoConfig;

pub const DEFAULT_MAX_PRICE: u32 = 20000;
pub const RATING_CEILING: f64 = 5.0;

// None, or an empty category/location, matches everything.
// Missing keys in a payload fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub location: Option<String>,
    pub min_rating: f64,
    pub max_price: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            category: None,
            location: None,
            min_rating: 0.0,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl FilterCriteria {
    pub fn from_config(config: &ExpoConfig) -> Self {
        Self {
            max_price: config.max_price_ceiling,
            ..Default::default()
        }
    }

    // "" is the "All" option of the selector
    pub fn set_category(&mut self, category: &str) {
        self.category = match category {
            "" => None,
            name => Some(Category::from(name)),
        };
    }

    pub fn set_location(&mut self, location: &str) {
        self.location = match location {
            "" => None,
            name => Some(name.to_string()),
        };
    }

    pub fn set_min_rating(&mut self, min_rating: f64, ceiling: f64) {
        self.min_rating = if min_rating.is_nan() {
            0.0
        } else {
            min_rating.clamp(0.0, ceiling)
        };
    }

    pub fn set_max_price(&mut self, max_price: u32, ceiling: u32) {
        self.max_price = max_price.min(ceiling);
    }

    pub fn matches(&self, service: &Service) -> bool {
        let category_ok = self
            .category
            .as_ref()
            .map_or(true, |category| {
                category.as_str().is_empty() || &service.category == category
            });

        let location_ok = self
            .location
            .as_deref()
            .map_or(true, |location| location.is_empty() || service.location == location);

        let rating_ok = service.rating >= self.min_rating;

        let price_ok = service.price <= self.max_price;

        category_ok && location_ok && rating_ok && price_ok
    }
}

// Lower-cased, trimmed search term. Empty matches everything.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

pub fn matches_term(service: &Service, normalized_term: &str) -> bool {
    normalized_term.is_empty()
        || service.name.to_lowercase().contains(normalized_term)
        || service.category.as_str().to_lowercase().contains(normalized_term)
        || service.location.to_lowercase().contains(normalized_term)
}

// Full pass over the catalog on every call; output keeps catalog order
pub fn apply(catalog: &[Arc<Service>], term: &str, criteria: &FilterCriteria) -> Vec<Arc<Service>> {
    let term = normalize_term(term);

    catalog
        .iter()
        .filter(|service| matches_term(service, &term) && criteria.matches(service))
        .cloned()
        .collect()
}

// Distinct values for the selector options, in catalog order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facets {
    pub categories: Vec<Category>,
    pub locations: Vec<String>,
}

pub fn facets(catalog: &[Arc<Service>]) -> Facets {
    let mut facets = Facets::default();

    for service in catalog {
        if !facets.categories.contains(&service.category) {
            facets.categories.push(service.category.clone());
        }
        if !facets.locations.contains(&service.location) {
            facets.locations.push(service.location.clone());
        }
    }

    facets
}
