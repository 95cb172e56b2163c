use chrono::{NaiveDate, NaiveTime};

use crate::catalog::Service;

// Empty means "nothing picked yet", which is not an error
pub fn is_valid_selection(service: &Service, date: &str) -> bool {
    date.is_empty() || service.availability.iter().any(|d| d == date)
}

// "2025-08-25" -> "Mon Aug 25 2025"; anything unparsable is shown as given
pub fn date_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a %b %d %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

// HH:MM, 24 hour clock
pub fn is_valid_time(time: &str) -> bool {
    time.len() == 5 && NaiveTime::parse_from_str(time, "%H:%M").is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOption {
    pub value: String,
    pub label: String,
}

pub fn date_options(service: &Service) -> Vec<DateOption> {
    service
        .availability
        .iter()
        .map(|d| DateOption {
            value: d.clone(),
            label: date_label(d),
        })
        .collect()
}

// The detail view's own date pick, separate from the booking draft
#[derive(Debug, Clone, Default)]
pub struct AvailabilitySelector {
    selected: String,
}

impl AvailabilitySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, date: impl Into<String>) {
        self.selected = date.into();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn is_selected(&self, date: &str) -> bool {
        !self.selected.is_empty() && self.selected == date
    }

    pub fn is_valid(&self, service: &Service) -> bool {
        is_valid_selection(service, &self.selected)
    }
}
