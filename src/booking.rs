// Four step reservation flow: date & time, party, contact, summary.
//
// Each forward transition is gated by a guard over the draft; backward moves
// never validate. Field edits are plain assignments and never move the step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::availability::{date_label, is_valid_selection};
use crate::catalog::{Service, ServiceId};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BookingStep {
    DateTime = 1,
    Party = 2,
    Contact = 3,
    Summary = 4,
}

impl BookingStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            BookingStep::DateTime => "Date & Time",
            BookingStep::Party => "Guests & Requirements",
            BookingStep::Contact => "Contact Info",
            BookingStep::Summary => "Summary",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            BookingStep::DateTime => Some(BookingStep::Party),
            BookingStep::Party => Some(BookingStep::Contact),
            BookingStep::Contact => Some(BookingStep::Summary),
            BookingStep::Summary => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            BookingStep::DateTime => None,
            BookingStep::Party => Some(BookingStep::DateTime),
            BookingStep::Contact => Some(BookingStep::Party),
            BookingStep::Summary => Some(BookingStep::Contact),
        }
    }
}

// Raw form values, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingDraft {
    pub date: String,
    pub time: String,
    pub guests: String,
    pub requirements: String,
    pub name: String,
    pub email: String,
}

impl BookingDraft {
    // Some(n) only for a whole number above zero. No upper bound: counts past
    // u64::MAX saturate instead of failing.
    pub fn guest_count(&self) -> Option<u64> {
        let trimmed = self.guests.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.bytes().all(|b| b == b'0') {
            return None;
        }

        Some(digits.parse::<u64>().unwrap_or(u64::MAX))
    }

    pub fn has_valid_email(&self) -> bool {
        EMAIL_PATTERN.is_match(&self.email)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    #[error("Choose an available date")]
    MissingDate,

    #[error("Pick a listed available date.")]
    UnavailableDate(String),

    #[error("Choose a time")]
    MissingTime,

    #[error("Guests must be a whole number above zero")]
    InvalidGuests,

    #[error("Name is required")]
    MissingName,

    #[error("Enter a valid email address")]
    InvalidEmail,
}

// Everything blocking the forward transition out of `step`
pub fn guard(step: BookingStep, service: &Service, draft: &BookingDraft) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    match step {
        BookingStep::DateTime => {
            if draft.date.is_empty() {
                issues.push(FieldIssue::MissingDate);
            } else if !is_valid_selection(service, &draft.date) {
                issues.push(FieldIssue::UnavailableDate(draft.date.clone()));
            }
            if draft.time.is_empty() {
                issues.push(FieldIssue::MissingTime);
            }
        }
        BookingStep::Party => {
            if draft.guest_count().is_none() {
                issues.push(FieldIssue::InvalidGuests);
            }
        }
        BookingStep::Contact => {
            if draft.name.trim().is_empty() {
                issues.push(FieldIssue::MissingName);
            }
            if !draft.has_valid_email() {
                issues.push(FieldIssue::InvalidEmail);
            }
        }
        // edit is always enabled
        BookingStep::Summary => {}
    }

    issues
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("Cannot continue past {step:?}: {issues:?}")]
    Blocked {
        step: BookingStep,
        issues: Vec<FieldIssue>,
    },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("No step after the summary")]
    AtLastStep,

    #[error("Only available from the summary, currently at {0:?}")]
    NotAtSummary(BookingStep),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingSummary {
    pub service: String,
    pub date: String,
    pub time: String,
    pub guests: String,
    pub requirements: String,
    pub name: String,
    pub email: String,
    pub estimated_price: u32,
}

impl BookingSummary {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Service", self.service.clone()),
            ("Date", self.date.clone()),
            ("Time", self.time.clone()),
            ("Guests", self.guests.clone()),
            ("Requirements", self.requirements.clone()),
            ("Name", self.name.clone()),
            ("Email", self.email.clone()),
            ("Estimated Price", format!("₹{}", self.estimated_price)),
        ]
    }
}

// Emitted once per completed flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingConfirmed {
    pub reference: String,
    pub service_id: ServiceId,
    pub service_name: String,
    pub draft: BookingDraft,
    pub estimated_price: u32,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    service: Arc<Service>,
    draft: BookingDraft,
    step: BookingStep,
}

impl BookingFlow {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            draft: BookingDraft::default(),
            step: BookingStep::DateTime,
        }
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.draft.date = date.into();
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.draft.time = time.into();
    }

    pub fn set_guests(&mut self, guests: impl Into<String>) {
        self.draft.guests = guests.into();
    }

    pub fn set_requirements(&mut self, requirements: impl Into<String>) {
        self.draft.requirements = requirements.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.email = email.into();
    }

    // Drives the inline "Pick a listed available date." message
    pub fn date_is_valid(&self) -> bool {
        is_valid_selection(&self.service, &self.draft.date)
    }

    pub fn issues(&self) -> Vec<FieldIssue> {
        guard(self.step, &self.service, &self.draft)
    }

    // Whether the "Next"/"Review" control is enabled
    pub fn can_advance(&self) -> bool {
        self.step != BookingStep::Summary && self.issues().is_empty()
    }

    pub fn advance(&mut self) -> Result<BookingStep, BookingError> {
        let next = self.step.next().ok_or(BookingError::AtLastStep)?;

        let issues = self.issues();
        if !issues.is_empty() {
            debug!(step = ?self.step, ?issues, "booking transition blocked");
            return Err(BookingError::Blocked {
                step: self.step,
                issues,
            });
        }

        info!(service_id = self.service.id, from = ?self.step, to = ?next, "booking step advanced");
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<BookingStep, BookingError> {
        let prev = self.step.prev().ok_or(BookingError::AtFirstStep)?;
        debug!(service_id = self.service.id, from = ?self.step, to = ?prev, "booking step back");
        self.step = prev;
        Ok(prev)
    }

    // Summary back to the first step, draft untouched
    pub fn edit(&mut self) -> Result<BookingStep, BookingError> {
        if self.step != BookingStep::Summary {
            return Err(BookingError::NotAtSummary(self.step));
        }
        debug!(service_id = self.service.id, "booking reopened for edit");
        self.step = BookingStep::DateTime;
        Ok(self.step)
    }

    pub fn summary(&self) -> BookingSummary {
        let requirements = match self.draft.requirements.trim() {
            "" => "-".to_string(),
            _ => self.draft.requirements.clone(),
        };

        BookingSummary {
            service: self.service.name.clone(),
            date: date_label(&self.draft.date),
            time: self.draft.time.clone(),
            guests: self.draft.guests.clone(),
            requirements,
            name: self.draft.name.clone(),
            email: self.draft.email.clone(),
            estimated_price: self.service.price,
        }
    }

    // Builds the confirmation event. The owner is responsible for ending the
    // session afterwards so the event cannot fire twice.
    pub fn confirm(&self) -> Result<BookingConfirmed, BookingError> {
        if self.step != BookingStep::Summary {
            return Err(BookingError::NotAtSummary(self.step));
        }

        // fields stay writable at the summary, so re-check every guard
        for step in [BookingStep::DateTime, BookingStep::Party, BookingStep::Contact] {
            let issues = guard(step, &self.service, &self.draft);
            if !issues.is_empty() {
                return Err(BookingError::Blocked { step, issues });
            }
        }

        let confirmed = BookingConfirmed {
            reference: format!("booking-{}", rand::random::<u32>()),
            service_id: self.service.id,
            service_name: self.service.name.clone(),
            draft: self.draft.clone(),
            estimated_price: self.service.price,
            confirmed_at: Utc::now(),
        };
        info!(
            service_id = confirmed.service_id,
            reference = %confirmed.reference,
            "booking confirmed"
        );

        Ok(confirmed)
    }
}
