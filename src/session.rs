// Explicit session object: owns the catalog store, the search/filter inputs
// and the confirmation channel. Detail views are built from it and own their
// own draft, image index, date pick and review page.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::availability::{date_options, AvailabilitySelector, DateOption};
use crate::booking::{BookingConfirmed, BookingError, BookingFlow};
use crate::catalog::{Catalog, CatalogState, CatalogStore, FetchError, LoadHandle, Service, ServiceId};
use crate::config::{ConfigError, ExpoConfig};
use crate::debounce::SearchBox;
use crate::filter::{self, Facets, FilterCriteria};
use crate::reviews::ReviewPager;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Catalog is not loaded yet")]
    CatalogNotReady,

    #[error("No service with id {0}")]
    UnknownService(ServiceId),

    #[error("Detail view is closed")]
    ViewClosed,

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// What the grid shows. Empty is its own state, distinct from loading and failure.
#[derive(Debug, Clone)]
pub enum Listing {
    Loading,
    Failed(String),
    Empty,
    Results(Vec<Arc<Service>>),
}

impl Listing {
    pub fn services(&self) -> &[Arc<Service>] {
        match self {
            Listing::Results(services) => services,
            _ => &[],
        }
    }
}

pub type ConfirmationReceiver = mpsc::UnboundedReceiver<BookingConfirmed>;

pub struct Session {
    config: ExpoConfig,
    store: Arc<CatalogStore>,
    load: Option<LoadHandle>,
    search: SearchBox,
    criteria: FilterCriteria,
    confirmations: mpsc::UnboundedSender<BookingConfirmed>,
}

impl Session {
    pub fn new(
        store: Arc<CatalogStore>,
        config: ExpoConfig,
    ) -> Result<(Self, ConfirmationReceiver), SessionError> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            search: SearchBox::new(config.search_debounce()),
            criteria: FilterCriteria::from_config(&config),
            config,
            store,
            load: None,
            confirmations: tx,
        };

        Ok((session, rx))
    }

    pub fn config(&self) -> &ExpoConfig {
        &self.config
    }

    // Kicks off the one catalog load. Needs a tokio runtime.
    pub fn start(&mut self) {
        if self.load.is_none() && self.store.is_loading() {
            self.load = Some(self.store.spawn_load());
        }
    }

    // Waits for the load started by `start`, or runs it inline
    pub async fn ready(&mut self) -> Result<Catalog, FetchError> {
        match self.load.take() {
            Some(handle) => handle.wait().await,
            None => self.store.load().await,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn set_search_input(&mut self, text: impl Into<String>) {
        self.search.set_input(text);
    }

    pub fn search_input(&self) -> &str {
        self.search.input()
    }

    // The debounced term the listing is filtered by
    pub fn search_term(&self) -> String {
        self.search.term()
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_category(&mut self, category: &str) {
        self.criteria.set_category(category);
    }

    pub fn set_location(&mut self, location: &str) {
        self.criteria.set_location(location);
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        self.criteria
            .set_min_rating(min_rating, self.config.rating_ceiling);
    }

    pub fn set_max_price(&mut self, max_price: u32) {
        self.criteria
            .set_max_price(max_price, self.config.max_price_ceiling);
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::from_config(&self.config);
    }

    // Recomputed from scratch on every call
    pub fn listing(&self) -> Listing {
        match self.store.state() {
            CatalogState::Loading => Listing::Loading,
            CatalogState::Failed(reason) => Listing::Failed(reason),
            CatalogState::Ready(catalog) => {
                let results = filter::apply(&catalog, &self.search.term(), &self.criteria);
                if results.is_empty() {
                    Listing::Empty
                } else {
                    Listing::Results(results)
                }
            }
        }
    }

    pub fn facets(&self) -> Facets {
        self.store
            .services()
            .map(|catalog| filter::facets(&catalog))
            .unwrap_or_default()
    }

    // Every call builds a fresh view with an empty draft
    pub fn open(&self, id: ServiceId) -> Result<DetailView, SessionError> {
        if self.store.services().is_none() {
            return Err(SessionError::CatalogNotReady);
        }

        let service = self
            .store
            .get(id)
            .ok_or(SessionError::UnknownService(id))?;

        debug!(service_id = id, "detail view opened");
        Ok(DetailView::new(
            service,
            self.config.review_page_size,
            self.confirmations.clone(),
        ))
    }
}

pub struct DetailView {
    service: Arc<Service>,
    image_index: usize,
    availability: AvailabilitySelector,
    reviews: ReviewPager,
    booking: Option<BookingFlow>,
    confirmations: mpsc::UnboundedSender<BookingConfirmed>,
}

impl DetailView {
    fn new(
        service: Arc<Service>,
        page_size: usize,
        confirmations: mpsc::UnboundedSender<BookingConfirmed>,
    ) -> Self {
        Self {
            reviews: ReviewPager::new(service.reviews.clone(), page_size),
            booking: Some(BookingFlow::new(service.clone())),
            availability: AvailabilitySelector::new(),
            image_index: 0,
            service,
            confirmations,
        }
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn image(&self) -> Option<&str> {
        self.service.images.get(self.image_index).map(String::as_str)
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn next_image(&mut self) -> usize {
        let count = self.service.images.len();
        if count > 0 {
            self.image_index = (self.image_index + 1) % count;
        }
        self.image_index
    }

    pub fn prev_image(&mut self) -> usize {
        let count = self.service.images.len();
        if count > 0 {
            self.image_index = (self.image_index + count - 1) % count;
        }
        self.image_index
    }

    pub fn date_options(&self) -> Vec<DateOption> {
        date_options(&self.service)
    }

    pub fn select_date(&mut self, date: impl Into<String>) {
        self.availability.select(date);
    }

    pub fn selected_date(&self) -> &str {
        self.availability.selected()
    }

    pub fn selected_date_is_valid(&self) -> bool {
        self.availability.is_valid(&self.service)
    }

    pub fn reviews(&self) -> &ReviewPager {
        &self.reviews
    }

    pub fn reviews_mut(&mut self) -> &mut ReviewPager {
        &mut self.reviews
    }

    pub fn is_open(&self) -> bool {
        self.booking.is_some()
    }

    pub fn booking(&self) -> Result<&BookingFlow, SessionError> {
        self.booking.as_ref().ok_or(SessionError::ViewClosed)
    }

    pub fn booking_mut(&mut self) -> Result<&mut BookingFlow, SessionError> {
        self.booking.as_mut().ok_or(SessionError::ViewClosed)
    }

    // Discards the draft without an event
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.booking.take().ok_or(SessionError::ViewClosed)?;
        debug!(service_id = self.service.id, "booking cancelled");
        Ok(())
    }

    // Emits the confirmation and ends the booking session; a second call
    // finds the view closed.
    pub fn confirm(&mut self) -> Result<BookingConfirmed, SessionError> {
        let confirmed = self.booking()?.confirm()?;
        self.booking = None;

        if self.confirmations.send(confirmed.clone()).is_err() {
            warn!(reference = %confirmed.reference, "no listener for booking confirmation");
        }

        Ok(confirmed)
    }
}
