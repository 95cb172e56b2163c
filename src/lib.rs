// Core logic for the event services front end: catalog load, derived
// filtering, availability checks, the booking flow and review paging

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod logging;
pub mod reviews;
pub mod session;

// Re-export key types for convenience
pub use availability::{is_valid_selection, AvailabilitySelector};
pub use booking::{BookingConfirmed, BookingDraft, BookingError, BookingFlow, BookingStep, FieldIssue};
pub use catalog::{Catalog, CatalogSource, CatalogStore, Category, FetchError, MockCatalogSource, Review, Service};
pub use config::{ConfigError, ExpoConfig};
pub use filter::{apply, FilterCriteria};
pub use reviews::ReviewPager;
pub use session::{DetailView, Listing, Session, SessionError};
