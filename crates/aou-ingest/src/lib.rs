//! Participant-summary retrieval from the AoU API.
//!
//! - **bundle**: page format and saved-record parsing
//! - **client**: the [`PageFetcher`] seam and the reqwest-backed [`ApiClient`]
//! - **paging**: [`fetch_all`] over linked pages
//! - **spec**: API spec file and first-page query URL

pub mod bundle;
pub mod client;
pub mod error;
pub mod paging;
pub mod spec;

pub use bundle::{Bundle, BundleEntry, BundleLink, records_from_json};
pub use client::{ApiClient, PageFetcher};
pub use error::{IngestError, Result};
pub use paging::{PageProgress, fetch_all};
pub use spec::{ApiSpec, DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_ENV, ParticipantQuery};
