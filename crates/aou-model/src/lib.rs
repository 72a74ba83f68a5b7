//! Record types for the AoU participant refresh.
//!
//! - [`RawValue`] / [`RawRecord`]: one participant summary as returned by the API.
//! - [`OutputRecord`]: one participant row in the HealthPro reporting schema.

pub mod record;
pub mod value;

pub use record::{OutputRecord, RawRecord};
pub use value::{RawValue, UNSET};

/// Source field carrying the participant identifier.
pub const PARTICIPANT_ID_FIELD: &str = "participantId";

/// Output column carrying the participant identifier.
pub const PMI_ID_COLUMN: &str = "PMI ID";
