// File: ./src/model/mod.rs
pub mod record;
pub mod reminder;

pub use record::{CatalogRecord, Payload, SourceRecord, normalize_key};
pub use reminder::{ReminderEvent, ReminderSpec, TimeSpecError, resolve_due};
