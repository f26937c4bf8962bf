// Crate root library declaration and module exports.
pub mod catalog_index;
pub mod config;
pub mod context;
pub mod logging;
pub mod maintenance;
pub mod model;
pub mod reminder_queue;
pub mod session;
pub mod source;
pub mod storage;

pub use catalog_index::{BuildReport, CatalogIndex};
pub use reminder_queue::{ReloadPolicy, ReminderQueue};
pub use session::GrocerySession;
