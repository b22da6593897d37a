pub mod schema;
pub mod record;
pub mod validation;
pub mod store;
pub mod query;
pub mod api;
pub mod error;

pub use api::RecordService;
pub use error::{Result, StudentDbError};
pub use query::{SortField, SortOrder};
pub use record::{Collection, StudentData, StudentRecord, StudentView};
pub use store::{JsonFileStore, MemoryStore, RecordStore};
