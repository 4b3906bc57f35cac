pub mod error;
pub mod record_store;
pub mod tables;

pub use error::{StoreError, StoreResult};
pub use record_store::{RecordStore, SchedulePreview, StoredCurriculum};
pub use tables::Tables;
