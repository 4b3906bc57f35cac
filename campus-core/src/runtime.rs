use std::sync::Arc;

use crate::{FileIO, HttpIO, Instance};

/// The TargetRuntime struct unifies the available runtime-specific
/// IO implementations. This is used to reduce piping IO structs all
/// over the codebase.
#[derive(Clone)]
pub struct TargetRuntime {
    /// HTTP client used to reach remote record and curriculum stores.
    pub http: Arc<dyn HttpIO>,
    /// Interface for file operations, tailored to the target environment's
    /// capabilities.
    pub file: Arc<dyn FileIO>,
    /// Clock used for record timestamps, ids and schedule status.
    pub instance: Arc<dyn Instance>,
}
