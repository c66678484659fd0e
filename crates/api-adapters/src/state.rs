use std::sync::Arc;

use services::RecordService;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordService>,
}

impl AppState {
    pub fn new(records: Arc<RecordService>) -> Self {
        Self { records }
    }
}
