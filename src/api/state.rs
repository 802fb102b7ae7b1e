use std::sync::Arc;

use crate::fetch::HistorySource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn HistorySource>,
    pub default_count: usize,
}
