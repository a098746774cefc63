use std::sync::Arc;

use crate::config::Config;
use crate::db::RecordStore;
use crate::mock::RequestLogger;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Config,
    pub request_logger: RequestLogger,
}
