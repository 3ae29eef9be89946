//! Application state shared by all handlers

use quietreel_core::Config;
use quietreel_processing::{TranscodeInvoker, UploadValidator};
use quietreel_storage::StagingStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub staging: Arc<dyn StagingStore>,
    pub transcoder: Arc<dyn TranscodeInvoker>,
    pub validator: UploadValidator,
}

impl AppState {
    pub fn new(
        config: Config,
        staging: Arc<dyn StagingStore>,
        transcoder: Arc<dyn TranscodeInvoker>,
    ) -> Self {
        let validator = UploadValidator::new(config.max_upload_size_bytes());
        Self {
            config,
            staging,
            transcoder,
            validator,
        }
    }
}
