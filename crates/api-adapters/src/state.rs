//! State shared across all request handlers.

use std::sync::Arc;

use services::content::ContentService;
use services::submission::SubmissionService;
use services::thread::ThreadService;

use crate::metrics::ApiMetrics;

pub struct AppState {
    pub submissions: SubmissionService,
    pub threads: ThreadService,
    pub content: ContentService,
    pub metrics: Arc<ApiMetrics>,
}
