pub mod catalog;
pub mod error;
pub mod models;
pub mod session;
pub mod sink;
pub mod stats;

use std::sync::Arc;

use crate::sink::{HistoryStore, HttpResultsApi, NoopResultsApi, ResultSink, ResultsApi};

/// Builds the result sink from the environment: the HTTP client when
/// `RESULTS_API_URL` is configured, otherwise the no-op client (offline
/// mode, local history only).
pub fn build_sink() -> ResultSink {
    let api: Arc<dyn ResultsApi> = if let Some(real) = HttpResultsApi::from_env() {
        Arc::new(real)
    } else {
        Arc::new(NoopResultsApi)
    };
    ResultSink::new(HistoryStore::from_env(), api)
}
