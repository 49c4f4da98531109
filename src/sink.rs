use crate::models::{QuizResult, UserContext};
use anyhow::Context as _;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Wire shape expected by the remote results service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSubmission {
    pub user_id: i64,
    pub state: String,
    pub test_number: u32,
    pub score: u32,
    pub total_questions: u32,
    pub user_answers: Vec<Option<String>>,
    pub timestamp: String,
}

impl ResultSubmission {
    pub fn from_result(result: &QuizResult, ctx: &UserContext) -> Self {
        Self {
            user_id: ctx.effective_user_id(),
            state: result.state.clone(),
            test_number: result.test_number,
            score: result.score,
            total_questions: result.total,
            user_answers: result.answers.clone(),
            timestamp: result.timestamp.clone(),
        }
    }
}

pub trait ResultsApi: Send + Sync {
    fn submit(&self, submission: ResultSubmission) -> BoxFuture<'static, anyhow::Result<()>>;
}

#[derive(Clone)]
pub struct HttpResultsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResultsApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("results api client failed to build")?;
        Ok(Self { client, base_url: base_url.into() })
    }

    /// Reads `RESULTS_API_URL` and `RESULTS_TIMEOUT_SECS`; `None` when the
    /// service is unconfigured, which callers treat as offline mode.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("RESULTS_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        let timeout_secs = std::env::var("RESULTS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        match Self::new(base_url, Duration::from_secs(timeout_secs)) {
            Ok(api) => Some(api),
            Err(err) => {
                warn!("results api disabled: {}", err);
                None
            }
        }
    }
}

impl ResultsApi for HttpResultsApi {
    fn submit(&self, submission: ResultSubmission) -> BoxFuture<'static, anyhow::Result<()>> {
        let client = self.client.clone();
        let url = format!("{}/api/quiz-result", self.base_url.trim_end_matches('/'));
        Box::pin(async move {
            let response = client
                .post(&url)
                .json(&submission)
                .send()
                .await
                .context("quiz result request failed")?;
            response
                .error_for_status()
                .context("results service rejected submission")?;
            Ok(())
        })
    }
}

/// Used when no remote service is configured.
#[derive(Clone)]
pub struct NoopResultsApi;

impl ResultsApi for NoopResultsApi {
    fn submit(&self, _submission: ResultSubmission) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Durable on-device attempt history: a single JSON array, appended to by
/// re-reading the full list. Single-writer from one app instance.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        let path = std::env::var("HISTORY_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{}/quiz_history.json", env!("CARGO_MANIFEST_DIR")));
        Self::new(path)
    }

    /// Full history, oldest first. A missing file is an empty history; a
    /// corrupt file is logged and treated as empty rather than failing the
    /// progress surface.
    pub async fn load(&self) -> Vec<QuizResult> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(results) => results,
            Err(err) => {
                warn!("history file {} is corrupt, starting fresh: {}", self.path.display(), err);
                Vec::new()
            }
        }
    }

    pub async fn append(&self, result: &QuizResult) -> anyhow::Result<()> {
        let mut results = self.load().await;
        results.push(result.clone());
        let serialized = serde_json::to_vec_pretty(&results)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serialized)
            .await
            .with_context(|| format!("failed to write history file {}", self.path.display()))?;
        Ok(())
    }
}

/// Records a finalized result locally and submits it remotely. The two
/// paths are independent: each failure is logged and swallowed, and neither
/// delays the score the caller has already displayed.
#[derive(Clone)]
pub struct ResultSink {
    history: Arc<HistoryStore>,
    api: Arc<dyn ResultsApi>,
}

impl ResultSink {
    pub fn new(history: HistoryStore, api: Arc<dyn ResultsApi>) -> Self {
        Self { history: Arc::new(history), api }
    }

    pub async fn record_locally(&self, result: &QuizResult) {
        if let Err(err) = self.history.append(result).await {
            warn!("failed to record quiz result locally: {}", err);
        }
    }

    pub async fn submit_remote(&self, result: &QuizResult, ctx: &UserContext) {
        let submission = ResultSubmission::from_result(result, ctx);
        if let Err(err) = self.api.submit(submission).await {
            warn!("remote result submission failed: {}", err);
        }
    }

    /// Dispatches both persistence paths as uncoordinated tasks. Callers in
    /// a UI drop the handles; tests await them for determinism.
    pub fn finalize(&self, result: QuizResult, ctx: UserContext) -> (JoinHandle<()>, JoinHandle<()>) {
        let local = {
            let sink = self.clone();
            let result = result.clone();
            tokio::spawn(async move { sink.record_locally(&result).await })
        };
        let remote = {
            let sink = self.clone();
            tokio::spawn(async move { sink.submit_remote(&result, &ctx).await })
        };
        (local, remote)
    }

    pub async fn history(&self) -> Vec<QuizResult> {
        self.history.load().await
    }
}
