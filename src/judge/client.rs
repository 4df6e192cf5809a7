use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PollPolicy;
use crate::languages::RuntimeId;

use super::EvaluationStatus;
use super::poll::{self, PollStep};

/// Header carrying the static sandbox API key
const API_KEY_HEADER: &str = "X-RapidAPI-Key";

/// Per-request timeout, distinct from the poll budget
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One source unit dispatched to the sandbox and awaited to a local outcome.
///
/// Implementations either observe a terminal verdict or give up after the
/// configured poll budget. Errors from the create call itself (network,
/// auth, quota) propagate; they are not a timeout.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    async fn dispatch_and_await(
        &self,
        source_code: &str,
        runtime: RuntimeId,
        stdin: &str,
        expected_output: &str,
    ) -> Result<PollOutcome>;
}

/// Local outcome of one dispatch-and-poll cycle
#[derive(Debug)]
pub enum PollOutcome {
    Finished(RemoteJob),
    /// Poll budget exhausted. The remote job is not retracted and may still
    /// complete later; that completion is discarded.
    TimedOut,
}

#[derive(Serialize)]
struct CreateSubmission<'a> {
    source_code: &'a str,
    language_id: u32,
    stdin: &'a str,
    expected_output: &'a str,
}

#[derive(Deserialize)]
struct CreatedSubmission {
    token: String,
}

/// The sandbox service's view of one dispatched job
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteJob {
    pub status: RemoteStatus,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteStatus {
    pub id: i32,
}

impl RemoteJob {
    /// Ids 1 (queued) and 2 (processing) mean the job is still in flight;
    /// everything above is a final verdict.
    pub fn is_terminal(&self) -> bool {
        self.status.id > 2
    }

    /// Map the service's terminal status id to the normalized verdict
    pub fn verdict(&self) -> EvaluationStatus {
        match self.status.id {
            3 => EvaluationStatus::Success, // Accepted
            4 | 5 => EvaluationStatus::Error, // Wrong Answer, Time Limit Exceeded
            6 => EvaluationStatus::CompilationError,
            _ => EvaluationStatus::Error,
        }
    }

    /// Combined program output: stdout, else stderr, else compiler output
    pub fn output_text(&self) -> String {
        [&self.stdout, &self.stderr, &self.compile_output]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    /// Failure diagnostics: stderr, else compiler output
    pub fn diagnostic_text(&self) -> String {
        [&self.stderr, &self.compile_output]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// Client for the remote execution sandbox's create-then-poll protocol
pub struct SandboxClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    poll: PollPolicy,
}

impl SandboxClient {
    pub fn new(base_url: String, api_key: String, poll: PollPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            poll,
        })
    }

    async fn create(&self, body: &CreateSubmission<'_>) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/submissions", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .context("Sandbox dispatch request failed")?
            .error_for_status()
            .context("Sandbox rejected the dispatch")?;

        let created: CreatedSubmission = response
            .json()
            .await
            .context("Malformed dispatch response")?;
        Ok(created.token)
    }

    async fn fetch(&self, token: &str) -> Result<RemoteJob> {
        let job = self
            .http
            .get(format!("{}/submissions/{token}", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("Sandbox status request failed")?
            .error_for_status()
            .context("Sandbox status fetch rejected")?
            .json()
            .await
            .context("Malformed status response")?;
        Ok(job)
    }
}

#[async_trait]
impl ExecutionService for SandboxClient {
    async fn dispatch_and_await(
        &self,
        source_code: &str,
        runtime: RuntimeId,
        stdin: &str,
        expected_output: &str,
    ) -> Result<PollOutcome> {
        let token = self
            .create(&CreateSubmission {
                source_code,
                language_id: runtime.0,
                stdin,
                expected_output,
            })
            .await?;
        log::debug!("Dispatched sandbox job {token}");

        let mut attempt = 0;
        loop {
            tokio::time::sleep(self.poll.interval()).await;

            let job = self.fetch(&token).await?;
            match poll::assess(job, attempt, &self.poll) {
                PollStep::Settle(job) => {
                    log::debug!(
                        "Sandbox job {token} finished with status {}",
                        job.status.id
                    );
                    return Ok(PollOutcome::Finished(job));
                }
                PollStep::GiveUp => {
                    log::warn!(
                        "Sandbox job {token} still running after {} attempts, giving up",
                        self.poll.max_attempts
                    );
                    return Ok(PollOutcome::TimedOut);
                }
                PollStep::Retry { attempt: next } => attempt = next,
            }
        }
    }
}
