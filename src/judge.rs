mod client;
mod evaluator;
mod keyword;
mod poll;
mod remote;

// Re-export the trait and common types
pub use client::{ExecutionService, PollOutcome, RemoteJob, RemoteStatus, SandboxClient};
pub use evaluator::Evaluator;
pub use keyword::KeywordEvaluator;
pub use remote::RemoteEvaluator;

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::{EvaluatorMode, JudgeConfig};

/// Normalized verdict of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Success,
    Error,
    Timeout,
    CompilationError,
}

/// Result of a single test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
    /// Explanation of the failure; empty when passed
    pub message: String,
}

/// Result of one evaluation attempt.
///
/// The two variants carry mutually exclusive payloads: a bare run (no test
/// cases) reports the combined program output, a test-suite run reports one
/// outcome per case and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationOutcome {
    TestSuite {
        status: EvaluationStatus,
        #[serde(rename = "testResults")]
        test_results: Vec<TestOutcome>,
    },
    BareRun {
        status: EvaluationStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl EvaluationOutcome {
    pub fn status(&self) -> EvaluationStatus {
        match self {
            Self::TestSuite { status, .. } => *status,
            Self::BareRun { status, .. } => *status,
        }
    }

    /// A submission counts as passed iff the evaluation succeeded
    pub fn passed(&self) -> bool {
        self.status() == EvaluationStatus::Success
    }
}

/// Creates an evaluator based on the judge configuration.
///
/// The keyword evaluator never runs any code and is only selected when the
/// configuration explicitly asks for it; there is no automatic failover from
/// the remote sandbox.
pub fn create_evaluator(config: &JudgeConfig) -> Result<Arc<dyn Evaluator>> {
    match config.mode {
        EvaluatorMode::Remote => {
            log::info!("Creating remote evaluator against {}", config.api_url);
            let client = SandboxClient::new(
                config.api_url.clone(),
                config.api_key.clone(),
                config.poll.clone(),
            )?;
            Ok(Arc::new(RemoteEvaluator::new(Box::new(client))))
        }
        EvaluatorMode::Keyword => {
            log::warn!(
                "Creating keyword evaluator - submissions are NOT executed and results are not authoritative"
            );
            Ok(Arc::new(KeywordEvaluator))
        }
    }
}
