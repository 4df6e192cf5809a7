use anyhow::Result;
use async_trait::async_trait;

use crate::config::TestCaseConfig;
use crate::languages::{self, RuntimeId};

use super::client::{ExecutionService, PollOutcome};
use super::{EvaluationOutcome, EvaluationStatus, Evaluator, TestOutcome};

const TIMEOUT_MESSAGE: &str = "Evaluation timed out. Please try again.";
const INTERNAL_ERROR_MESSAGE: &str = "An error occurred during code evaluation.";

/// Evaluates submissions against the remote execution sandbox.
///
/// Chooses between a bare run (no catalog test cases) and a per-case
/// test-suite run, and reduces the sandbox verdicts to one normalized
/// [`EvaluationOutcome`].
pub struct RemoteEvaluator {
    service: Box<dyn ExecutionService>,
}

impl RemoteEvaluator {
    pub fn new(service: Box<dyn ExecutionService>) -> Self {
        Self { service }
    }

    fn runtime_for(language: &str) -> RuntimeId {
        match languages::resolve(language) {
            Ok(runtime) => runtime,
            Err(unknown) => {
                // Deliberate policy pending product review: unmapped languages
                // run on the default Node.js runtime instead of being rejected
                log::warn!("{unknown}, submitting with the default runtime");
                languages::DEFAULT_RUNTIME
            }
        }
    }

    async fn run_bare(&self, code: &str, runtime: RuntimeId) -> Result<EvaluationOutcome> {
        let outcome = self
            .service
            .dispatch_and_await(code, runtime, "", "")
            .await?;

        Ok(match outcome {
            PollOutcome::TimedOut => EvaluationOutcome::BareRun {
                status: EvaluationStatus::Timeout,
                output: Some(TIMEOUT_MESSAGE.to_string()),
                error: None,
            },
            PollOutcome::Finished(job) => EvaluationOutcome::BareRun {
                status: job.verdict(),
                output: Some(job.output_text()),
                error: Some(job.diagnostic_text()),
            },
        })
    }

    async fn run_suite(
        &self,
        code: &str,
        runtime: RuntimeId,
        cases: &[TestCaseConfig],
    ) -> Result<EvaluationOutcome> {
        let mut test_results = Vec::with_capacity(cases.len());
        let mut all_passed = true;

        // Cases run one after another: each dispatch-and-poll cycle finishes
        // before the next case is sent
        for case in cases {
            let source = with_harness(code, case);
            let outcome = self
                .service
                .dispatch_and_await(&source, runtime, &case.input, &case.expected_output)
                .await?;

            let result = match outcome {
                PollOutcome::TimedOut => TestOutcome {
                    name: case.name.clone(),
                    passed: false,
                    message: "Test timed out".to_string(),
                },
                PollOutcome::Finished(job) => {
                    let passed = job.verdict() == EvaluationStatus::Success;
                    let message = if passed {
                        String::new()
                    } else {
                        let diagnostic = job.diagnostic_text();
                        if diagnostic.is_empty() {
                            "Test failed".to_string()
                        } else {
                            diagnostic
                        }
                    };
                    TestOutcome {
                        name: case.name.clone(),
                        passed,
                        message,
                    }
                }
            };

            all_passed &= result.passed;
            test_results.push(result);
        }

        Ok(EvaluationOutcome::TestSuite {
            status: if all_passed {
                EvaluationStatus::Success
            } else {
                EvaluationStatus::Error
            },
            test_results,
        })
    }
}

/// Candidate code with one test case's harness appended. The candidate's
/// code must already be syntactically complete on its own.
fn with_harness(code: &str, case: &TestCaseConfig) -> String {
    format!(
        "{code}\n\n// Test case: {name}\n{test_code}\n",
        name = case.name,
        test_code = case.test_code
    )
}

#[async_trait]
impl Evaluator for RemoteEvaluator {
    async fn evaluate(
        &self,
        code: &str,
        language: &str,
        cases: &[TestCaseConfig],
    ) -> EvaluationOutcome {
        let runtime = Self::runtime_for(language);

        let attempt = if cases.is_empty() {
            self.run_bare(code, runtime).await
        } else {
            self.run_suite(code, runtime, cases).await
        };

        attempt.unwrap_or_else(|e| {
            log::error!("Code evaluation failed: {e:#}");
            EvaluationOutcome::BareRun {
                status: EvaluationStatus::Error,
                output: Some(INTERNAL_ERROR_MESSAGE.to_string()),
                error: Some(e.to_string()),
            }
        })
    }
}
