use async_trait::async_trait;

use crate::config::TestCaseConfig;

use super::{EvaluationOutcome, EvaluationStatus, Evaluator, TestOutcome};

/// Heuristic evaluator that never executes the submission.
///
/// A case passes when every one of its keywords appears verbatim in the
/// candidate's code. This is a proxy for keeping the submit flow alive while
/// the sandbox service is down, not a correctness check; it is only selected
/// through explicit configuration.
pub struct KeywordEvaluator;

#[async_trait]
impl Evaluator for KeywordEvaluator {
    async fn evaluate(
        &self,
        code: &str,
        _language: &str,
        cases: &[TestCaseConfig],
    ) -> EvaluationOutcome {
        if cases.is_empty() {
            // Nothing to check against; accept the submission as received
            return EvaluationOutcome::BareRun {
                status: EvaluationStatus::Success,
                output: Some("Code submitted successfully (fallback mode)".to_string()),
                error: None,
            };
        }

        let mut test_results = Vec::with_capacity(cases.len());
        let mut all_passed = true;

        for case in cases {
            let passed = case.keywords.iter().all(|keyword| code.contains(keyword));
            all_passed &= passed;

            test_results.push(TestOutcome {
                name: case.name.clone(),
                passed,
                message: if passed {
                    String::new()
                } else {
                    "Test failed (fallback mode)".to_string()
                },
            });
        }

        EvaluationOutcome::TestSuite {
            status: if all_passed {
                EvaluationStatus::Success
            } else {
                EvaluationStatus::Error
            },
            test_results,
        }
    }
}
