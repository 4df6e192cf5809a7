use async_trait::async_trait;

use crate::config::TestCaseConfig;

use super::EvaluationOutcome;

/// Trait for the evaluation backends behind the submit route
///
/// Implementations turn one submission (code, language, catalog test cases)
/// into one normalized [`EvaluationOutcome`]. They never let an error escape:
/// whatever happens, the caller gets a well-formed result it can store and
/// return to the candidate.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate a submission.
    ///
    /// With an empty `cases` slice the code is dispatched as-is (bare run);
    /// otherwise every case is evaluated in input order and reported
    /// individually.
    async fn evaluate(
        &self,
        code: &str,
        language: &str,
        cases: &[TestCaseConfig],
    ) -> EvaluationOutcome;
}
