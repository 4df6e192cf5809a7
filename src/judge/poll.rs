use crate::config::PollPolicy;

use super::client::RemoteJob;

/// Decision taken after one status fetch of a dispatched job.
#[derive(Debug)]
pub enum PollStep {
    /// The job reached a terminal status; stop with its verdict
    Settle(RemoteJob),
    /// Still queued or running; fetch again after the poll delay
    Retry { attempt: u32 },
    /// Attempt budget exhausted without a terminal status
    GiveUp,
}

/// Pure transition function of the poll loop.
///
/// `attempt` is the zero-based index of the fetch that produced `job`, so a
/// policy of `max_attempts = 10` allows attempts 0 through 9 and gives up
/// after the tenth observation.
pub fn assess(job: RemoteJob, attempt: u32, policy: &PollPolicy) -> PollStep {
    if job.is_terminal() {
        return PollStep::Settle(job);
    }
    let next = attempt + 1;
    if next >= policy.max_attempts {
        PollStep::GiveUp
    } else {
        PollStep::Retry { attempt: next }
    }
}

#[cfg(test)]
mod tests {
    use super::super::client::RemoteStatus;
    use super::*;

    fn job_with_status(id: i32) -> RemoteJob {
        RemoteJob {
            status: RemoteStatus { id },
            stdout: None,
            stderr: None,
            compile_output: None,
        }
    }

    fn policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            interval_ms: 1000,
        }
    }

    #[test]
    fn test_terminal_status_settles_immediately() {
        for id in [3, 4, 5, 6, 13] {
            match assess(job_with_status(id), 0, &policy(10)) {
                PollStep::Settle(job) => assert_eq!(job.status.id, id),
                other => panic!("expected Settle for status {id}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_queued_and_processing_are_not_terminal() {
        // 1 = queued, 2 = processing
        for id in [1, 2] {
            assert!(matches!(
                assess(job_with_status(id), 0, &policy(10)),
                PollStep::Retry { attempt: 1 }
            ));
        }
    }

    #[test]
    fn test_retry_increments_attempt() {
        match assess(job_with_status(2), 4, &policy(10)) {
            PollStep::Retry { attempt } => assert_eq!(attempt, 5),
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn test_budget_exhaustion_gives_up() {
        // Tenth fetch (attempt index 9) of a still-running job is the last
        for id in [1, 2] {
            assert!(matches!(
                assess(job_with_status(id), 9, &policy(10)),
                PollStep::GiveUp
            ));
        }
    }

    #[test]
    fn test_terminal_status_wins_on_final_attempt() {
        assert!(matches!(
            assess(job_with_status(3), 9, &policy(10)),
            PollStep::Settle(_)
        ));
    }

    #[test]
    fn test_full_sequence_that_never_terminates() {
        let policy = policy(10);
        let mut attempt = 0;
        let mut fetches = 0;
        loop {
            fetches += 1;
            match assess(job_with_status(2), attempt, &policy) {
                PollStep::Retry { attempt: next } => attempt = next,
                PollStep::GiveUp => break,
                PollStep::Settle(_) => panic!("status 2 must never settle"),
            }
        }
        assert_eq!(fetches, 10);
    }
}
