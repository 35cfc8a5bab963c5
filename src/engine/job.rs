use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};

use crate::engine::traits::{HistoryResponse, RenderEngine};
use crate::error::{RelayError, Result};
use crate::model::{JobHandle, JobRecord, WorkflowGraph};

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitting,
    Polling,
    Completed,
    TimedOut,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Submitting => "submitting",
            JobState::Polling => "polling",
            JobState::Completed => "completed",
            JobState::TimedOut => "timed_out",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl JobState {
    /// Terminal state reached by a finished wait.
    pub fn of_wait(result: &Result<JobRecord>) -> Self {
        match result {
            Ok(_) => JobState::Completed,
            Err(RelayError::Timeout { .. }) => JobState::TimedOut,
            Err(_) => JobState::Failed,
        }
    }
}

/// Classification of one history response.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Pending,
    Complete(JobRecord),
}

impl PollOutcome {
    /// Only an entry for `prompt_id` with populated outputs is terminal.
    pub fn classify(prompt_id: &str, response: &HistoryResponse) -> Self {
        match response {
            HistoryResponse::NotYetKnown => PollOutcome::Pending,
            HistoryResponse::Found(body) => body
                .get(prompt_id)
                .and_then(|entry| JobRecord::from_entry(prompt_id, entry))
                .map_or(PollOutcome::Pending, PollOutcome::Complete),
        }
    }
}

/// Submit-then-poll protocol against a `RenderEngine`.
#[derive(Debug, Clone)]
pub struct JobClient<E> {
    engine: E,
    poll_interval: Duration,
    timeout: Duration,
}

impl<E: RenderEngine> JobClient<E> {
    pub fn new(engine: E, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            engine,
            poll_interval,
            timeout,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Queue `graph` once. There is no retry.
    pub async fn submit(&self, graph: &WorkflowGraph, client_id: &str) -> Result<JobHandle> {
        log::debug!("Job {} {}", client_id, JobState::Submitting);
        let queued = self.engine.queue_prompt(graph, client_id).await.map_err(|e| {
            log::warn!("Job {} {}: {}", client_id, JobState::Failed, e);
            e
        })?;
        log::info!(
            "Queued prompt {} for client {} (queue position {:?})",
            queued.prompt_id,
            client_id,
            queued.number
        );
        Ok(JobHandle {
            prompt_id: queued.prompt_id,
            client_id: client_id.to_string(),
            queue_number: queued.number,
        })
    }

    /// Wait for `handle` with the deadline fixed now, at `now + timeout`.
    pub async fn wait(&self, handle: &JobHandle) -> Result<JobRecord> {
        let deadline = Instant::now() + self.timeout;
        let result = match self
            .await_completion(&handle.prompt_id, self.poll_interval, deadline)
            .await
        {
            Err(RelayError::Timeout { prompt_id, .. }) => Err(RelayError::Timeout {
                prompt_id,
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            other => other,
        };
        let state = JobState::of_wait(&result);
        match &result {
            Ok(_) => log::info!("Prompt {} {}", handle.prompt_id, state),
            Err(e) => log::warn!("Prompt {} {}: {}", handle.prompt_id, state, e),
        }
        result
    }

    /// Poll sequentially until a terminal record, a transport failure, or the
    /// deadline. Neither a sleep nor an in-flight poll runs past the deadline.
    /// A timeout reports the budget that was left when the wait started.
    pub async fn await_completion(
        &self,
        prompt_id: &str,
        poll_interval: Duration,
        deadline: Instant,
    ) -> Result<JobRecord> {
        let started = Instant::now();
        let timed_out = || RelayError::Timeout {
            prompt_id: prompt_id.to_string(),
            timeout_ms: deadline.saturating_duration_since(started).as_millis() as u64,
        };
        let mut attempts: u32 = 0;
        loop {
            if Instant::now() >= deadline {
                return Err(timed_out());
            }

            attempts += 1;
            let response = match timeout_at(deadline, self.engine.fetch_history(prompt_id)).await {
                Ok(response) => response?,
                Err(_) => {
                    log::debug!("Prompt {} poll {} cut off at the deadline", prompt_id, attempts);
                    return Err(timed_out());
                }
            };
            match PollOutcome::classify(prompt_id, &response) {
                PollOutcome::Complete(record) => {
                    log::debug!("Prompt {} complete after {} polls", prompt_id, attempts);
                    return Ok(record);
                }
                PollOutcome::Pending => {
                    log::debug!(
                        "Prompt {} {} (poll {}, {})",
                        prompt_id,
                        JobState::Polling,
                        attempts,
                        if response == HistoryResponse::NotYetKnown {
                            "not yet known"
                        } else {
                            "no outputs yet"
                        }
                    );
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(poll_interval.min(remaining)).await;
        }
    }
}
