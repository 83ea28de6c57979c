use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::transport::{HttpReply, Transport};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Submitted,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// How long to keep asking about a submitted job. There is no backoff: every
/// attempt waits the same `interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Optional wall-clock ceiling, checked alongside the attempt budget.
    pub deadline: Option<Duration>,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: String,
}

/// One status report for a job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// In-progress reports send `"outputs": null`.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Submits generation requests and polls them to a terminal state.
///
/// Each call to [`JobClient::submit_and_wait`] owns exactly one remote job:
/// it is polled until it completes, fails, or the [`PollPolicy`] runs out,
/// and never again afterwards. HTTP calls are not retried.
#[derive(Clone)]
pub struct JobClient {
    transport: Arc<dyn Transport>,
    config: ApiConfig,
}

impl JobClient {
    pub fn new(transport: Arc<dyn Transport>, config: ApiConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Submit `payload` to `endpoint` and return the job's first output URL.
    pub async fn submit_and_wait(
        &self,
        endpoint: &str,
        payload: &Value,
        policy: &PollPolicy,
    ) -> Result<String> {
        let begin = Instant::now();
        let job_id = self.submit(endpoint, payload).await?;
        info!(job_id = %job_id, endpoint, "Task submitted");

        let poll_url = self.config.poll_url(&job_id);

        for attempt in 1..=policy.max_attempts {
            if let Some(deadline) = policy.deadline {
                if begin.elapsed() >= deadline {
                    warn!(job_id = %job_id, attempt, "Poll deadline reached");
                    return Err(Error::TimedOut {
                        job_id,
                        attempts: attempt - 1,
                    });
                }
            }

            sleep(policy.interval).await;

            let snapshot = self.poll(&job_id, &poll_url).await?;
            match snapshot.status {
                JobStatus::Completed => {
                    info!(
                        job_id = %job_id,
                        attempts = attempt,
                        elapsed_ms = begin.elapsed().as_millis() as u64,
                        "Task completed"
                    );
                    return snapshot.outputs.into_iter().next().ok_or_else(|| {
                        Error::RemoteJobFailed {
                            job_id,
                            reason: "completed without outputs".to_string(),
                        }
                    });
                }
                JobStatus::Failed => {
                    let reason = snapshot
                        .error
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| "unknown error".to_string());
                    warn!(job_id = %job_id, reason = %reason, "Task failed");
                    return Err(Error::RemoteJobFailed { job_id, reason });
                }
                status => {
                    debug!(job_id = %job_id, attempt, ?status, "Task still processing");
                }
            }
        }

        warn!(job_id = %job_id, attempts = policy.max_attempts, "Task timed out after maximum retries");
        Err(Error::TimedOut {
            job_id,
            attempts: policy.max_attempts,
        })
    }

    async fn submit(&self, endpoint: &str, payload: &Value) -> Result<String> {
        let reply = self
            .transport
            .post_json(endpoint, payload)
            .await
            .map_err(|e| Error::SubmissionFailed {
                status: None,
                message: e.to_string(),
            })?;

        if !reply.is_success() {
            return Err(Error::SubmissionFailed {
                status: Some(reply.status),
                message: reply.text(),
            });
        }

        let data: SubmitData = parse_envelope(&reply).map_err(|message| Error::SubmissionFailed {
            status: Some(reply.status),
            message,
        })?;

        Ok(data.id)
    }

    async fn poll(&self, job_id: &str, poll_url: &str) -> Result<JobSnapshot> {
        let reply = self
            .transport
            .get(poll_url)
            .await
            .map_err(|e| Error::PollFailed {
                job_id: job_id.to_string(),
                status: None,
                message: e.to_string(),
            })?;

        if !reply.is_success() {
            return Err(Error::PollFailed {
                job_id: job_id.to_string(),
                status: Some(reply.status),
                message: reply.text(),
            });
        }

        parse_envelope(&reply).map_err(|message| Error::PollFailed {
            job_id: job_id.to_string(),
            status: Some(reply.status),
            message,
        })
    }
}

fn parse_envelope<T: DeserializeOwned>(reply: &HttpReply) -> std::result::Result<T, String> {
    serde_json::from_slice::<Envelope<T>>(&reply.body)
        .map(|envelope| envelope.data)
        .map_err(|e| format!("Failed to parse response: {}", e))
}
