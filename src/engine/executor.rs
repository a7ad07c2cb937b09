// src/engine/executor.rs
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{RiptideError, RiptideResult};
use crate::plugin::PluginDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

/// Uniform envelope around one plugin execution. Failures are captured here
/// and never escape the engine boundary.
pub struct ExecutionResult<T> {
    pub descriptor: PluginDescriptor,
    pub status: ExecutionStatus,
    pub data: Option<T>,
    pub error: Option<RiptideError>,
    pub duration: Duration,
}

impl<T> ExecutionResult<T> {
    pub fn is_succeeded(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }
}

/// Runs plugin work units on a shared bounded pool with a per-unit timeout.
/// One engine instance is shared by every phase of a scan.
pub struct ExecutionEngine {
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ExecutionEngine {
    pub fn new(max_workers: usize, timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            timeout,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.max_workers,
            Duration::from_secs(config.plugin_timeout_secs),
        )
    }

    /// Execute one plugin work unit. The future runs on the pool once a
    /// worker slot is free; errors and timeouts are converted into the
    /// result envelope, and successful runs are stamped with their elapsed
    /// wall-clock duration.
    pub async fn execute<T, F>(
        &self,
        descriptor: &PluginDescriptor,
        work: F,
    ) -> ExecutionResult<T>
    where
        T: Send + 'static,
        F: Future<Output = RiptideResult<T>> + Send + 'static,
    {
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                return self.failed_result(
                    descriptor,
                    RiptideError::Unexpected("execution pool is shut down".to_string()),
                    Duration::ZERO,
                )
            }
        };

        let start = Instant::now();
        let mut handle = tokio::spawn(work);
        let outcome = tokio::time::timeout(self.timeout, &mut handle).await;
        drop(permit);

        match outcome {
            Ok(Ok(Ok(data))) => {
                let duration = start.elapsed();
                info!(
                    "Plugin '{}' execution finished in {} ms",
                    descriptor.name,
                    duration.as_millis()
                );
                ExecutionResult {
                    descriptor: descriptor.clone(),
                    status: ExecutionStatus::Succeeded,
                    data: Some(data),
                    error: None,
                    duration,
                }
            }
            Ok(Ok(Err(error))) => self.failed_result(
                descriptor,
                error.into_execution_failure(&descriptor.name),
                start.elapsed(),
            ),
            Ok(Err(join_error)) => self.failed_result(
                descriptor,
                RiptideError::PluginExecutionFailed {
                    name: descriptor.name.clone(),
                    cause: join_error.to_string(),
                },
                start.elapsed(),
            ),
            Err(_elapsed) => {
                // The work did not observe cancellation in time; abort the
                // task so the pipeline is never blocked on it.
                handle.abort();
                self.failed_result(
                    descriptor,
                    RiptideError::TimeoutExceeded {
                        name: descriptor.name.clone(),
                        limit_secs: self.timeout.as_secs(),
                    },
                    start.elapsed(),
                )
            }
        }
    }

    fn failed_result<T>(
        &self,
        descriptor: &PluginDescriptor,
        error: RiptideError,
        duration: Duration,
    ) -> ExecutionResult<T> {
        warn!("Plugin '{}' failed: {}", descriptor.name, error);
        ExecutionResult {
            descriptor: descriptor.clone(),
            status: ExecutionStatus::Failed,
            data: None,
            error: Some(error),
            duration,
        }
    }
}
