//! Counters for job and suggestion attempts

/// Metrics collected while running attempts
///
/// Shared by a runner and every task its worker spawns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMetrics {
    /// Job attempts started
    pub attempts: usize,

    /// Jobs that reached `completed`
    pub completed: usize,

    /// Jobs that reached `failed`
    pub failed: usize,

    /// Job retries scheduled after a failed attempt
    pub retries_scheduled: usize,

    /// Chunks finished across all job attempts
    pub chunks_processed: usize,

    /// Suggestion attempts started
    pub suggestion_attempts: usize,

    /// Suggestions that reached `completed`
    pub suggestions_completed: usize,

    /// Suggestions that reached `failed`
    pub suggestions_failed: usize,

    /// Wall time spent in successful extractions (milliseconds)
    pub total_processing_ms: u64,
}

impl JobMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a job attempt
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Record a completed job
    pub fn record_completion(&mut self, processing_ms: u64) {
        self.completed += 1;
        self.total_processing_ms += processing_ms;
    }

    /// Record a job that will not be retried
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Record a scheduled job retry
    pub fn record_retry(&mut self) {
        self.retries_scheduled += 1;
    }

    /// Record one finished chunk
    pub fn record_chunk(&mut self) {
        self.chunks_processed += 1;
    }

    /// Record the start of a suggestion attempt
    pub fn record_suggestion_attempt(&mut self) {
        self.suggestion_attempts += 1;
    }

    /// Record a suggestion's terminal state
    pub fn record_suggestion_outcome(&mut self, completed: bool) {
        if completed {
            self.suggestions_completed += 1;
        } else {
            self.suggestions_failed += 1;
        }
    }

    /// Mean processing time of completed jobs
    pub fn average_processing_ms(&self) -> Option<u64> {
        (self.completed > 0).then(|| self.total_processing_ms / self.completed as u64)
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Job Metrics Summary".to_string(),
            "===================".to_string(),
            format!("Attempts: {}", self.attempts),
            format!("Completed: {}", self.completed),
            format!("Failed: {}", self.failed),
            format!("Retries scheduled: {}", self.retries_scheduled),
            format!("Chunks processed: {}", self.chunks_processed),
        ];

        if let Some(avg) = self.average_processing_ms() {
            lines.push(format!("Average processing time: {}ms", avg));
        }

        if self.suggestion_attempts > 0 {
            lines.push(String::new());
            lines.push(format!("Suggestion attempts: {}", self.suggestion_attempts));
            lines.push(format!("  Completed: {}", self.suggestions_completed));
            lines.push(format!("  Failed: {}", self.suggestions_failed));
        }

        lines.join("\n")
    }
}
