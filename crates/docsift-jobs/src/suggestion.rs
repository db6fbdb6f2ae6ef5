//! Schema-suggestion attempts

use crate::error::JobError;
use crate::runner::{lock, store_error, AttemptReport, JobRunner};
use docsift_domain::{
    AttemptOutcome, DocumentId, JobStore, LlmCaller, SchemaSuggestion, SuggestionId,
};
use docsift_extractor::{ExtractorError, SuggestedSchema};
use std::fmt::Display;
use tracing::{error, info, warn};

enum Prepared {
    Skip(&'static str),
    Fail(String),
    Run(SchemaSuggestion, String),
}

impl<L, S> JobRunner<L, S>
where
    L: LlmCaller,
    S: JobStore + Send,
    S::Error: Display,
{
    /// Create and persist a pending suggestion request
    pub fn create_suggestion(
        &self,
        document_id: DocumentId,
        model: &str,
    ) -> Result<SchemaSuggestion, JobError> {
        let suggestion = SchemaSuggestion::new(document_id, model)
            .with_max_retries(self.config.suggestion_max_retries);
        self.save_suggestion(&suggestion)?;
        info!(suggestion_id = %suggestion.id, document_id = %document_id, "Created schema suggestion");
        Ok(suggestion)
    }

    /// Run one suggestion attempt
    ///
    /// A retryable failure keeps the suggestion in `processing` and reports
    /// the backoff, capped at `suggestion_backoff_max_secs`.
    pub async fn run_suggestion_attempt(
        &self,
        id: SuggestionId,
    ) -> Result<AttemptReport, JobError> {
        let (mut suggestion, text) = match self.prepare_suggestion(id)? {
            Prepared::Skip(status) => return Ok(AttemptReport::Skipped { status }),
            Prepared::Fail(message) => return Ok(AttemptReport::Failed { message }),
            Prepared::Run(suggestion, text) => (suggestion, text),
        };

        info!(
            suggestion_id = %id,
            attempt = suggestion.retry_count + 1,
            model = %suggestion.llm_model,
            "Starting schema suggestion"
        );
        let outcome = self
            .extractor
            .suggest_schema(&text, &suggestion.llm_model)
            .await;

        let report = self.settle_suggestion(&mut suggestion, outcome)?;
        self.save_suggestion(&suggestion)?;
        Ok(report)
    }

    fn prepare_suggestion(&self, id: SuggestionId) -> Result<Prepared, JobError> {
        let mut store = lock(&self.store);
        let mut suggestion = store
            .get_suggestion(id)
            .map_err(store_error)?
            .ok_or_else(|| JobError::NotFound(format!("suggestion {}", id)))?;

        if !suggestion.is_runnable() {
            return Ok(Prepared::Skip(suggestion.status.as_str()));
        }

        suggestion.begin_attempt()?;
        lock(&self.metrics).record_suggestion_attempt();

        match store.get_document(suggestion.document_id).map_err(store_error)? {
            Some(document) => {
                store.save_suggestion(&suggestion).map_err(store_error)?;
                Ok(Prepared::Run(suggestion, document.text))
            }
            None => {
                let message = format!("document {} not found", suggestion.document_id);
                suggestion.fail_permanently(message.clone())?;
                store.save_suggestion(&suggestion).map_err(store_error)?;
                lock(&self.metrics).record_suggestion_outcome(false);
                error!(suggestion_id = %id, error = %message, "Schema suggestion failed");
                Ok(Prepared::Fail(message))
            }
        }
    }

    fn settle_suggestion(
        &self,
        suggestion: &mut SchemaSuggestion,
        outcome: Result<SuggestedSchema, ExtractorError>,
    ) -> Result<AttemptReport, JobError> {
        let mut metrics = lock(&self.metrics);
        let err = match outcome {
            Ok(proposed) => {
                info!(
                    suggestion_id = %suggestion.id,
                    name = %proposed.name,
                    fields = proposed.definition.field_count(),
                    "Schema suggestion completed"
                );
                suggestion.complete(proposed.name, proposed.description, proposed.definition)?;
                metrics.record_suggestion_outcome(true);
                return Ok(AttemptReport::Completed);
            }
            Err(err) => err,
        };

        let message = err.to_string();
        let outcome = if err.is_retryable() {
            suggestion.fail_attempt(message.clone())?
        } else {
            suggestion.fail_permanently(message.clone())?;
            AttemptOutcome::Exhausted
        };

        match outcome {
            AttemptOutcome::Retry { retry_count } => {
                let delay = self.config.suggestion_backoff_delay(retry_count - 1);
                warn!(
                    suggestion_id = %suggestion.id,
                    retry = retry_count,
                    delay_secs = delay.as_secs(),
                    error = %message,
                    "Schema suggestion failed, retry scheduled"
                );
                Ok(AttemptReport::RetryScheduled { retry_count, delay })
            }
            AttemptOutcome::Exhausted => {
                metrics.record_suggestion_outcome(false);
                error!(suggestion_id = %suggestion.id, error = %message, "Schema suggestion failed");
                Ok(AttemptReport::Failed { message })
            }
        }
    }

    pub(crate) fn save_suggestion(&self, suggestion: &SchemaSuggestion) -> Result<(), JobError> {
        lock(&self.store)
            .save_suggestion(suggestion)
            .map_err(store_error)
    }
}
