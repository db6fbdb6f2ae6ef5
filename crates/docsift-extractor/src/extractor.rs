//! Core Extractor implementation

use crate::chunking::{should_chunk, TextChunker};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::merge::merge;
use crate::prompt::{self, Prompt};
use crate::shape::translate;
use crate::types::{ExtractionOutcome, ExtractionRequest};
use docsift_domain::{LlmCaller, LlmRequest, OutputShape};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info};

/// Receives progress from a chunked extraction
///
/// Called synchronously between chunks: the next LLM call is not issued
/// until `on_chunk_complete` returns.
pub trait ExtractionObserver: Send {
    /// The chunk sequence for this attempt is fixed at `total` chunks
    fn on_chunks_planned(&mut self, _total: usize) {}

    /// Chunk `index` (0-based) finished; `accumulated` is the merged result so far
    fn on_chunk_complete(&mut self, index: usize, total: usize, accumulated: &Value);
}

impl<F> ExtractionObserver for F
where
    F: FnMut(usize, usize, &Value) + Send,
{
    fn on_chunk_complete(&mut self, index: usize, total: usize, accumulated: &Value) {
        self(index, total, accumulated)
    }
}

/// Per-request values shared by every call of one attempt
struct CallContext<'a> {
    model: &'a str,
    shape: OutputShape,
    output_name: String,
    output_description: String,
}

/// Drives single-pass or chunked extraction of one document
pub struct Extractor<L>
where
    L: LlmCaller,
{
    llm: Arc<L>,
    config: ExtractorConfig,
    chunker: TextChunker,
}

impl<L> Extractor<L>
where
    L: LlmCaller,
{
    /// Create a new Extractor
    pub fn new(llm: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::from_arc(Arc::new(llm), config)
    }

    /// Create an Extractor around a shared provider
    pub fn from_arc(llm: Arc<L>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        let chunker = TextChunker::from_config(&config)?;
        Ok(Self {
            llm,
            config,
            chunker,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The provider calls go to
    pub fn llm(&self) -> &Arc<L> {
        &self.llm
    }

    /// Extract without progress reporting
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionOutcome, ExtractorError> {
        self.extract_with_observer(request, &mut |_: usize, _: usize, _: &Value| {})
            .await
    }

    /// Extract, reporting each finished chunk to `observer`
    ///
    /// Any call failure aborts the attempt; nothing after the failing chunk
    /// is reported.
    pub async fn extract_with_observer<O>(
        &self,
        request: &ExtractionRequest,
        observer: &mut O,
    ) -> Result<ExtractionOutcome, ExtractorError>
    where
        O: ExtractionObserver + ?Sized,
    {
        let started = Instant::now();
        let text_len = request.text.chars().count();

        if text_len == 0 {
            info!(schema = %request.schema_name, "Empty document, skipping LLM call");
            return Ok(ExtractionOutcome {
                result: Value::Object(Map::new()),
                is_chunked: false,
                total_chunks: 0,
                model_name: request.model.clone(),
                processing_time_ms: elapsed_ms(started),
            });
        }

        let context = CallContext {
            model: &request.model,
            shape: translate(&request.definition)?,
            output_name: prompt::output_name(&request.schema_name),
            output_description: prompt::output_description(
                &request.schema_name,
                &request.schema_description,
            ),
        };

        info!(
            "Starting extraction with schema '{}', text length {}",
            request.schema_name, text_len
        );

        if !should_chunk(&request.text, self.config.chunk_threshold) {
            let result = self
                .call(&context, prompt::single_pass(&request.text))
                .await?;
            info!("Single-pass extraction complete");
            return Ok(ExtractionOutcome {
                result,
                is_chunked: false,
                total_chunks: 1,
                model_name: request.model.clone(),
                processing_time_ms: elapsed_ms(started),
            });
        }

        let chunks = self.chunker.chunk(&request.text);
        let total = chunks.len();
        info!("Text exceeds chunk threshold, processing {} chunks", total);
        observer.on_chunks_planned(total);

        let mut accumulated: Option<Value> = None;
        for chunk in &chunks {
            info!(
                "Processing chunk {}/{} ({} chars)",
                chunk.index + 1,
                total,
                chunk.char_len()
            );

            let next = match accumulated.take() {
                None => self.call(&context, prompt::first_chunk(chunk)).await?,
                Some(previous) => {
                    let candidate = self
                        .call(&context, prompt::next_chunk(chunk, &previous)?)
                        .await?;
                    merge(previous, candidate)
                }
            };

            observer.on_chunk_complete(chunk.index, total, &next);
            accumulated = Some(next);
        }

        info!("Chunked extraction complete ({} chunks)", total);
        Ok(ExtractionOutcome {
            result: accumulated.unwrap_or_else(|| Value::Object(Map::new())),
            is_chunked: true,
            total_chunks: total,
            model_name: request.model.clone(),
            processing_time_ms: elapsed_ms(started),
        })
    }

    async fn call(&self, context: &CallContext<'_>, prompt: Prompt) -> Result<Value, ExtractorError> {
        let request = LlmRequest {
            model: context.model.to_string(),
            system_prompt: prompt.system,
            user_message: prompt.user,
            output_shape: context.shape.clone(),
            output_name: context.output_name.clone(),
            output_description: context.output_description.clone(),
        };
        self.call_llm(&request).await
    }

    /// Issue one call bounded by the configured timeout
    pub(crate) async fn call_llm(&self, request: &LlmRequest) -> Result<Value, ExtractorError> {
        debug!(
            "Prompt length: {} chars system, {} chars user",
            request.system_prompt.len(),
            request.user_message.len()
        );

        let value = timeout(self.config.call_timeout(), self.llm.call(request))
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.call_timeout_secs))?
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;
        Ok(value)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
