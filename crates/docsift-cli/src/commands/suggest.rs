//! Suggest command implementation.

use super::{build_extractor, read_document};
use crate::cli::SuggestArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::schema_file::SchemaFile;
use docsift_domain::JobStore;
use docsift_jobs::{AttemptReport, JobRunner, JobWorker, MemoryStore};
use std::fs;
use std::sync::{Arc, Mutex};

/// Execute the suggest command.
pub async fn execute_suggest(args: SuggestArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = read_document(&args.document)?;
    let model = args.model.unwrap_or_else(|| config.llm.model.clone());

    let mut store = MemoryStore::new();
    let document_id = store.insert_document(document);
    let store = Arc::new(Mutex::new(store));

    let runner = JobRunner::new(build_extractor(config)?, Arc::clone(&store), config.jobs.clone())?;
    let suggestion = runner.create_suggestion(document_id, &model)?;
    let worker = JobWorker::new(runner);

    if let AttemptReport::Failed { message } = worker.dispatch_suggestion(suggestion.id).join().await? {
        return Err(CliError::ExtractionFailed(message));
    }

    let Ok(stored) = store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get_suggestion(suggestion.id);
    let suggestion = stored.ok_or_else(|| {
        CliError::ExtractionFailed(format!("suggestion {} disappeared", suggestion.id))
    })?;
    let Some(definition) = suggestion.suggested_schema else {
        return Err(CliError::ExtractionFailed(format!(
            "suggestion ended in '{}' without a schema",
            suggestion.status.as_str()
        )));
    };

    let schema = SchemaFile {
        name: suggestion.suggested_name,
        description: suggestion.suggested_description,
        definition,
        model: Some(model),
    };

    match args.output {
        Some(path) => {
            fs::write(&path, serde_json::to_string_pretty(&schema)?)?;
            println!(
                "{}",
                formatter.success(&format!("Schema '{}' written to {}", schema.name, path.display()))
            );
        }
        None => println!("{}", formatter.format_schema(&schema)?),
    }
    Ok(())
}
