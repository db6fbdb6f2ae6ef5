//! Extract command implementation.

use super::{build_extractor, read_document};
use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::schema_file::SchemaFile;
use docsift_domain::JobStore;
use docsift_jobs::{AttemptReport, JobRunner, JobWorker, MemoryStore};
use std::fs;
use std::sync::{Arc, Mutex};

/// Execute the extract command.
///
/// Runs a full job, retries included, and prints the result.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = read_document(&args.document)?;
    let schema_file = match (&args.schema, &args.preset) {
        (Some(path), _) => SchemaFile::load(path)?,
        (None, Some(key)) => SchemaFile::from_preset(key)?,
        (None, None) => {
            return Err(CliError::InvalidInput(
                "either --schema or --preset is required".to_string(),
            ))
        }
    };
    let model = args
        .model
        .or_else(|| schema_file.model.clone())
        .unwrap_or_else(|| config.llm.model.clone());

    let jobs_config = if args.no_retry {
        config.jobs.clone().without_retries()
    } else {
        config.jobs.clone()
    };

    let mut store = MemoryStore::new();
    let document_id = store.insert_document(document);
    let schema_id = store.insert_schema(schema_file.into_schema(model));
    let store = Arc::new(Mutex::new(store));

    let runner = JobRunner::new(build_extractor(config)?, Arc::clone(&store), jobs_config)?;
    let job = runner.create_job(document_id, schema_id)?;
    let worker = JobWorker::new(runner);

    let report = worker.dispatch(job.id).join().await?;

    let Ok(stored) = store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get_job(job.id);
    let job = stored.ok_or_else(|| CliError::ExtractionFailed(format!("job {} disappeared", job.id)))?;

    if let AttemptReport::Failed { message } = report {
        if formatter.format() == OutputFormat::Table {
            eprintln!("{}", formatter.format_job(&job)?);
        }
        return Err(CliError::ExtractionFailed(message));
    }

    let result = job.result.clone().ok_or_else(|| {
        CliError::ExtractionFailed(format!("job ended in '{}' without a result", job.status))
    })?;

    if formatter.format() == OutputFormat::Table {
        eprintln!("{}", formatter.format_job(&job)?);
    }

    match args.output {
        Some(path) => {
            fs::write(&path, serde_json::to_string_pretty(&result)?)?;
            println!(
                "{}",
                formatter.success(&format!("Result written to {}", path.display()))
            );
        }
        None => println!("{}", formatter.format_value(&result)?),
    }
    Ok(())
}
