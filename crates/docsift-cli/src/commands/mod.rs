//! Command implementations.

pub mod chunks;
pub mod extract;
pub mod presets;
pub mod shape;
pub mod suggest;

pub use self::chunks::execute_chunks;
pub use self::extract::execute_extract;
pub use self::presets::execute_presets;
pub use self::shape::execute_shape;
pub use self::suggest::execute_suggest;

use crate::config::Config;
use crate::error::Result;
use docsift_domain::Document;
use docsift_extractor::Extractor;
use docsift_llm::Provider;
use std::fs;
use std::path::Path;

/// Read a text document, titled after its file name.
pub(crate) fn read_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)?;
    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(title, text))
}

/// Build an extractor over the configured provider.
pub(crate) fn build_extractor(config: &Config) -> Result<Extractor<Provider>> {
    let provider = Provider::from_config(&config.llm)?;
    Ok(Extractor::new(provider, config.extractor.clone())?)
}
