//! In-memory [`JobStore`]

use docsift_domain::{
    Document, DocumentId, ExtractionSchema, Job, JobId, JobStore, SchemaId, SchemaSuggestion,
    SuggestionId,
};
use std::collections::HashMap;
use std::convert::Infallible;

/// Keeps every record in a `HashMap`; nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: HashMap<DocumentId, Document>,
    schemas: HashMap<SchemaId, ExtractionSchema>,
    jobs: HashMap<JobId, Job>,
    suggestions: HashMap<SuggestionId, SchemaSuggestion>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert_document(&mut self, document: Document) -> DocumentId {
        let id = document.id;
        self.documents.insert(id, document);
        id
    }

    /// Add or replace a schema
    pub fn insert_schema(&mut self, schema: ExtractionSchema) -> SchemaId {
        let id = schema.id;
        self.schemas.insert(id, schema);
        id
    }
}

impl JobStore for MemoryStore {
    type Error = Infallible;

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        Ok(self.documents.get(&id).cloned())
    }

    fn get_schema(&self, id: SchemaId) -> Result<Option<ExtractionSchema>, Self::Error> {
        Ok(self.schemas.get(&id).cloned())
    }

    fn get_job(&self, id: JobId) -> Result<Option<Job>, Self::Error> {
        Ok(self.jobs.get(&id).cloned())
    }

    fn save_job(&mut self, job: &Job) -> Result<(), Self::Error> {
        self.jobs.insert(job.id, job.clone());
        Ok(())
    }

    fn get_suggestion(&self, id: SuggestionId) -> Result<Option<SchemaSuggestion>, Self::Error> {
        Ok(self.suggestions.get(&id).cloned())
    }

    fn save_suggestion(&mut self, suggestion: &SchemaSuggestion) -> Result<(), Self::Error> {
        self.suggestions.insert(suggestion.id, suggestion.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::{FieldNode, FieldType, JobStatus, SchemaDefinition};

    #[test]
    fn test_round_trip_records() {
        let mut store = MemoryStore::new();
        let doc_id = store.insert_document(Document::new("memo", "hello"));
        let schema_id = store.insert_schema(ExtractionSchema::new(
            "Memo",
            SchemaDefinition::new(vec![FieldNode::scalar("subject", FieldType::String)]),
            "llama3.1",
        ));

        assert_eq!(store.get_document(doc_id).unwrap().unwrap().text, "hello");
        assert_eq!(store.get_schema(schema_id).unwrap().unwrap().name, "Memo");
        assert!(store.get_document(DocumentId::new()).unwrap().is_none());
    }

    #[test]
    fn test_save_job_overwrites() {
        let mut store = MemoryStore::new();
        let mut job = Job::new(DocumentId::new(), SchemaId::new());
        store.save_job(&job).unwrap();

        job.begin_attempt().unwrap();
        store.save_job(&job).unwrap();

        let saved = store.get_job(job.id).unwrap().unwrap();
        assert_eq!(saved.status, JobStatus::Processing);
    }
}
