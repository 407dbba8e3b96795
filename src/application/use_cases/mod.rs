pub mod ingestion;
pub mod summarizer;
