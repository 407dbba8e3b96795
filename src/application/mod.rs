pub mod use_cases;

pub use use_cases::ingestion::IngestionService;
pub use use_cases::summarizer::summarize;
