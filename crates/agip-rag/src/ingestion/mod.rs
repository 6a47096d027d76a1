//! Offline ingestion: PDF loading, page splitting and index building

pub mod chunker;
pub mod parser;
pub mod pipeline;

pub use chunker::RecursiveTextSplitter;
pub use parser::{DocumentLoader, PdfLoader};
pub use pipeline::{IngestionPipeline, IngestionReport};
