//! The document processor: raw HTML in, one processed JSON document per
//! input and a process completion record out.

mod document;
mod processor;

pub use document::ProcessedDocument;
pub use processor::DocumentProcessor;
