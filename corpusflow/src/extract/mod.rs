//! The text extractor: raw HTML in, plain text, references and statistics out.

mod html;
mod stats;

pub use html::{strip_html, ExtractedHtml};
pub use stats::{count_paragraphs, count_sentences, count_statistics, TextStatistics};
