//! The per-document artifact written by the processor.

use crate::extract::{count_statistics, strip_html, TextStatistics};
use crate::utils::timestamps::{self, Timestamp};
use crate::utils::now_utc;
use serde::{Deserialize, Serialize};

/// Cleaned text, references and statistics for one raw document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Raw document name as listed by the fetch stage.
    pub source_file: String,
    /// Markup-free text.
    pub text: String,
    /// Statistics over `text`.
    pub statistics: TextStatistics,
    /// `href` values in document order.
    pub links: Vec<String>,
    /// `src` values in document order.
    pub images: Vec<String>,
    /// When the document was processed.
    #[serde(with = "timestamps::iso8601")]
    pub processed_at: Timestamp,
}

impl ProcessedDocument {
    /// Extracts text and references from `html` and computes statistics.
    #[must_use]
    pub fn from_html(source_file: impl Into<String>, html: &str) -> Self {
        let (text, links, images) = strip_html(html).into_parts();
        let statistics = count_statistics(&text);
        Self {
            source_file: source_file.into(),
            text,
            statistics,
            links,
            images,
            processed_at: now_utc(),
        }
    }
}
