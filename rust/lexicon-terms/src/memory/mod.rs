//! In-memory term dictionary.
//!
//! [`MemoryTermsBuilder`] collects the tokens of one field of one segment and
//! [`MemoryTermsBuilder::finish`] sorts them into an immutable [`MemoryTerms`].
//! The dictionary is shared behind an `Arc`: every [`MemoryTermsCursor`] and
//! posting iterator keeps a handle to it, so cursors can be opened and used
//! concurrently from different threads.
//!
//! The cursor supports every optional part of the protocol: ordinals, total
//! term frequencies (when frequencies are indexed) and a state replay that
//! jumps straight to the captured ordinal.

use std::{ops::Range, sync::Arc};

use lexicon_common::Result;
use serde::{Deserialize, Serialize};

use crate::{collation::Collation, state::StateScope, terms::Terms};

mod builder;
mod cursor;
mod postings;

pub use builder::{MemoryTermsBuilder, Token};
pub use cursor::MemoryTermsCursor;
pub use postings::{MemoryDocs, MemoryPositions};

/// What is recorded for each term occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexOptions {
    /// Document ids only.
    Docs,
    /// Document ids and per-document frequencies.
    DocsAndFreqs,
    /// Document ids, frequencies and positions (and payloads, when supplied).
    DocsFreqsPositions,
    /// Document ids, frequencies, positions and character offsets.
    DocsFreqsPositionsOffsets,
}

impl IndexOptions {
    pub fn has_freqs(self) -> bool {
        self >= IndexOptions::DocsAndFreqs
    }

    pub fn has_positions(self) -> bool {
        self >= IndexOptions::DocsFreqsPositions
    }

    pub fn has_offsets(self) -> bool {
        self >= IndexOptions::DocsFreqsPositionsOffsets
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions::DocsFreqsPositionsOffsets
    }
}

/// Settings of an in-memory term dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MemoryTermsConfig {
    /// Name of the collation ordering the terms, see [`crate::create_collation`].
    pub collation: String,
    pub index_options: IndexOptions,
    /// Segment identifier stamped into captured term states.
    pub segment: u64,
}

impl Default for MemoryTermsConfig {
    fn default() -> Self {
        MemoryTermsConfig {
            collation: "binary".to_string(),
            index_options: IndexOptions::default(),
            segment: 0,
        }
    }
}

/// Statistics of one term.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TermStats {
    pub doc_freq: u32,
    pub total_term_freq: u64,
}

/// One document of a posting list.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocEntry {
    pub doc: u32,
    pub freq: u32,
    /// Index of the document's first occurrence in `TermsData::occurrences`.
    /// The document owns `freq` occurrences when positions are indexed.
    pub first_occurrence: usize,
}

/// One term occurrence inside a document.
#[derive(Debug, Clone)]
pub(crate) struct OccurrenceEntry {
    pub position: u32,
    pub offsets: Option<(u32, u32)>,
    /// Range into `TermsData::payload_bytes`.
    pub payload: Option<Range<usize>>,
}

/// Immutable, sorted contents of a dictionary.
pub(crate) struct TermsData {
    pub field: String,
    pub scope: StateScope,
    pub collation: Box<dyn Collation>,
    pub index_options: IndexOptions,
    pub has_payloads: bool,
    /// Concatenated term bytes in collation order.
    pub term_bytes: Vec<u8>,
    /// `term_offsets[ord]..term_offsets[ord + 1]` is the range of term `ord`.
    pub term_offsets: Vec<usize>,
    pub stats: Vec<TermStats>,
    /// `doc_starts[ord]..doc_starts[ord + 1]` is the posting list of term `ord` in `docs`.
    pub doc_starts: Vec<usize>,
    pub docs: Vec<DocEntry>,
    pub occurrences: Vec<OccurrenceEntry>,
    pub payload_bytes: Vec<u8>,
    pub doc_count: u32,
}

impl TermsData {
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn term(&self, ord: usize) -> &[u8] {
        &self.term_bytes[self.term_offsets[ord]..self.term_offsets[ord + 1]]
    }

    pub fn postings(&self, ord: usize) -> Range<usize> {
        self.doc_starts[ord]..self.doc_starts[ord + 1]
    }

    pub fn total_term_freq(&self, ord: usize) -> Option<u64> {
        self.index_options
            .has_freqs()
            .then(|| self.stats[ord].total_term_freq)
    }

    /// Index of the first term not less than `target`.
    pub fn find_leftmost_ge(&self, target: &[u8]) -> usize {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.collation.compare(self.term(mid), target).is_lt() {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Ordinal of the term equal to `target`, if any.
    pub fn find_equal(&self, target: &[u8]) -> Option<usize> {
        let ord = self.find_leftmost_ge(target);
        (ord < self.len() && self.collation.compare(self.term(ord), target).is_eq()).then_some(ord)
    }
}

/// The terms of one field of one segment, held in memory.
#[derive(Clone)]
pub struct MemoryTerms {
    data: Arc<TermsData>,
}

impl MemoryTerms {
    pub(crate) fn new(data: TermsData) -> MemoryTerms {
        MemoryTerms {
            data: Arc::new(data),
        }
    }

    pub fn field(&self) -> &str {
        &self.data.field
    }

    pub fn scope(&self) -> StateScope {
        self.data.scope
    }

    pub fn index_options(&self) -> IndexOptions {
        self.data.index_options
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
}

impl std::fmt::Debug for MemoryTerms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTerms")
            .field("field", &self.data.field)
            .field("collation", &self.data.collation.name())
            .field("terms", &self.data.len())
            .field("doc_count", &self.data.doc_count)
            .finish()
    }
}

impl Terms for MemoryTerms {
    type Cursor = MemoryTermsCursor;

    fn cursor(&self) -> Result<MemoryTermsCursor> {
        Ok(MemoryTermsCursor::new(Arc::clone(&self.data)))
    }

    fn collation(&self) -> &dyn Collation {
        self.data.collation.as_ref()
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn doc_count(&self) -> u32 {
        self.data.doc_count
    }

    fn sum_doc_freq(&self) -> u64 {
        self.data.stats.iter().map(|s| s.doc_freq as u64).sum()
    }

    fn sum_total_term_freq(&self) -> Option<u64> {
        self.data
            .index_options
            .has_freqs()
            .then(|| self.data.stats.iter().map(|s| s.total_term_freq).sum())
    }

    fn has_freqs(&self) -> bool {
        self.data.index_options.has_freqs()
    }

    fn has_positions(&self) -> bool {
        self.data.index_options.has_positions()
    }

    fn has_offsets(&self) -> bool {
        self.data.index_options.has_offsets()
    }

    fn has_payloads(&self) -> bool {
        self.data.has_payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_options_capabilities() {
        assert!(!IndexOptions::Docs.has_freqs());
        assert!(IndexOptions::DocsAndFreqs.has_freqs());
        assert!(!IndexOptions::DocsAndFreqs.has_positions());
        assert!(IndexOptions::DocsFreqsPositions.has_positions());
        assert!(!IndexOptions::DocsFreqsPositions.has_offsets());
        assert!(IndexOptions::DocsFreqsPositionsOffsets.has_offsets());
    }

    #[test]
    fn test_config_from_json() {
        let config: MemoryTermsConfig = serde_json::from_str(
            r#"{ "collation": "unicode-case-insensitive", "index-options": "docs-and-freqs" }"#,
        )
        .unwrap();
        assert_eq!(config.collation, "unicode-case-insensitive");
        assert_eq!(config.index_options, IndexOptions::DocsAndFreqs);
        assert_eq!(config.segment, 0);

        let config: MemoryTermsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MemoryTermsConfig::default());
    }
}
