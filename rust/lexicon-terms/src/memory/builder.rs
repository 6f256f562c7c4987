use std::{cmp::Ordering, ops::Range};

use ahash::AHashMap;
use lexicon_common::{Result, error::Error, verify_data};
use roaring::RoaringBitmap;

use super::{
    DocEntry, IndexOptions, MemoryTerms, MemoryTermsConfig, OccurrenceEntry, TermStats, TermsData,
};
use crate::{
    collation::{Collation, create_collation},
    postings::DocId,
    state::StateScope,
};

/// One occurrence of a term in a document.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub term: &'a [u8],
    pub position: u32,
    pub offsets: Option<(u32, u32)>,
    pub payload: Option<&'a [u8]>,
}

impl<'a> Token<'a> {
    pub fn new(term: &'a [u8], position: u32) -> Token<'a> {
        Token {
            term,
            position,
            offsets: None,
            payload: None,
        }
    }

    pub fn with_offsets(mut self, start: u32, end: u32) -> Token<'a> {
        self.offsets = Some((start, end));
        self
    }

    pub fn with_payload(mut self, payload: &'a [u8]) -> Token<'a> {
        self.payload = Some(payload);
        self
    }
}

#[derive(Debug)]
struct PendingOccurrence {
    position: u32,
    offsets: Option<(u32, u32)>,
    payload: Option<Range<usize>>,
}

#[derive(Debug)]
struct PendingDoc {
    doc: DocId,
    occurrences: Vec<PendingOccurrence>,
}

/// Accumulates the tokens of one field and sorts them into a [`MemoryTerms`].
///
/// Terms are interned in first-seen order: each distinct term gets the next
/// dense id, and its postings are accumulated under that id. Documents must be
/// added in non-decreasing id order; within a document, positions must not go
/// backwards.
///
/// On [`finish`](MemoryTermsBuilder::finish) the ids are ordered by the
/// configured collation. Terms that the collation considers equal (for example
/// `"Apple"` and `"apple"` under a case-insensitive collation) are merged into
/// the first one added.
pub struct MemoryTermsBuilder {
    field: String,
    config: MemoryTermsConfig,
    collation: Box<dyn Collation>,
    /// Term-to-id mapping.
    ids: AHashMap<Box<[u8]>, u32>,
    /// Concatenated term bytes in id order.
    term_bytes: Vec<u8>,
    /// `term_offsets[id]..term_offsets[id + 1]` is the range of term `id`.
    term_offsets: Vec<usize>,
    postings: Vec<Vec<PendingDoc>>,
    payload_bytes: Vec<u8>,
}

impl MemoryTermsBuilder {
    /// Creates a builder for `field`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured collation is not recognized.
    pub fn new(field: impl Into<String>, config: MemoryTermsConfig) -> Result<Self> {
        let collation = create_collation(&config.collation)?;
        Ok(MemoryTermsBuilder {
            field: field.into(),
            config,
            collation,
            ids: AHashMap::default(),
            term_bytes: Vec::new(),
            term_offsets: vec![0],
            postings: Vec::new(),
            payload_bytes: Vec::new(),
        })
    }

    /// Number of distinct terms added so far.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Total number of bytes used to store all distinct terms.
    pub fn buf_size(&self) -> usize {
        self.term_bytes.len()
    }

    /// Maps a term to its id, assigning the next id if the term is new.
    fn map_term(&mut self, term: &[u8]) -> u32 {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.postings.len() as u32;
        self.ids.insert(term.into(), id);
        self.term_bytes.extend_from_slice(term);
        self.term_offsets.push(self.term_bytes.len());
        self.postings.push(Vec::new());
        id
    }

    fn term_by_id(&self, id: usize) -> &[u8] {
        &self.term_bytes[self.term_offsets[id]..self.term_offsets[id + 1]]
    }

    /// Records one token of document `doc`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidFormat` error if `doc` is lower than a document
    /// already added for the same term, or if the position goes backwards
    /// within the document.
    pub fn add_token(&mut self, doc: DocId, token: Token<'_>) -> Result<()> {
        let id = self.map_term(token.term) as usize;
        let payload = match token.payload {
            Some(payload) if !payload.is_empty() => {
                let start = self.payload_bytes.len();
                self.payload_bytes.extend_from_slice(payload);
                Some(start..self.payload_bytes.len())
            }
            _ => None,
        };
        let occurrence = PendingOccurrence {
            position: token.position,
            offsets: token.offsets,
            payload,
        };

        let docs = &mut self.postings[id];
        if let Some(last) = docs.last_mut().filter(|last| last.doc == doc) {
            let previous = last.occurrences.last().map_or(0, |o| o.position);
            verify_data!(position, token.position >= previous);
            last.occurrences.push(occurrence);
            return Ok(());
        }
        verify_data!(doc, docs.last().is_none_or(|last| last.doc < doc));
        docs.push(PendingDoc {
            doc,
            occurrences: vec![occurrence],
        });
        Ok(())
    }

    /// Records the terms of a document, one token per term, positions
    /// numbered from zero.
    pub fn add_terms<'a, I>(&mut self, doc: DocId, terms: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        for (position, term) in terms.into_iter().enumerate() {
            self.add_token(doc, Token::new(term, position as u32))?;
        }
        Ok(())
    }

    /// Term ids sorted by `compare`, ties kept in id order.
    fn sorted_order<F>(&self, mut compare: F) -> Vec<usize>
    where
        F: FnMut(&[u8], &[u8]) -> Ordering,
    {
        let mut indices: Vec<usize> = (0..self.postings.len()).collect();
        indices.sort_by(|&a, &b| compare(self.term_by_id(a), self.term_by_id(b)));
        indices
    }

    /// Sorts the collected terms and freezes them into a dictionary.
    pub fn finish(mut self) -> Result<MemoryTerms> {
        let order = self.sorted_order(|a, b| self.collation.compare(a, b));
        let index_options = self.config.index_options;
        let mut postings = std::mem::take(&mut self.postings);

        let mut data = TermsData {
            scope: StateScope::new(self.config.segment, &self.field),
            field: self.field.clone(),
            collation: self.collation.clone_boxed(),
            index_options,
            has_payloads: false,
            term_bytes: Vec::with_capacity(self.term_bytes.len()),
            term_offsets: vec![0],
            stats: Vec::with_capacity(order.len()),
            doc_starts: vec![0],
            docs: Vec::new(),
            occurrences: Vec::new(),
            payload_bytes: std::mem::take(&mut self.payload_bytes),
            doc_count: 0,
        };
        let mut all_docs = RoaringBitmap::new();

        let mut i = 0;
        while i < order.len() {
            let representative = order[i];
            let mut merged = std::mem::take(&mut postings[representative]);
            let mut j = i + 1;
            while j < order.len()
                && self
                    .collation
                    .compare(self.term_by_id(representative), self.term_by_id(order[j]))
                    .is_eq()
            {
                merged = merge_postings(merged, std::mem::take(&mut postings[order[j]]));
                j += 1;
            }

            data.term_bytes
                .extend_from_slice(self.term_by_id(representative));
            data.term_offsets.push(data.term_bytes.len());

            let mut stats = TermStats::default();
            for pending in merged {
                all_docs.insert(pending.doc);
                let freq = pending.occurrences.len() as u32;
                stats.doc_freq += 1;
                stats.total_term_freq += freq as u64;
                data.docs.push(DocEntry {
                    doc: pending.doc,
                    freq,
                    first_occurrence: data.occurrences.len(),
                });
                if index_options.has_positions() {
                    for occurrence in pending.occurrences {
                        data.has_payloads |= occurrence.payload.is_some();
                        data.occurrences.push(OccurrenceEntry {
                            position: occurrence.position,
                            offsets: occurrence.offsets.filter(|_| index_options.has_offsets()),
                            payload: occurrence.payload,
                        });
                    }
                }
            }
            data.stats.push(stats);
            data.doc_starts.push(data.docs.len());
            i = j;
        }

        if !data.has_payloads {
            data.payload_bytes = Vec::new();
        }
        data.doc_count = u32::try_from(all_docs.len())
            .map_err(|_| Error::invalid_arg("docs", "more than u32::MAX documents"))?;

        log::debug!(
            "built in-memory terms for field '{}': {} terms, {} docs, {} postings, collation {}",
            data.field,
            data.len(),
            data.doc_count,
            data.docs.len(),
            data.collation.name()
        );
        Ok(MemoryTerms::new(data))
    }
}

/// Merges two doc-ordered posting lists; occurrences of a shared document are
/// combined in position order.
fn merge_postings(left: Vec<PendingDoc>, right: Vec<PendingDoc>) -> Vec<PendingDoc> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(l), Some(r)) if l.doc == r.doc => {
                let (Some(mut l), Some(r)) = (left.next(), right.next()) else {
                    unreachable!("both sides were peeked");
                };
                l.occurrences.extend(r.occurrences);
                l.occurrences.sort_by_key(|o| o.position);
                merged.push(l);
                continue;
            }
            (Some(l), Some(r)) => l.doc < r.doc,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    merged
}

impl std::fmt::Debug for MemoryTermsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTermsBuilder")
            .field("field", &self.field)
            .field("collation", &self.collation.name())
            .field("index_options", &self.config.index_options)
            .field("terms", &self.len())
            .finish()
    }
}
