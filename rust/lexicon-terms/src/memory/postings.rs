use std::{ops::Range, sync::Arc};

use lexicon_common::{Result, error::Error};

use super::TermsData;
use crate::postings::{
    DocId, DocsFlags, DocsIterator, PositionsFlags, PositionsIterator, SharedLiveDocs,
};

/// Documents iterator over one term of a [`MemoryTerms`](super::MemoryTerms).
pub struct MemoryDocs {
    data: Arc<TermsData>,
    live_docs: Option<SharedLiveDocs>,
    /// Range of the term's posting list in `TermsData::docs`.
    range: Range<usize>,
    /// Index in `TermsData::docs` of the next entry to examine.
    next: usize,
    current: Option<usize>,
    freqs: bool,
}

impl MemoryDocs {
    pub(crate) fn new(
        data: Arc<TermsData>,
        ord: usize,
        live_docs: Option<SharedLiveDocs>,
        flags: DocsFlags,
    ) -> MemoryDocs {
        let range = data.postings(ord);
        let freqs = flags.contains(DocsFlags::FREQS) && data.index_options.has_freqs();
        MemoryDocs {
            next: range.start,
            data,
            live_docs,
            range,
            current: None,
            freqs,
        }
    }

    /// Reuses `reuse` when it iterates over the same dictionary, otherwise
    /// builds a new iterator.
    pub(crate) fn reuse_or_new(
        reuse: Option<MemoryDocs>,
        data: &Arc<TermsData>,
        ord: usize,
        live_docs: Option<SharedLiveDocs>,
        flags: DocsFlags,
    ) -> MemoryDocs {
        match reuse {
            Some(mut docs) if Arc::ptr_eq(&docs.data, data) => {
                log::trace!("reusing documents iterator for term ordinal {ord}");
                docs.range = data.postings(ord);
                docs.next = docs.range.start;
                docs.current = None;
                docs.live_docs = live_docs;
                docs.freqs = flags.contains(DocsFlags::FREQS) && data.index_options.has_freqs();
                docs
            }
            _ => MemoryDocs::new(Arc::clone(data), ord, live_docs, flags),
        }
    }

    fn is_live(&self, doc: DocId) -> bool {
        self.live_docs.as_ref().is_none_or(|live| live.is_live(doc))
    }

    fn current_entry(&self) -> Option<&super::DocEntry> {
        self.current.map(|idx| &self.data.docs[idx])
    }
}

impl DocsIterator for MemoryDocs {
    fn doc_id(&self) -> Option<DocId> {
        self.current_entry().map(|entry| entry.doc)
    }

    fn next_doc(&mut self) -> Option<DocId> {
        while self.next < self.range.end {
            let idx = self.next;
            self.next += 1;
            let doc = self.data.docs[idx].doc;
            if self.is_live(doc) {
                self.current = Some(idx);
                return Some(doc);
            }
        }
        self.current = None;
        None
    }

    fn advance_to(&mut self, target: DocId) -> Option<DocId> {
        // Posting lists are sorted by doc id: skip straight past smaller ids.
        let remaining = &self.data.docs[self.next..self.range.end];
        self.next += remaining.partition_point(|entry| entry.doc < target);
        self.next_doc()
    }

    fn freq(&self) -> Result<u32> {
        let entry = self
            .current_entry()
            .ok_or_else(|| Error::invalid_operation("freq without a current document"))?;
        Ok(if self.freqs { entry.freq } else { 1 })
    }

    fn cost(&self) -> u64 {
        self.range.len() as u64
    }
}

/// Documents-and-positions iterator over one term of a [`MemoryTerms`](super::MemoryTerms).
pub struct MemoryPositions {
    docs: MemoryDocs,
    offsets: bool,
    payloads: bool,
    /// Occurrences of the current document not yet returned.
    pending: Range<usize>,
    current: Option<usize>,
}

impl MemoryPositions {
    pub(crate) fn reuse_or_new(
        reuse: Option<MemoryPositions>,
        data: &Arc<TermsData>,
        ord: usize,
        live_docs: Option<SharedLiveDocs>,
        flags: PositionsFlags,
    ) -> MemoryPositions {
        let docs =
            MemoryDocs::reuse_or_new(reuse.map(|p| p.docs), data, ord, live_docs, DocsFlags::FREQS);
        MemoryPositions {
            offsets: flags.contains(PositionsFlags::OFFSETS) && data.index_options.has_offsets(),
            payloads: flags.contains(PositionsFlags::PAYLOADS) && data.has_payloads,
            docs,
            pending: 0..0,
            current: None,
        }
    }

    fn load_occurrences(&mut self) {
        self.current = None;
        self.pending = match self.docs.current_entry() {
            Some(entry) => entry.first_occurrence..entry.first_occurrence + entry.freq as usize,
            None => 0..0,
        };
    }

    fn current_occurrence(&self) -> Option<&super::OccurrenceEntry> {
        self.current.map(|idx| &self.docs.data.occurrences[idx])
    }
}

impl DocsIterator for MemoryPositions {
    fn doc_id(&self) -> Option<DocId> {
        self.docs.doc_id()
    }

    fn next_doc(&mut self) -> Option<DocId> {
        let doc = self.docs.next_doc();
        self.load_occurrences();
        doc
    }

    fn advance_to(&mut self, target: DocId) -> Option<DocId> {
        let doc = self.docs.advance_to(target);
        self.load_occurrences();
        doc
    }

    fn freq(&self) -> Result<u32> {
        self.docs.freq()
    }

    fn cost(&self) -> u64 {
        self.docs.cost()
    }
}

impl PositionsIterator for MemoryPositions {
    fn next_position(&mut self) -> Result<Option<u32>> {
        if self.docs.current.is_none() {
            return Err(Error::invalid_operation(
                "next_position without a current document",
            ));
        }
        Ok(self.pending.next().map(|idx| {
            self.current = Some(idx);
            self.docs.data.occurrences[idx].position
        }))
    }

    fn start_offset(&self) -> Option<u32> {
        if !self.offsets {
            return None;
        }
        self.current_occurrence()?.offsets.map(|(start, _)| start)
    }

    fn end_offset(&self) -> Option<u32> {
        if !self.offsets {
            return None;
        }
        self.current_occurrence()?.offsets.map(|(_, end)| end)
    }

    fn payload(&self) -> Option<&[u8]> {
        if !self.payloads {
            return None;
        }
        let range = self.current_occurrence()?.payload.clone()?;
        Some(&self.docs.data.payload_bytes[range])
    }
}

impl std::fmt::Debug for MemoryDocs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocs")
            .field("range", &self.range)
            .field("next", &self.next)
            .field("current", &self.current)
            .field("freqs", &self.freqs)
            .finish()
    }
}

impl std::fmt::Debug for MemoryPositions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPositions")
            .field("docs", &self.docs)
            .field("offsets", &self.offsets)
            .field("payloads", &self.payloads)
            .field("pending", &self.pending)
            .field("current", &self.current)
            .finish()
    }
}
