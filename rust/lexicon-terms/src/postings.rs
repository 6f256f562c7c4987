//! Posting list iterators handed out by a positioned cursor.
//!
//! A cursor positioned on a term hands out a [`DocsIterator`] over the ids of
//! the documents containing that term and, when the field was indexed with
//! positions, a [`PositionsIterator`] that additionally walks the occurrences
//! inside each document. Both skip documents whose bit is unset in the caller's
//! [`LiveDocs`].

use std::sync::Arc;

use bitflags::bitflags;
use lexicon_common::{Result, error::Error};
use roaring::RoaringBitmap;

/// Segment-local document identifier.
pub type DocId = u32;

bitflags! {
    /// Optional per-document values requested from a documents iterator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DocsFlags: u8 {
        /// Per-document term frequencies.
        const FREQS = 0b0000_0001;
    }
}

bitflags! {
    /// Optional per-position values requested from a positions iterator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PositionsFlags: u8 {
        /// Start and end character offsets of each occurrence.
        const OFFSETS = 0b0000_0001;
        /// Per-occurrence payload bytes.
        const PAYLOADS = 0b0000_0010;
    }
}

/// Live documents filter: documents with an unset bit are excluded.
pub trait LiveDocs: Send + Sync {
    fn is_live(&self, doc: DocId) -> bool;
}

impl LiveDocs for RoaringBitmap {
    fn is_live(&self, doc: DocId) -> bool {
        self.contains(doc)
    }
}

impl<T: LiveDocs + ?Sized> LiveDocs for Arc<T> {
    fn is_live(&self, doc: DocId) -> bool {
        (**self).is_live(doc)
    }
}

/// Shared handle to a live documents filter, cheap to keep inside an iterator.
pub type SharedLiveDocs = Arc<dyn LiveDocs>;

/// Iterator over the documents of one term's posting list, in increasing id order.
pub trait DocsIterator {
    /// The current document, or `None` before the first `next_doc` call and
    /// after the iterator is exhausted.
    fn doc_id(&self) -> Option<DocId>;

    /// Moves to the next live document.
    fn next_doc(&mut self) -> Option<DocId>;

    /// Moves to the first live document whose id is `>= target`.
    ///
    /// Calling this with a target not beyond the current document still moves
    /// at least one document forward.
    fn advance_to(&mut self, target: DocId) -> Option<DocId> {
        loop {
            let doc = self.next_doc()?;
            if doc >= target {
                return Some(doc);
            }
        }
    }

    /// Occurrences of the term in the current document. Reports 1 when
    /// frequencies were not indexed or not requested.
    fn freq(&self) -> Result<u32>;

    /// Upper bound on the number of documents this iterator can return.
    fn cost(&self) -> u64;
}

/// Documents iterator that also walks the occurrences inside each document.
pub trait PositionsIterator: DocsIterator {
    /// Next position inside the current document, `None` after the last one.
    /// At most `freq()` positions are returned per document.
    fn next_position(&mut self) -> Result<Option<u32>>;

    /// Start offset of the current occurrence, if offsets were indexed and requested.
    fn start_offset(&self) -> Option<u32>;

    /// End offset of the current occurrence, if offsets were indexed and requested.
    fn end_offset(&self) -> Option<u32>;

    /// Payload of the current occurrence, if payloads were indexed and requested.
    fn payload(&self) -> Option<&[u8]>;
}

/// A posting list with no documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPostings;

impl DocsIterator for EmptyPostings {
    fn doc_id(&self) -> Option<DocId> {
        None
    }

    fn next_doc(&mut self) -> Option<DocId> {
        None
    }

    fn advance_to(&mut self, _target: DocId) -> Option<DocId> {
        None
    }

    fn freq(&self) -> Result<u32> {
        Err(Error::invalid_operation("freq on an empty posting list"))
    }

    fn cost(&self) -> u64 {
        0
    }
}

impl PositionsIterator for EmptyPostings {
    fn next_position(&mut self) -> Result<Option<u32>> {
        Err(Error::invalid_operation(
            "next_position on an empty posting list",
        ))
    }

    fn start_offset(&self) -> Option<u32> {
        None
    }

    fn end_offset(&self) -> Option<u32> {
        None
    }

    fn payload(&self) -> Option<&[u8]> {
        None
    }
}
