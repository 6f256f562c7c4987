//! Term dictionary contract: the entry point handing out cursors.

use std::ops::Bound;

use lexicon_common::Result;

use crate::{
    collation::Collation,
    cursor::TermsCursor,
    filtered::{FilteredTermsCursor, PrefixFilter, RangeFilter},
};

/// The terms of one field of one segment.
///
/// A dictionary is immutable once built. Any number of cursors may be opened
/// over it, from any number of threads; each cursor is owned by one reader.
pub trait Terms {
    type Cursor: TermsCursor;

    /// Opens a new, unpositioned cursor.
    fn cursor(&self) -> Result<Self::Cursor>;

    /// The order of the terms.
    fn collation(&self) -> &dyn Collation;

    /// Number of distinct terms, if known.
    fn size(&self) -> Option<u64>;

    /// Number of documents with at least one term in this field.
    fn doc_count(&self) -> u32;

    /// Sum of the document frequencies of all terms.
    fn sum_doc_freq(&self) -> u64;

    /// Sum of the total term frequencies of all terms, or `None` when
    /// frequencies are not tracked.
    fn sum_total_term_freq(&self) -> Option<u64>;

    fn has_freqs(&self) -> bool;

    fn has_positions(&self) -> bool;

    fn has_offsets(&self) -> bool;

    fn has_payloads(&self) -> bool;

    /// Opens a cursor limited to the terms starting with `prefix`.
    fn prefix_cursor(&self, prefix: &[u8]) -> Result<FilteredTermsCursor<Self::Cursor, PrefixFilter>> {
        Ok(FilteredTermsCursor::new(
            self.cursor()?,
            PrefixFilter::new(prefix),
        ))
    }

    /// Opens a cursor limited to the terms between `lower` and `upper`.
    fn range_cursor(
        &self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
    ) -> Result<FilteredTermsCursor<Self::Cursor, RangeFilter>> {
        Ok(FilteredTermsCursor::new(
            self.cursor()?,
            RangeFilter::new(lower, upper),
        ))
    }
}
