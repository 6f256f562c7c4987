//! The term cursor protocol.
//!
//! A [`TermsCursor`] walks the ordered set of distinct terms of one field of
//! one segment. It starts unpositioned, moves with [`TermsCursor::advance`] or
//! one of the seeks, and while positioned exposes the current term, its
//! statistics and its posting lists.
//!
//! # Positioning
//!
//! ```text
//!                 advance / seek (hit)
//!  Unpositioned ───────────────────────────▶ Positioned(term)
//!       ▲                                      │      ▲
//!       │ seek_exact (miss)                    │      │ advance / seek (hit)
//!       └──────────────────────────────────────┤      │
//!                                              ▼      │
//!                                          Exhausted ─┘ (seek only)
//! ```
//!
//! Every term reached by `advance` compares strictly greater than the previous
//! one under the cursor's [`Collation`].
//!
//! The provided trait methods are thin wrappers over the free functions in this
//! module ([`seek_exact_by_ceil`], [`seek_exact_state_by_term`],
//! [`generic_term_state`]), so a backend that overrides one of them can still
//! reuse the default behavior for the others.

use lexicon_common::{Result, error::Error, try_or_ret_some_err};

use crate::{
    attributes::Attributes,
    collation::Collation,
    postings::{DocsFlags, DocsIterator, PositionsFlags, PositionsIterator, SharedLiveDocs},
    state::{StateScope, TermState},
};

/// Outcome of [`TermsCursor::seek_ceil`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekStatus {
    /// No term at or after the target exists. The cursor is exhausted.
    End,
    /// The target term exists and the cursor is positioned on it.
    Found,
    /// The target does not exist. The cursor is positioned on the smallest
    /// term greater than the target.
    NotFound,
}

/// Cursor over the ordered terms of one field of one segment.
///
/// A cursor is a single mutable traversal state: positioning takes `&mut self`
/// and the term returned by [`term`](TermsCursor::term) borrows the cursor, so
/// it cannot outlive the next positioning call. Open one cursor per reader.
pub trait TermsCursor {
    /// Documents iterator type handed out for the current term.
    type Docs: DocsIterator;
    /// Documents-and-positions iterator type handed out for the current term.
    type Positions: PositionsIterator;

    /// The order in which this cursor enumerates terms.
    fn collation(&self) -> &dyn Collation;

    /// Side-channel attributes, created lazily on first access.
    fn attributes(&self) -> &Attributes;

    /// Identity of the dictionary this cursor walks, stamped into captured states.
    fn scope(&self) -> StateScope;

    /// Moves to the next term and returns it, or returns `None` once the terms
    /// are exhausted. From the unpositioned state this moves to the first term;
    /// once exhausted it keeps returning `None` until a seek succeeds.
    fn advance(&mut self) -> Result<Option<&[u8]>>;

    /// Moves to `target` if it exists, else to the smallest term greater than
    /// `target`. The target may lie before or after the current term.
    fn seek_ceil(&mut self, target: &[u8]) -> Result<SeekStatus>;

    /// Moves to `target` only if it exists. Returns `false` and leaves the
    /// cursor unpositioned otherwise.
    fn seek_exact(&mut self, target: &[u8]) -> Result<bool> {
        seek_exact_by_ceil(self, target)
    }

    /// Moves to the term with the given dense ordinal. The ordinal must lie in
    /// `[0, size)`. Backends without ordinals fail with `Unsupported`.
    fn seek_exact_ord(&mut self, ord: u64) -> Result<()>;

    /// Repositions on `term` using a state previously captured by
    /// [`term_state`](TermsCursor::term_state) from a cursor over the same field.
    /// Fails with `TermNotFound` if the term does not exist.
    fn seek_exact_state(&mut self, term: &[u8], state: &TermState) -> Result<()> {
        seek_exact_state_by_term(self, term, state)
    }

    /// Returns the cursor to the unpositioned state.
    fn reset(&mut self);

    /// Whether the cursor is positioned on a term.
    fn is_positioned(&self) -> bool;

    /// The current term.
    fn term(&self) -> Result<&[u8]>;

    /// Ordinal of the current term. Optional: may fail with `Unsupported`.
    fn ord(&self) -> Result<u64>;

    /// Number of documents containing the current term, deleted documents included.
    fn doc_freq(&self) -> Result<u32>;

    /// Total occurrences of the current term across all documents, or `None`
    /// when the backend does not track it.
    fn total_term_freq(&self) -> Result<Option<u64>>;

    /// Captures the current position for a later [`seek_exact_state`](TermsCursor::seek_exact_state).
    /// Attributes are not part of the captured state.
    fn term_state(&self) -> Result<TermState> {
        generic_term_state(self)
    }

    /// Documents containing the current term, skipping those not live in
    /// `live_docs`. `reuse` may carry an iterator previously returned by this
    /// cursor so that its buffers are recycled.
    fn docs(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<Self::Docs>,
        flags: DocsFlags,
    ) -> Result<Self::Docs>;

    /// [`docs`](TermsCursor::docs) with frequencies requested.
    fn docs_with_freqs(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<Self::Docs>,
    ) -> Result<Self::Docs> {
        self.docs(live_docs, reuse, DocsFlags::FREQS)
    }

    /// Documents and positions of the current term, or `None` when the field
    /// was indexed without positions.
    fn positions(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<Self::Positions>,
        flags: PositionsFlags,
    ) -> Result<Option<Self::Positions>>;

    /// [`positions`](TermsCursor::positions) with offsets and payloads requested.
    fn positions_with_all(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<Self::Positions>,
    ) -> Result<Option<Self::Positions>> {
        self.positions(
            live_docs,
            reuse,
            PositionsFlags::OFFSETS | PositionsFlags::PAYLOADS,
        )
    }

    /// Consumes the remaining terms as owned byte vectors.
    fn terms_iter(&mut self) -> TermsIter<'_, Self>
    where
        Self: Sized,
    {
        TermsIter { cursor: self }
    }
}

/// Exact seek expressed through [`TermsCursor::seek_ceil`]: a miss (whether
/// `NotFound` or `End`) resets the cursor to unpositioned.
pub fn seek_exact_by_ceil<C>(cursor: &mut C, target: &[u8]) -> Result<bool>
where
    C: TermsCursor + ?Sized,
{
    match cursor.seek_ceil(target)? {
        SeekStatus::Found => Ok(true),
        SeekStatus::NotFound | SeekStatus::End => {
            cursor.reset();
            Ok(false)
        }
    }
}

/// State replay without a fast path: checks that `state` belongs to this
/// cursor's dictionary and seeks `term` exactly. Every failure leaves the
/// cursor unpositioned.
pub fn seek_exact_state_by_term<C>(cursor: &mut C, term: &[u8], state: &TermState) -> Result<()>
where
    C: TermsCursor + ?Sized,
{
    if let Err(err) = state.verify_scope(cursor.scope()) {
        cursor.reset();
        return Err(err);
    }
    log::trace!(
        "replaying term state by exact seek on '{}'",
        String::from_utf8_lossy(term)
    );
    if cursor.seek_exact(term)? {
        Ok(())
    } else {
        Err(Error::term_not_found(term))
    }
}

/// A state with no backend payload, scoped to the cursor's dictionary.
pub fn generic_term_state<C>(cursor: &C) -> Result<TermState>
where
    C: TermsCursor + ?Sized,
{
    lexicon_common::result::verify_positioned(cursor.is_positioned(), "term_state")?;
    Ok(TermState::generic(cursor.scope()))
}

/// Iterator over the terms remaining in a cursor, see [`TermsCursor::terms_iter`].
pub struct TermsIter<'a, C: TermsCursor> {
    cursor: &'a mut C,
}

impl<C: TermsCursor> Iterator for TermsIter<'_, C> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let term = try_or_ret_some_err!(self.cursor.advance())?;
        Some(Ok(term.to_vec()))
    }
}
