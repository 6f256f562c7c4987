use std::sync::Arc;

use lexicon_common::{Result, error::Error};

use super::{
    TermsData,
    postings::{MemoryDocs, MemoryPositions},
};
use crate::{
    attributes::Attributes,
    collation::Collation,
    cursor::{SeekStatus, TermsCursor, seek_exact_state_by_term},
    postings::{DocsFlags, PositionsFlags, SharedLiveDocs},
    state::{MemoryTermState, StateScope, TermState, TermStateKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Unpositioned,
    At(usize),
    Exhausted,
}

/// Cursor over a [`MemoryTerms`](super::MemoryTerms) dictionary.
///
/// Seeks are binary searches over the sorted terms; ordinal seeks and state
/// replays jump directly to the ordinal.
pub struct MemoryTermsCursor {
    data: Arc<TermsData>,
    position: Position,
    attributes: Attributes,
}

impl MemoryTermsCursor {
    pub(crate) fn new(data: Arc<TermsData>) -> MemoryTermsCursor {
        MemoryTermsCursor {
            data,
            position: Position::Unpositioned,
            attributes: Attributes::new(),
        }
    }

    /// Name of the field this cursor enumerates.
    pub fn field(&self) -> &str {
        &self.data.field
    }

    /// Whether the cursor ran past the last term.
    pub fn is_exhausted(&self) -> bool {
        self.position == Position::Exhausted
    }

    fn current(&self, operation: &'static str) -> Result<usize> {
        match self.position {
            Position::At(ord) => Ok(ord),
            Position::Unpositioned | Position::Exhausted => Err(Error::unpositioned(operation)),
        }
    }
}

impl std::fmt::Debug for MemoryTermsCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTermsCursor")
            .field("field", &self.data.field)
            .field("position", &self.position)
            .finish()
    }
}

impl TermsCursor for MemoryTermsCursor {
    type Docs = MemoryDocs;
    type Positions = MemoryPositions;

    fn collation(&self) -> &dyn Collation {
        self.data.collation.as_ref()
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn scope(&self) -> StateScope {
        self.data.scope
    }

    fn advance(&mut self) -> Result<Option<&[u8]>> {
        let next = match self.position {
            Position::Unpositioned => 0,
            Position::At(ord) => ord + 1,
            Position::Exhausted => return Ok(None),
        };
        if next < self.data.len() {
            self.position = Position::At(next);
            Ok(Some(self.data.term(next)))
        } else {
            self.position = Position::Exhausted;
            Ok(None)
        }
    }

    fn seek_ceil(&mut self, target: &[u8]) -> Result<SeekStatus> {
        let ord = self.data.find_leftmost_ge(target);
        let status = if ord == self.data.len() {
            self.position = Position::Exhausted;
            SeekStatus::End
        } else {
            self.position = Position::At(ord);
            if self.data.collation.compare(self.data.term(ord), target).is_eq() {
                SeekStatus::Found
            } else {
                SeekStatus::NotFound
            }
        };
        log::trace!(
            "seek_ceil('{}') on field '{}': {status:?}",
            String::from_utf8_lossy(target),
            self.data.field
        );
        Ok(status)
    }

    fn seek_exact(&mut self, target: &[u8]) -> Result<bool> {
        match self.data.find_equal(target) {
            Some(ord) => {
                self.position = Position::At(ord);
                Ok(true)
            }
            None => {
                self.position = Position::Unpositioned;
                Ok(false)
            }
        }
    }

    fn seek_exact_ord(&mut self, ord: u64) -> Result<()> {
        let size = self.data.len() as u64;
        if ord >= size {
            return Err(Error::ordinal_out_of_range(ord, size));
        }
        self.position = Position::At(ord as usize);
        Ok(())
    }

    /// Jumps to the captured ordinal when it still holds `term`. A state
    /// whose ordinal does not match falls back to an exact seek, so every
    /// outcome (including `TermNotFound` on an absent term) matches the
    /// replay by term.
    fn seek_exact_state(&mut self, term: &[u8], state: &TermState) -> Result<()> {
        let memory_state = match state.kind() {
            TermStateKind::Memory(memory_state) => memory_state,
            TermStateKind::Generic => return seek_exact_state_by_term(self, term, state),
        };
        if let Err(err) = state.verify_scope(self.data.scope) {
            self.reset();
            return Err(err);
        }
        let ord = usize::try_from(memory_state.ord).unwrap_or(usize::MAX);
        let hit = ord < self.data.len()
            && self.data.collation.compare(self.data.term(ord), term).is_eq();
        if hit {
            log::trace!("replayed term state to ordinal {ord} on field '{}'", self.data.field);
            self.position = Position::At(ord);
            return Ok(());
        }
        log::trace!(
            "stale term state for '{}' on field '{}', seeking by term",
            String::from_utf8_lossy(term),
            self.data.field
        );
        if self.seek_exact(term)? {
            Ok(())
        } else {
            Err(Error::term_not_found(term))
        }
    }

    fn reset(&mut self) {
        self.position = Position::Unpositioned;
    }

    fn is_positioned(&self) -> bool {
        matches!(self.position, Position::At(_))
    }

    fn term(&self) -> Result<&[u8]> {
        Ok(self.data.term(self.current("term")?))
    }

    fn ord(&self) -> Result<u64> {
        Ok(self.current("ord")? as u64)
    }

    fn doc_freq(&self) -> Result<u32> {
        Ok(self.data.stats[self.current("doc_freq")?].doc_freq)
    }

    fn total_term_freq(&self) -> Result<Option<u64>> {
        Ok(self.data.total_term_freq(self.current("total_term_freq")?))
    }

    fn term_state(&self) -> Result<TermState> {
        let ord = self.current("term_state")?;
        Ok(TermState::new(
            self.data.scope,
            TermStateKind::Memory(MemoryTermState {
                ord: ord as u64,
                doc_freq: self.data.stats[ord].doc_freq,
                total_term_freq: self.data.total_term_freq(ord),
            }),
        ))
    }

    fn docs(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<MemoryDocs>,
        flags: DocsFlags,
    ) -> Result<MemoryDocs> {
        let ord = self.current("docs")?;
        Ok(MemoryDocs::reuse_or_new(
            reuse, &self.data, ord, live_docs, flags,
        ))
    }

    fn positions(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<MemoryPositions>,
        flags: PositionsFlags,
    ) -> Result<Option<MemoryPositions>> {
        let ord = self.current("positions")?;
        if !self.data.index_options.has_positions() {
            return Ok(None);
        }
        Ok(Some(MemoryPositions::reuse_or_new(
            reuse, &self.data, ord, live_docs, flags,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::{MemoryTerms, MemoryTermsBuilder, MemoryTermsConfig},
        postings::{DocsIterator, PositionsIterator},
        terms::Terms,
    };
    use lexicon_common::error::ErrorKind;

    fn fruit_terms() -> MemoryTerms {
        let mut builder = MemoryTermsBuilder::new("body", MemoryTermsConfig::default()).unwrap();
        builder
            .add_terms(0, [&b"banana"[..], b"apple", b"banana"])
            .unwrap();
        builder.add_terms(1, [&b"cherry"[..], b"apple"]).unwrap();
        builder.add_terms(3, [&b"banana"[..]]).unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_advance_then_exhaust() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        assert!(!cursor.is_positioned());
        assert_eq!(cursor.advance().unwrap(), Some(&b"apple"[..]));
        assert_eq!(cursor.ord().unwrap(), 0);
        assert_eq!(cursor.advance().unwrap(), Some(&b"banana"[..]));
        assert_eq!(cursor.advance().unwrap(), Some(&b"cherry"[..]));
        assert_eq!(cursor.advance().unwrap(), None);
        assert!(cursor.is_exhausted());
        // Exhaustion is sticky for advance.
        assert_eq!(cursor.advance().unwrap(), None);
        // A seek brings the cursor back.
        assert_eq!(cursor.seek_ceil(b"b").unwrap(), SeekStatus::NotFound);
        assert_eq!(cursor.term().unwrap(), b"banana");
        assert_eq!(cursor.advance().unwrap(), Some(&b"cherry"[..]));
    }

    #[test]
    fn test_statistics_of_current_term() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        assert!(cursor.seek_exact(b"banana").unwrap());
        assert_eq!(cursor.doc_freq().unwrap(), 2);
        assert_eq!(cursor.total_term_freq().unwrap(), Some(3));
        assert!(cursor.seek_exact(b"cherry").unwrap());
        assert_eq!(cursor.doc_freq().unwrap(), 1);
        assert_eq!(cursor.total_term_freq().unwrap(), Some(1));
    }

    #[test]
    fn test_seek_exact_ord_bounds() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        cursor.seek_exact_ord(2).unwrap();
        assert_eq!(cursor.term().unwrap(), b"cherry");
        cursor.seek_exact_ord(0).unwrap();
        assert_eq!(cursor.term().unwrap(), b"apple");

        let err = cursor.seek_exact_ord(3).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::OrdinalOutOfRange { ord: 3, size: 3 }
        ));
        // A rejected ordinal seek leaves the position alone.
        assert_eq!(cursor.term().unwrap(), b"apple");
    }

    #[test]
    fn test_state_replay_fast_path() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        assert!(cursor.seek_exact(b"banana").unwrap());
        let state = cursor.term_state().unwrap();
        assert!(matches!(
            state.kind(),
            TermStateKind::Memory(MemoryTermState { ord: 1, doc_freq: 2, .. })
        ));

        let mut other = terms.cursor().unwrap();
        other.seek_exact_state(b"banana", &state).unwrap();
        assert_eq!(other.term().unwrap(), b"banana");
        assert_eq!(other.ord().unwrap(), 1);

        // A state captured on another term is only a hint.
        other.seek_exact_state(b"cherry", &state).unwrap();
        assert_eq!(other.term().unwrap(), b"cherry");
        assert_eq!(other.ord().unwrap(), 2);
    }

    #[test]
    fn test_state_replay_of_absent_term_unpositions() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        assert!(cursor.seek_exact(b"banana").unwrap());
        let state = cursor.term_state().unwrap();

        assert!(cursor.seek_exact(b"apple").unwrap());
        let err = cursor.seek_exact_state(b"durian", &state).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TermNotFound { .. }));
        assert!(!cursor.is_positioned());
        assert!(cursor.term().is_err());

        // Same end state as the replay without a fast path.
        let mut fallback = terms.cursor().unwrap();
        assert!(fallback.seek_exact(b"apple").unwrap());
        let err = fallback
            .seek_exact_state(b"durian", &TermState::generic(terms.scope()))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TermNotFound { .. }));
        assert!(!fallback.is_positioned());
    }

    #[test]
    fn test_state_from_other_field_rejected() {
        let terms = fruit_terms();
        let mut builder = MemoryTermsBuilder::new("title", MemoryTermsConfig::default()).unwrap();
        builder.add_terms(0, [&b"apple"[..]]).unwrap();
        let title = builder.finish().unwrap();

        let mut cursor = terms.cursor().unwrap();
        cursor.advance().unwrap();
        let state = cursor.term_state().unwrap();

        let mut title_cursor = title.cursor().unwrap();
        title_cursor.advance().unwrap();
        let err = title_cursor.seek_exact_state(b"apple", &state).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IncompatibleTermState { .. }));
        assert!(!title_cursor.is_positioned());
    }

    #[test]
    fn test_docs_reuse_keeps_iterating_correctly() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        assert!(cursor.seek_exact(b"apple").unwrap());
        let mut docs = cursor.docs_with_freqs(None, None).unwrap();
        assert_eq!(docs.next_doc(), Some(0));
        assert_eq!(docs.next_doc(), Some(1));
        assert_eq!(docs.next_doc(), None);

        assert!(cursor.seek_exact(b"banana").unwrap());
        let mut docs = cursor.docs_with_freqs(None, Some(docs)).unwrap();
        assert_eq!(docs.doc_id(), None);
        assert_eq!(docs.next_doc(), Some(0));
        assert_eq!(docs.freq().unwrap(), 2);
        assert_eq!(docs.next_doc(), Some(3));
        assert_eq!(docs.freq().unwrap(), 1);
        assert_eq!(docs.next_doc(), None);
    }

    #[test]
    fn test_positions_follow_documents() {
        let terms = fruit_terms();
        let mut cursor = terms.cursor().unwrap();
        assert!(cursor.seek_exact(b"banana").unwrap());
        let mut positions = cursor.positions_with_all(None, None).unwrap().unwrap();
        assert!(positions.next_position().is_err());
        assert_eq!(positions.next_doc(), Some(0));
        assert_eq!(positions.next_position().unwrap(), Some(0));
        assert_eq!(positions.next_position().unwrap(), Some(2));
        assert_eq!(positions.next_position().unwrap(), None);
        assert_eq!(positions.advance_to(2), Some(3));
        assert_eq!(positions.next_position().unwrap(), Some(0));
    }
}
