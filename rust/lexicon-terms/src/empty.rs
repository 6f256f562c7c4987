//! The null cursor: a cursor over an empty set of terms.
//!
//! Use it wherever a cursor is required but a field has no terms, instead of
//! threading `Option<Cursor>` through query code. It is never positioned, so
//! every current-term accessor fails with `Unpositioned`.

use lexicon_common::{Result, error::Error};

use crate::{
    attributes::Attributes,
    collation::{BinaryCollation, Collation},
    cursor::{SeekStatus, TermsCursor},
    postings::{DocsFlags, EmptyPostings, PositionsFlags, SharedLiveDocs},
    state::{StateScope, TermState},
};

/// Attributes of every [`EmptyTermsCursor`], shared process-wide.
static EMPTY_ATTRIBUTES: Attributes = Attributes::new();

/// The shared null cursor. Copy it to obtain a mutable instance:
/// `let mut cursor = EMPTY_TERMS_CURSOR;`.
pub static EMPTY_TERMS_CURSOR: EmptyTermsCursor = EmptyTermsCursor;

/// Always-exhausted cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTermsCursor;

impl TermsCursor for EmptyTermsCursor {
    type Docs = EmptyPostings;
    type Positions = EmptyPostings;

    fn collation(&self) -> &dyn Collation {
        &BinaryCollation
    }

    fn attributes(&self) -> &Attributes {
        &EMPTY_ATTRIBUTES
    }

    fn scope(&self) -> StateScope {
        StateScope::default()
    }

    fn advance(&mut self) -> Result<Option<&[u8]>> {
        Ok(None)
    }

    fn seek_ceil(&mut self, _target: &[u8]) -> Result<SeekStatus> {
        Ok(SeekStatus::End)
    }

    fn seek_exact(&mut self, _target: &[u8]) -> Result<bool> {
        Ok(false)
    }

    fn seek_exact_ord(&mut self, _ord: u64) -> Result<()> {
        Ok(())
    }

    fn seek_exact_state(&mut self, _term: &[u8], _state: &TermState) -> Result<()> {
        Err(Error::unpositioned("seek_exact_state"))
    }

    fn reset(&mut self) {}

    fn is_positioned(&self) -> bool {
        false
    }

    fn term(&self) -> Result<&[u8]> {
        Err(Error::unpositioned("term"))
    }

    fn ord(&self) -> Result<u64> {
        Err(Error::unpositioned("ord"))
    }

    fn doc_freq(&self) -> Result<u32> {
        Err(Error::unpositioned("doc_freq"))
    }

    fn total_term_freq(&self) -> Result<Option<u64>> {
        Err(Error::unpositioned("total_term_freq"))
    }

    fn term_state(&self) -> Result<TermState> {
        Err(Error::unpositioned("term_state"))
    }

    fn docs(
        &self,
        _live_docs: Option<SharedLiveDocs>,
        _reuse: Option<EmptyPostings>,
        _flags: DocsFlags,
    ) -> Result<EmptyPostings> {
        Err(Error::unpositioned("docs"))
    }

    fn positions(
        &self,
        _live_docs: Option<SharedLiveDocs>,
        _reuse: Option<EmptyPostings>,
        _flags: PositionsFlags,
    ) -> Result<Option<EmptyPostings>> {
        Err(Error::unpositioned("positions"))
    }
}
