//! Cursors restricted to a subset of the terms, for multi-term queries.
//!
//! A [`FilteredTermsCursor`] seeks its inner cursor to the filter's start
//! point with a ceiling seek and then scans forward with `advance`, asking the
//! [`TermFilter`] about each term until the filter reports the end of the
//! accepted region.

use std::ops::Bound;

use lexicon_common::{Result, error::Error, result::verify_positioned};

use crate::{
    attributes::Attributes,
    collation::Collation,
    cursor::{SeekStatus, TermsCursor},
    postings::{DocsFlags, PositionsFlags, SharedLiveDocs},
    state::{StateScope, TermState},
};

/// Filter decision for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Return the term.
    Yes,
    /// Skip the term and keep scanning.
    No,
    /// Skip the term and stop: no later term can be accepted.
    End,
}

/// Selects the terms a [`FilteredTermsCursor`] returns.
pub trait TermFilter {
    /// Term to ceiling-seek to before the first scan, `None` to start at the
    /// first term of the dictionary.
    fn initial_seek(&self, collation: &dyn Collation) -> Option<&[u8]>;

    fn accept(&self, term: &[u8], collation: &dyn Collation) -> Accept;
}

/// Accepts the terms starting with a prefix.
#[derive(Debug, Clone)]
pub struct PrefixFilter {
    prefix: Vec<u8>,
}

impl PrefixFilter {
    pub fn new(prefix: &[u8]) -> PrefixFilter {
        PrefixFilter {
            prefix: prefix.to_vec(),
        }
    }
}

impl TermFilter for PrefixFilter {
    fn initial_seek(&self, collation: &dyn Collation) -> Option<&[u8]> {
        Some(&self.prefix[..collation.prefix_seek_len(&self.prefix)])
    }

    fn accept(&self, term: &[u8], collation: &dyn Collation) -> Accept {
        if collation.starts_with(term, &self.prefix) {
            Accept::Yes
        } else if collation.compare(term, &self.prefix).is_lt() {
            Accept::No
        } else {
            Accept::End
        }
    }
}

/// Accepts the terms between two bounds.
#[derive(Debug, Clone)]
pub struct RangeFilter {
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
}

impl RangeFilter {
    pub fn new(lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> RangeFilter {
        RangeFilter {
            lower: lower.map(<[u8]>::to_vec),
            upper: upper.map(<[u8]>::to_vec),
        }
    }
}

impl TermFilter for RangeFilter {
    fn initial_seek(&self, _collation: &dyn Collation) -> Option<&[u8]> {
        match &self.lower {
            Bound::Included(term) | Bound::Excluded(term) => Some(term),
            Bound::Unbounded => None,
        }
    }

    fn accept(&self, term: &[u8], collation: &dyn Collation) -> Accept {
        if let Bound::Excluded(lower) = &self.lower {
            if collation.compare(term, lower).is_le() {
                return Accept::No;
            }
        }
        match &self.upper {
            Bound::Included(upper) if collation.compare(term, upper).is_gt() => Accept::End,
            Bound::Excluded(upper) if collation.compare(term, upper).is_ge() => Accept::End,
            _ => Accept::Yes,
        }
    }
}

/// Cursor returning only the terms a [`TermFilter`] accepts.
///
/// Supports sequential advance, metadata, state capture and replay, and the
/// posting handoff. Ceiling and exact seeks and ordinals are not supported.
pub struct FilteredTermsCursor<C, F> {
    inner: C,
    filter: F,
    attributes: Attributes,
    started: bool,
    positioned: bool,
    exhausted: bool,
}

impl<C: TermsCursor, F: TermFilter> FilteredTermsCursor<C, F> {
    pub fn new(inner: C, filter: F) -> Self {
        FilteredTermsCursor {
            inner,
            filter,
            attributes: Attributes::new(),
            started: false,
            positioned: false,
            exhausted: false,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn finish(&mut self) -> Result<Option<&[u8]>> {
        self.positioned = false;
        self.exhausted = true;
        Ok(None)
    }
}

impl<C: TermsCursor, F: TermFilter> TermsCursor for FilteredTermsCursor<C, F> {
    type Docs = C::Docs;
    type Positions = C::Positions;

    fn collation(&self) -> &dyn Collation {
        self.inner.collation()
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn scope(&self) -> StateScope {
        self.inner.scope()
    }

    fn advance(&mut self) -> Result<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut has_term = if self.started {
            self.inner.advance()?.is_some()
        } else {
            self.started = true;
            match self.filter.initial_seek(self.inner.collation()) {
                Some(target) => self.inner.seek_ceil(target)? != SeekStatus::End,
                None => self.inner.advance()?.is_some(),
            }
        };
        loop {
            if !has_term {
                return self.finish();
            }
            match self
                .filter
                .accept(self.inner.term()?, self.inner.collation())
            {
                Accept::Yes => {
                    self.positioned = true;
                    return self.inner.term().map(Some);
                }
                Accept::No => has_term = self.inner.advance()?.is_some(),
                Accept::End => return self.finish(),
            }
        }
    }

    fn seek_ceil(&mut self, _target: &[u8]) -> Result<SeekStatus> {
        Err(Error::unsupported("seek_ceil on a filtered cursor"))
    }

    fn seek_exact(&mut self, _target: &[u8]) -> Result<bool> {
        Err(Error::unsupported("seek_exact on a filtered cursor"))
    }

    fn seek_exact_ord(&mut self, _ord: u64) -> Result<()> {
        Err(Error::unsupported("seek_exact_ord on a filtered cursor"))
    }

    /// Replays the state on the inner cursor. A term outside the filter is
    /// reported as not found and leaves the cursor unpositioned.
    fn seek_exact_state(&mut self, term: &[u8], state: &TermState) -> Result<()> {
        if let Err(err) = self.inner.seek_exact_state(term, state) {
            self.reset();
            return Err(err);
        }
        self.started = true;
        self.exhausted = false;
        match self
            .filter
            .accept(self.inner.term()?, self.inner.collation())
        {
            Accept::Yes => {
                self.positioned = true;
                Ok(())
            }
            Accept::No | Accept::End => {
                self.reset();
                Err(Error::term_not_found(term))
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.started = false;
        self.positioned = false;
        self.exhausted = false;
    }

    fn is_positioned(&self) -> bool {
        self.positioned
    }

    fn term(&self) -> Result<&[u8]> {
        verify_positioned(self.positioned, "term")?;
        self.inner.term()
    }

    fn ord(&self) -> Result<u64> {
        Err(Error::unsupported("ord on a filtered cursor"))
    }

    fn doc_freq(&self) -> Result<u32> {
        verify_positioned(self.positioned, "doc_freq")?;
        self.inner.doc_freq()
    }

    fn total_term_freq(&self) -> Result<Option<u64>> {
        verify_positioned(self.positioned, "total_term_freq")?;
        self.inner.total_term_freq()
    }

    fn term_state(&self) -> Result<TermState> {
        verify_positioned(self.positioned, "term_state")?;
        self.inner.term_state()
    }

    fn docs(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<Self::Docs>,
        flags: DocsFlags,
    ) -> Result<Self::Docs> {
        verify_positioned(self.positioned, "docs")?;
        self.inner.docs(live_docs, reuse, flags)
    }

    fn positions(
        &self,
        live_docs: Option<SharedLiveDocs>,
        reuse: Option<Self::Positions>,
        flags: PositionsFlags,
    ) -> Result<Option<Self::Positions>> {
        verify_positioned(self.positioned, "positions")?;
        self.inner.positions(live_docs, reuse, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collation::{
        BinaryCollation, UnicodeCaseInsensitiveCollation, UnicodeCasePreservingCollation,
    };

    #[test]
    fn test_prefix_filter() {
        let filter = PrefixFilter::new(b"ba");
        assert_eq!(filter.initial_seek(&BinaryCollation), Some(&b"ba"[..]));
        assert_eq!(
            filter.initial_seek(&UnicodeCasePreservingCollation),
            Some(&b"b"[..])
        );
        assert_eq!(filter.accept(b"b", &BinaryCollation), Accept::No);
        assert_eq!(filter.accept(b"banana", &BinaryCollation), Accept::Yes);
        assert_eq!(filter.accept(b"cherry", &BinaryCollation), Accept::End);
        assert_eq!(
            filter.accept(b"BAnana", &UnicodeCaseInsensitiveCollation),
            Accept::Yes
        );
    }

    #[test]
    fn test_range_filter_bounds() {
        let filter = RangeFilter::new(Bound::Excluded(b"b"), Bound::Included(b"d"));
        assert_eq!(filter.initial_seek(&BinaryCollation), Some(&b"b"[..]));
        assert_eq!(filter.accept(b"b", &BinaryCollation), Accept::No);
        assert_eq!(filter.accept(b"c", &BinaryCollation), Accept::Yes);
        assert_eq!(filter.accept(b"d", &BinaryCollation), Accept::Yes);
        assert_eq!(filter.accept(b"da", &BinaryCollation), Accept::End);

        let filter = RangeFilter::new(Bound::Unbounded, Bound::Excluded(b"d"));
        assert_eq!(filter.initial_seek(&BinaryCollation), None);
        assert_eq!(filter.accept(b"a", &BinaryCollation), Accept::Yes);
        assert_eq!(filter.accept(b"d", &BinaryCollation), Accept::End);
    }
}
