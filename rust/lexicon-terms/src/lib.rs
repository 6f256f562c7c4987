//! Term enumeration over the sorted term dictionary of one field of one segment.
//!
//! This crate defines the cursor protocol used by query execution to walk,
//! seek and inspect the distinct terms of an inverted index, and to obtain the
//! posting lists of the current term.
//!
//! # Overview
//!
//! - [`Terms`]: a term dictionary. Opens any number of independent cursors.
//! - [`TermsCursor`]: a stateful, single-reader cursor. Supports sequential
//!   [`advance`](TermsCursor::advance), ceiling and exact seeks, optional
//!   ordinal seeks, position capture ([`TermState`]) and replay, per-term
//!   statistics and the handoff to [`DocsIterator`] / [`PositionsIterator`].
//! - [`Collation`]: the total order of a dictionary's terms, selected by name
//!   through [`create_collation`].
//! - [`EmptyTermsCursor`]: the null cursor for fields without terms.
//! - [`FilteredTermsCursor`]: a cursor restricted to a prefix or a range.
//! - [`MemoryTerms`]: an in-memory dictionary built with [`MemoryTermsBuilder`].
//!
//! # Quick Start
//!
//! ```rust
//! use lexicon_terms::{
//!     MemoryTermsBuilder, MemoryTermsConfig, SeekStatus, Terms, TermsCursor,
//! };
//!
//! let mut builder = MemoryTermsBuilder::new("body", MemoryTermsConfig::default()).unwrap();
//! builder.add_terms(0, [&b"apple"[..], b"banana"]).unwrap();
//! builder.add_terms(1, [&b"cherry"[..]]).unwrap();
//! let terms = builder.finish().unwrap();
//!
//! let mut cursor = terms.cursor().unwrap();
//! assert_eq!(cursor.seek_ceil(b"b").unwrap(), SeekStatus::NotFound);
//! assert_eq!(cursor.term().unwrap(), b"banana");
//! assert_eq!(cursor.advance().unwrap(), Some(&b"cherry"[..]));
//! assert_eq!(cursor.advance().unwrap(), None);
//! ```

pub mod attributes;
pub mod collation;
pub mod cursor;
pub mod empty;
pub mod filtered;
pub mod memory;
pub mod postings;
pub mod state;
pub mod terms;

pub use attributes::Attributes;
pub use collation::{Collation, CollationKind, create_collation};
pub use cursor::{SeekStatus, TermsCursor, TermsIter};
pub use empty::{EMPTY_TERMS_CURSOR, EmptyTermsCursor};
pub use filtered::{Accept, FilteredTermsCursor, PrefixFilter, RangeFilter, TermFilter};
pub use memory::{
    IndexOptions, MemoryDocs, MemoryPositions, MemoryTerms, MemoryTermsBuilder,
    MemoryTermsConfig, MemoryTermsCursor, Token,
};
pub use postings::{
    DocId, DocsFlags, DocsIterator, EmptyPostings, LiveDocs, PositionsFlags, PositionsIterator,
    SharedLiveDocs,
};
pub use state::{MemoryTermState, StateScope, TermState, TermStateKind};
pub use terms::Terms;
