//! Captured cursor positions.
//!
//! A [`TermState`] remembers how to get back to one exact term without walking
//! the dictionary again. It is only meaningful for the field (and segment) it was
//! captured from, so every state carries a [`StateScope`], which cursors check
//! before replaying it.

use lexicon_common::{Result, error::Error};

/// Identity of the term dictionary a state was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateScope {
    /// Segment identifier assigned by the dictionary's owner.
    pub segment: u64,
    /// Field tag: the `xxh3_64` hash of the field name.
    pub field: u64,
}

impl StateScope {
    pub fn new(segment: u64, field_name: &str) -> StateScope {
        StateScope {
            segment,
            field: field_tag(field_name),
        }
    }
}

/// Computes the tag identifying a field inside a [`StateScope`].
pub fn field_tag(field_name: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(field_name.as_bytes())
}

/// Backend-specific payload of a captured position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermStateKind {
    /// Produced by cursors without a replay fast path. Replaying it is
    /// equivalent to an exact seek by term.
    Generic,
    /// Produced by the in-memory dictionary cursor.
    Memory(MemoryTermState),
}

impl TermStateKind {
    fn name(&self) -> &'static str {
        match self {
            TermStateKind::Generic => "generic",
            TermStateKind::Memory(_) => "memory",
        }
    }
}

/// Position of a term inside an in-memory dictionary, plus the statistics
/// observed when it was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTermState {
    pub ord: u64,
    pub doc_freq: u32,
    pub total_term_freq: Option<u64>,
}

/// An opaque snapshot of a cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermState {
    scope: StateScope,
    kind: TermStateKind,
}

impl TermState {
    pub fn new(scope: StateScope, kind: TermStateKind) -> TermState {
        TermState { scope, kind }
    }

    pub fn generic(scope: StateScope) -> TermState {
        TermState::new(scope, TermStateKind::Generic)
    }

    pub fn scope(&self) -> StateScope {
        self.scope
    }

    pub fn kind(&self) -> &TermStateKind {
        &self.kind
    }

    /// Overwrites this state with `other`.
    ///
    /// Only states of the same concrete kind may be assigned to each other.
    pub fn copy_from(&mut self, other: &TermState) -> Result<()> {
        if std::mem::discriminant(&self.kind) != std::mem::discriminant(&other.kind) {
            return Err(Error::incompatible_state(format!(
                "cannot copy a {} state into a {} state",
                other.kind.name(),
                self.kind.name()
            )));
        }
        self.scope = other.scope;
        self.kind = other.kind.clone();
        Ok(())
    }

    /// Fails with `IncompatibleTermState` unless this state was captured in `scope`.
    pub fn verify_scope(&self, scope: StateScope) -> Result<()> {
        if self.scope == scope {
            Ok(())
        } else {
            Err(Error::incompatible_state(format!(
                "state captured in segment {} field {:#x}, replayed in segment {} field {:#x}",
                self.scope.segment, self.scope.field, scope.segment, scope.field
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_common::error::ErrorKind;

    #[test]
    fn test_field_tag_is_stable_per_name() {
        assert_eq!(field_tag("body"), field_tag("body"));
        assert_ne!(field_tag("body"), field_tag("title"));
        assert_eq!(StateScope::new(3, "body").field, field_tag("body"));
    }

    #[test]
    fn test_copy_from_same_kind() {
        let scope = StateScope::new(1, "body");
        let mut target = TermState::new(
            scope,
            TermStateKind::Memory(MemoryTermState {
                ord: 0,
                doc_freq: 1,
                total_term_freq: None,
            }),
        );
        let source = TermState::new(
            StateScope::new(2, "body"),
            TermStateKind::Memory(MemoryTermState {
                ord: 5,
                doc_freq: 3,
                total_term_freq: Some(9),
            }),
        );
        target.copy_from(&source).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_copy_from_other_kind_fails() {
        let scope = StateScope::new(1, "body");
        let mut target = TermState::generic(scope);
        let source = TermState::new(
            scope,
            TermStateKind::Memory(MemoryTermState {
                ord: 5,
                doc_freq: 3,
                total_term_freq: None,
            }),
        );
        let err = target.copy_from(&source).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IncompatibleTermState { .. }));
        assert_eq!(target, TermState::generic(scope));
    }

    #[test]
    fn test_verify_scope() {
        let state = TermState::generic(StateScope::new(1, "body"));
        assert!(state.verify_scope(StateScope::new(1, "body")).is_ok());
        assert!(state.verify_scope(StateScope::new(1, "title")).is_err());
        assert!(state.verify_scope(StateScope::new(2, "body")).is_err());
    }
}
