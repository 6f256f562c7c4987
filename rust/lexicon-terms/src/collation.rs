//! Term comparers defining the total order of a term dictionary.
//!
//! Every term dictionary orders its terms by exactly one collation, and every
//! cursor opened over that dictionary enumerates and seeks in that order. The
//! collation must remain the same between building a dictionary and querying it,
//! otherwise ceiling seeks land on the wrong terms.
//!
//! # Available Collations
//!
//! - **Binary** (`"binary"`): unsigned lexicographic byte order, the default
//! - **Unicode Case Insensitive** (`"unicode-case-insensitive"`): case-folding comparison
//! - **Unicode Case Preserving** (`"unicode-case-preserving"`): case-insensitive primary
//!   order with a case-sensitive tie break
//!
//! The Unicode collations compare valid UTF-8 terms as text. Terms that are not
//! valid UTF-8 sort after every valid one, in byte order among themselves, so
//! the order stays total over arbitrary bytes.

use std::cmp::Ordering;

use lexicon_common::{Result, error::Error};

/// Total order over terms (arbitrary byte sequences).
///
/// A dictionary stores its terms sorted by one `Collation`, and its cursors use
/// the same instance for ceiling seeks, exact seeks and prefix filtering.
pub trait Collation: Send + Sync + 'static {
    fn kind(&self) -> CollationKind;

    /// Configuration name, as accepted by [`create_collation`].
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn clone_boxed(&self) -> Box<dyn Collation>;

    /// Three-way comparison of two terms. Must be a total order.
    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering;

    /// Whether `term` starts with `prefix`. The terms accepted for a given
    /// prefix form one contiguous run of the collation order.
    fn starts_with(&self, term: &[u8], prefix: &[u8]) -> bool;

    /// Length of the leading part of `prefix` to ceiling-seek to when
    /// enumerating the terms that start with `prefix`: no accepted term sorts
    /// before `prefix[..len]`.
    fn prefix_seek_len(&self, prefix: &[u8]) -> usize {
        prefix.len()
    }
}

impl std::fmt::Debug for dyn Collation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Collation").field(&self.name()).finish()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CollationKind {
    /// Unsigned lexicographic byte order.
    Binary,
    /// Case-folded character order; terms differing only in case are equal.
    UnicodeCaseInsensitive,
    /// Case-folded character order, ties broken by code point.
    UnicodeCasePreserving,
}

impl TryFrom<&str> for CollationKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        [
            CollationKind::Binary,
            CollationKind::UnicodeCaseInsensitive,
            CollationKind::UnicodeCasePreserving,
        ]
        .into_iter()
        .find(|kind| kind.name() == name)
        .ok_or_else(|| Error::invalid_arg("collation", format!("unknown collation '{name}'")))
    }
}

impl CollationKind {
    pub const fn name(&self) -> &'static str {
        match self {
            CollationKind::Binary => "binary",
            CollationKind::UnicodeCaseInsensitive => "unicode-case-insensitive",
            CollationKind::UnicodeCasePreserving => "unicode-case-preserving",
        }
    }
}

/// Instantiates the collation registered under `name`.
///
/// # Errors
///
/// Returns an `InvalidArgument` error for an unknown name.
pub fn create_collation(name: &str) -> Result<Box<dyn Collation>> {
    Ok(match CollationKind::try_from(name)? {
        CollationKind::Binary => Box::new(BinaryCollation),
        CollationKind::UnicodeCaseInsensitive => Box::new(UnicodeCaseInsensitiveCollation),
        CollationKind::UnicodeCasePreserving => Box::new(UnicodeCasePreservingCollation),
    })
}

/// Unsigned lexicographic byte order. A term sorts before every longer term it
/// is a prefix of.
pub struct BinaryCollation;

impl Collation for BinaryCollation {
    fn kind(&self) -> CollationKind {
        CollationKind::Binary
    }

    fn clone_boxed(&self) -> Box<dyn Collation> {
        Box::new(BinaryCollation)
    }

    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering {
        left.cmp(right)
    }

    fn starts_with(&self, term: &[u8], prefix: &[u8]) -> bool {
        term.starts_with(prefix)
    }
}

pub struct UnicodeCaseInsensitiveCollation;

impl Collation for UnicodeCaseInsensitiveCollation {
    fn kind(&self) -> CollationKind {
        CollationKind::UnicodeCaseInsensitive
    }

    fn clone_boxed(&self) -> Box<dyn Collation> {
        Box::new(UnicodeCaseInsensitiveCollation)
    }

    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering {
        compare_text(left, right, |l, r| folded(l).cmp(folded(r)))
    }

    fn starts_with(&self, term: &[u8], prefix: &[u8]) -> bool {
        text_starts_with(term, prefix)
    }
}

/// Case-folded primary order with a code point tie break, so `"Ab"` and
/// `"ab"` are distinct but adjacent.
pub struct UnicodeCasePreservingCollation;

impl Collation for UnicodeCasePreservingCollation {
    fn kind(&self) -> CollationKind {
        CollationKind::UnicodeCasePreserving
    }

    fn clone_boxed(&self) -> Box<dyn Collation> {
        Box::new(UnicodeCasePreservingCollation)
    }

    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering {
        compare_text(left, right, |l, r| {
            folded(l).cmp(folded(r)).then_with(|| l.cmp(r))
        })
    }

    // Prefix matching ignores case: a case-sensitive match would not select a
    // contiguous run of this order.
    fn starts_with(&self, term: &[u8], prefix: &[u8]) -> bool {
        text_starts_with(term, prefix)
    }

    // A case variant of the whole prefix may sort before the prefix itself
    // ("AB" < "ab"), but never before the prefix minus its last character.
    fn prefix_seek_len(&self, prefix: &[u8]) -> usize {
        match std::str::from_utf8(prefix) {
            Ok(text) => text.char_indices().last().map_or(0, |(start, _)| start),
            Err(_) => prefix.len(),
        }
    }
}

/// Compares valid UTF-8 terms with `compare_str`. Invalid UTF-8 sorts after
/// valid UTF-8, and by bytes among itself.
fn compare_text<F>(left: &[u8], right: &[u8], compare_str: F) -> Ordering
where
    F: FnOnce(&str, &str) -> Ordering,
{
    match (std::str::from_utf8(left), std::str::from_utf8(right)) {
        (Ok(l), Ok(r)) => compare_str(l, r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

/// Case-folded prefix test for text, byte prefix test within the invalid
/// UTF-8 group. An empty prefix matches every term.
fn text_starts_with(term: &[u8], prefix: &[u8]) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match (std::str::from_utf8(term), std::str::from_utf8(prefix)) {
        (Ok(t), Ok(p)) => has_folded_prefix(t, p),
        (Err(_), Err(_)) => term.starts_with(prefix),
        _ => false,
    }
}

/// Upper-cases a character when its upper case is a single code point; lower
/// Eszett maps to capital Eszett.
fn to_upper(c: char) -> char {
    match c {
        'ß' => 'ẞ',
        c if c.is_lowercase() => {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => single,
                _ => c,
            }
        }
        c => c,
    }
}

fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().map(to_upper)
}

fn has_folded_prefix(text: &str, prefix: &str) -> bool {
    let mut text = folded(text);
    folded(prefix).all(|p| text.next() == Some(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collation_kind_from_str() {
        assert_eq!(
            CollationKind::try_from("binary").unwrap(),
            CollationKind::Binary
        );
        assert_eq!(
            CollationKind::try_from("unicode-case-insensitive").unwrap(),
            CollationKind::UnicodeCaseInsensitive
        );
        assert!(CollationKind::try_from("invalid").is_err());
        assert!(create_collation("invalid").is_err());
    }

    #[test]
    fn test_binary_collation() {
        let collation = BinaryCollation;
        assert_eq!(collation.name(), "binary");
        assert_eq!(collation.compare(b"", b""), Ordering::Equal);
        assert_eq!(collation.compare(b"", b"a"), Ordering::Less);
        assert_eq!(collation.compare(b"ab", b"a"), Ordering::Greater);
        // Unsigned bytes: 0xff sorts after ASCII.
        assert_eq!(collation.compare(b"\xff", b"z"), Ordering::Greater);
        assert_eq!(collation.compare(b"B", b"a"), Ordering::Less);
        assert!(collation.starts_with(b"banana", b"ban"));
        assert!(!collation.starts_with(b"ba", b"ban"));
    }

    #[test]
    fn test_unicode_case_insensitive_collation() {
        let collation = UnicodeCaseInsensitiveCollation;
        assert_eq!(
            collation.compare("café".as_bytes(), "CAFÉ".as_bytes()),
            Ordering::Equal
        );
        assert_eq!(collation.compare(b"abc", b"DEF"), Ordering::Less);
        assert_eq!(
            collation.compare("ß".as_bytes(), "ẞ".as_bytes()),
            Ordering::Equal
        );
        assert!(collation.starts_with("Héllo World".as_bytes(), "héllo".as_bytes()));
        assert!(!collation.starts_with(b"hello", b"world"));
    }

    #[test]
    fn test_unicode_case_preserving_collation() {
        let collation = UnicodeCasePreservingCollation;
        assert_eq!(collation.compare(b"abc", b"abc"), Ordering::Equal);
        assert_eq!(collation.compare(b"abc", b"ABC"), Ordering::Greater);

        let mut terms: Vec<&[u8]> = vec![&b"Abd"[..], &b"abc"[..], &b"aBc"[..]];
        terms.sort_by(|a, b| collation.compare(a, b));
        assert_eq!(terms, vec![&b"aBc"[..], &b"abc"[..], &b"Abd"[..]]);
    }

    #[test]
    fn test_prefix_matches_are_contiguous() {
        let collation = UnicodeCasePreservingCollation;
        let mut terms: Vec<&[u8]> = vec![
            &b"Ab"[..],
            &b"ab"[..],
            &b"Abc"[..],
            &b"abc"[..],
            &b"b"[..],
            &b"AA"[..],
        ];
        terms.sort_by(|a, b| collation.compare(a, b));
        let matches: Vec<bool> = terms
            .iter()
            .map(|term| collation.starts_with(term, b"Ab"))
            .collect();
        assert_eq!(matches, vec![false, true, true, true, true, false]);
    }

    #[test]
    fn test_invalid_utf8_sorts_after_text() {
        for collation in [
            create_collation("unicode-case-insensitive").unwrap(),
            create_collation("unicode-case-preserving").unwrap(),
        ] {
            assert_eq!(collation.compare(b"a\xff", b"a\xfe"), Ordering::Greater);
            assert_eq!(collation.compare(b"zzz", b"A\xff"), Ordering::Less);
            assert_eq!(collation.compare(b"\x00\xff", b"\xf0"), Ordering::Less);
            assert!(collation.starts_with(b"\xff\x00", b"\xff"));
            assert!(!collation.starts_with(b"ab\xff", b"ab"));
            assert!(!collation.starts_with(b"\xc3\xa9", b"\xc3"));
            assert!(collation.starts_with(b"ab\xff", b""));
        }
    }

    #[test]
    fn test_unicode_orders_are_transitive() {
        let samples: Vec<&[u8]> = vec![
            &b""[..],
            &b"B"[..],
            &b"C\xff"[..],
            &b"a"[..],
            &b"ab"[..],
            &b"AB"[..],
            &b"\x00"[..],
            &b"\xff"[..],
            &b"\x80a"[..],
            "é".as_bytes(),
            "É".as_bytes(),
            &b"\xc3"[..],
            "ß".as_bytes(),
            "ẞ".as_bytes(),
        ];
        for name in ["unicode-case-insensitive", "unicode-case-preserving"] {
            let collation = create_collation(name).unwrap();
            for a in &samples {
                for b in &samples {
                    assert_eq!(
                        collation.compare(a, b),
                        collation.compare(b, a).reverse()
                    );
                    for c in &samples {
                        if collation.compare(a, b).is_le() && collation.compare(b, c).is_le() {
                            assert!(
                                collation.compare(a, c).is_le(),
                                "{name}: {a:?} <= {b:?} <= {c:?}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_case_preserving_prefix_seek_len() {
        let collation = UnicodeCasePreservingCollation;
        assert_eq!(collation.prefix_seek_len(b"ab"), 1);
        assert_eq!(collation.prefix_seek_len("aé".as_bytes()), 1);
        assert_eq!(collation.prefix_seek_len(b""), 0);
        assert_eq!(collation.prefix_seek_len(b"a\xff"), 2);
        // Every case variant of the prefix sorts after the seek key.
        let key = &b"ab"[..collation.prefix_seek_len(b"ab")];
        for variant in [&b"AB"[..], b"Ab", b"aB", b"ab"] {
            assert_eq!(collation.compare(key, variant), Ordering::Less);
        }
        assert_eq!(BinaryCollation.prefix_seek_len(b"ab"), 2);
    }

    #[test]
    fn test_to_upper() {
        assert_eq!(to_upper('a'), 'A');
        assert_eq!(to_upper('1'), '1');
        assert_eq!(to_upper('ñ'), 'Ñ');
        assert_eq!(to_upper('ß'), 'ẞ');
        assert_eq!(to_upper('ẞ'), 'ẞ');
    }
}
