//! Vocabulary storage and lookup.
//!
//! The vocabulary maps every symbol id to the bytes it expands to. Ids are
//! dense, so storage is a plain `Vec` indexed by id: the 256 base bytes first,
//! then one entry per learned merge in learning order.

use crate::core::merges::{MergeRule, MergeRules, SymbolId, BASE_VOCAB_SIZE};
use crate::error::{BpeError, Result};
use compact_str::CompactString;

/// Symbol id -> byte expansion. Only grows; entries are never overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<Vec<u8>>,
}

impl Vocabulary {
    /// Create a vocabulary holding the 256 single-byte base symbols.
    pub fn new() -> Self {
        Self::with_capacity(BASE_VOCAB_SIZE)
    }

    /// Create a base vocabulary with room for `capacity` entries in total.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut tokens = Vec::with_capacity(capacity.max(BASE_VOCAB_SIZE));
        tokens.extend((0..=u8::MAX).map(|b| vec![b]));
        Self { tokens }
    }

    /// Rebuild a vocabulary from stored expansions, checking them against `merges`.
    ///
    /// Base entries must be `[id]` and every learned entry must equal the
    /// concatenation of its parents.
    pub fn from_entries(entries: Vec<Vec<u8>>, merges: &MergeRules) -> Result<Self> {
        if entries.len() != BASE_VOCAB_SIZE + merges.len() {
            return Err(BpeError::InvalidMerge(format!(
                "vocabulary has {} entries but {} merges imply {}",
                entries.len(),
                merges.len(),
                BASE_VOCAB_SIZE + merges.len()
            )));
        }
        for (id, entry) in entries.iter().take(BASE_VOCAB_SIZE).enumerate() {
            if entry.as_slice() != [id as u8] {
                return Err(BpeError::InvalidMerge(format!(
                    "base symbol {} does not expand to its own byte",
                    id
                )));
            }
        }

        let mut vocab = Self::with_capacity(entries.len());
        for (rule, entry) in merges.iter().zip(entries.into_iter().skip(BASE_VOCAB_SIZE)) {
            vocab.add_merge(rule)?;
            if vocab.tokens[rule.new_id as usize] != entry {
                return Err(BpeError::InvalidMerge(format!(
                    "symbol {} does not expand to the bytes of ({}, {})",
                    rule.new_id, rule.pair.0, rule.pair.1
                )));
            }
        }
        Ok(vocab)
    }

    /// Rebuild the vocabulary implied by a merge list.
    pub fn from_merges(merges: &MergeRules) -> Result<Self> {
        let mut vocab = Self::with_capacity(BASE_VOCAB_SIZE + merges.len());
        for rule in merges {
            vocab.add_merge(rule)?;
        }
        Ok(vocab)
    }

    /// Add the entry defined by `rule`, returning its id.
    ///
    /// The rule must create the next free id from already defined parents.
    pub fn add_merge(&mut self, rule: &MergeRule) -> Result<SymbolId> {
        if rule.new_id as usize != self.tokens.len() {
            return Err(BpeError::InvalidMerge(format!(
                "expected new id {}, found {}",
                self.tokens.len(),
                rule.new_id
            )));
        }
        let (first, second) = rule.pair;
        let (Some(left), Some(right)) = (self.get(first), self.get(second)) else {
            return Err(BpeError::InvalidMerge(format!(
                "pair ({}, {}) references an undefined symbol",
                first, second
            )));
        };

        let mut bytes = Vec::with_capacity(left.len() + right.len());
        bytes.extend_from_slice(left);
        bytes.extend_from_slice(right);
        self.tokens.push(bytes);
        Ok(rule.new_id)
    }

    /// Get the byte expansion of a symbol.
    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&[u8]> {
        self.tokens.get(id as usize).map(Vec::as_slice)
    }

    /// Check if a symbol id is defined.
    #[inline]
    pub fn contains(&self, id: SymbolId) -> bool {
        (id as usize) < self.tokens.len()
    }

    /// Check if a symbol id is one of the single-byte base symbols.
    #[inline]
    pub fn is_base(id: SymbolId) -> bool {
        (id as usize) < BASE_VOCAB_SIZE
    }

    /// Concatenate the expansions of `ids`.
    pub fn expand(&self, ids: &[SymbolId]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(ids.len() * 2);
        for &id in ids {
            let bytes = self.get(id).ok_or(BpeError::UnknownTokenId(id))?;
            out.extend_from_slice(bytes);
        }
        Ok(out)
    }

    /// Human-readable rendering of a symbol, with invalid UTF-8 replaced.
    pub fn display(&self, id: SymbolId) -> Option<CompactString> {
        self.get(id)
            .map(|bytes| CompactString::from(String::from_utf8_lossy(bytes)))
    }

    /// Iterate over `(id, bytes)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &[u8])> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, bytes)| (id as SymbolId, bytes.as_slice()))
    }

    /// The symbol with the longest expansion; the lowest id wins ties.
    pub fn longest(&self) -> Option<(SymbolId, &[u8])> {
        self.iter().fold(None, |best, (id, bytes)| match best {
            Some((_, b)) if b.len() >= bytes.len() => best,
            _ => Some((id, bytes)),
        })
    }

    /// Number of defined symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; the base symbols are present from construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merges_for(pairs: &[(u32, u32)]) -> MergeRules {
        let mut merges = MergeRules::new();
        for &pair in pairs {
            merges.push(pair).unwrap();
        }
        merges
    }

    #[test]
    fn test_base_vocabulary() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.len(), 256);
        assert_eq!(vocab.get(0), Some(&[0u8][..]));
        assert_eq!(vocab.get(255), Some(&[255u8][..]));
        assert_eq!(vocab.get(256), None);
        assert!(Vocabulary::is_base(255));
        assert!(!Vocabulary::is_base(256));
    }

    #[test]
    fn test_add_merge_concatenates_parents() {
        let merges = merges_for(&[(104, 101), (256, 108)]);
        let vocab = Vocabulary::from_merges(&merges).unwrap();

        assert_eq!(vocab.len(), 258);
        assert_eq!(vocab.get(256), Some(&b"he"[..]));
        assert_eq!(vocab.get(257), Some(&b"hel"[..]));
        assert_eq!(vocab.display(257).as_deref(), Some("hel"));
    }

    #[test]
    fn test_add_merge_rejects_out_of_order_id() {
        let mut vocab = Vocabulary::new();
        let rule = MergeRule::new(1, (1, 2));
        assert!(vocab.add_merge(&rule).is_err());
        assert_eq!(vocab.len(), 256);
    }

    #[test]
    fn test_expand_and_unknown_id() {
        let merges = merges_for(&[(97, 97)]);
        let vocab = Vocabulary::from_merges(&merges).unwrap();

        assert_eq!(vocab.expand(&[256, 97]).unwrap(), b"aaa");
        assert!(matches!(
            vocab.expand(&[97, 999]),
            Err(BpeError::UnknownTokenId(999))
        ));
    }

    #[test]
    fn test_from_entries_validates_expansions() {
        let merges = merges_for(&[(97, 98)]);
        let mut entries: Vec<Vec<u8>> = (0..=255u8).map(|b| vec![b]).collect();
        entries.push(b"ab".to_vec());
        assert!(Vocabulary::from_entries(entries.clone(), &merges).is_ok());

        entries[256] = b"ba".to_vec();
        assert!(Vocabulary::from_entries(entries.clone(), &merges).is_err());

        entries[256] = b"ab".to_vec();
        entries[3] = vec![4];
        assert!(Vocabulary::from_entries(entries, &merges).is_err());
    }

    #[test]
    fn test_longest() {
        let merges = merges_for(&[(97, 97), (256, 256), (98, 98)]);
        let vocab = Vocabulary::from_merges(&merges).unwrap();
        let (id, bytes) = vocab.longest().unwrap();
        assert_eq!(id, 257);
        assert_eq!(bytes, b"aaaa");
    }

    #[test]
    fn test_display_is_lossy() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.display(0xff).as_deref(), Some("\u{FFFD}"));
    }
}
