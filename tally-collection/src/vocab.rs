//! Word ↔ id registry
//! ---
//! `Vocab` hands out dense integer ids to words, starting at 1, in order of first
//! appearance.  It is an ordinary value: build one, pass it where ids are needed, and
//! serialize it alongside the containers keyed by those ids.

use std::collections::btree_map;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use tally::codec::{read_len, read_string, read_vint, write_len, write_string, write_vint, Writable};
use tally::{Error, Result};

/// Bidirectional word/id registry.
/// ```rust
///   use tally_collection::vocab::Vocab;
///
///   let mut vocab = Vocab::new();
///   assert_eq!(vocab.add("to"), 1);
///   assert_eq!(vocab.add("be"), 2);
///   assert_eq!(vocab.add("to"), 1);
///   assert_eq!(vocab.word(2), Some("be"));
///   assert_eq!(vocab.id("or"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vocab {
    ids: HashMap<String, i32>,
    words: BTreeMap<i32, String>,
    next: i32
}

impl Vocab {

    /// Creates an empty registry
    pub fn new() -> Self {
        Vocab {
            ids: HashMap::new(),
            words: BTreeMap::new(),
            next: 1
        }
    }

    /// Returns the id of `word`, assigning the next free id if it is new
    pub fn add(&mut self, word: &str) -> i32 {
        if let Some(id) = self.ids.get(word) {
            return *id;
        }
        while self.words.contains_key(&self.next) {
            self.next += 1;
        }
        let id = self.next;
        self.next += 1;
        self.ids.insert(word.to_owned(), id);
        self.words.insert(id, word.to_owned());
        id
    }

    /// Binds `word` to a specific id.  Rebinding either side to something else fails.
    pub fn register(&mut self, word: String, id: i32) -> Result<()> {
        if let Some(&bound) = self.ids.get(&word) {
            if bound != id {
                return Err(Error::Duplicate(format!("{:?} is already bound to id {}", word, bound)));
            }
            return Ok(());
        }
        if let Some(other) = self.words.get(&id) {
            return Err(Error::Duplicate(format!("id {} is already bound to {:?}", id, other)));
        }
        self.ids.insert(word.clone(), id);
        self.words.insert(id, word);
        Ok(())
    }

    /// Id of a word, if registered
    pub fn id(&self, word: &str) -> Option<i32> {
        self.ids.get(word).cloned()
    }

    /// Word for an id, if registered
    pub fn word(&self, id: i32) -> Option<&str> {
        self.words.get(&id).map(|w| w.as_str())
    }

    /// Number of registered words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterates over `(id, word)` in ascending id order
    pub fn iter(&self) -> Iter {
        Iter { inner: self.words.iter() }
    }
}

impl Default for Vocab {
    fn default() -> Self {
        Vocab::new()
    }
}

/// Iterator over a `Vocab`, ascending by id
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, i32, String>
}

impl <'a> Iterator for Iter<'a> {
    type Item = (i32, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(id, w)| (*id, w.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl Writable for Vocab {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_len(out, self.len())?;
        for (id, word) in self.iter() {
            write_vint(out, id)?;
            write_string(out, word)?;
        }
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        let n = read_len(input)?;
        let mut vocab = Vocab::new();
        for _ in 0..n {
            let id = read_vint(input)?;
            let word = read_string(input)?;
            if vocab.ids.contains_key(&word) || vocab.words.contains_key(&id) {
                return Err(Error::malformed(format!("vocabulary entry {} {:?} repeats", id, word)));
            }
            vocab.register(word, id)?;
        }
        Ok(vocab)
    }
}

#[cfg(test)]
mod vocab_test {
    use super::*;

    #[test]
    fn test_dense_ids() {
        let mut v = Vocab::new();
        let ids: Vec<i32> = "a b a c b d".split(' ').map(|w| v.add(w)).collect();
        assert_eq!(ids, vec![1, 2, 1, 3, 2, 4]);
        assert_eq!(v.len(), 4);
        let words: Vec<&str> = v.iter().map(|(_, w)| w).collect();
        assert_eq!(words, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_register() {
        let mut v = Vocab::new();
        v.register("x".into(), 10).unwrap();
        v.register("x".into(), 10).unwrap();
        assert!(v.register("x".into(), 11).is_err());
        match v.register("y".into(), 10) {
            Err(Error::Duplicate(_)) => (),
            other => panic!("expected duplicate, got {:?}", other)
        }
        // Explicit ids are skipped by later additions
        v.register("z".into(), 1).unwrap();
        assert_eq!(v.add("w"), 2);
        assert_eq!(v.id("z"), Some(1));
        assert_eq!(v.word(10), Some("x"));
    }

    #[test]
    fn test_round_trip() {
        let mut v = Vocab::new();
        for w in ["café", "日本語", "plain"].iter() {
            v.add(w);
        }
        v.register("neg".into(), -5).unwrap();
        let back = Vocab::from_bytes(&v.to_bytes().unwrap()).unwrap();
        assert_eq!(back.word(-5), Some("neg"));
        assert_eq!(back.id("日本語"), Some(2));
        assert_eq!(back.iter().collect::<Vec<_>>(), v.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_repeated_entry_rejected() {
        let mut bytes = Vec::new();
        write_len(&mut bytes, 2).unwrap();
        for _ in 0..2 {
            write_vint(&mut bytes, 1).unwrap();
            write_string(&mut bytes, "a").unwrap();
        }
        match Vocab::from_bytes(&bytes) {
            Err(Error::Malformed(_)) => (),
            other => panic!("expected malformed, got {:?}", other)
        }
    }
}
