use core::fmt;
use core::str::FromStr;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::token::Token;
use crate::ProtocolError;

/// Separator between the T side and the H side of an alignment key.
pub const KEY_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    TtoH,
    HtoT,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TtoH => f.write_str("TtoH"),
            Direction::HtoT => f.write_str("HtoT"),
        }
    }
}

impl FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TtoH" => Ok(Direction::TtoH),
            "HtoT" => Ok(Direction::HtoT),
            other => Err(ProtocolError::UnknownDirection(other.to_string())),
        }
    }
}

/// A judgment from the lexical aligner, e.g. `WORDNET__3.0__HYPERNYM` with
/// strength 0.5 in the T→H direction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlignmentEntry {
    pub link_info: String,
    pub strength: f64,
    pub direction: Direction,
}

impl AlignmentEntry {
    pub fn new(link_info: impl Into<String>, strength: f64, direction: Direction) -> Self {
        Self {
            link_info: link_info.into(),
            strength,
            direction,
        }
    }

    pub fn is_antonym(&self) -> bool {
        self.link_info.contains("ANTONYM")
    }

    /// `<link info>:<direction>`, the text stored in a transformation's info.
    pub fn describe(&self) -> String {
        format!("{}:{}", self.link_info, self.direction)
    }
}

/// Aligner output keyed by `T__H`, the T text and the H text joined by
/// [`KEY_SEPARATOR`]. Keys are kept whole: a side may itself contain
/// underscores.
///
/// Only the first entry reported for a key is kept.
#[derive(Debug, Clone, Default)]
pub struct AlignmentMap {
    entries: HashMap<String, AlignmentEntry>,
}

impl AlignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the pair already had an entry; the old one stays.
    pub fn insert(&mut self, t_text: &str, h_text: &str, entry: AlignmentEntry) -> bool {
        let mut key = String::with_capacity(t_text.len() + KEY_SEPARATOR.len() + h_text.len());
        push_key(&mut key, t_text, h_text);
        self.insert_raw(key, entry)
    }

    /// Inserts under a `T__H` key as produced at the aligner boundary. The
    /// key is stored as given; it must contain the separator.
    pub fn insert_keyed(&mut self, key: &str, entry: AlignmentEntry) -> Result<bool, ProtocolError> {
        if !key.contains(KEY_SEPARATOR) {
            return Err(ProtocolError::MalformedAlignmentKey(key.to_string()));
        }
        Ok(self.insert_raw(key.to_string(), entry))
    }

    fn insert_raw(&mut self, key: String, entry: AlignmentEntry) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    pub fn get(&self, t_text: &str, h_text: &str) -> Option<&AlignmentEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let mut key = String::new();
        self.find(&mut key, t_text, h_text)
    }

    /// Entry stored under the exact `T__H` key.
    pub fn get_keyed(&self, key: &str) -> Option<&AlignmentEntry> {
        self.entries.get(key)
    }

    /// Surface forms first, then lemmas.
    pub fn lookup(&self, t: &Token, h: &Token) -> Option<&AlignmentEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let mut key = String::with_capacity(
            t.form().len().max(t.lemma().len()) + KEY_SEPARATOR.len() + h.form().len().max(h.lemma().len()),
        );
        if let Some(entry) = self.find(&mut key, t.form(), h.form()) {
            return Some(entry);
        }
        self.find(&mut key, t.lemma(), h.lemma())
    }

    fn find(&self, key: &mut String, t_text: &str, h_text: &str) -> Option<&AlignmentEntry> {
        key.clear();
        push_key(key, t_text, h_text);
        self.entries.get(key.as_str())
    }

    /// Adds the entries of `fallback` whose keys are not present yet.
    pub fn fill_from(&mut self, fallback: &AlignmentMap) {
        for (key, entry) in &fallback.entries {
            if !self.entries.contains_key(key) {
                self.entries.insert(key.clone(), entry.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(T__H key, entry)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlignmentEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

fn push_key(buffer: &mut String, t_text: &str, h_text: &str) {
    buffer.push_str(t_text);
    buffer.push_str(KEY_SEPARATOR);
    buffer.push_str(h_text);
}

impl<T, H> Extend<(T, H, AlignmentEntry)> for AlignmentMap
where
    T: AsRef<str>,
    H: AsRef<str>,
{
    fn extend<I: IntoIterator<Item = (T, H, AlignmentEntry)>>(&mut self, iter: I) {
        for (t, h, entry) in iter {
            self.insert(t.as_ref(), h.as_ref(), entry);
        }
    }
}

impl<T, H> FromIterator<(T, H, AlignmentEntry)> for AlignmentMap
where
    T: AsRef<str>,
    H: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (T, H, AlignmentEntry)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// User-provided positive alignments, each side written as `form_POS`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualAlignments {
    pairs: HashSet<(String, String)>,
}

impl ManualAlignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, t_key: impl Into<String>, h_key: impl Into<String>) -> bool {
        self.pairs.insert((t_key.into(), h_key.into()))
    }

    pub fn contains(&self, t: &Token, h: &Token) -> bool {
        if self.pairs.is_empty() {
            return false;
        }
        self.pairs.contains(&(Self::key(t), Self::key(h)))
    }

    /// `form_POS`
    pub fn key(token: &Token) -> String {
        format!("{}_{}", token.form(), token.pos())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
