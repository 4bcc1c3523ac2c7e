//! Core domain types for the mushaf corpus.

use std::collections::BTreeMap;

use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VerseRef
// ---------------------------------------------------------------------------

/// A `(surah, ayah)` pair identifying a single verse.
///
/// Rendered as `surah.ayah` (e.g. `2.255`), the form used by the upstream
/// transliteration pages and by the audio tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseRef {
    /// Surah (chapter) number, 1-based.
    pub surah: u32,
    /// Ayah (verse) index within the surah, 1-based.
    pub ayah: u32,
}

impl VerseRef {
    pub fn new(surah: u32, ayah: u32) -> Self {
        Self { surah, ayah }
    }
}

impl std::fmt::Display for VerseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.surah, self.ayah)
    }
}

// ---------------------------------------------------------------------------
// SparseSeq
// ---------------------------------------------------------------------------

/// A sparse 1-indexed sequence backed by an explicit `index → value` map.
///
/// Translation and tafsir sources may skip verses; gaps are preserved, not
/// compacted. Serializes to a JSON array padded with `null` up to the highest
/// occupied index, which is exactly the artifact shape downstream consumers
/// expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseSeq<T> {
    entries: BTreeMap<u32, T>,
    highest: u32,
}

// Manual impl: an empty sequence needs nothing from `T`.
impl<T> Default for SparseSeq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSeq<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            highest: 0,
        }
    }

    /// Insert a value at a 1-based index. Index 0 is ignored (no valid verse
    /// carries it in any upstream source).
    pub fn insert(&mut self, index: u32, value: T) {
        if index == 0 {
            return;
        }
        self.entries.insert(index, value);
        self.highest = self.highest.max(index);
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.entries.get(&index)
    }

    /// Highest occupied index, or 0 when empty.
    pub fn highest(&self) -> u32 {
        self.highest
    }

    /// Number of occupied slots (gaps excluded).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate occupied `(index, value)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl<T: Serialize> Serialize for SparseSeq<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.highest as usize))?;
        for index in 1..=self.highest {
            seq.serialize_element(&self.entries.get(&index))?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SparseSeq<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let slots = Vec::<Option<T>>::deserialize(deserializer)?;
        let mut seq = SparseSeq::new();
        for (i, slot) in slots.into_iter().enumerate() {
            if let Some(value) = slot {
                seq.insert(i as u32 + 1, value);
            } else {
                // A trailing null still counts toward the highest index.
                seq.highest = seq.highest.max(i as u32 + 1);
            }
        }
        Ok(seq)
    }
}

// ---------------------------------------------------------------------------
// TafsirEntry
// ---------------------------------------------------------------------------

/// A commentary entry: primary text plus an optional footnote block.
///
/// Serializes as `[text]` or `[text, footnotes]` to match the artifact format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafsirEntry {
    pub text: String,
    pub footnotes: Option<String>,
}

impl TafsirEntry {
    pub fn new(text: impl Into<String>, footnotes: Option<String>) -> Self {
        Self {
            text: text.into(),
            footnotes,
        }
    }
}

impl Serialize for TafsirEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.footnotes.is_some() { 2 } else { 1 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.text)?;
        if let Some(notes) = &self.footnotes {
            seq.serialize_element(notes)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for TafsirEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut parts = Vec::<String>::deserialize(deserializer)?;
        if parts.is_empty() {
            return Err(D::Error::custom("tafsir entry must contain at least text"));
        }
        let footnotes = if parts.len() > 1 { parts.pop() } else { None };
        let text = parts.swap_remove(0);
        Ok(Self { text, footnotes })
    }
}

// ---------------------------------------------------------------------------
// Surah
// ---------------------------------------------------------------------------

/// One surah's aggregate record in the corpus artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surah {
    /// Display name from the canonical metadata database.
    pub name: String,
    /// Surah number, 1-based.
    pub number: u32,
    /// Commentary per source folder, sparse by ayah.
    pub tafsir: BTreeMap<String, SparseSeq<TafsirEntry>>,
    /// Translated verse text per source folder, sparse by ayah.
    #[serde(rename = "surah")]
    pub translations: BTreeMap<String, SparseSeq<String>>,
    /// Phonetic transliteration strings in discovery order.
    pub pronunciation: Vec<String>,
    /// Highest ayah index contributed by any translation source.
    pub length: u32,
}

impl Surah {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            tafsir: BTreeMap::new(),
            translations: BTreeMap::new(),
            pronunciation: Vec::new(),
            length: 0,
        }
    }

    /// Store a translated verse under a source folder key. Distinct sources
    /// never overwrite each other.
    pub fn set_translation(&mut self, source: &str, ayah: u32, text: impl Into<String>) {
        self.translations
            .entry(source.to_string())
            .or_default()
            .insert(ayah, text.into());
        self.length = self.length.max(ayah);
    }

    /// Store a tafsir entry under a source folder key.
    pub fn set_tafsir(&mut self, source: &str, ayah: u32, entry: TafsirEntry) {
        self.tafsir
            .entry(source.to_string())
            .or_default()
            .insert(ayah, entry);
    }
}

/// The full in-memory corpus, keyed by surah number.
///
/// `serde_json` renders integer keys as strings, giving the artifact's
/// `{"1": {...}, "2": {...}}` top level for free.
pub type Corpus = BTreeMap<u32, Surah>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_ref_display() {
        assert_eq!(VerseRef::new(2, 255).to_string(), "2.255");
    }

    #[test]
    fn sparse_seq_preserves_gaps() {
        let mut seq = SparseSeq::new();
        seq.insert(1, "one".to_string());
        seq.insert(4, "four".to_string());

        assert_eq!(seq.highest(), 4);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(2), None);

        let json = serde_json::to_string(&seq).expect("serialize");
        assert_eq!(json, r#"["one",null,null,"four"]"#);
    }

    #[test]
    fn sparse_seq_ignores_index_zero() {
        let mut seq = SparseSeq::new();
        seq.insert(0, "nothing".to_string());
        assert!(seq.is_empty());
        assert_eq!(seq.highest(), 0);
    }

    #[test]
    fn sparse_seq_roundtrip() {
        let mut seq = SparseSeq::new();
        seq.insert(2, 20u32);
        seq.insert(5, 50u32);

        let json = serde_json::to_string(&seq).expect("serialize");
        let parsed: SparseSeq<u32> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, seq);
    }

    #[test]
    fn tafsir_entry_serializes_as_array() {
        let bare = TafsirEntry::new("In the name of God", None);
        assert_eq!(
            serde_json::to_string(&bare).unwrap(),
            r#"["In the name of God"]"#
        );

        let with_notes = TafsirEntry::new("text", Some("note 1".to_string()));
        assert_eq!(
            serde_json::to_string(&with_notes).unwrap(),
            r#"["text","note 1"]"#
        );
    }

    #[test]
    fn independent_sources_do_not_overwrite() {
        let mut surah = Surah::new(1, "The Opening");
        surah.set_translation("en", 1, "english text");
        surah.set_translation("fr", 1, "texte français");

        assert_eq!(
            surah.translations["en"].get(1).map(String::as_str),
            Some("english text")
        );
        assert_eq!(
            surah.translations["fr"].get(1).map(String::as_str),
            Some("texte français")
        );
    }

    #[test]
    fn tafsir_accumulates_per_source() {
        // TafsirEntry has no Default; inserting must not require one.
        let mut surah = Surah::new(1, "The Opening");
        surah.set_tafsir("en", 1, TafsirEntry::new("first", None));
        surah.set_tafsir("en", 2, TafsirEntry::new("second", Some("note".into())));

        let seq: SparseSeq<TafsirEntry> = SparseSeq::default();
        assert!(seq.is_empty());

        assert_eq!(surah.tafsir["en"].len(), 2);
        assert_eq!(surah.tafsir["en"].get(2).unwrap().text, "second");
    }

    #[test]
    fn length_tracks_highest_ayah() {
        let mut surah = Surah::new(2, "The Cow");
        surah.set_translation("en", 7, "seven");
        surah.set_translation("en", 3, "three");
        assert_eq!(surah.length, 7);
    }

    #[test]
    fn corpus_top_level_keys_are_strings() {
        let mut corpus = Corpus::new();
        corpus.insert(1, Surah::new(1, "The Opening"));

        let json = serde_json::to_value(&corpus).expect("serialize");
        assert!(json.get("1").is_some());
        assert_eq!(json["1"]["name"], "The Opening");
        assert_eq!(json["1"]["number"], 1);
        // Field renamed to the artifact's `surah` key.
        assert!(json["1"].get("surah").is_some());
    }
}
