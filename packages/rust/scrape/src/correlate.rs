//! Verse correlation: find the `[surah.ayah]` marker inside a gloss string.

use std::sync::LazyLock;

use regex::Regex;

use mushaf_shared::VerseRef;

/// A bracketed `digits.digits` marker, e.g. `[2.255]`.
static VERSE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\.(\d+)\]").expect("valid regex"));

/// Extract the verse reference from a gloss string.
///
/// The first marker wins; a gloss without one is simply not a verse row and
/// yields `None` — a normal skip for the caller, never an error.
pub fn correlate(gloss: &str) -> Option<VerseRef> {
    let caps = VERSE_MARKER.captures(gloss)?;
    let surah = caps[1].parse().ok()?;
    let ayah = caps[2].parse().ok()?;
    Some(VerseRef::new(surah, ayah))
}
