//! Corpus artifact writer: `surahs.json`.

use std::path::Path;

use tracing::info;

use mushaf_shared::{Corpus, MushafError, Result};

/// Write the corpus as pretty-printed JSON.
///
/// The content goes to a hidden temp sibling first and is renamed into
/// place, so a partially-written artifact is never observable.
pub fn write_corpus(path: &Path, corpus: &Corpus) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MushafError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(corpus)
        .map_err(|e| MushafError::validation(format!("corpus serialization failed: {e}")))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus.json".into());
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, &json).map_err(|e| MushafError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| MushafError::io(path, e))?;

    info!(path = %path.display(), surahs = corpus.len(), "corpus artifact written");
    Ok(())
}

/// Read a corpus artifact back (validation and tests).
pub fn read_corpus(path: &Path) -> Result<Corpus> {
    let content = std::fs::read_to_string(path).map_err(|e| MushafError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| MushafError::validation(format!("invalid corpus artifact: {e}")))
}
