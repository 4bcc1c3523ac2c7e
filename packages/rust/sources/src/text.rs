//! Pipe-delimited translation corpus reader and source folder discovery.

use std::path::Path;

use tracing::warn;

use mushaf_shared::{MushafError, Result};

/// One parsed `surah|ayah|text` line from a source's `data.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationLine {
    pub surah: u32,
    pub ayah: u32,
    pub text: String,
}

/// List translation source folders under `<data_dir>/surah/`, sorted by name.
///
/// The folder name doubles as the source identifier in the artifact.
pub fn discover_translation_folders(data_dir: &Path) -> Result<Vec<String>> {
    let surah_dir = data_dir.join("surah");
    let entries =
        std::fs::read_dir(&surah_dir).map_err(|e| MushafError::io(&surah_dir, e))?;

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MushafError::io(&surah_dir, e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            folders.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    folders.sort();
    Ok(folders)
}

/// Parse a single pipe-delimited line. Blank and malformed lines yield `None`;
/// both are normal skips, not errors.
pub fn parse_translation_line(line: &str) -> Option<TranslationLine> {
    if line.trim().is_empty() {
        return None;
    }

    let mut parts = line.splitn(3, '|');
    let surah = parts.next()?.trim().parse().ok()?;
    let ayah = parts.next()?.trim().parse().ok()?;
    let text = parts.next()?.trim().to_string();

    Some(TranslationLine { surah, ayah, text })
}

/// Read a source folder's `data.txt`, silently skipping blank lines and
/// warning once per malformed line.
pub fn read_translation_file(path: &Path) -> Result<Vec<TranslationLine>> {
    let content = std::fs::read_to_string(path).map_err(|e| MushafError::io(path, e))?;

    let mut lines = Vec::new();
    for (lineno, raw) in content.lines().enumerate() {
        match parse_translation_line(raw) {
            Some(line) => lines.push(line),
            None if raw.trim().is_empty() => {}
            None => {
                warn!(path = %path.display(), lineno = lineno + 1, "skipping malformed line");
            }
        }
    }
    Ok(lines)
}
