//! libSQL readers for the canonical surah metadata and per-source tafsir.

use std::collections::BTreeMap;
use std::path::Path;

use libsql::params;
use tracing::debug;

use mushaf_shared::{MushafError, Result, TafsirEntry};

/// Canonical metadata for one surah from `quran.sqlite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurahMeta {
    pub id: u32,
    /// English display name (`name_en` column).
    pub name: String,
}

/// One commentary row from a source's `tafsir.sqlite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafsirRow {
    pub surah: u32,
    pub ayah: u32,
    pub entry: TafsirEntry,
}

async fn open(path: &Path) -> Result<libsql::Connection> {
    let db = libsql::Builder::new_local(path)
        .build()
        .await
        .map_err(|e| MushafError::Storage(e.to_string()))?;
    db.connect().map_err(|e| MushafError::Storage(e.to_string()))
}

/// Load the surah index (`SELECT id, name_en FROM surahs`), keyed by number.
pub async fn load_surah_index(path: &Path) -> Result<BTreeMap<u32, SurahMeta>> {
    let conn = open(path).await?;

    let mut rows = conn
        .query("SELECT id, name_en FROM surahs", params![])
        .await
        .map_err(|e| MushafError::Storage(e.to_string()))?;

    let mut index = BTreeMap::new();
    while let Ok(Some(row)) = rows.next().await {
        let id = row
            .get::<u32>(0)
            .map_err(|e| MushafError::Storage(e.to_string()))?;
        let name = row
            .get::<String>(1)
            .map_err(|e| MushafError::Storage(e.to_string()))?;
        index.insert(id, SurahMeta { id, name });
    }

    debug!(count = index.len(), path = %path.display(), "loaded surah index");
    Ok(index)
}

/// Load all tafsir rows from a source's `tafsir.sqlite`.
///
/// The stored translation text begins with a repeated ayah-number prefix
/// whose length equals the ayah's digit count; it is stripped before use.
/// Footnotes are kept only when non-blank.
pub async fn load_tafsir(path: &Path) -> Result<Vec<TafsirRow>> {
    let conn = open(path).await?;

    let mut rows = conn
        .query(
            "SELECT sura, aya, translation, footnotes FROM translations",
            params![],
        )
        .await
        .map_err(|e| MushafError::Storage(e.to_string()))?;

    let mut out = Vec::new();
    while let Ok(Some(row)) = rows.next().await {
        let surah = row
            .get::<u32>(0)
            .map_err(|e| MushafError::Storage(e.to_string()))?;
        let ayah = row
            .get::<u32>(1)
            .map_err(|e| MushafError::Storage(e.to_string()))?;
        let translation = row
            .get::<String>(2)
            .map_err(|e| MushafError::Storage(e.to_string()))?;
        let footnotes: Option<String> = row.get(3).ok();

        let text = strip_index_prefix(&translation, ayah);
        let footnotes = footnotes.filter(|f| !f.trim().is_empty());

        out.push(TafsirRow {
            surah,
            ayah,
            entry: TafsirEntry::new(text, footnotes),
        });
    }

    debug!(count = out.len(), path = %path.display(), "loaded tafsir rows");
    Ok(out)
}

/// Drop the leading ayah-number prefix: as many bytes as the ayah has
/// digits, then trim.
fn strip_index_prefix(text: &str, ayah: u32) -> String {
    let prefix_len = ayah.to_string().len();
    text.get(prefix_len..).unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_prefix_strip_matches_digit_count() {
        assert_eq!(strip_index_prefix("1 In the name of God", 1), "In the name of God");
        assert_eq!(strip_index_prefix("255 The Throne Verse", 255), "The Throne Verse");
        assert_eq!(strip_index_prefix("7", 7), "");
        assert_eq!(strip_index_prefix("", 12), "");
    }

    fn temp_db(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("mushaf-sql-{tag}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("test.sqlite")
    }

    #[tokio::test]
    async fn surah_index_loads_from_sqlite() {
        let path = temp_db("index");
        let conn = open(&path).await.unwrap();
        conn.execute_batch(
            "CREATE TABLE surahs (id INTEGER PRIMARY KEY, name_en TEXT);
             INSERT INTO surahs (id, name_en) VALUES (1, 'The Opening');
             INSERT INTO surahs (id, name_en) VALUES (2, 'The Cow');",
        )
        .await
        .unwrap();

        let index = load_surah_index(&path).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&1].name, "The Opening");
        assert_eq!(index[&2].name, "The Cow");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn tafsir_rows_strip_prefix_and_filter_footnotes() {
        let path = temp_db("tafsir");
        let conn = open(&path).await.unwrap();
        conn.execute_batch(
            "CREATE TABLE translations (sura INTEGER, aya INTEGER, translation TEXT, footnotes TEXT);
             INSERT INTO translations VALUES (1, 1, '1 In the name of God', NULL);
             INSERT INTO translations VALUES (1, 2, '2 All praise is due to God', '  ');
             INSERT INTO translations VALUES (2, 255, '255 The Throne Verse', 'see 2:256');",
        )
        .await
        .unwrap();

        let rows = load_tafsir(&path).await.unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].entry.text, "In the name of God");
        assert_eq!(rows[0].entry.footnotes, None);
        // Blank footnotes are dropped, not kept as empty strings.
        assert_eq!(rows[1].entry.footnotes, None);
        assert_eq!(rows[2].surah, 2);
        assert_eq!(rows[2].ayah, 255);
        assert_eq!(rows[2].entry.footnotes.as_deref(), Some("see 2:256"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
