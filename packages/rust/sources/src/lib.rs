//! Input collaborators: the canonical metadata database, per-folder
//! translation files, and optional per-folder tafsir databases.
//!
//! The expected on-disk layout under the configured data directory:
//!
//! ```text
//! <data_dir>/
//! ├── quran.sqlite                  (table `surahs`: id, name_en, …)
//! └── surah/
//!     ├── <folder>/                 (one directory per translation source)
//!     │   ├── data.txt              (pipe-delimited `surah|ayah|text` lines)
//!     │   └── tafsir.sqlite         (optional; table `translations`)
//!     └── …
//! ```
//!
//! All readers are consume-only; nothing here writes to the inputs.

mod relational;
mod text;

pub use relational::{SurahMeta, TafsirRow, load_surah_index, load_tafsir};
pub use text::{
    TranslationLine, discover_translation_folders, parse_translation_line, read_translation_file,
};
