//! Shared types, error model, and configuration for mushaf.
//!
//! This crate is the foundation depended on by all other mushaf crates.
//! It provides:
//! - [`MushafError`] — the unified error type
//! - Domain types ([`Corpus`], [`Surah`], [`VerseRef`], [`SparseSeq`])
//! - Run counters ([`RunStats`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod stats;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DownloadSettings, PathsConfig, ScrapeSettings, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{MushafError, Result};
pub use stats::{RunStats, StatsSnapshot};
pub use types::{Corpus, SparseSeq, Surah, TafsirEntry, VerseRef};
