//! Corpus build orchestration: wires sources, scraping, downloads, and the
//! artifact writer into one run.

pub mod artifact;
pub mod pipeline;

pub use pipeline::{BuildConfig, BuildResult, ProgressReporter, SilentProgress, build_corpus};
