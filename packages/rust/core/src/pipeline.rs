//! End-to-end build pipeline: inputs → corpus → scrape → download → artifact.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use mushaf_audio::AudioDownloader;
use mushaf_scrape::PronunciationScraper;
use mushaf_shared::{
    AppConfig, Corpus, DownloadSettings, MushafError, Result, RunStats, ScrapeSettings,
    StatsSnapshot, Surah,
};
use mushaf_sources::SurahMeta;

use crate::artifact;

/// Canonical metadata database file name under the data directory.
const SURAH_DB_FILE: &str = "quran.sqlite";

/// Per-folder commentary database file name.
const TAFSIR_DB_FILE: &str = "tafsir.sqlite";

/// Minimum gap between periodic progress log lines.
const PROGRESS_LOG_EVERY: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Config / result
// ---------------------------------------------------------------------------

/// Configuration for one corpus build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Input root: `<data_dir>/quran.sqlite` and `<data_dir>/surah/<folder>/`.
    pub data_dir: PathBuf,
    /// Output root: `<output_dir>/surahs.json` and `<output_dir>/audios/`.
    pub output_dir: PathBuf,
    /// Pronunciation page settings.
    pub scrape: ScrapeSettings,
    /// Audio pipeline settings.
    pub download: DownloadSettings,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            data_dir: PathBuf::from(&config.paths.data_dir),
            output_dir: PathBuf::from(&config.paths.output_dir),
            scrape: config.scrape.clone(),
            download: config.download.clone(),
        }
    }
}

/// Summary of a completed build run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Path to the written `surahs.json`.
    pub corpus_path: PathBuf,
    /// Root of the audio tree.
    pub audio_root: PathBuf,
    /// Number of surahs in the corpus.
    pub surah_count: usize,
    /// End-of-run counters.
    pub stats: StatsSnapshot,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each surah page is scanned.
    fn surah_scanned(&self, number: u32, scanned: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn surah_scanned(&self, _number: u32, _scanned: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full corpus build.
///
/// 1. Load canonical surah metadata
/// 2. Read translation folders (text + optional tafsir)
/// 3. Scrape pronunciations per surah, spawning bounded download tasks
/// 4. Join the pending download set
/// 5. Write `surahs.json` and report counters
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub async fn build_corpus(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let started_at = Utc::now();
    let start = Instant::now();

    // --- Phase 1: metadata ---
    progress.phase("Loading surah metadata");
    let index = mushaf_sources::load_surah_index(&config.data_dir.join(SURAH_DB_FILE)).await?;
    info!(surahs = index.len(), "surah metadata loaded");

    // --- Phase 2: translation sources ---
    progress.phase("Reading translation sources");
    let mut corpus = load_text_sources(config, &index).await?;
    info!(
        surahs = corpus.len(),
        "translation sources read"
    );

    // --- Phase 3: scrape + spawn downloads ---
    progress.phase("Scraping pronunciations");
    let scraper = PronunciationScraper::new(config.scrape.clone())?;
    let audio_root = config.output_dir.join("audios");
    let downloader = Arc::new(AudioDownloader::new(
        &audio_root,
        config.download.clone(),
    )?);
    let stats = Arc::new(RunStats::new());
    let semaphore = Arc::new(Semaphore::new(config.download.concurrency.max(1) as usize));

    let mut handles = Vec::new();
    let total = corpus.len();
    let mut last_log = Instant::now();

    for (scanned, (number, surah)) in corpus.iter_mut().enumerate() {
        match scraper.scrape_surah(*number).await {
            Ok(verses) => {
                for found in verses {
                    stats.add_discovered();
                    surah.pronunciation.push(found.pronunciation);

                    // Downloads start immediately and overlap later scans;
                    // the semaphore caps outbound connections.
                    let downloader = downloader.clone();
                    let stats = stats.clone();
                    let semaphore = semaphore.clone();
                    handles.push(tokio::spawn(async move {
                        let _permit = match semaphore.acquire().await {
                            Ok(permit) => permit,
                            Err(_) => {
                                // Closed semaphore means the run is tearing
                                // down; count the asset and bow out.
                                warn!(verse = %found.verse, "download slot unavailable");
                                stats.add_failed();
                                return Ok(mushaf_audio::DownloadOutcome::Failed);
                            }
                        };
                        downloader
                            .download(found.verse, &found.audio_url, &stats)
                            .await
                    }));
                }
            }
            Err(e) => {
                // This surah contributes no pronunciations; the run goes on.
                warn!(surah = *number, error = %e, "page fetch failed");
            }
        }

        progress.surah_scanned(*number, scanned + 1, total);
        if last_log.elapsed() > PROGRESS_LOG_EVERY {
            let snap = stats.snapshot();
            info!(
                surah = *number,
                scanned = scanned + 1,
                total,
                downloaded = snap.downloaded,
                skipped = snap.skipped,
                "scan progress"
            );
            last_log = Instant::now();
        }

        // Politeness throttle between page fetches, not after the last one.
        if scanned + 1 < total {
            tokio::time::sleep(scraper.rate_limit()).await;
        }
    }

    // --- Phase 4: drain downloads ---
    progress.phase("Waiting for downloads");
    let mut fatal: Option<MushafError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(_)) => {}
            // Only storage exhaustion comes back as Err; remember the first.
            Ok(Err(e)) => {
                fatal.get_or_insert(e);
            }
            Err(e) => warn!(error = %e, "download task failed to join"),
        }
    }
    if let Some(e) = fatal {
        return Err(e);
    }

    // --- Phase 5: artifact ---
    progress.phase("Writing corpus artifact");
    let corpus_path = config.output_dir.join("surahs.json");
    artifact::write_corpus(&corpus_path, &corpus)?;

    let result = BuildResult {
        corpus_path,
        audio_root,
        surah_count: corpus.len(),
        stats: stats.snapshot(),
        started_at,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        surahs = result.surah_count,
        discovered = result.stats.discovered,
        downloaded = result.stats.downloaded,
        skipped = result.stats.skipped,
        failed = result.stats.failed,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build complete"
    );

    Ok(result)
}

/// Read every translation folder into the corpus: `data.txt` always,
/// `tafsir.sqlite` when present.
async fn load_text_sources(
    config: &BuildConfig,
    index: &std::collections::BTreeMap<u32, SurahMeta>,
) -> Result<Corpus> {
    let folders = mushaf_sources::discover_translation_folders(&config.data_dir)?;
    if folders.is_empty() {
        return Err(MushafError::validation(format!(
            "no translation folders under {}",
            config.data_dir.join("surah").display()
        )));
    }
    info!(folders = folders.len(), "translation folders discovered");

    let mut corpus = Corpus::new();

    for folder in &folders {
        let folder_dir = config.data_dir.join("surah").join(folder);

        let lines = mushaf_sources::read_translation_file(&folder_dir.join("data.txt"))?;
        for line in lines {
            let surah = entry(&mut corpus, line.surah, index);
            surah.set_translation(folder, line.ayah, line.text);
        }

        let tafsir_path = folder_dir.join(TAFSIR_DB_FILE);
        if tafsir_path.exists() {
            for row in mushaf_sources::load_tafsir(&tafsir_path).await? {
                let surah = entry(&mut corpus, row.surah, index);
                surah.set_tafsir(folder, row.ayah, row.entry);
            }
        }
    }

    Ok(corpus)
}

/// Get or create the corpus entry for a surah number, naming it from the
/// metadata index (with a plain fallback when the index lacks the row).
fn entry<'c>(
    corpus: &'c mut Corpus,
    number: u32,
    index: &std::collections::BTreeMap<u32, SurahMeta>,
) -> &'c mut Surah {
    corpus.entry(number).or_insert_with(|| {
        let name = match index.get(&number) {
            Some(meta) => meta.name.clone(),
            None => {
                warn!(surah = number, "surah missing from metadata index");
                format!("Surah {number}")
            }
        };
        Surah::new(number, name)
    })
}
