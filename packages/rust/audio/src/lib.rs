//! Resilient audio clip downloads with idempotent, at-most-once writes.
//!
//! Each asset is identified by its [`VerseRef`] and lands at
//! `<root>/<surah>/<ayah><ext>`. Presence of the target file is the sole
//! existence signal; re-running the pipeline never re-fetches or rewrites an
//! existing asset. Transient failures retry with linear backoff; a verse that
//! fails all attempts is counted and the run continues.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use url::Url;

use mushaf_shared::{DownloadSettings, MushafError, Result, RunStats, VerseRef};

/// User-Agent string for download requests.
const USER_AGENT: &str = concat!("mushaf/", env!("CARGO_PKG_VERSION"));

/// Terminal state of one download operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The asset was fetched and written.
    Downloaded,
    /// The target file already existed; nothing was fetched.
    Skipped,
    /// All attempts failed; recorded, never fatal for the run.
    Failed,
}

/// Downloads audio clips into the on-disk audio tree.
pub struct AudioDownloader {
    client: Client,
    root: PathBuf,
    settings: DownloadSettings,
}

impl AudioDownloader {
    /// Create a downloader writing under `root` (the `audios/` directory).
    pub fn new(root: impl Into<PathBuf>, settings: DownloadSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| MushafError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            root: root.into(),
            settings,
        })
    }

    /// Deterministic target path for a verse's clip:
    /// `<root>/<surah>/<ayah><ext>`, `ext` taken from the URL.
    pub fn target_path(&self, verse: VerseRef, audio_url: &str) -> PathBuf {
        self.root
            .join(verse.surah.to_string())
            .join(format!("{}{}", verse.ayah, url_extension(audio_url)))
    }

    /// Download one asset, with skip-if-present and bounded retries.
    ///
    /// Every outcome except storage exhaustion is returned as an
    /// [`DownloadOutcome`]; one failed asset must never abort the run.
    #[instrument(skip(self, stats), fields(verse = %verse))]
    pub async fn download(
        &self,
        verse: VerseRef,
        audio_url: &str,
        stats: &RunStats,
    ) -> Result<DownloadOutcome> {
        let dir = self.root.join(verse.surah.to_string());
        let target = self.target_path(verse, audio_url);

        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            debug!(target = %target.display(), "asset present, skipping");
            stats.add_skipped();
            return Ok(DownloadOutcome::Skipped);
        }

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            return self.record_failure(verse, MushafError::io(&dir, e), stats);
        }

        // Stream into a hidden temp sibling; only a completed download is
        // renamed into place, so a half-written file never looks complete.
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| verse.ayah.to_string());
        let temp = dir.join(format!(".{file_name}.tmp"));

        let attempts = self.settings.retry_attempts.max(1);
        for attempt in 1..=attempts {
            match self.fetch_to(audio_url, &temp).await {
                Ok(()) => {
                    if let Err(e) = tokio::fs::rename(&temp, &target).await {
                        let _ = tokio::fs::remove_file(&temp).await;
                        return self.record_failure(verse, MushafError::io(&target, e), stats);
                    }
                    debug!(target = %target.display(), attempt, "asset downloaded");
                    stats.add_downloaded();
                    return Ok(DownloadOutcome::Downloaded);
                }
                Err(e) if attempt < attempts => {
                    let backoff =
                        Duration::from_millis(self.settings.backoff_base_ms * u64::from(attempt));
                    warn!(error = %e, attempt, backoff_ms = backoff.as_millis() as u64, "attempt failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&temp).await;
                    return self.record_failure(verse, e, stats);
                }
            }
        }

        unreachable!("retry loop always returns");
    }

    /// Count a permanent failure and keep the run alive, unless the disk is
    /// full — that propagates to the caller.
    fn record_failure(
        &self,
        verse: VerseRef,
        error: MushafError,
        stats: &RunStats,
    ) -> Result<DownloadOutcome> {
        if error.is_storage_full() {
            return Err(error);
        }
        warn!(%verse, %error, "download failed permanently");
        stats.add_failed();
        Ok(DownloadOutcome::Failed)
    }

    /// One fetch attempt: stream the response body into `temp`.
    async fn fetch_to(&self, audio_url: &str, temp: &std::path::Path) -> Result<()> {
        let response = self
            .client
            .get(audio_url)
            .send()
            .await
            .map_err(|e| MushafError::Network(format!("{audio_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MushafError::Network(format!("{audio_url}: HTTP {status}")));
        }

        let mut file = tokio::fs::File::create(temp)
            .await
            .map_err(|e| MushafError::io(temp, e))?;

        let mut response = response;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MushafError::Network(format!("{audio_url}: stream error: {e}")))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| MushafError::io(temp, e))?;
        }

        file.flush().await.map_err(|e| MushafError::io(temp, e))?;
        Ok(())
    }
}

/// File extension (dot included) of a URL's final path segment, or empty.
fn url_extension(audio_url: &str) -> String {
    let path = match Url::parse(audio_url) {
        Ok(u) => u.path().to_string(),
        Err(_) => audio_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rfind('.') {
        Some(i) if i > 0 => segment[i..].to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mushaf-audio-{tag}-{}", uuid::Uuid::now_v7()))
    }

    fn settings(backoff_ms: u64) -> DownloadSettings {
        DownloadSettings {
            concurrency: 4,
            retry_attempts: 3,
            backoff_base_ms: backoff_ms,
            timeout_secs: 5,
        }
    }

    #[test]
    fn extension_comes_from_url_path() {
        assert_eq!(url_extension("http://h/clips/7.mp3"), ".mp3");
        assert_eq!(url_extension("http://h/clips/7.mp3?v=2"), ".mp3");
        assert_eq!(url_extension("http://h/clips/seven"), "");
        assert_eq!(url_extension("relative/clips/7.wav"), ".wav");
    }

    #[test]
    fn target_path_is_deterministic() {
        let dl = AudioDownloader::new("/tmp/audios", settings(0)).unwrap();
        let path = dl.target_path(VerseRef::new(2, 255), "http://h/x/255.mp3");
        assert_eq!(path, PathBuf::from("/tmp/audios/2/255.mp3"));
    }

    #[tokio::test]
    async fn downloads_and_then_skips() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/clips/1.mp3"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(b"AUDIO".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let root = temp_root("skip");
        let dl = AudioDownloader::new(&root, settings(0)).unwrap();
        let stats = RunStats::new();
        let url = format!("{}/clips/1.mp3", server.uri());
        let verse = VerseRef::new(1, 1);

        let first = dl.download(verse, &url, &stats).await.unwrap();
        assert_eq!(first, DownloadOutcome::Downloaded);

        let target = root.join("1").join("1.mp3");
        assert_eq!(std::fs::read(&target).unwrap(), b"AUDIO");
        // No temp leftovers.
        assert!(!root.join("1").join(".1.mp3.tmp").exists());

        // Second run: skip, no re-fetch (mock expects exactly one request),
        // content unchanged.
        let second = dl.download(verse, &url, &stats).await.unwrap();
        assert_eq!(second, DownloadOutcome::Skipped);
        assert_eq!(std::fs::read(&target).unwrap(), b"AUDIO");

        let snap = stats.snapshot();
        assert_eq!(snap.downloaded, 1);
        assert_eq!(snap.skipped, 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn failing_asset_uses_exactly_configured_attempts() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/clips/2.mp3"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let root = temp_root("retry");
        let dl = AudioDownloader::new(&root, settings(1)).unwrap();
        let stats = RunStats::new();
        let url = format!("{}/clips/2.mp3", server.uri());

        let outcome = dl.download(VerseRef::new(1, 2), &url, &stats).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::Failed);
        assert_eq!(stats.snapshot().failed, 1);

        // Nothing claiming to be the asset may exist, and no temp leftovers.
        assert!(!root.join("1").join("2.mp3").exists());
        assert!(!root.join("1").join(".2.mp3.tmp").exists());

        server.verify().await;
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn transient_failure_recovers_within_one_call() {
        let server = wiremock::MockServer::start().await;
        // First attempt sees a 500; the mounted-later mock serves the retry.
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/clips/3.mp3"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/clips/3.mp3"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(b"LATE".to_vec()))
            .mount(&server)
            .await;

        let root = temp_root("recover");
        let dl = AudioDownloader::new(&root, settings(1)).unwrap();
        let stats = RunStats::new();
        let url = format!("{}/clips/3.mp3", server.uri());

        let outcome = dl.download(VerseRef::new(1, 3), &url, &stats).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::Downloaded);
        assert_eq!(std::fs::read(root.join("1").join("3.mp3")).unwrap(), b"LATE");
        assert_eq!(stats.snapshot().failed, 0);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn extensionless_url_writes_bare_index_file() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/clips/four"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(b"X".to_vec()))
            .mount(&server)
            .await;

        let root = temp_root("noext");
        let dl = AudioDownloader::new(&root, settings(0)).unwrap();
        let stats = RunStats::new();
        let url = format!("{}/clips/four", server.uri());

        let outcome = dl.download(VerseRef::new(1, 4), &url, &stats).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::Downloaded);
        assert!(root.join("1").join("4").exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
