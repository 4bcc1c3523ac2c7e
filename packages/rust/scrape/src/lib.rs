//! Pronunciation page scraping: one remote page per surah, scanned for
//! verse rows carrying a transliteration fragment and an audio clip.

mod correlate;
mod dom;
mod locate;

use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument, trace};
use url::Url;

use mushaf_shared::{MushafError, Result, ScrapeSettings, VerseRef};

pub use correlate::correlate;
pub use dom::cell_fragment;
pub use locate::locate_audio_url;

/// User-Agent string for scrape requests.
const USER_AGENT: &str = concat!("mushaf/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// VerseAudio
// ---------------------------------------------------------------------------

/// A fully-qualified verse discovery: annotation plus downloadable clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseAudio {
    /// The verse this row describes, per its gloss marker.
    pub verse: VerseRef,
    /// Semantic annotation string (never raw markup, never empty).
    pub pronunciation: String,
    /// Absolute audio clip URL.
    pub audio_url: String,
}

// ---------------------------------------------------------------------------
// Page address
// ---------------------------------------------------------------------------

/// Deterministic page address for a surah: number clamped to `[1, 999]` and
/// zero-padded to three digits.
pub fn page_url(base_url: &str, number: u32) -> String {
    let n = number.clamp(1, 999);
    format!("{}/{n:03}.asp", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

/// Fetches and scans one transliteration page per surah.
pub struct PronunciationScraper {
    client: Client,
    settings: ScrapeSettings,
}

impl PronunciationScraper {
    /// Create a scraper with the given settings.
    pub fn new(settings: ScrapeSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| MushafError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    /// Politeness delay to insert between successive surah page fetches.
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.settings.rate_limit_ms)
    }

    /// Fetch and scan the page for one surah.
    ///
    /// A failed fetch is an error for this surah only; the caller logs it and
    /// treats the surah's contribution as empty without aborting the run.
    #[instrument(skip(self), fields(surah = number))]
    pub async fn scrape_surah(&self, number: u32) -> Result<Vec<VerseAudio>> {
        let url = page_url(&self.settings.base_url, number);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MushafError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MushafError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MushafError::Network(format!("{url}: body read failed: {e}")))?;

        let verses = scan_page(&body, Url::parse(&url).ok().as_ref());
        debug!(url, verses = verses.len(), "surah page scanned");
        Ok(verses)
    }
}

/// Scan a fetched page for qualifying verse rows.
///
/// A qualifying row has exactly 3 cells and an audio marker in the first.
/// Per row: the second cell's gloss is correlated to a verse, the first cell
/// (minus audio/anchor children) is converted to an annotation, and the audio
/// URL is located. Rows failing any precondition are silently skipped —
/// expected, not an error path.
pub fn scan_page(html: &str, base: Option<&Url>) -> Vec<VerseAudio> {
    let row_sel = Selector::parse("table tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();
    let marker_sel = Selector::parse(locate::AUDIO_MARKER_SELECTOR).unwrap();

    let doc = Html::parse_document(html);
    let mut verses = Vec::new();

    for row in doc.select(&row_sel) {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() != 3 {
            continue;
        }
        if cells[0].select(&marker_sel).next().is_none() {
            continue;
        }

        let gloss = cells[1].text().collect::<String>();
        let Some(verse) = correlate(&gloss) else {
            trace!("row without verse marker, skipping");
            continue;
        };

        let pronunciation = mushaf_annotate::annotate(&cell_fragment(cells[0]));
        let Some(audio_url) = locate_audio_url(cells[0], base) else {
            trace!(%verse, "row without audio address, skipping");
            continue;
        };

        if pronunciation.is_empty() {
            trace!(%verse, "empty pronunciation, skipping");
            continue;
        }

        verses.push(VerseAudio {
            verse,
            pronunciation,
            audio_url,
        });
    }

    verses
}
