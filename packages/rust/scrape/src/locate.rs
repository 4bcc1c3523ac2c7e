//! Asset location: pull the audio clip URL out of a verse row cell.

use scraper::{ElementRef, Selector};
use url::Url;

/// CSS id prefix that marks the audio element in a verse row.
pub(crate) const AUDIO_MARKER_SELECTOR: &str = r#"audio[id^="myAudio"]"#;

/// Locate the downloadable audio URL inside a cell.
///
/// Lookup order: the marker audio element's nested `<source src>` child,
/// then the audio element's own `src`. Relative addresses are resolved
/// against `base`. No usable address means "no asset for this verse" and the
/// caller skips the download without error.
pub fn locate_audio_url(cell: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let audio_sel = Selector::parse(AUDIO_MARKER_SELECTOR).unwrap();
    let source_sel = Selector::parse("source").unwrap();

    let audio = cell.select(&audio_sel).next()?;

    let raw = audio
        .select(&source_sel)
        .next()
        .and_then(|s| s.value().attr("src"))
        .filter(|s| !s.is_empty())
        .or_else(|| audio.value().attr("src").filter(|s| !s.is_empty()))?;

    match base.and_then(|b| b.join(raw).ok()) {
        Some(resolved) => Some(resolved.to_string()),
        None => Some(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_td(doc: &Html) -> ElementRef<'_> {
        let td = Selector::parse("td").unwrap();
        doc.select(&td).next().expect("td present")
    }

    #[test]
    fn prefers_nested_source_child() {
        let html = r#"<table><tr><td>
            <audio id="myAudio7" src="fallback.mp3"><source src="clips/7.mp3"></audio>
        </td></tr></table>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            locate_audio_url(first_td(&doc), None),
            Some("clips/7.mp3".to_string())
        );
    }

    #[test]
    fn falls_back_to_audio_src() {
        let html = r#"<table><tr><td>
            <audio id="myAudio7" src="fallback.mp3"></audio>
        </td></tr></table>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            locate_audio_url(first_td(&doc), None),
            Some("fallback.mp3".to_string())
        );
    }

    #[test]
    fn missing_everything_is_none() {
        let no_audio = Html::parse_document("<table><tr><td>text only</td></tr></table>");
        assert_eq!(locate_audio_url(first_td(&no_audio), None), None);

        let empty_srcs = Html::parse_document(
            r#"<table><tr><td><audio id="myAudio1" src=""><source src=""></audio></td></tr></table>"#,
        );
        assert_eq!(locate_audio_url(first_td(&empty_srcs), None), None);
    }

    #[test]
    fn ignores_audio_without_marker_prefix() {
        let html = r#"<table><tr><td>
            <audio id="player3" src="other.mp3"></audio>
        </td></tr></table>"#;
        let doc = Html::parse_document(html);
        assert_eq!(locate_audio_url(first_td(&doc), None), None);
    }

    #[test]
    fn resolves_relative_against_base() {
        let html = r#"<table><tr><td>
            <audio id="myAudio1"><source src="../clips/1.mp3"></audio>
        </td></tr></table>"#;
        let doc = Html::parse_document(html);
        let base = Url::parse("http://example.com/quran/pages/001.asp").unwrap();
        assert_eq!(
            locate_audio_url(first_td(&doc), Some(&base)),
            Some("http://example.com/quran/clips/1.mp3".to_string())
        );
    }
}
