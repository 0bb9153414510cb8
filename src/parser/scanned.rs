use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::filename::apply_working_group_info;
use super::segmenter::{
    decode_entities, split_fragments, split_speaker_tag, SegmentState, SpeechAssembler,
};
use crate::models::Minutes;

static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("paragraph selector"));

static MEETING_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".+ワーキンググループ.+[ 0-9　０-９]+回.+").expect("meeting title pattern")
});

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<("[^"]*"|'[^']*'|[^'">])*>"#).expect("markup pattern")
});

/// Configuration for documents converted from PDF
#[derive(Debug, Clone)]
pub struct ScannedConfig {
    /// Number of leading paragraphs searched for the meeting title
    pub title_scan_paragraphs: usize,
    /// Characters that end a complete sentence; anything else was cut by a page break
    pub terminal_chars: Vec<char>,
}

impl Default for ScannedConfig {
    fn default() -> Self {
        Self {
            title_scan_paragraphs: 3,
            terminal_chars: vec!['。', '）', '―', '─'],
        }
    }
}

impl ScannedConfig {
    fn is_complete(&self, talk: &str) -> bool {
        talk.chars()
            .last()
            .is_some_and(|c| self.terminal_chars.contains(&c))
    }
}

/// Remove tags the conversion left behind and decode entities
pub fn strip_markup(text: &str) -> String {
    decode_entities(&MARKUP.replace_all(text, "")).trim().to_string()
}

/// Parse a minutes document produced by PDF-to-HTML conversion
///
/// Every `<p>` in the document is read. Fragments that do not end a
/// sentence are held back and joined to the next fragment of the same
/// speech. Text before the first speaker tag is discarded.
pub fn parse_minutes(markup: &str, file_name: &str, config: &ScannedConfig) -> Minutes {
    let document = Html::parse_document(markup);

    let title = document
        .select(&PARAGRAPH)
        .take(config.title_scan_paragraphs)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .find(|text| MEETING_TITLE.is_match(text))
        .unwrap_or_default();

    let mut minutes = Minutes {
        working_group: title.split('（').next().unwrap_or_default().to_string(),
        title,
        ..Default::default()
    };
    apply_working_group_info(&mut minutes, file_name);

    let mut assembler = SpeechAssembler::new();
    let mut pending = String::new();

    for paragraph in document.select(&PARAGRAPH) {
        for fragment in split_fragments(&paragraph.inner_html()) {
            let (label, talk) = split_speaker_tag(fragment);
            let talk = strip_markup(talk);

            if let Some(label) = label {
                if !pending.is_empty() {
                    assembler.push_talk(std::mem::take(&mut pending));
                }
                assembler.open_speech(label);
            }

            if talk.is_empty() || assembler.state() == SegmentState::SeekingSpeaker {
                continue;
            }

            pending.push_str(&talk);
            if config.is_complete(&pending) {
                assembler.push_talk(std::mem::take(&mut pending));
            }
        }
    }

    if !pending.is_empty() {
        assembler.push_talk(pending);
    }
    assembler.finish(&mut minutes);
    debug!(
        "{}: {} speeches, {} speakers",
        file_name,
        minutes.speech_count,
        minutes.speakers.len()
    );

    minutes
}
