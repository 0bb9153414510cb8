use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::filename::apply_working_group_info;
use super::segmenter::{split_fragments, split_speaker_tag, SpeechAssembler};
use crate::error::{Error, Result};
use crate::models::Minutes;

/// Heading text that opens the transcript section
pub const MINUTES_HEADING: &str = "議事録";

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("h1 selector"));

static SECTION_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div#contentsMain h2").expect("section heading selector")
});

/// Parse a minutes page published directly as HTML
///
/// Speeches are read from the `<p>` siblings following the `議事録` heading
/// of `div#contentsMain`. Inline markup inside a fragment is kept as-is.
pub fn parse_minutes(markup: &str, file_name: &str) -> Result<Minutes> {
    let document = Html::parse_document(markup);

    let title = document
        .select(&TITLE)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut minutes = Minutes {
        working_group: title.split('　').next().unwrap_or_default().to_string(),
        title,
        ..Default::default()
    };
    apply_working_group_info(&mut minutes, file_name);

    let heading = document
        .select(&SECTION_HEADING)
        .find(|h2| h2.text().collect::<String>().contains(MINUTES_HEADING))
        .ok_or_else(|| {
            Error::parse(
                file_name,
                format!("no {} heading inside div#contentsMain", MINUTES_HEADING),
            )
        })?;

    let mut assembler = SpeechAssembler::new();
    let paragraphs = heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "p");

    for paragraph in paragraphs {
        for fragment in split_fragments(&paragraph.inner_html()) {
            let (label, talk) = split_speaker_tag(fragment);
            if let Some(label) = label {
                assembler.open_speech(label);
            }
            if !talk.is_empty() {
                assembler.push_talk(talk);
            }
        }
    }

    assembler.finish(&mut minutes);
    debug!(
        "{}: {} speeches, {} speakers",
        file_name,
        minutes.speech_count,
        minutes.speakers.len()
    );

    Ok(minutes)
}
