use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Minutes, Speakers, Speech};

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern"));

static SPEAKER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^【(.+?)】").expect("speaker tag pattern"));

/// Split a paragraph's inner markup on `<br>` into fragments
pub fn split_fragments(inner_html: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK.split(inner_html)
}

/// Separate a leading `【label】` from a trimmed fragment
///
/// Returns the label (if any) and the remaining text, trimmed.
pub fn split_speaker_tag(fragment: &str) -> (Option<&str>, &str) {
    let fragment = fragment.trim();
    match SPEAKER_TAG.captures(fragment) {
        Some(caps) => {
            let label = caps.get(1).map(|m| m.as_str());
            let rest = caps.get(0).map(|m| &fragment[m.end()..]).unwrap_or(fragment);
            (label, rest.trim())
        }
        None => (None, fragment),
    }
}

/// Where the assembler is within the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// No speaker tag seen yet; talk goes to the unattributed preamble
    SeekingSpeaker,
    /// At least one speaker tag seen; talk goes to the open speech
    InSpeech,
}

/// Builds the ordered speech list of one transcript
///
/// A speech is closed only when a new speaker tag arrives, and only kept if
/// it has talk. The last open speech is kept unconditionally by `finish`.
#[derive(Debug)]
pub struct SpeechAssembler {
    state: SegmentState,
    speakers: Speakers,
    speeches: Vec<Speech>,
    current: Speech,
}

impl Default for SpeechAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechAssembler {
    pub fn new() -> Self {
        Self {
            state: SegmentState::SeekingSpeaker,
            speakers: Speakers::default(),
            speeches: Vec::new(),
            current: Speech::default(),
        }
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Close the open speech and open a new one for `label`
    pub fn open_speech(&mut self, label: &str) {
        let closed = std::mem::take(&mut self.current);
        if !closed.is_empty() {
            self.speeches.push(closed);
        }
        self.current.speaker = Some(self.speakers.get_or_insert(label));
        self.state = SegmentState::InSpeech;
    }

    /// Append talk to the open speech
    pub fn push_talk(&mut self, talk: impl Into<String>) {
        self.current.talks.push(talk.into());
    }

    /// Flush the open speech and move speeches and speakers into `minutes`
    pub fn finish(mut self, minutes: &mut Minutes) {
        self.speeches.push(self.current);
        minutes.speech_count = self.speeches.len();
        minutes.speeches = self.speeches;
        minutes.speakers = self.speakers;
    }
}

/// Decode the entities the HTML serializer emits for text nodes
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
