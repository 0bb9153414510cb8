use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Index of a speaker within its `Minutes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerId(pub usize);

/// A speaker as labelled in the transcript, e.g. "主査" from "【主査】"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Speaker {
    /// Raw label between the brackets
    pub label: String,
    /// Identifier of the resolved roster member, if any
    pub person: Option<Uuid>,
    /// Similarity of the resolved member (0 when unresolved)
    pub resolution_score: f64,
}

impl Speaker {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            person: None,
            resolution_score: 0.0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.person.is_some()
    }
}

/// Label-keyed, insertion-ordered set of speakers
///
/// Serialized as a plain list; the label index is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Speaker>", into = "Vec<Speaker>")]
pub struct Speakers {
    entries: Vec<Speaker>,
    index: HashMap<String, SpeakerId>,
}

impl Speakers {
    /// Return the speaker for `label`, creating it on first sight
    pub fn get_or_insert(&mut self, label: &str) -> SpeakerId {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = SpeakerId(self.entries.len());
        self.entries.push(Speaker::new(label));
        self.index.insert(label.to_string(), id);
        id
    }

    pub fn get(&self, id: SpeakerId) -> Option<&Speaker> {
        self.entries.get(id.0)
    }

    pub fn get_mut(&mut self, id: SpeakerId) -> Option<&mut Speaker> {
        self.entries.get_mut(id.0)
    }

    pub fn by_label(&self, label: &str) -> Option<&Speaker> {
        self.index.get(label).and_then(|&id| self.get(id))
    }

    pub fn id_of(&self, label: &str) -> Option<SpeakerId> {
        self.index.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Speaker> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Speaker> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Speaker>> for Speakers {
    fn from(list: Vec<Speaker>) -> Self {
        let mut speakers = Speakers::default();
        for speaker in list {
            if speakers.index.contains_key(&speaker.label) {
                continue;
            }
            speakers
                .index
                .insert(speaker.label.clone(), SpeakerId(speakers.entries.len()));
            speakers.entries.push(speaker);
        }
        speakers
    }
}

impl From<Speakers> for Vec<Speaker> {
    fn from(speakers: Speakers) -> Self {
        speakers.entries
    }
}

/// A run of utterances attributed to one speaker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Speech {
    /// `None` for preamble text before the first speaker tag
    pub speaker: Option<SpeakerId>,
    /// Paragraph fragments in document order
    pub talks: Vec<String>,
}

impl Speech {
    pub fn is_empty(&self) -> bool {
        self.talks.is_empty()
    }
}

/// One meeting transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Minutes {
    pub title: String,
    /// Display name of the working group, derived from the title
    pub working_group: String,
    #[serde(rename = "SpeachCount")]
    pub speech_count: usize,
    pub working_group_order: String,
    #[serde(rename = "WorkingGroupID")]
    pub working_group_id: String,
    pub date: String,
    pub venue: String,
    pub topics: Vec<String>,
    pub speakers: Speakers,
    #[serde(rename = "Speaches")]
    pub speeches: Vec<Speech>,
}

impl Minutes {
    /// The speaker a speech is attributed to
    pub fn speaker_of(&self, speech: &Speech) -> Option<&Speaker> {
        speech.speaker.and_then(|id| self.speakers.get(id))
    }
}
