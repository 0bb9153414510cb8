use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{find_person, order_key, Minutes, Person, Rosters, WorkingGroupList};

/// Column header of the speaker table
pub const SPEAKER_CSV_HEADER: [&str; 10] = [
    "WorkingGroupOrder",
    "WorkingGroupID",
    "Title",
    "Speaker.Label",
    "Speaker.ResolutionScore",
    "Person.ID",
    "Person.Label",
    "Person.Name",
    "Person.Role",
    "Person.Affiliation",
];

/// Character encoding of the speaker table file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvEncoding {
    Utf8,
    /// What spreadsheet software on Japanese Windows opens without an import dialog
    #[default]
    ShiftJis,
}

/// Write any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// One row per distinct speaker per transcript
pub struct SpeakerTable<'a> {
    minutes: &'a [Minutes],
    rosters: &'a Rosters,
}

impl<'a> SpeakerTable<'a> {
    pub fn new(minutes: &'a [Minutes], rosters: &'a Rosters) -> Self {
        Self { minutes, rosters }
    }

    /// Rows in transcript order, speakers in order of first appearance
    pub fn rows(&self) -> Vec<[String; 10]> {
        let mut rows = Vec::new();
        for minutes in self.minutes {
            for speaker in minutes.speakers.iter() {
                let person = speaker
                    .person
                    .and_then(|id| find_person(self.rosters, &minutes.working_group_order, &id));
                let field = |f: fn(&Person) -> String| person.map(f).unwrap_or_default();

                rows.push([
                    minutes.working_group_order.clone(),
                    minutes.working_group_id.clone(),
                    minutes.title.clone(),
                    speaker.label.clone(),
                    speaker.resolution_score.to_string(),
                    field(|p| p.id.to_string()),
                    field(|p| p.label.clone()),
                    field(|p| p.name.clone()),
                    field(|p| p.role.clone()),
                    field(|p| p.affiliation.clone()),
                ]);
            }
        }
        rows
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(SPEAKER_CSV_HEADER)?;
        for row in self.rows() {
            csv.write_record(&row)?;
        }
        csv.flush().map_err(|e| Error::Csv(e.into()))?;
        Ok(())
    }

    pub fn write_file(&self, path: &Path, encoding: CsvEncoding) -> Result<()> {
        match encoding {
            CsvEncoding::Utf8 => {
                let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
                self.write_csv(file)
            }
            CsvEncoding::ShiftJis => {
                let mut buffer = Vec::new();
                self.write_csv(&mut buffer)?;
                let text = String::from_utf8_lossy(&buffer);
                let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(&text);
                if had_errors {
                    warn!("{:?}: characters outside Shift_JIS written as numeric references", path);
                }
                std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
            }
        }
    }
}

/// Plain text input for KH Coder, with `<h1>`-`<h3>` section markers
pub struct KhCoderText<'a> {
    minutes: &'a [Minutes],
    working_groups: Option<&'a WorkingGroupList>,
}

impl<'a> KhCoderText<'a> {
    pub fn new(minutes: &'a [Minutes], working_groups: Option<&'a WorkingGroupList>) -> Self {
        Self {
            minutes,
            working_groups,
        }
    }

    fn group_name(&self, minutes: &'a Minutes) -> &'a str {
        self.working_groups
            .and_then(|list| list.get(&order_key(&minutes.working_group_order)))
            .map(|wg| wg.name.as_str())
            .unwrap_or(minutes.working_group.as_str())
    }

    pub fn format(&self) -> String {
        let mut output = String::new();
        let mut current_order: Option<&str> = None;

        for minutes in self.minutes {
            if current_order != Some(minutes.working_group_order.as_str()) {
                output.push_str(&format!("<h1>{}</h1>\n", self.group_name(minutes)));
                current_order = Some(minutes.working_group_order.as_str());
            }

            if !minutes.title.is_empty() {
                output.push_str(&format!("<h2>{}</h2>\n", minutes.title));
            }

            for speech in &minutes.speeches {
                let label = minutes
                    .speaker_of(speech)
                    .map(|s| s.label.as_str())
                    .unwrap_or_default();
                output.push_str(&format!("<h3>{}</h3>\n", label));
                for talk in &speech.talks {
                    output.push_str(talk);
                    output.push('\n');
                }
            }
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
        write!(file, "{}", self.format()).map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberList, Speech, WorkingGroup};

    fn sample() -> (Vec<Minutes>, Rosters) {
        let roster = MemberList::new(vec![Person::new("山田花子", "主査", "X大学")]);
        let person_id = roster.members[0].id;

        let mut minutes = Minutes {
            title: "部会（第1回）".to_string(),
            working_group: "部会".to_string(),
            working_group_order: "03".to_string(),
            working_group_id: "057".to_string(),
            ..Default::default()
        };
        let chair = minutes.speakers.get_or_insert("主査");
        let guest = minutes.speakers.get_or_insert("説明者");
        if let Some(speaker) = minutes.speakers.get_mut(chair) {
            speaker.person = Some(person_id);
            speaker.resolution_score = 0.9;
        }
        minutes.speeches = vec![
            Speech { speaker: None, talks: vec!["前文".to_string()] },
            Speech { speaker: Some(chair), talks: vec!["開会します。".to_string()] },
            Speech { speaker: Some(guest), talks: vec!["説明します。".to_string(), "以上です。".to_string()] },
        ];
        minutes.speech_count = 3;

        let mut rosters = Rosters::new();
        rosters.insert("03".to_string(), roster);
        (vec![minutes], rosters)
    }

    #[test]
    fn test_speaker_table_rows() {
        let (minutes, rosters) = sample();
        let table = SpeakerTable::new(&minutes, &rosters);
        let rows = table.rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][3], "主査");
        assert_eq!(rows[0][4], "0.9");
        assert_eq!(rows[0][6], "山田花子主査");
        assert_eq!(rows[0][9], "X大学");
        // Unresolved speaker leaves person columns empty
        assert_eq!(rows[1][3], "説明者");
        assert_eq!(rows[1][4], "0");
        assert_eq!(rows[1][5], "");
    }

    #[test]
    fn test_speaker_csv_header() {
        let (minutes, rosters) = sample();
        let mut buffer = Vec::new();
        SpeakerTable::new(&minutes, &rosters).write_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let first_line = text.lines().next().unwrap();
        assert_eq!(first_line, SPEAKER_CSV_HEADER.join(","));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_speaker_file_is_shift_jis() {
        let (minutes, rosters) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_speaker.csv");
        SpeakerTable::new(&minutes, &rosters)
            .write_file(&path, CsvEncoding::ShiftJis)
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(String::from_utf8(bytes.clone()).is_err());
        let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
        assert!(!had_errors);
        assert_eq!(text.lines().next().unwrap(), SPEAKER_CSV_HEADER.join(","));
        assert!(text.contains("山田花子主査"));
    }

    #[test]
    fn test_speaker_file_utf8() {
        let (minutes, rosters) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_speaker.csv");
        SpeakerTable::new(&minutes, &rosters)
            .write_file(&path, CsvEncoding::Utf8)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("山田花子主査"));
    }

    #[test]
    fn test_kh_coder_format() {
        let (minutes, _) = sample();
        let text = KhCoderText::new(&minutes, None).format();

        assert_eq!(
            text,
            "<h1>部会</h1>\n<h2>部会（第1回）</h2>\n<h3></h3>\n前文\n<h3>主査</h3>\n開会します。\n<h3>説明者</h3>\n説明します。\n以上です。\n"
        );
    }

    #[test]
    fn test_kh_coder_uses_working_group_list() {
        let (mut minutes, _) = sample();
        minutes.push(minutes[0].clone());

        let mut groups = WorkingGroupList::new();
        groups.insert(
            "no03".to_string(),
            WorkingGroup {
                order: "no03".to_string(),
                id: "057".to_string(),
                name: "教育課程部会".to_string(),
                ..Default::default()
            },
        );
        let text = KhCoderText::new(&minutes, Some(&groups)).format();

        // Group heading only when the order changes
        assert_eq!(text.matches("<h1>教育課程部会</h1>").count(), 1);
        assert_eq!(text.matches("<h2>").count(), 2);
    }

    #[test]
    fn test_write_json_round_trip_file() {
        let (minutes, _) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.json");
        write_json(&minutes, &path).unwrap();

        let loaded: Vec<Minutes> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded[0].speakers.len(), 2);
        assert_eq!(loaded[0].speeches.len(), 3);
    }
}
