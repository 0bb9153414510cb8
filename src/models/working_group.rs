use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A working group of the council, as listed in `working-groups.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkingGroup {
    /// Display-order key, e.g. "no03"
    pub order: String,
    /// Three-digit identifier taken from the group's URL
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(rename = "URL", default)]
    pub url: String,
    /// Archive page listing the group's past meetings
    #[serde(rename = "MinutesListURL", default)]
    pub minutes_list_url: String,
    #[serde(rename = "MinutesURLs", default)]
    pub minutes_urls: Vec<String>,
    #[serde(rename = "MemberListURLs", default)]
    pub member_list_urls: Vec<String>,
}

/// Working groups keyed by order key ("no03")
pub type WorkingGroupList = HashMap<String, WorkingGroup>;

/// Key into a `WorkingGroupList` for a two-digit order ("03" -> "no03")
pub fn order_key(order: &str) -> String {
    format!("no{}", order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_working_group_list() {
        let json = r#"{
            "no03": {
                "Order": "no03",
                "ID": "057",
                "Name": "教育課程部会",
                "URL": "https://example.invalid/057/index.htm",
                "MinutesURLs": []
            }
        }"#;

        let list: WorkingGroupList = serde_json::from_str(json).unwrap();
        let wg = &list[&order_key("03")];
        assert_eq!(wg.id, "057");
        assert_eq!(wg.name, "教育課程部会");
        assert!(wg.minutes_urls.is_empty());
        assert!(wg.member_list_urls.is_empty());
    }

    #[test]
    fn test_working_group_json_field_names() {
        let wg = WorkingGroup {
            order: "no03".to_string(),
            id: "057".to_string(),
            minutes_urls: vec!["https://example.invalid/1.htm".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&wg).unwrap();
        assert_eq!(json["ID"], "057");
        assert_eq!(json["MinutesURLs"][0], "https://example.invalid/1.htm");
        assert_eq!(json["MinutesListURL"], "");
        assert!(json["MemberListURLs"].as_array().unwrap().is_empty());
    }
}
