use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to roster rows whose header cell is empty
pub const DEFAULT_ROLE: &str = "委員";

/// Strip every whitespace character (ASCII and full-width) from a label
pub fn normalize_label(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A committee member as listed on a roster page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    /// Generated per roster row, never derived from content
    #[serde(rename = "ID")]
    pub id: Uuid,
    /// Normalized name + role, used for display and matching
    pub label: String,
    pub name: String,
    pub role: String,
    pub affiliation: String,
}

impl Person {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        affiliation: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let role = role.into();
        let label = Self::label_for(&name, &role);
        Self {
            id: Uuid::new_v4(),
            label,
            name,
            role,
            affiliation: affiliation.into(),
        }
    }

    /// The label derived from the current name and role
    pub fn normalized_label(&self) -> String {
        Self::label_for(&self.name, &self.role)
    }

    fn label_for(name: &str, role: &str) -> String {
        normalize_label(&format!("{}{}", name, role))
    }
}

/// The roster of one working group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemberList {
    /// Order key ("01", "02", ...) of the working group this roster belongs to
    pub working_group_order: Option<String>,
    pub members: Vec<Person>,
}

impl MemberList {
    pub fn new(members: Vec<Person>) -> Self {
        Self {
            working_group_order: None,
            members,
        }
    }

    /// Look up a member by identifier
    pub fn get(&self, id: &Uuid) -> Option<&Person> {
        self.members.iter().find(|p| p.id == *id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Rosters keyed by working-group order ("03")
pub type Rosters = HashMap<String, MemberList>;

/// Look up the roster member a resolved speaker points to
pub fn find_person<'a>(rosters: &'a Rosters, order: &str, id: &Uuid) -> Option<&'a Person> {
    rosters.get(order).and_then(|list| list.get(id))
}
