use crate::error::{Error, Result};
use crate::models::{MemberList, Person};

/// Closeness of one roster member to a speaker label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity<'a> {
    pub target: &'a Person,
    /// Jaro-Winkler similarity in [0, 1]
    pub score: f64,
}

/// Outcome of resolving one speaker label against a roster
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub label: String,
    /// Best-scoring member, `None` when nothing scored above zero
    pub person: Option<&'a Person>,
    /// Every member's score, highest first; ties keep roster order
    pub similarities: Vec<Similarity<'a>>,
}

impl<'a> Resolution<'a> {
    /// Score of the best match (0 when unresolved)
    pub fn score(&self) -> f64 {
        match self.person {
            Some(_) => self.similarities.first().map(|s| s.score).unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// The best match and its score, or `Error::ResolutionFailed`
    pub fn check(&self) -> Result<(&'a Person, f64)> {
        self.person
            .map(|person| (person, self.score()))
            .ok_or_else(|| Error::ResolutionFailed {
                label: self.label.clone(),
            })
    }
}

/// Score one member's normalized label against a raw speaker label
///
/// Labels that start with different characters score 0 without computing
/// the distance: speaker tags begin with the surname, so a different first
/// character is taken as a certain mismatch. This also rejects correct
/// matches written in another order.
pub fn score_label(candidate: &str, label: &str) -> f64 {
    match (candidate.chars().next(), label.chars().next()) {
        (Some(a), Some(b)) if a == b => strsim::jaro_winkler(candidate, label),
        _ => 0.0,
    }
}

/// Find the roster member that best matches a transcript speaker label
pub fn resolve<'a>(member_list: &'a MemberList, label: &str) -> Resolution<'a> {
    let mut similarities: Vec<Similarity<'a>> = member_list
        .members
        .iter()
        .map(|person| Similarity {
            target: person,
            score: score_label(&person.normalized_label(), label),
        })
        .collect();

    // Stable: equal scores stay in roster order
    similarities.sort_by(|a, b| b.score.total_cmp(&a.score));

    let person = similarities
        .first()
        .filter(|best| best.score > 0.0)
        .map(|best| best.target);

    Resolution {
        label: label.to_string(),
        person,
        similarities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> MemberList {
        MemberList::new(vec![
            Person::new("山田花子", "主査代理", "ラブラドール大学レトリーバー研究科教授"),
            Person::new("鈴木一郎", "委員", "ブルドッグ工科大学特任教授"),
        ])
    }

    #[test]
    fn test_resolve_best_match() {
        let list = roster();
        let resolution = resolve(&list, "山田（花）主査代理");

        let (person, score) = resolution.check().unwrap();
        assert_eq!(person.name, "山田花子");
        assert!(score > 0.0 && score <= 1.0);

        assert_eq!(resolution.similarities.len(), 2);
        assert_eq!(resolution.similarities[0].target.name, "山田花子");
        assert_eq!(resolution.similarities[1].target.name, "鈴木一郎");
        assert_eq!(resolution.similarities[1].score, 0.0);
    }

    #[test]
    fn test_first_character_mismatch_fails() {
        let list = roster();
        let resolution = resolve(&list, "佐藤委員");

        assert!(resolution.person.is_none());
        assert!(resolution.similarities.iter().all(|s| s.score == 0.0));
        assert_eq!(resolution.score(), 0.0);
        match resolution.check() {
            Err(Error::ResolutionFailed { label }) => assert_eq!(label, "佐藤委員"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_empty_roster_fails() {
        let list = MemberList::default();
        let resolution = resolve(&list, "主査");
        assert!(resolution.similarities.is_empty());
        assert!(resolution.check().is_err());
    }

    #[test]
    fn test_empty_label_fails() {
        let list = roster();
        assert!(resolve(&list, "").person.is_none());
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let list = MemberList::new(vec![
            Person::new("山田花子", "委員", "X大学"),
            Person::new("山田花子", "委員", "Y大学"),
        ]);
        let resolution = resolve(&list, "山田委員");

        assert_eq!(resolution.similarities[0].score, resolution.similarities[1].score);
        assert_eq!(resolution.similarities[0].target.affiliation, "X大学");
        assert_eq!(resolution.person.unwrap().affiliation, "X大学");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let list = roster();
        let first = resolve(&list, "山田主査代理");
        let second = resolve(&list, "山田主査代理");

        assert_eq!(first.person.map(|p| p.id), second.person.map(|p| p.id));
        let scores = |r: &Resolution<'_>| r.similarities.iter().map(|s| (s.target.id, s.score)).collect::<Vec<_>>();
        assert_eq!(scores(&first), scores(&second));
    }

    #[test]
    fn test_candidate_label_is_normalized() {
        let list = MemberList::new(vec![Person {
            label: String::new(),
            ..Person::new("山田 花子", "主査", "")
        }]);
        let resolution = resolve(&list, "山田花子主査");
        assert_eq!(resolution.score(), 1.0);
    }
}
