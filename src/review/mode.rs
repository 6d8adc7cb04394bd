//! Review modes.
//!
//! A mode decides what one unit of work is and which questions the form asks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Answers, EntityRecord};

/// Form questions, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    MakesSense,
    Issues,
    LabelCount,
    Confidence,
}

impl Question {
    pub fn prompt(self) -> &'static str {
        match self {
            Question::MakesSense => "Does the annotation make sense?",
            Question::Issues => "What's wrong?",
            Question::LabelCount => {
                "(Answer if the entity has multiple fine-grained roles) How many labels are correct?"
            }
            Question::Confidence => "Confidence in your answer (1-5)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// One unit per entity, judging all predicted roles together
    #[default]
    PerEntity,
    /// One unit per (entity, predicted role)
    PerLabel,
}

/// One unit of work
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewUnit<'a> {
    pub entity: &'a EntityRecord,
    /// The single label under review in per-label mode
    pub judged_role: Option<&'a str>,
}

const PER_ENTITY_QUESTIONS: &[Question] = &[
    Question::MakesSense,
    Question::Issues,
    Question::LabelCount,
    Question::Confidence,
];

const PER_LABEL_QUESTIONS: &[Question] = &[Question::MakesSense, Question::Issues, Question::Confidence];

impl ReviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewMode::PerEntity => "per_entity",
            ReviewMode::PerLabel => "per_label",
        }
    }

    pub fn questions(&self) -> &'static [Question] {
        match self {
            ReviewMode::PerEntity => PER_ENTITY_QUESTIONS,
            ReviewMode::PerLabel => PER_LABEL_QUESTIONS,
        }
    }

    /// Units contributed by one entity (always at least one)
    pub fn unit_count(&self, entity: &EntityRecord) -> usize {
        match self {
            ReviewMode::PerEntity => 1,
            ReviewMode::PerLabel => entity.predicted_roles.len().max(1),
        }
    }

    /// Units of an article, in order
    pub fn units<'a>(&self, entities: &[&'a EntityRecord]) -> Vec<ReviewUnit<'a>> {
        let mut units = Vec::new();
        for &entity in entities {
            match self {
                ReviewMode::PerLabel if !entity.predicted_roles.is_empty() => {
                    units.extend(entity.predicted_roles.iter().map(|role| ReviewUnit {
                        entity,
                        judged_role: Some(role.as_str()),
                    }));
                }
                _ => units.push(ReviewUnit {
                    entity,
                    judged_role: None,
                }),
            }
        }
        units
    }

    /// Drop answers to questions this mode does not ask
    pub fn normalize(&self, mut answers: Answers) -> Answers {
        if !self.questions().contains(&Question::LabelCount) {
            answers.multi_labels = None;
        }
        answers
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").as_str() {
            "per_entity" => Ok(ReviewMode::PerEntity),
            "per_label" => Ok(ReviewMode::PerLabel),
            other => Err(format!("Unknown review mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Confidence, LabelCount, MakesSense, RoleList};

    fn entity(roles: &[&str]) -> EntityRecord {
        EntityRecord {
            article_id: "a".to_string(),
            lang: "en".to_string(),
            text: "Alice met Bob".to_string(),
            entity_mention: "Alice".to_string(),
            start_offset: 0,
            end_offset: 4,
            main_role: "Protagonist".to_string(),
            predicted_roles: RoleList::new(roles.iter().copied()),
            gold_roles: None,
        }
    }

    #[test]
    fn test_per_label_expands_roles() {
        let e1 = entity(&["Hero", "Guardian"]);
        let e2 = entity(&[]);
        let units = ReviewMode::PerLabel.units(&[&e1, &e2]);
        let judged: Vec<_> = units.iter().map(|u| u.judged_role).collect();
        assert_eq!(judged, vec![Some("Hero"), Some("Guardian"), None]);
        assert_eq!(ReviewMode::PerLabel.unit_count(&e1), 2);
        assert_eq!(ReviewMode::PerLabel.unit_count(&e2), 1);
    }

    #[test]
    fn test_per_entity_one_unit_each() {
        let e1 = entity(&["Hero", "Guardian"]);
        let units = ReviewMode::PerEntity.units(&[&e1]);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].judged_role, None);
    }

    #[test]
    fn test_per_label_drops_label_count() {
        let answers = Answers::new(MakesSense::Yes, Confidence::default())
            .with_label_count(LabelCount::Two);
        assert_eq!(ReviewMode::PerLabel.normalize(answers.clone()).multi_labels, None);
        assert_eq!(
            ReviewMode::PerEntity.normalize(answers).multi_labels,
            Some(LabelCount::Two)
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("per-label".parse::<ReviewMode>().unwrap(), ReviewMode::PerLabel);
        assert_eq!("per_entity".parse::<ReviewMode>().unwrap(), ReviewMode::PerEntity);
        assert!("both".parse::<ReviewMode>().is_err());
    }
}
