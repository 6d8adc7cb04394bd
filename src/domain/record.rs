//! Entity-level corpus record.

use serde::{Deserialize, Serialize};

use super::roles::RoleList;

/// One (article, entity mention) row of the corpus.
///
/// The article text is repeated on every row of the same article. Offsets are
/// character offsets and both bounds are inclusive: the mention is
/// `text[start_offset..=end_offset]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Opaque article key
    pub article_id: String,

    /// Language code (e.g. "en", "hi")
    pub lang: String,

    /// Full article text
    pub text: String,

    /// Mentioned surface form
    pub entity_mention: String,

    /// First character of the mention
    pub start_offset: i64,

    /// Last character of the mention (inclusive)
    pub end_offset: i64,

    /// Predicted coarse role
    pub main_role: String,

    /// Predicted fine-grained roles
    pub predicted_roles: RoleList,

    /// Reference fine-grained roles, when the corpus carries them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_roles: Option<RoleList>,
}

impl EntityRecord {
    /// Inclusive character bounds, if they fall inside the text
    pub fn char_span(&self) -> Option<(usize, usize)> {
        let start = usize::try_from(self.start_offset).ok()?;
        let end = usize::try_from(self.end_offset).ok()?;
        if start > end || end >= self.text.chars().count() {
            return None;
        }
        Some((start, end))
    }

    /// Whether the offsets select exactly the recorded mention
    pub fn mention_matches(&self) -> bool {
        match self.char_span() {
            Some((start, end)) => {
                let slice: String = self.text.chars().skip(start).take(end - start + 1).collect();
                slice == self.entity_mention
            }
            None => false,
        }
    }
}
