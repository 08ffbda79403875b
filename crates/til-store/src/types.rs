//! Core types for fact rows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Category;
use crate::records::{VOTES_FALSE_COLUMN, VOTES_INTERESTING_COLUMN, VOTES_MIND_BLOWING_COLUMN};

/// A fact row as stored in the `facts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Server-assigned row id.
    pub id: i64,
    pub text: String,
    pub source: String,
    pub category: Category,
    #[serde(default)]
    pub votes_interesting: u32,
    #[serde(default)]
    pub votes_mind_blowing: u32,
    #[serde(default)]
    pub votes_false: u32,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl Fact {
    /// Current value of the counter behind `field`.
    pub fn votes(&self, field: VoteField) -> u32 {
        match field {
            VoteField::Interesting => self.votes_interesting,
            VoteField::MindBlowing => self.votes_mind_blowing,
            VoteField::False => self.votes_false,
        }
    }

    /// More "false" votes than positive ones combined.
    pub fn is_disputed(&self) -> bool {
        self.votes_false > self.votes_interesting + self.votes_mind_blowing
    }
}

/// Insert payload for a new fact. Only built by [`crate::validate_new_fact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFact {
    pub(crate) text: String,
    pub(crate) source: String,
    pub(crate) category: Category,
}

impl NewFact {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// One of the three independent vote counters on a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteField {
    #[serde(rename = "votes_interesting")]
    Interesting,
    #[serde(rename = "votes_mind_blowing")]
    MindBlowing,
    #[serde(rename = "votes_false")]
    False,
}

impl VoteField {
    pub const ALL: [VoteField; 3] = [
        VoteField::Interesting,
        VoteField::MindBlowing,
        VoteField::False,
    ];

    /// Column holding this counter.
    pub fn column(self) -> &'static str {
        match self {
            VoteField::Interesting => VOTES_INTERESTING_COLUMN,
            VoteField::MindBlowing => VOTES_MIND_BLOWING_COLUMN,
            VoteField::False => VOTES_FALSE_COLUMN,
        }
    }

    /// Glyph shown on the vote button.
    pub fn glyph(self) -> &'static str {
        match self {
            VoteField::Interesting => "\u{1F44D}",
            VoteField::MindBlowing => "\u{1F92F}",
            VoteField::False => "\u{26D4}\u{FE0F}",
        }
    }
}

impl fmt::Display for VoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Error returned when a string names no vote column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vote field: {0}")]
pub struct UnknownVoteField(pub String);

impl FromStr for VoteField {
    type Err = UnknownVoteField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoteField::ALL
            .into_iter()
            .find(|f| f.column() == s)
            .ok_or_else(|| UnknownVoteField(s.to_string()))
    }
}
