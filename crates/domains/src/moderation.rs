//! # Moderation lifecycle
//!
//! Every comment is created `pending` and shown publicly only once a
//! moderator approves it. The transition itself is executed by an external
//! moderation tool; this crate owns the contract (which transitions exist,
//! which states are terminal) so nothing in the codebase can invent a
//! fifth status or resurrect a rejected comment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

impl CommentStatus {
    /// Wire/database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
            CommentStatus::Spam => "spam",
        }
    }

    /// `pending` is the only non-terminal state. There is no re-queuing:
    /// once moderated, a comment stays moderated.
    pub fn is_terminal(self) -> bool {
        !matches!(self, CommentStatus::Pending)
    }

    /// Whether a single moderation event may move a comment from `self`
    /// to `next`.
    pub fn can_become(self, next: CommentStatus) -> bool {
        match (self, next) {
            (CommentStatus::Pending, CommentStatus::Approved)
            | (CommentStatus::Pending, CommentStatus::Rejected)
            | (CommentStatus::Pending, CommentStatus::Spam) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            "spam" => Ok(CommentStatus::Spam),
            other => Err(ParseEnumError::new("comment status", other)),
        }
    }
}
