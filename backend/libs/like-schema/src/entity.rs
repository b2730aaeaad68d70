//! Likeable entities and the snapshot derived from their like edges

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Kinds of entity that can receive likes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Post,
    Comment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Post => "post",
            EntityKind::Comment => "comment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown entity kind: {0}")]
pub struct ParseEntityKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(EntityKind::Post),
            "comment" => Ok(EntityKind::Comment),
            other => Err(ParseEntityKindError(other.to_string())),
        }
    }
}

/// Reference to one likeable entity: (entityType, entityId)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn post(id: Uuid) -> Self {
        Self::new(EntityKind::Post, id)
    }

    pub fn comment(id: Uuid) -> Self {
        Self::new(EntityKind::Comment, id)
    }

    /// Path of the toggle endpoint for this entity, e.g. `/posts/{id}/like`
    pub fn like_path(&self) -> String {
        format!("/{}s/{}/like", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Derived like state of one entity as seen by one viewer.
///
/// Never persisted; recomputed from the like edges on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSnapshot {
    pub likes_count: u64,
    pub is_liked_by_current_user: bool,
}

impl LikeSnapshot {
    pub fn new(likes_count: u64, is_liked_by_current_user: bool) -> Self {
        Self {
            likes_count,
            is_liked_by_current_user,
        }
    }

    /// Snapshot after the viewer flips their like, without server input.
    ///
    /// The count saturates at zero so a stale unliked-but-counted view never
    /// goes negative.
    pub fn toggled(&self) -> Self {
        if self.is_liked_by_current_user {
            Self::new(self.likes_count.saturating_sub(1), false)
        } else {
            Self::new(self.likes_count.saturating_add(1), true)
        }
    }
}
