//! # Entity Identity
//!
//! Every entity carries an [`EntityMeta`]: an [`EntityId`] assigned exactly
//! once at creation, plus the change stamp the interchange format records.
//! Relationships between entities are stored as `EntityId` values and looked
//! up in the [`Model`](crate::model::Model) when needed.
//!
//! Default names (`B.1`, `P.3`, ...) come from a [`NamingSequence`] passed into
//! the entity factories. Reset it when a model build starts.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::entity::{EntityMeta, NamingSequence};
//!
//! let mut names = NamingSequence::new();
//! assert_eq!(names.next_name("B"), "B.1");
//! assert_eq!(names.next_name("B"), "B.2");
//! assert_eq!(names.next_name("P"), "P.1");
//!
//! let meta = EntityMeta::created();
//! let copy = meta.clone();
//! assert_eq!(meta.id, copy.id);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StruxError, StruxResult};

/// Identity token of an entity, written to documents as a hyphenated GUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Fresh random (v4) identity
    pub fn new() -> Self {
        EntityId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::new()
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        EntityId(uuid)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for EntityId {
    type Err = StruxError;

    fn from_str(s: &str) -> StruxResult<Self> {
        Uuid::parse_str(s)
            .map(EntityId)
            .map_err(|e| StruxError::invalid_input("guid", s, e.to_string()))
    }
}

/// Change action recorded with each entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityAction {
    Added,
    Modified,
}

impl EntityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityAction::Added => "added",
            EntityAction::Modified => "modified",
        }
    }
}

impl FromStr for EntityAction {
    type Err = StruxError;

    fn from_str(s: &str) -> StruxResult<Self> {
        match s {
            "added" => Ok(EntityAction::Added),
            "modified" => Ok(EntityAction::Modified),
            other => Err(StruxError::invalid_input("action", other, "expected added or modified")),
        }
    }
}

/// Identity and change stamp of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: EntityId,
    pub last_change: DateTime<Utc>,
    pub action: EntityAction,
}

impl EntityMeta {
    /// The single creation point of an identity
    pub fn created() -> Self {
        EntityMeta {
            id: EntityId::new(),
            last_change: now(),
            action: EntityAction::Added,
        }
    }

    /// Stamp a modification without touching the identity
    pub fn touch(&mut self) {
        self.last_change = now();
        self.action = EntityAction::Modified;
    }

    /// `last_change` as written to documents (second precision, UTC)
    pub fn last_change_str(&self) -> String {
        self.last_change.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Documents carry second precision; stamps are truncated so they survive a
/// round trip unchanged
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Per-prefix monotonic counters for default entity names
#[derive(Debug, Clone, Default)]
pub struct NamingSequence {
    counters: HashMap<String, u32>,
}

impl NamingSequence {
    pub fn new() -> Self {
        NamingSequence::default()
    }

    /// Next name for `prefix`, e.g. `"B.4"`
    pub fn next_name(&mut self, prefix: &str) -> String {
        let n = self.counters.entry(prefix.to_string()).or_insert(0);
        *n += 1;
        format!("{}.{}", prefix, n)
    }

    /// Restart every counter at 1
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}
