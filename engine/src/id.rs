//! Entity identifiers.
//!
//! Server-confirmed entities carry a permanent [`ServerId`]. Entities created
//! during an edit session carry a [`TempId`] until the commit swaps it for the
//! id the server hands back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of every rendered temporary id.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Permanent, server-assigned identifier.
pub type ServerId = i64;

/// A temporary identifier for an entity that only exists locally.
///
/// `generation` identifies the edit session that minted the id and `seq` the
/// position within that session, so an id is never handed out twice by the
/// same [`EditSession`](crate::EditSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TempId {
    generation: u64,
    seq: u64,
}

impl TempId {
    pub fn new(generation: u64, seq: u64) -> Self {
        Self { generation, seq }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}_{}", TEMP_ID_PREFIX, self.generation, self.seq)
    }
}

impl FromStr for TempId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(TEMP_ID_PREFIX)
            .ok_or_else(|| format!("temporary id must start with '{}': {}", TEMP_ID_PREFIX, s))?;
        let (generation, seq) = rest
            .split_once('_')
            .ok_or_else(|| format!("malformed temporary id: {}", s))?;
        let generation = generation
            .parse()
            .map_err(|_| format!("malformed temporary id: {}", s))?;
        let seq = seq
            .parse()
            .map_err(|_| format!("malformed temporary id: {}", s))?;
        Ok(Self { generation, seq })
    }
}

impl From<TempId> for String {
    fn from(id: TempId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TempId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identity of an entity in a working copy.
///
/// Serialized untagged: server ids as numbers, temporary ids as `"temp_…"`
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Server(ServerId),
    Temp(TempId),
}

impl EntityId {
    /// True if the entity has never been confirmed by the server.
    pub fn is_temporary(&self) -> bool {
        matches!(self, EntityId::Temp(_))
    }

    /// The permanent id, if any.
    pub fn as_server(&self) -> Option<ServerId> {
        match self {
            EntityId::Server(id) => Some(*id),
            EntityId::Temp(_) => None,
        }
    }

    /// The temporary id, if any.
    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            EntityId::Server(_) => None,
            EntityId::Temp(id) => Some(*id),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Server(id) => write!(f, "{}", id),
            EntityId::Temp(id) => write!(f, "{}", id),
        }
    }
}

impl From<ServerId> for EntityId {
    fn from(id: ServerId) -> Self {
        EntityId::Server(id)
    }
}

impl From<TempId> for EntityId {
    fn from(id: TempId) -> Self {
        EntityId::Temp(id)
    }
}
