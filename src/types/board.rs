use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Server-computed; never recomputed locally.
    #[serde(default)]
    pub task_count: i64,
}

/// Result of resolving a board id against the loaded boards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardName {
    Known(String),
    Unknown(i64),
}

impl fmt::Display for BoardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardName::Known(name) => f.write_str(name),
            BoardName::Unknown(id) => write!(f, "Unknown board #{id}"),
        }
    }
}
