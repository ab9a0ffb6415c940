use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

/// Opaque identifier the backend assigns to every note file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub Uuid);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// A note file as returned by the load endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteFile {
    pub id: FileId,
    pub name: String,
    pub content: String,
}
