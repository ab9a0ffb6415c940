use serde::Deserialize;

/// Repository status as reported by the backend.
///
/// The backend formats every field for display ("Last Commit: 3m ago."),
/// so they are shown as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitInfo {
    pub last_commit: String,
    pub last_pull: String,
    pub remote_ahead_by: String,
    pub local_ahead_by: String,
}

impl GitInfo {
    /// Placeholder shown before the first fetch completes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }

    /// Non-empty fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        [
            self.last_commit.as_str(),
            self.last_pull.as_str(),
            self.remote_ahead_by.as_str(),
            self.local_ahead_by.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
    }
}
