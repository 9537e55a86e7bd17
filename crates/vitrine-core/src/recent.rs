//! Most-recently-opened model list, one path per line in `recent.txt`

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::settings::{SessionPaths, SettingsError};

pub const MAX_RECENT: usize = 5;

/// Ordered most-recent-first, capped at [`MAX_RECENT`], without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFiles {
    entries: Vec<PathBuf>,
}

impl RecentFiles {
    pub fn load(paths: &SessionPaths) -> Self {
        match std::fs::read_to_string(paths.recent_file()) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                debug!("No recent files list: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut out = Self::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if out.entries.len() == MAX_RECENT {
                break;
            }
            let path = PathBuf::from(line);
            if !out.entries.contains(&path) {
                out.entries.push(path);
            }
        }
        out
    }

    /// Move `path` to the front, dropping the oldest entry past the cap
    pub fn insert(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|p| p != &path);
        self.entries.insert(0, path);
        self.entries.truncate(MAX_RECENT);
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|p| p == path)
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("{}\n", p.display()))
            .collect()
    }

    pub fn save(&self, paths: &SessionPaths) -> Result<(), SettingsError> {
        let path = paths.recent_file();
        std::fs::write(&path, self.to_text())
            .map_err(|source| SettingsError::Write { path, source })
    }
}
