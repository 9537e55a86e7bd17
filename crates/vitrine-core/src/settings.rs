//! User settings persisted as `Key=Value` lines in `config.txt`

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::i18n::Language;

pub const CONFIG_FILE: &str = "config.txt";
pub const RECENT_FILE: &str = "recent.txt";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory holding the session's settings and recent-files lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    dir: PathBuf,
}

impl SessionPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Session rooted at the process working directory
    pub fn working_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn recent_file(&self) -> PathBuf {
        self.dir.join(RECENT_FILE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Culture code such as `en-US`
    pub language: String,
    pub show_fps: bool,
    /// Multiplier applied to orbit rotation speed
    pub camera_sensitivity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default().code().to_string(),
            show_fps: false,
            camera_sensitivity: 1.0,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults for anything missing.
    ///
    /// Without a config file the language follows the environment locale.
    pub fn load(paths: &SessionPaths) -> Self {
        let path = paths.config_file();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let settings = Self::parse(&text);
                info!(path = %path.display(), language = %settings.language, "Loaded settings");
                settings
            }
            Err(e) => {
                debug!(path = %path.display(), "No settings file: {}", e);
                Self {
                    language: Language::from_environment().code().to_string(),
                    ..Default::default()
                }
            }
        }
    }

    /// Parse `Key=Value` lines; malformed lines and values are ignored.
    ///
    /// A value that fails to parse leaves the setting as it was, so
    /// `FPS=True` followed by `FPS=garbage` still reads as `true` and a lone
    /// bad value keeps the default.
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        for line in text.lines() {
            let parts: Vec<&str> = line.trim_end_matches('\r').split('=').collect();
            let [key, value] = parts.as_slice() else {
                continue;
            };
            match *key {
                "Lang" => settings.language = value.to_string(),
                "FPS" => {
                    if let Some(v) = parse_bool(value) {
                        settings.show_fps = v;
                    }
                }
                "Sense" => {
                    if let Ok(v) = value.trim().parse::<f32>() {
                        if v.is_finite() {
                            settings.camera_sensitivity = v;
                        }
                    }
                }
                _ => {}
            }
        }
        settings
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Lang={}", self.language);
        let _ = writeln!(out, "FPS={}", if self.show_fps { "True" } else { "False" });
        let _ = writeln!(out, "Sense={}", self.camera_sensitivity);
        out
    }

    pub fn save(&self, paths: &SessionPaths) -> Result<(), SettingsError> {
        let path = paths.config_file();
        std::fs::write(&path, self.to_text()).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
