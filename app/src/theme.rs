//! Dark-mode preference: what the user chose, where it is stored, and how it is applied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

/// Storage key of the preference
pub const MODE_KEY: &str = "app-mode";

/// The user's choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Follow the system color scheme
    #[default]
    Auto,
    /// Always light
    Light,
    /// Always dark
    Dark,
}

impl ThemePreference {
    /// Stored string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The concrete theme, given the system preference
    #[must_use]
    pub const fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::Auto if prefers_dark => Theme::Dark,
            Self::Auto => Theme::Light,
        }
    }
}

impl From<Theme> for ThemePreference {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::Light,
            Theme::Dark => Self::Dark,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(PreferenceError::InvalidValue(other.to_string())),
        }
    }
}

/// The theme actually applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light
    Light,
    /// Dark
    Dark,
}

impl Theme {
    /// Attribute value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reading or writing the stored preference
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Filesystem failure
    #[error("Preference storage failed: {0}")]
    Io(#[from] std::io::Error),

    /// The preference file is not a JSON object
    #[error("Preference file is malformed: {0}")]
    Format(#[from] serde_json::Error),

    /// The stored value is not `auto`, `light` or `dark`
    #[error("Invalid theme preference {0:?} (expected auto, light or dark)")]
    InvalidValue(String),
}

/// Persistent storage for the preference
pub trait PreferenceStore: Send + Sync {
    /// The stored preference, if any
    ///
    /// # Errors
    ///
    /// Returns a [`PreferenceError`] if storage cannot be read or holds an invalid value.
    fn load(&self) -> Result<Option<ThemePreference>, PreferenceError>;

    /// Store `mode`
    ///
    /// # Errors
    ///
    /// Returns a [`PreferenceError`] if storage cannot be written.
    fn save(&self, mode: ThemePreference) -> Result<(), PreferenceError>;
}

/// Preferences kept in a small JSON object on disk (`{"app-mode": "dark"}`)
///
/// Other keys in the file are left alone.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    /// Use the file at `path` (created on first save)
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, PreferenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferences {
    fn load(&self) -> Result<Option<ThemePreference>, PreferenceError> {
        match self.read_all()?.get(MODE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(mode)) => mode.parse().map(Some),
            Some(other) => Err(PreferenceError::InvalidValue(other.to_string())),
        }
    }

    fn save(&self, mode: ThemePreference) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(MODE_KEY.to_string(), Value::String(mode.as_str().to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;

        tracing::debug!(path = %self.path.display(), mode = %mode, "Saved theme preference");
        Ok(())
    }
}

/// Where the theme is applied and where the system preference comes from
pub trait Appearance: Send + Sync {
    /// Whether the system prefers a dark color scheme, probed now
    fn prefers_dark(&self) -> bool;

    /// Apply `theme`
    fn apply_theme(&self, theme: Theme);

    /// The theme applied last, if any
    fn current_theme(&self) -> Option<Theme>;
}

/// Terminal appearance
///
/// The system preference is read from `COLORFGBG` (`"fg;bg"`, where a
/// background of 0-6 or 8 is dark). The applied theme is held in memory.
#[derive(Debug, Default)]
pub struct TerminalAppearance {
    applied: Mutex<Option<Theme>>,
}

impl TerminalAppearance {
    /// A terminal appearance with no theme applied yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Theme>> {
        match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Whether a `COLORFGBG` value describes a dark background
#[must_use]
pub fn colorfgbg_is_dark(value: &str) -> bool {
    value
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

impl Appearance for TerminalAppearance {
    fn prefers_dark(&self) -> bool {
        std::env::var("COLORFGBG").is_ok_and(|value| colorfgbg_is_dark(&value))
    }

    fn apply_theme(&self, theme: Theme) {
        tracing::debug!(%theme, "Applying theme");
        *self.slot() = Some(theme);
    }

    fn current_theme(&self) -> Option<Theme> {
        *self.slot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolves_auto_against_system() {
        assert_eq!(ThemePreference::Auto.resolve(true), Theme::Dark);
        assert_eq!(ThemePreference::Auto.resolve(false), Theme::Light);
        assert_eq!(ThemePreference::Light.resolve(true), Theme::Light);
        assert_eq!(ThemePreference::Dark.resolve(false), Theme::Dark);
    }

    #[test]
    fn parses_stored_strings() {
        assert_eq!("dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!(matches!(
            "sepia".parse::<ThemePreference>(),
            Err(PreferenceError::InvalidValue(_))
        ));
    }

    #[test]
    fn file_preferences_round_trip_and_keep_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"token": "abc"}"#).unwrap();

        let store = FilePreferences::new(&path);
        assert_eq!(store.load().unwrap(), None);

        store.save(ThemePreference::Dark).unwrap();
        assert_eq!(store.load().unwrap(), Some(ThemePreference::Dark));

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["app-mode"], "dark");
        assert_eq!(raw["token"], "abc");
    }

    #[test]
    fn missing_file_means_no_preference() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferences::new(dir.path().join("absent").join("prefs.json"));
        assert_eq!(store.load().unwrap(), None);
        store.save(ThemePreference::Auto).unwrap();
        assert_eq!(store.load().unwrap(), Some(ThemePreference::Auto));
    }

    #[test]
    fn invalid_stored_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"app-mode": 3}"#).unwrap();
        assert!(matches!(
            FilePreferences::new(&path).load(),
            Err(PreferenceError::InvalidValue(_))
        ));
    }

    #[test]
    fn reads_colorfgbg() {
        assert!(colorfgbg_is_dark("15;0"));
        assert!(colorfgbg_is_dark("15;default;8"));
        assert!(!colorfgbg_is_dark("0;15"));
        assert!(!colorfgbg_is_dark("garbage"));
    }

    #[test]
    fn terminal_appearance_remembers_applied_theme() {
        let appearance = TerminalAppearance::new();
        assert_eq!(appearance.current_theme(), None);
        appearance.apply_theme(Theme::Dark);
        assert_eq!(appearance.current_theme(), Some(Theme::Dark));
    }
}
