//! Persisted caregiver preferences (display language and dark mode).

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::i18n::{Language, MessageCatalog};

pub const LANGUAGE_KEY: &str = "lang";
pub const DARK_MODE_KEY: &str = "darkMode";

/// Simple key to string store injected into the preference services.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("unable to access preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preference file {path} is not valid json: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("language {0} is not supported")]
    UnsupportedLanguage(String),
}

#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        let guard = self.values.lock().expect("preference mutex poisoned");
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut guard = self.values.lock().expect("preference mutex poisoned");
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePreferenceStore {
    /// Open the store; a missing file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| PreferenceError::Json {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        let guard = self.values.lock().expect("preference mutex poisoned");
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut guard = self.values.lock().expect("preference mutex poisoned");
        guard.insert(key.to_string(), value.to_string());
        let serialized =
            serde_json::to_string_pretty(&*guard).map_err(|source| PreferenceError::Json {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, serialized).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(key, path = %self.path.display(), "preference persisted");
        Ok(())
    }
}

/// Active display language, resolved from saved, detected, then default.
pub struct LanguagePreference {
    store: Arc<dyn PreferenceStore>,
    current: Language,
}

impl LanguagePreference {
    pub fn initialize(store: Arc<dyn PreferenceStore>, detected: Option<&str>) -> Self {
        let saved = store.get(LANGUAGE_KEY).and_then(|code| {
            let parsed = Language::parse(&code);
            if parsed.is_none() {
                warn!(code = %code, "ignoring unsupported saved language");
            }
            parsed
        });
        let current = saved
            .or_else(|| detected.and_then(Language::parse))
            .unwrap_or_default();

        Self { store, current }
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn supported(&self) -> [Language; 2] {
        Language::supported()
    }

    pub fn catalog(&self) -> MessageCatalog {
        MessageCatalog::for_language(self.current)
    }

    /// Switch and persist the language; unsupported codes are rejected.
    pub fn set(&mut self, code: &str) -> Result<Language, PreferenceError> {
        let language = Language::parse(code)
            .filter(|language| language.code() == code.trim().to_ascii_lowercase())
            .ok_or_else(|| PreferenceError::UnsupportedLanguage(code.to_string()))?;
        self.store.set(LANGUAGE_KEY, language.code())?;
        self.current = language;
        Ok(language)
    }
}

/// Dark-mode flag persisted as the strings `"true"`/`"false"`.
pub struct ThemePreference {
    store: Arc<dyn PreferenceStore>,
    dark_mode: bool,
}

impl ThemePreference {
    pub fn initialize(store: Arc<dyn PreferenceStore>) -> Self {
        let dark_mode = store.get(DARK_MODE_KEY).as_deref() == Some("true");
        Self { store, dark_mode }
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle(&mut self) -> Result<bool, PreferenceError> {
        let next = !self.dark_mode;
        self.store.set(DARK_MODE_KEY, if next { "true" } else { "false" })?;
        self.dark_mode = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> Arc<dyn PreferenceStore> {
        Arc::new(InMemoryPreferenceStore::default())
    }

    #[test]
    fn language_prefers_saved_then_detected_then_default() {
        let store = memory_store();
        assert_eq!(
            LanguagePreference::initialize(store.clone(), None).current(),
            Language::Fr
        );
        assert_eq!(
            LanguagePreference::initialize(store.clone(), Some("en_US.UTF-8")).current(),
            Language::En
        );

        store.set(LANGUAGE_KEY, "fr").expect("memory store accepts writes");
        assert_eq!(
            LanguagePreference::initialize(store, Some("en")).current(),
            Language::Fr
        );
    }

    #[test]
    fn unsupported_saved_language_falls_back() {
        let store = memory_store();
        store.set(LANGUAGE_KEY, "de").expect("memory store accepts writes");
        let preference = LanguagePreference::initialize(store, Some("en"));
        assert_eq!(preference.current(), Language::En);
    }

    #[test]
    fn setting_language_persists_and_rejects_unknown_codes() {
        let store = memory_store();
        let mut preference = LanguagePreference::initialize(store.clone(), None);

        assert_eq!(preference.set("en").expect("en supported"), Language::En);
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("en"));

        match preference.set("nl") {
            Err(PreferenceError::UnsupportedLanguage(code)) => assert_eq!(code, "nl"),
            other => panic!("expected unsupported language, got {other:?}"),
        }
        match preference.set("en-GB") {
            Err(PreferenceError::UnsupportedLanguage(_)) => {}
            other => panic!("expected unsupported language, got {other:?}"),
        }
        assert_eq!(preference.current(), Language::En);
    }

    #[test]
    fn theme_toggle_round_trips_through_store() {
        let store = memory_store();
        let mut theme = ThemePreference::initialize(store.clone());
        assert!(!theme.is_dark_mode());

        assert!(theme.toggle().expect("toggle persists"));
        assert_eq!(store.get(DARK_MODE_KEY).as_deref(), Some("true"));
        assert!(ThemePreference::initialize(store.clone()).is_dark_mode());

        assert!(!theme.toggle().expect("toggle persists"));
        assert!(!ThemePreference::initialize(store).is_dark_mode());
    }

    #[test]
    fn json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("prefs.json");

        let store = JsonFilePreferenceStore::open(&path).expect("missing file opens empty");
        assert_eq!(store.get(LANGUAGE_KEY), None);
        store.set(LANGUAGE_KEY, "en").expect("write succeeds");
        store.set(DARK_MODE_KEY, "true").expect("write succeeds");

        let reopened = JsonFilePreferenceStore::open(&path).expect("existing file opens");
        assert_eq!(reopened.get(LANGUAGE_KEY).as_deref(), Some("en"));
        assert_eq!(reopened.get(DARK_MODE_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn json_file_store_reports_corrupt_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").expect("fixture written");

        match JsonFilePreferenceStore::open(&path) {
            Err(PreferenceError::Json { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected json error, got {other:?}"),
        }
    }
}
