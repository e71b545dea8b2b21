use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use hospitalization_predictor::config::PredictorConfig;
use hospitalization_predictor::error::AppError;
use hospitalization_predictor::i18n::{Language, MessageCatalog, Translate};
use hospitalization_predictor::preferences::{
    JsonFilePreferenceStore, LanguagePreference, PreferenceStore,
};
use hospitalization_predictor::telemetry;
use hospitalization_predictor::workflows::prediction::{AssessmentForm, ValidationErrors};
use tracing::debug;

/// Config, telemetry and preferences shared by every command.
pub(crate) struct Session {
    pub(crate) config: PredictorConfig,
    pub(crate) store: Arc<dyn PreferenceStore>,
    pub(crate) language: LanguagePreference,
}

impl Session {
    pub(crate) fn start() -> Result<Self, AppError> {
        let config = PredictorConfig::load()?;
        telemetry::init(&config.telemetry)?;

        let store: Arc<dyn PreferenceStore> =
            Arc::new(JsonFilePreferenceStore::open(&config.preferences.path)?);
        let detected = detected_locale();
        let language = LanguagePreference::initialize(Arc::clone(&store), detected.as_deref());
        debug!(
            environment = ?config.environment,
            language = language.current().code(),
            "session ready"
        );

        Ok(Self {
            config,
            store,
            language,
        })
    }

    /// Catalog for this run: the explicit override, else the saved preference.
    pub(crate) fn translator(&self, requested: Option<Language>) -> Arc<dyn Translate> {
        let language = requested.unwrap_or_else(|| self.language.current());
        Arc::new(MessageCatalog::for_language(language))
    }
}

fn detected_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|variable| env::var(variable).ok())
        .find(|value| !value.trim().is_empty())
}

pub(crate) fn parse_language(raw: &str) -> Result<Language, String> {
    Language::parse(raw).ok_or_else(|| {
        let supported: Vec<&str> = Language::supported()
            .into_iter()
            .map(Language::code)
            .collect();
        format!("unsupported language '{raw}' (expected one of {})", supported.join(", "))
    })
}

pub(crate) fn read_form(path: &Path) -> Result<AssessmentForm, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Per-field messages, one line each, in form order.
pub(crate) fn field_messages(errors: &ValidationErrors, translator: &dyn Translate) -> Vec<String> {
    errors
        .iter()
        .filter_map(|(field, _)| {
            errors
                .field_message(field, translator)
                .map(|message| format!("{field}: {message}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospitalization_predictor::workflows::prediction::{FieldValue, ValidationEngine};

    #[test]
    fn parse_language_accepts_locale_tags() {
        assert_eq!(parse_language("en-GB"), Ok(Language::En));
        assert_eq!(parse_language("fr"), Ok(Language::Fr));
        assert!(parse_language("nl")
            .expect_err("dutch is not bundled")
            .contains("fr, en"));
    }

    #[test]
    fn read_form_accepts_short_field_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("form.json");
        fs::write(
            &path,
            r#"{"age":45,"sexe":"1","fr":["asthme"],"symp":["toux"],"temperature":"","oxygen":""}"#,
        )
        .expect("write form");

        let form = read_form(&path).expect("form parses");
        assert_eq!(form.age, Some(FieldValue::Number(45.0)));
        assert_eq!(form.risk_factors, vec!["asthme".to_string()]);
    }

    #[test]
    fn field_messages_name_each_invalid_field() {
        let form: AssessmentForm =
            serde_json::from_str(r#"{"age":130,"sexe":"1","fr":["asthme"],"symp":["toux"]}"#)
                .expect("form parses");
        let errors = ValidationEngine::default()
            .validate(&form)
            .expect_err("age out of range");

        let lines = field_messages(&errors, &MessageCatalog::for_language(Language::En));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("age: "));
    }
}
