//! Message lookup used by the workflows to produce user-facing text.
//!
//! Rendering layers may plug their own [`Translate`] implementation; the
//! bundled [`MessageCatalog`] covers the keys the workflows emit in French and
//! English. Unknown keys translate to themselves.

use serde::{Deserialize, Serialize};

/// Black-box `translate(key) -> string` lookup.
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

/// Translation keys emitted by the workflows.
pub mod keys {
    pub const SUBMIT: &str = "SUBMIT";
    pub const SUBMITTING: &str = "SUBMITTING";
    pub const SEND: &str = "SEND";
    pub const SENDING: &str = "SENDING";

    pub const RF: &str = "RF";
    pub const NN: &str = "NN";
    pub const GBT: &str = "GBT";
    pub const SUMMARY: &str = "SUMMARY";
    pub const AMBULATORY: &str = "AMBULATORY";
    pub const HOSPITALIZATION: &str = "HOSPITALIZATION";

    pub const FIELD_REQUIRED: &str = "FIELD_REQUIRED";
    pub const INVALID_RANGE: &str = "INVALID_RANGE";
    pub const INVALID_STEP: &str = "INVALID_STEP";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const INVALID_OPTION: &str = "INVALID_OPTION";
    pub const FORM_INVALID: &str = "FORM_INVALID";

    pub const FORM_FILLING_AGE_ERRORS: &str = "FORM_FILLING_AGE_ERRORS";
    pub const FORM_FILLING_SEX_ERRORS: &str = "FORM_FILLING_SEX_ERRORS";
    pub const FORM_FILLING_RISKS_ERRORS: &str = "FORM_FILLING_RISKS_ERRORS";
    pub const FORM_FILLING_SYMPTOMS_ERRORS: &str = "FORM_FILLING_SYMPTOMS_ERRORS";
    pub const FORM_FILLING_LEFT_PART_SINGLE: &str = "FORM_FILLING_LEFT_PART_SINGLE";
    pub const FORM_FILLING_RIGHT_PART_SINGLE: &str = "FORM_FILLING_RIGHT_PART_SINGLE";
    pub const FORM_FILLING_LEFT_PART: &str = "FORM_FILLING_LEFT_PART";
    pub const FORM_FILLING_MIDDLE_PART: &str = "FORM_FILLING_MIDDLE_PART";
    pub const FORM_FILLING_RIGHT_PART: &str = "FORM_FILLING_RIGHT_PART";

    pub const FORM_RESULTS_FILLING_ERRORS: &str = "FORM_RESULTS_FILLING_ERRORS";
    pub const INVALID_PROVIDER_NUMBER: &str = "INVALID_PROVIDER_NUMBER";
    pub const REPORT_SUCCESS: &str = "REPORT_SUCCESS";
    pub const REPORT_BLOCKED: &str = "REPORT_BLOCKED";

    pub const ERROR_NETWORK: &str = "ERROR_NETWORK";
    pub const ERROR_HTTP_STATUS: &str = "ERROR_HTTP_STATUS";
    pub const ERROR_INVALID_RESPONSE: &str = "ERROR_INVALID_RESPONSE";
    pub const ERROR_UNKNOWN: &str = "ERROR_UNKNOWN";
}

/// Languages the bundled catalog ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub const fn supported() -> [Self; 2] {
        [Self::Fr, Self::En]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }

    /// Accepts bare codes and locale tags such as `en-GB` or `fr_BE.UTF-8`.
    pub fn parse(value: &str) -> Option<Self> {
        let primary = value
            .trim()
            .split(|c: char| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::supported()
            .into_iter()
            .find(|language| language.code() == primary)
    }
}

const FR: &[(&str, &str)] = &[
    (keys::SUBMIT, "Envoyer"),
    (keys::SUBMITTING, "Envoi en cours..."),
    (keys::SEND, "Transmettre"),
    (keys::SENDING, "Transmission..."),
    (keys::RF, "Forêt aléatoire"),
    (keys::NN, "Réseau de neurones"),
    (keys::GBT, "Gradient boosting"),
    (keys::SUMMARY, "Probabilité d'hospitalisation"),
    (keys::AMBULATORY, "Ambulatoire"),
    (keys::HOSPITALIZATION, "Hospitalisation"),
    (keys::FIELD_REQUIRED, "Ce champ est obligatoire"),
    (keys::INVALID_RANGE, "Valeur hors de la plage autorisée"),
    (
        keys::INVALID_STEP,
        "La valeur {value} doit être un multiple de {step}",
    ),
    (keys::INVALID_NUMBER, "Veuillez saisir un nombre valide"),
    (keys::INVALID_OPTION, "Option inconnue"),
    (keys::FORM_INVALID, "Le formulaire contient des erreurs"),
    (keys::FORM_FILLING_AGE_ERRORS, "l'âge"),
    (keys::FORM_FILLING_SEX_ERRORS, "le sexe"),
    (keys::FORM_FILLING_RISKS_ERRORS, "les facteurs de risque"),
    (keys::FORM_FILLING_SYMPTOMS_ERRORS, "les symptômes"),
    (keys::FORM_FILLING_LEFT_PART_SINGLE, "Veuillez renseigner "),
    (keys::FORM_FILLING_RIGHT_PART_SINGLE, "."),
    (keys::FORM_FILLING_LEFT_PART, "Veuillez renseigner "),
    (keys::FORM_FILLING_MIDDLE_PART, " et "),
    (keys::FORM_FILLING_RIGHT_PART, "."),
    (
        keys::FORM_RESULTS_FILLING_ERRORS,
        "Veuillez renseigner votre numéro INAMI",
    ),
    (
        keys::INVALID_PROVIDER_NUMBER,
        "Le numéro INAMI ne peut contenir que des chiffres",
    ),
    (keys::REPORT_SUCCESS, "Message transmis avec succès"),
    (
        keys::REPORT_BLOCKED,
        "Veuillez attendre la fin de la prédiction en cours",
    ),
    (keys::ERROR_NETWORK, "Erreur réseau"),
    (keys::ERROR_HTTP_STATUS, "Erreur {status}"),
    (keys::ERROR_INVALID_RESPONSE, "Réponse serveur invalide"),
    (keys::ERROR_UNKNOWN, "Une erreur inconnue est survenue"),
];

const EN: &[(&str, &str)] = &[
    (keys::SUBMIT, "Submit"),
    (keys::SUBMITTING, "Submitting..."),
    (keys::SEND, "Send"),
    (keys::SENDING, "Sending..."),
    (keys::RF, "Random forest"),
    (keys::NN, "Neural network"),
    (keys::GBT, "Gradient boosting"),
    (keys::SUMMARY, "Hospitalization probability"),
    (keys::AMBULATORY, "Ambulatory"),
    (keys::HOSPITALIZATION, "Hospitalization"),
    (keys::FIELD_REQUIRED, "This field is required"),
    (keys::INVALID_RANGE, "Value is outside the allowed range"),
    (keys::INVALID_STEP, "Value {value} must be a multiple of {step}"),
    (keys::INVALID_NUMBER, "Please enter a valid number"),
    (keys::INVALID_OPTION, "Unknown option"),
    (keys::FORM_INVALID, "The form contains errors"),
    (keys::FORM_FILLING_AGE_ERRORS, "the age"),
    (keys::FORM_FILLING_SEX_ERRORS, "the sex"),
    (keys::FORM_FILLING_RISKS_ERRORS, "the risk factors"),
    (keys::FORM_FILLING_SYMPTOMS_ERRORS, "the symptoms"),
    (keys::FORM_FILLING_LEFT_PART_SINGLE, "Please fill in "),
    (keys::FORM_FILLING_RIGHT_PART_SINGLE, "."),
    (keys::FORM_FILLING_LEFT_PART, "Please fill in "),
    (keys::FORM_FILLING_MIDDLE_PART, " and "),
    (keys::FORM_FILLING_RIGHT_PART, "."),
    (
        keys::FORM_RESULTS_FILLING_ERRORS,
        "Please fill in your provider number",
    ),
    (
        keys::INVALID_PROVIDER_NUMBER,
        "The provider number may only contain digits",
    ),
    (keys::REPORT_SUCCESS, "Message sent successfully"),
    (
        keys::REPORT_BLOCKED,
        "Please wait for the running prediction to finish",
    ),
    (keys::ERROR_NETWORK, "Network error"),
    (keys::ERROR_HTTP_STATUS, "Error {status}"),
    (keys::ERROR_INVALID_RESPONSE, "Invalid server response"),
    (keys::ERROR_UNKNOWN, "An unknown error occurred"),
];

/// Static catalog for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCatalog {
    language: Language,
}

impl MessageCatalog {
    pub fn for_language(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn entries(&self) -> &'static [(&'static str, &'static str)] {
        match self.language {
            Language::Fr => FR,
            Language::En => EN,
        }
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::for_language(Language::default())
    }
}

impl Translate for MessageCatalog {
    fn translate(&self, key: &str) -> String {
        self.entries()
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, message)| (*message).to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
