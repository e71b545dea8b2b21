use serde::{Deserialize, Serialize};

use crate::i18n::{keys, Translate};

pub const DEFAULT_COUNTRY: &str = "BE";

/// Raw reporting form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    #[serde(default)]
    pub provider_number: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// Validated disagreement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisagreementReport {
    provider_number: String,
    country: String,
}

impl DisagreementReport {
    pub fn from_form(form: &ReportForm) -> Result<Self, ReportValidationError> {
        let provider_number = form.provider_number.trim();
        if provider_number.is_empty() {
            return Err(ReportValidationError::MissingProviderNumber);
        }
        if !provider_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ReportValidationError::NonNumericProviderNumber);
        }

        let country = form
            .country
            .as_deref()
            .map(str::trim)
            .filter(|country| !country.is_empty())
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

        Ok(Self {
            provider_number: provider_number.to_string(),
            country,
        })
    }

    pub fn provider_number(&self) -> &str {
        &self.provider_number
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportValidationError {
    #[error("provider number is required")]
    MissingProviderNumber,
    #[error("provider number may only contain digits")]
    NonNumericProviderNumber,
}

impl ReportValidationError {
    pub fn message(&self, translator: &dyn Translate) -> String {
        match self {
            Self::MissingProviderNumber => translator.translate(keys::FORM_RESULTS_FILLING_ERRORS),
            Self::NonNumericProviderNumber => translator.translate(keys::INVALID_PROVIDER_NUMBER),
        }
    }
}

/// Input filter for the provider number field: keeps ASCII digits only.
pub fn sanitize_provider_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Language, MessageCatalog};

    fn form(provider_number: &str, country: Option<&str>) -> ReportForm {
        ReportForm {
            provider_number: provider_number.to_string(),
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn country_defaults_to_belgium() {
        let report = DisagreementReport::from_form(&form(" 12345678 ", None)).expect("valid");
        assert_eq!(report.provider_number(), "12345678");
        assert_eq!(report.country(), "BE");

        let blank = DisagreementReport::from_form(&form("1", Some("  "))).expect("valid");
        assert_eq!(blank.country(), DEFAULT_COUNTRY);

        let france = DisagreementReport::from_form(&form("1", Some("fr"))).expect("valid");
        assert_eq!(france.country(), "FR");
    }

    #[test]
    fn provider_number_must_be_present_and_numeric() {
        assert_eq!(
            DisagreementReport::from_form(&form("", None)),
            Err(ReportValidationError::MissingProviderNumber)
        );
        assert_eq!(
            DisagreementReport::from_form(&form("12-34", None)),
            Err(ReportValidationError::NonNumericProviderNumber)
        );
    }

    #[test]
    fn errors_render_localized_messages() {
        let catalog = MessageCatalog::for_language(Language::En);
        assert_eq!(
            ReportValidationError::MissingProviderNumber.message(&catalog),
            "Please fill in your provider number"
        );
        assert_eq!(
            ReportValidationError::NonNumericProviderNumber.message(&catalog),
            "The provider number may only contain digits"
        );
    }

    #[test]
    fn sanitize_strips_non_digits() {
        assert_eq!(sanitize_provider_number("1-234 56a7"), "1234567");
        assert_eq!(sanitize_provider_number("abc"), "");
        assert_eq!(sanitize_provider_number("١٢٣"), "");
    }
}
