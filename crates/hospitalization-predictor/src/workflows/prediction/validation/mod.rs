mod rules;

pub use rules::{step_aligned, NumericRule, STEP_EPSILON};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::domain::{
    AssessmentField, AssessmentForm, FieldValue, RiskFactor, SexCode, Symptom, ValidatedAssessment,
};
use crate::i18n::{keys, Translate};

/// Stateless checker turning a raw form into a [`ValidatedAssessment`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationEngine {
    age: NumericRule,
    temperature: NumericRule,
    oxygen: NumericRule,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self {
            age: rules::AGE,
            temperature: rules::TEMPERATURE,
            oxygen: rules::OXYGEN,
        }
    }
}

impl ValidationEngine {
    pub fn new(age: NumericRule, temperature: NumericRule, oxygen: NumericRule) -> Self {
        Self {
            age,
            temperature,
            oxygen,
        }
    }

    /// Validate every field, collecting at most one error per field.
    pub fn validate(&self, form: &AssessmentForm) -> Result<ValidatedAssessment, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let age = self
            .age(form.age.as_ref())
            .map_err(|kind| errors.insert(AssessmentField::Age, kind));
        let sex = sex(form.sex.as_ref()).map_err(|kind| errors.insert(AssessmentField::Sex, kind));
        let temperature = optional_vital(form.temperature.as_ref(), &self.temperature)
            .map_err(|kind| errors.insert(AssessmentField::Temperature, kind));
        let oxygen = optional_vital(form.oxygen.as_ref(), &self.oxygen)
            .map_err(|kind| errors.insert(AssessmentField::Oxygen, kind));
        let risk_factors = vocabulary(&form.risk_factors, RiskFactor::from_code)
            .map_err(|kind| errors.insert(AssessmentField::RiskFactors, kind));
        let symptoms = vocabulary(&form.symptoms, Symptom::from_code)
            .map_err(|kind| errors.insert(AssessmentField::Symptoms, kind));

        match (age, sex, temperature, oxygen, risk_factors, symptoms) {
            (Ok(age), Ok(sex), Ok(temperature), Ok(oxygen), Ok(risk_factors), Ok(symptoms)) => {
                Ok(ValidatedAssessment::new(
                    age,
                    sex,
                    temperature,
                    oxygen,
                    risk_factors,
                    symptoms,
                ))
            }
            _ => Err(errors),
        }
    }

    fn age(&self, value: Option<&FieldValue>) -> Result<u8, ValidationErrorKind> {
        let value = required(value)?;
        let number = value.as_number().ok_or(ValidationErrorKind::InvalidNumber)?;
        if number.fract() != 0.0 {
            return Err(ValidationErrorKind::InvalidNumber);
        }
        if let Some(kind) = self.age.check(number) {
            return Err(kind);
        }
        u8::try_from(number as i64).map_err(|_| ValidationErrorKind::Range {
            min: self.age.min,
            max: self.age.max,
            actual: number,
        })
    }
}

fn required(value: Option<&FieldValue>) -> Result<&FieldValue, ValidationErrorKind> {
    match value {
        Some(value) if !value.is_blank() => Ok(value),
        _ => Err(ValidationErrorKind::Required),
    }
}

fn sex(value: Option<&FieldValue>) -> Result<SexCode, ValidationErrorKind> {
    let number = required(value)?
        .as_number()
        .ok_or(ValidationErrorKind::InvalidNumber)?;
    if number.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&number) {
        return Err(ValidationErrorKind::InvalidNumber);
    }
    Ok(SexCode(number as u8))
}

fn optional_vital(
    value: Option<&FieldValue>,
    rule: &NumericRule,
) -> Result<Option<f64>, ValidationErrorKind> {
    let Some(value) = value.filter(|value| !value.is_blank()) else {
        return Ok(None);
    };
    let number = value.as_number().ok_or(ValidationErrorKind::InvalidNumber)?;
    match rule.check(number) {
        Some(kind) => Err(kind),
        None => Ok(Some(number)),
    }
}

fn vocabulary<T: Ord>(
    codes: &[String],
    lookup: impl Fn(&str) -> Option<T>,
) -> Result<BTreeSet<T>, ValidationErrorKind> {
    let mut selected = BTreeSet::new();
    for code in codes.iter().filter(|code| !code.trim().is_empty()) {
        let member = lookup(code.as_str()).ok_or_else(|| ValidationErrorKind::UnknownOption {
            value: code.clone(),
        })?;
        selected.insert(member);
    }
    if selected.is_empty() {
        return Err(ValidationErrorKind::Required);
    }
    Ok(selected)
}

/// Reason a single field was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Required,
    InvalidNumber,
    UnknownOption { value: String },
    Range { min: f64, max: f64, actual: f64 },
    Step { required_step: f64, actual_value: f64 },
}

/// Field-keyed validation failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, thiserror::Error)]
#[error("assessment has {} invalid field(s)", .fields.len())]
pub struct ValidationErrors {
    fields: BTreeMap<AssessmentField, ValidationErrorKind>,
}

impl ValidationErrors {
    fn insert(&mut self, field: AssessmentField, kind: ValidationErrorKind) {
        self.fields.entry(field).or_insert(kind);
    }

    pub fn get(&self, field: AssessmentField) -> Option<&ValidationErrorKind> {
        self.fields.get(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssessmentField, &ValidationErrorKind)> {
        self.fields.iter().map(|(field, kind)| (*field, kind))
    }

    /// Per-field message shown under the input.
    pub fn field_message(
        &self,
        field: AssessmentField,
        translator: &dyn Translate,
    ) -> Option<String> {
        let message = match self.fields.get(&field)? {
            ValidationErrorKind::Required => translator.translate(keys::FIELD_REQUIRED),
            ValidationErrorKind::InvalidNumber => translator.translate(keys::INVALID_NUMBER),
            ValidationErrorKind::UnknownOption { .. } => translator.translate(keys::INVALID_OPTION),
            ValidationErrorKind::Range { .. } => translator.translate(keys::INVALID_RANGE),
            ValidationErrorKind::Step {
                required_step,
                actual_value,
            } => translator
                .translate(keys::INVALID_STEP)
                .replace("{step}", &required_step.to_string())
                .replace("{value}", &actual_value.to_string()),
        };
        Some(message)
    }

    /// "Please fill in X, Y and Z" banner built from the required-field errors.
    pub fn missing_fields_message(&self, translator: &dyn Translate) -> Option<String> {
        let labels: Vec<String> = self
            .fields
            .iter()
            .filter(|(_, kind)| matches!(kind, ValidationErrorKind::Required))
            .filter_map(|(field, _)| missing_label_key(*field))
            .map(|key| translator.translate(key))
            .collect();

        match labels.as_slice() {
            [] => None,
            [single] => Some(format!(
                "{}{}{}",
                translator.translate(keys::FORM_FILLING_LEFT_PART_SINGLE),
                single,
                translator.translate(keys::FORM_FILLING_RIGHT_PART_SINGLE)
            )),
            [leading @ .., last] => Some(format!(
                "{}{}{}{}{}",
                translator.translate(keys::FORM_FILLING_LEFT_PART),
                leading.join(", "),
                translator.translate(keys::FORM_FILLING_MIDDLE_PART),
                last,
                translator.translate(keys::FORM_FILLING_RIGHT_PART)
            )),
        }
    }
}

fn missing_label_key(field: AssessmentField) -> Option<&'static str> {
    match field {
        AssessmentField::Age => Some(keys::FORM_FILLING_AGE_ERRORS),
        AssessmentField::Sex => Some(keys::FORM_FILLING_SEX_ERRORS),
        AssessmentField::RiskFactors => Some(keys::FORM_FILLING_RISKS_ERRORS),
        AssessmentField::Symptoms => Some(keys::FORM_FILLING_SYMPTOMS_ERRORS),
        AssessmentField::Temperature | AssessmentField::Oxygen => None,
    }
}
