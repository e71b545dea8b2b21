use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::domain::{RiskFactor, Symptom, ValidatedAssessment};
use crate::config::EncodingConfig;

/// Coding system stamped on every observation.
pub const CODING_SYSTEM: &str = "http://comunicare.io";
pub const DEFAULT_SUBJECT_REFERENCE: &str = "patient-id";

/// How risk-factor and symptom vocabularies are written into the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VocabularyEmission {
    /// Every vocabulary member, 1 when selected and 0 otherwise.
    #[default]
    ZeroFilled,
    /// Only the selected members, each with value 1.
    Sparse,
}

impl VocabularyEmission {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zero-filled" | "zero_filled" | "zerofilled" => Some(Self::ZeroFilled),
            "sparse" => Some(Self::Sparse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    pub code: String,
    pub display: String,
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
}

/// Numeric observation value; integral values are written without a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(serialize_with = "serialize_quantity")]
    pub value: f64,
}

fn serialize_quantity<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "valueQuantity")]
    pub value_quantity: Quantity,
    pub code: CodeableConcept,
}

impl Observation {
    fn new(code: impl Into<String>, display: impl Into<String>, value: f64) -> Self {
        Self {
            value_quantity: Quantity { value },
            code: CodeableConcept {
                coding: vec![Coding {
                    code: code.into(),
                    display: display.into(),
                    system: CODING_SYSTEM.to_string(),
                }],
            },
        }
    }

    pub fn code(&self) -> &str {
        self.code
            .coding
            .first()
            .map(|coding| coding.code.as_str())
            .unwrap_or_default()
    }

    pub fn display(&self) -> &str {
        self.code
            .coding
            .first()
            .map(|coding| coding.display.as_str())
            .unwrap_or_default()
    }

    pub fn value(&self) -> f64 {
        self.value_quantity.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectReference {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl SubjectReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            display: None,
        }
    }
}

impl Default for SubjectReference {
    fn default() -> Self {
        Self::new(DEFAULT_SUBJECT_REFERENCE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub subject: SubjectReference,
    #[serde(serialize_with = "serialize_issued")]
    pub issued: DateTime<Utc>,
    pub component: Vec<Observation>,
}

fn serialize_issued<S: Serializer>(
    issued: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&issued.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Exact request body: a JSON array holding one subject record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationBundle(Vec<SubjectRecord>);

impl ObservationBundle {
    pub fn records(&self) -> &[SubjectRecord] {
        &self.0
    }

    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.0.iter().flat_map(|record| record.component.iter())
    }

    pub fn observation(&self, code: &str) -> Option<&Observation> {
        self.observations().find(|observation| observation.code() == code)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Turns a validated assessment into the observation bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadEncoder {
    emission: VocabularyEmission,
    subject: SubjectReference,
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self::new(VocabularyEmission::default(), SubjectReference::default())
    }
}

impl PayloadEncoder {
    pub fn new(emission: VocabularyEmission, subject: SubjectReference) -> Self {
        Self { emission, subject }
    }

    pub fn from_config(config: &EncodingConfig) -> Self {
        Self::new(
            config.emission,
            SubjectReference::new(config.subject_reference.clone()),
        )
    }

    pub fn emission(&self) -> VocabularyEmission {
        self.emission
    }

    pub fn encode_now(&self, assessment: &ValidatedAssessment) -> ObservationBundle {
        self.encode(assessment, Utc::now())
    }

    /// Order: age, sex, risk factors, symptoms, then measured vitals.
    pub fn encode(
        &self,
        assessment: &ValidatedAssessment,
        issued: DateTime<Utc>,
    ) -> ObservationBundle {
        let mut component = vec![
            Observation::new("age", "Age", f64::from(assessment.age())),
            Observation::new("sexe", "Sexe", f64::from(assessment.sex().0)),
        ];

        for risk in RiskFactor::ordered() {
            let selected = assessment.risk_factors().contains(&risk);
            if let Some(value) = self.flag(selected) {
                component.push(Observation::new(
                    format!("fr_{}", risk.code()),
                    risk.code().replacen('_', " ", 1),
                    value,
                ));
            }
        }

        for symptom in Symptom::ordered() {
            let selected = assessment.symptoms().contains(&symptom);
            if let Some(value) = self.flag(selected) {
                component.push(Observation::new(
                    format!("symp_{}", symptom.code()),
                    symptom.code(),
                    value,
                ));
            }
        }

        if let Some(temperature) = measured(assessment.temperature()) {
            component.push(Observation::new("temperature", "Température", temperature));
        }
        if let Some(oxygen) = measured(assessment.oxygen()) {
            component.push(Observation::new("oxygen", "Oxygène", oxygen));
        }

        ObservationBundle(vec![SubjectRecord {
            subject: self.subject.clone(),
            issued,
            component,
        }])
    }

    fn flag(&self, selected: bool) -> Option<f64> {
        match (self.emission, selected) {
            (_, true) => Some(1.0),
            (VocabularyEmission::ZeroFilled, false) => Some(0.0),
            (VocabularyEmission::Sparse, false) => None,
        }
    }
}

fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|value| *value != 0.0)
}
