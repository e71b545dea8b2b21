use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar form input as the UI hands it over: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Blank text counts as "not filled in".
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.trim().is_empty())
    }

    /// Strict numeric reading; `None` for blank, unparsable or non-finite input.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(value) => *value,
            FieldValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

/// Raw patient assessment as collected by the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentForm {
    #[serde(default)]
    pub age: Option<FieldValue>,
    #[serde(default, alias = "sexe")]
    pub sex: Option<FieldValue>,
    #[serde(default)]
    pub temperature: Option<FieldValue>,
    #[serde(default)]
    pub oxygen: Option<FieldValue>,
    #[serde(default, alias = "fr")]
    pub risk_factors: Vec<String>,
    #[serde(default, alias = "symp")]
    pub symptoms: Vec<String>,
}

/// Form fields addressed by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentField {
    Age,
    Sex,
    Temperature,
    Oxygen,
    RiskFactors,
    Symptoms,
}

impl AssessmentField {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::Temperature => "temperature",
            Self::Oxygen => "oxygen",
            Self::RiskFactors => "risk_factors",
            Self::Symptoms => "symptoms",
        }
    }
}

impl fmt::Display for AssessmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comorbidity vocabulary, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Asthme,
    Bpco,
    Diabete,
    MaladieCardiovasculaire,
    Neoplasie,
    Obese,
}

impl RiskFactor {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Asthme,
            Self::Bpco,
            Self::Diabete,
            Self::MaladieCardiovasculaire,
            Self::Neoplasie,
            Self::Obese,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Asthme => "asthme",
            Self::Bpco => "bpco",
            Self::Diabete => "diabete",
            Self::MaladieCardiovasculaire => "maladie_cardiovasculaire",
            Self::Neoplasie => "neoplasie",
            Self::Obese => "obese",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ordered().into_iter().find(|risk| risk.code() == code)
    }
}

/// Symptom vocabulary, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Cephalees,
    Digestifs,
    Dyspnee,
    Fievre,
    Myalgies,
    Toux,
}

impl Symptom {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Cephalees,
            Self::Digestifs,
            Self::Dyspnee,
            Self::Fievre,
            Self::Myalgies,
            Self::Toux,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Cephalees => "cephalees",
            Self::Digestifs => "digestifs",
            Self::Dyspnee => "dyspnee",
            Self::Fievre => "fievre",
            Self::Myalgies => "myalgies",
            Self::Toux => "toux",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ordered().into_iter().find(|symptom| symptom.code() == code)
    }
}

/// Categorical sex code forwarded to the model untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SexCode(pub u8);

/// Assessment that passed every validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAssessment {
    age: u8,
    sex: SexCode,
    temperature: Option<f64>,
    oxygen: Option<f64>,
    risk_factors: BTreeSet<RiskFactor>,
    symptoms: BTreeSet<Symptom>,
}

impl ValidatedAssessment {
    pub(crate) fn new(
        age: u8,
        sex: SexCode,
        temperature: Option<f64>,
        oxygen: Option<f64>,
        risk_factors: BTreeSet<RiskFactor>,
        symptoms: BTreeSet<Symptom>,
    ) -> Self {
        Self {
            age,
            sex,
            temperature,
            oxygen,
            risk_factors,
            symptoms,
        }
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn sex(&self) -> SexCode {
        self.sex
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn oxygen(&self) -> Option<f64> {
        self.oxygen
    }

    pub fn risk_factors(&self) -> &BTreeSet<RiskFactor> {
        &self.risk_factors
    }

    pub fn symptoms(&self) -> &BTreeSet<Symptom> {
        &self.symptoms
    }
}
