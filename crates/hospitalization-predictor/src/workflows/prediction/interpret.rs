use serde::Serialize;

use super::gateway::{PredictionEntry, RawPredictionResponse};
use crate::i18n::{keys, Translate};

const SUMMARY_RATIONALE: &str = "summary";
const AMBULATORY_OUTCOME: &str = "ambulatoire";
const HOSPITALIZED_OUTCOME: &str = "hospitalise";

/// Models reported by the prediction service, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelMethod {
    #[serde(rename = "RF")]
    RandomForest,
    #[serde(rename = "NN")]
    NeuralNetwork,
    #[serde(rename = "GBT")]
    GradientBoosting,
}

impl ModelMethod {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::RandomForest,
            Self::NeuralNetwork,
            Self::GradientBoosting,
        ]
    }

    /// Rationale tag used by the service, doubling as the translation key.
    pub const fn rationale(self) -> &'static str {
        match self {
            Self::RandomForest => keys::RF,
            Self::NeuralNetwork => keys::NN,
            Self::GradientBoosting => keys::GBT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPrediction {
    pub method: ModelMethod,
    pub ambulatory_probability: f64,
    pub hospitalization_probability: f64,
}

/// Interpreted service answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub summary_probability: Option<f64>,
    pub models: Vec<ModelPrediction>,
}

impl PredictionResult {
    pub fn model(&self, method: ModelMethod) -> Option<&ModelPrediction> {
        self.models.iter().find(|model| model.method == method)
    }

    pub fn formatted_summary(&self) -> String {
        format_probability(self.summary_probability)
    }

    /// Display model with percentages and translated method labels.
    pub fn view(&self, translator: &dyn Translate) -> PredictionView {
        PredictionView {
            summary: self.formatted_summary(),
            details: self
                .models
                .iter()
                .map(|model| ModelPredictionView {
                    method: translator.translate(model.method.rationale()),
                    ambulatory: format_probability(Some(model.ambulatory_probability)),
                    hospitalization: format_probability(Some(model.hospitalization_probability)),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionView {
    pub summary: String,
    pub details: Vec<ModelPredictionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPredictionView {
    pub method: String,
    pub ambulatory: String,
    pub hospitalization: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResponseError {
    #[error("response is missing a boolean success flag")]
    MalformedResponse,
    #[error("prediction service reported a failure")]
    Service { message: Option<String> },
}

/// Extract the summary and per-model probabilities from a raw response.
pub fn interpret(raw: &RawPredictionResponse) -> Result<PredictionResult, ResponseError> {
    let success = raw
        .success
        .as_ref()
        .and_then(serde_json::Value::as_bool)
        .ok_or(ResponseError::MalformedResponse)?;
    if !success {
        return Err(ResponseError::Service {
            message: raw
                .message
                .clone()
                .filter(|message| !message.trim().is_empty()),
        });
    }

    let entries: &[PredictionEntry] = raw
        .data
        .as_deref()
        .and_then(|data| data.first())
        .map(|envelope| envelope.prediction.as_slice())
        .unwrap_or_default();

    let summary_probability = entries
        .iter()
        .find(|entry| entry.rationale.as_deref() == Some(SUMMARY_RATIONALE))
        .and_then(|entry| entry.probability_decimal);

    let models = ModelMethod::ordered()
        .into_iter()
        .map(|method| ModelPrediction {
            method,
            ambulatory_probability: probability(entries, method, AMBULATORY_OUTCOME),
            hospitalization_probability: probability(entries, method, HOSPITALIZED_OUTCOME),
        })
        .collect();

    Ok(PredictionResult {
        summary_probability,
        models,
    })
}

fn probability(entries: &[PredictionEntry], method: ModelMethod, outcome: &str) -> f64 {
    entries
        .iter()
        .find(|entry| {
            entry.rationale.as_deref() == Some(method.rationale())
                && entry
                    .outcome
                    .as_ref()
                    .and_then(|concept| concept.coding.first())
                    .and_then(|coding| coding.code.as_deref())
                    == Some(outcome)
        })
        .and_then(|entry| entry.probability_decimal)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Percentage rounded half-up, or `N/A` when unavailable.
pub fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(value) if !value.is_nan() => format!("{}%", (value * 100.0 + 0.5).floor() as i64),
        _ => "N/A".to_string(),
    }
}
