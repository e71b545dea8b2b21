use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use tokio::sync::Notify;

use crate::i18n::{Language, MessageCatalog, Translate};
use crate::workflows::prediction::{
    AssessmentForm, FieldValue, ObservationBundle, PredictionGateway, RawPredictionResponse,
    SubmissionSettings, SubmissionStateMachine, TransportError, ValidatedAssessment,
    ValidationEngine,
};

pub(super) fn assessment_form() -> AssessmentForm {
    AssessmentForm {
        age: Some(FieldValue::from(45)),
        sex: Some(FieldValue::from("1")),
        temperature: Some(FieldValue::from("")),
        oxygen: Some(FieldValue::from("")),
        risk_factors: vec!["asthme".to_string()],
        symptoms: vec!["toux".to_string(), "fievre".to_string()],
    }
}

pub(super) fn validated(form: &AssessmentForm) -> ValidatedAssessment {
    ValidationEngine::default()
        .validate(form)
        .expect("fixture form is valid")
}

pub(super) fn issued() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn english() -> Arc<dyn Translate> {
    Arc::new(MessageCatalog::for_language(Language::En))
}

pub(super) fn raw(value: serde_json::Value) -> RawPredictionResponse {
    serde_json::from_value(value).expect("fixture response deserializes")
}

pub(super) fn summary_response(probability: f64) -> RawPredictionResponse {
    raw(json!({
        "success": true,
        "data": [{ "prediction": [{ "rationale": "summary", "probabilityDecimal": probability }] }]
    }))
}

fn entry(rationale: &str, outcome: &str, probability: f64) -> serde_json::Value {
    json!({
        "rationale": rationale,
        "outcome": { "coding": [{ "code": outcome }] },
        "probabilityDecimal": probability
    })
}

/// Summary plus RF and GBT detail; NN is deliberately absent.
pub(super) fn detailed_response() -> RawPredictionResponse {
    raw(json!({
        "success": true,
        "message": "ok",
        "data": [{
            "prediction": [
                { "rationale": "summary", "probabilityDecimal": 0.35 },
                entry("RF", "ambulatoire", 0.7),
                entry("RF", "hospitalise", 0.3),
                entry("GBT", "hospitalise", 0.45),
                entry("GBT", "ambulatoire", 0.55)
            ]
        }]
    }))
}

pub(super) fn settings(error_banner: Duration) -> SubmissionSettings {
    SubmissionSettings {
        error_banner,
        ..SubmissionSettings::default()
    }
}

pub(super) fn build_machine(
    gateway: Arc<RecordingGateway>,
) -> SubmissionStateMachine<RecordingGateway> {
    SubmissionStateMachine::new(gateway, english(), settings(Duration::from_secs(10)))
}

/// Gateway fake that records every bundle and answers with a programmable
/// response, optionally holding each call until the gate is notified.
pub(super) struct RecordingGateway {
    bundles: Mutex<Vec<ObservationBundle>>,
    response: Mutex<Result<RawPredictionResponse, TransportError>>,
    gate: Option<Arc<Notify>>,
}

impl RecordingGateway {
    pub(super) fn answering(response: Result<RawPredictionResponse, TransportError>) -> Self {
        Self {
            bundles: Mutex::new(Vec::new()),
            response: Mutex::new(response),
            gate: None,
        }
    }

    pub(super) fn gated(
        response: Result<RawPredictionResponse, TransportError>,
        gate: Arc<Notify>,
    ) -> Self {
        Self {
            gate: Some(gate),
            ..Self::answering(response)
        }
    }

    pub(super) fn respond_with(&self, response: Result<RawPredictionResponse, TransportError>) {
        *self.response.lock().expect("gateway mutex poisoned") = response;
    }

    pub(super) fn calls(&self) -> usize {
        self.bundles.lock().expect("gateway mutex poisoned").len()
    }

    pub(super) fn bundles(&self) -> Vec<ObservationBundle> {
        self.bundles.lock().expect("gateway mutex poisoned").clone()
    }
}

impl PredictionGateway for RecordingGateway {
    fn submit(
        &self,
        bundle: ObservationBundle,
    ) -> BoxFuture<'_, Result<RawPredictionResponse, TransportError>> {
        self.bundles
            .lock()
            .expect("gateway mutex poisoned")
            .push(bundle);
        let response = self.response.lock().expect("gateway mutex poisoned").clone();
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            response
        }
        .boxed()
    }
}
