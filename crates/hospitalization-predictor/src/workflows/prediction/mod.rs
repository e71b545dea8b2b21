//! Prediction submission pipeline: validate the assessment form, encode the
//! observation bundle, call the prediction service and interpret its answer,
//! with [`SubmissionStateMachine`] tying the steps into an observable lifecycle.

pub mod domain;
pub mod encoding;
pub mod gateway;
pub mod interpret;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentField, AssessmentForm, FieldValue, RiskFactor, SexCode, Symptom, ValidatedAssessment,
};
pub use encoding::{
    Coding, CodeableConcept, Observation, ObservationBundle, PayloadEncoder, Quantity,
    SubjectRecord, SubjectReference, VocabularyEmission, CODING_SYSTEM,
    DEFAULT_SUBJECT_REFERENCE,
};
pub use gateway::{
    OutcomeCoding, OutcomeConcept, PredictionEntry, PredictionEnvelope, PredictionGateway,
    RawPredictionResponse, TransportError, UreqPredictionClient,
};
pub use interpret::{
    format_probability, interpret, ModelMethod, ModelPrediction, ModelPredictionView,
    PredictionResult, PredictionView, ResponseError,
};
pub use submission::{
    SubmissionError, SubmissionSettings, SubmissionSnapshot, SubmissionState,
    SubmissionStateMachine, SubmissionTicket, SubmitOutcome,
};
pub use validation::{
    step_aligned, NumericRule, ValidationEngine, ValidationErrorKind, ValidationErrors,
    STEP_EPSILON,
};
