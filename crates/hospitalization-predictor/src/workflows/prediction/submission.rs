use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::domain::{AssessmentForm, ValidatedAssessment};
use super::encoding::{ObservationBundle, PayloadEncoder};
use super::gateway::{PredictionGateway, TransportError};
use super::interpret::{interpret, PredictionResult, ResponseError};
use super::validation::{ValidationEngine, ValidationErrors};
use crate::config::PredictorConfig;
use crate::i18n::{keys, Translate};
use crate::workflows::banner::BannerTimer;

/// Lifecycle of the prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

impl SubmissionState {
    pub const fn submit_label_key(self) -> &'static str {
        match self {
            Self::Submitting => keys::SUBMITTING,
            _ => keys::SUBMIT,
        }
    }
}

/// Everything a rendering layer needs to draw the submission area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionSnapshot {
    pub state: SubmissionState,
    pub result: Option<PredictionResult>,
    pub error_message: Option<String>,
    pub show_validation_errors: bool,
    pub scroll_to_results: bool,
    pub submit_label: String,
}

impl SubmissionSnapshot {
    fn idle(translator: &dyn Translate) -> Self {
        Self {
            state: SubmissionState::Idle,
            result: None,
            error_message: None,
            show_validation_errors: false,
            scroll_to_results: false,
            submit_label: translator.translate(keys::SUBMIT),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub engine: ValidationEngine,
    pub encoder: PayloadEncoder,
    pub error_banner: Duration,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            engine: ValidationEngine::default(),
            encoder: PayloadEncoder::default(),
            error_banner: Duration::from_secs(10),
        }
    }
}

impl From<&PredictorConfig> for SubmissionSettings {
    fn from(config: &PredictorConfig) -> Self {
        Self {
            engine: ValidationEngine::default(),
            encoder: PayloadEncoder::from_config(&config.encoding),
            error_banner: config.timings.error_banner(),
        }
    }
}

/// Failure surfaced by a submission attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Network(TransportError),
    #[error("prediction response could not be interpreted")]
    MalformedResponse,
    #[error("prediction service reported a failure")]
    Service { message: Option<String> },
}

impl From<TransportError> for SubmissionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Decode(_) => SubmissionError::MalformedResponse,
            other => SubmissionError::Network(other),
        }
    }
}

impl From<ResponseError> for SubmissionError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::MalformedResponse => SubmissionError::MalformedResponse,
            ResponseError::Service { message } => SubmissionError::Service { message },
        }
    }
}

impl SubmissionError {
    /// Banner text for the caregiver.
    pub fn display_message(&self, translator: &dyn Translate) -> String {
        match self {
            SubmissionError::Validation(errors) => errors
                .missing_fields_message(translator)
                .unwrap_or_else(|| translator.translate(keys::FORM_INVALID)),
            SubmissionError::Network(TransportError::Status {
                message: Some(message),
                ..
            }) => message.clone(),
            SubmissionError::Network(TransportError::Status {
                status,
                message: None,
            }) => translator
                .translate(keys::ERROR_HTTP_STATUS)
                .replace("{status}", &status.to_string()),
            SubmissionError::Network(_) => translator.translate(keys::ERROR_NETWORK),
            SubmissionError::MalformedResponse => {
                translator.translate(keys::ERROR_INVALID_RESPONSE)
            }
            SubmissionError::Service {
                message: Some(message),
            } => message.clone(),
            SubmissionError::Service { message: None } => {
                translator.translate(keys::ERROR_UNKNOWN)
            }
        }
    }
}

/// Result of a call to [`SubmissionStateMachine::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    Started(SubmissionTicket),
    Invalid(ValidationErrors),
    AlreadySubmitting,
}

/// Handle on the spawned request; awaiting it is optional.
#[derive(Debug)]
pub struct SubmissionTicket {
    handle: JoinHandle<SubmissionState>,
}

impl SubmissionTicket {
    pub async fn finished(self) -> Result<SubmissionState, JoinError> {
        self.handle.await
    }
}

/// Drives validate, encode, submit and interpret, publishing each transition.
pub struct SubmissionStateMachine<G> {
    shared: Arc<Shared<G>>,
}

struct Shared<G> {
    gateway: Arc<G>,
    translator: Arc<dyn Translate>,
    settings: SubmissionSettings,
    snapshot: Mutex<SubmissionSnapshot>,
    publisher: watch::Sender<SubmissionSnapshot>,
    error_timer: BannerTimer,
}

impl<G> SubmissionStateMachine<G>
where
    G: PredictionGateway + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        translator: Arc<dyn Translate>,
        settings: SubmissionSettings,
    ) -> Self {
        let initial = SubmissionSnapshot::idle(translator.as_ref());
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            shared: Arc::new(Shared {
                gateway,
                translator,
                settings,
                snapshot: Mutex::new(initial),
                publisher,
                error_timer: BannerTimer::default(),
            }),
        }
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        self.shared.lock().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionSnapshot> {
        self.shared.publisher.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.shared.lock().is_submitting()
    }

    /// Run the form through the configured rules without touching state.
    pub fn validate(
        &self,
        form: &AssessmentForm,
    ) -> Result<ValidatedAssessment, ValidationErrors> {
        self.shared.settings.engine.validate(form)
    }

    /// Start a prediction request. Must be called inside a tokio runtime.
    pub fn submit(&self, form: &AssessmentForm) -> SubmitOutcome {
        let validated = self.validate(form);
        let mut snapshot = self.shared.lock();

        if snapshot.is_submitting() {
            if validated.is_err() && !snapshot.show_validation_errors {
                snapshot.show_validation_errors = true;
                self.shared.publish(&snapshot);
            }
            debug!("submission ignored while a request is in flight");
            return SubmitOutcome::AlreadySubmitting;
        }

        let assessment = match validated {
            Ok(assessment) => assessment,
            Err(errors) => {
                snapshot.show_validation_errors = true;
                self.shared.publish(&snapshot);
                info!(invalid_fields = errors.len(), "assessment rejected by validation");
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.shared.error_timer.disarm();
        snapshot.state = SubmissionState::Submitting;
        snapshot.result = None;
        snapshot.error_message = None;
        snapshot.scroll_to_results = false;
        snapshot.show_validation_errors = false;
        snapshot.submit_label = self.shared.label(SubmissionState::Submitting);
        self.shared.publish(&snapshot);
        drop(snapshot);

        let bundle = self.shared.settings.encoder.encode_now(&assessment);
        info!(
            observations = bundle.observations().count(),
            "prediction submission started"
        );

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move { shared.run(bundle).await });
        SubmitOutcome::Started(SubmissionTicket { handle })
    }

    /// Back to idle, dropping result, error and validation display. Ignored
    /// while a request is in flight.
    pub fn reset(&self) -> bool {
        let mut snapshot = self.shared.lock();
        if snapshot.is_submitting() {
            debug!("reset ignored while a request is in flight");
            return false;
        }
        self.shared.error_timer.disarm();
        *snapshot = SubmissionSnapshot::idle(self.shared.translator.as_ref());
        self.shared.publish(&snapshot);
        true
    }
}

impl<G> Shared<G>
where
    G: PredictionGateway + 'static,
{
    fn lock(&self) -> std::sync::MutexGuard<'_, SubmissionSnapshot> {
        self.snapshot.lock().expect("submission state mutex poisoned")
    }

    fn publish(&self, snapshot: &SubmissionSnapshot) {
        self.publisher.send_replace(snapshot.clone());
    }

    fn label(&self, state: SubmissionState) -> String {
        self.translator.translate(state.submit_label_key())
    }

    async fn run(self: Arc<Self>, bundle: ObservationBundle) -> SubmissionState {
        let outcome = match self.gateway.submit(bundle).await {
            Ok(raw) => interpret(&raw).map_err(SubmissionError::from),
            Err(err) => Err(SubmissionError::from(err)),
        };
        self.resolve(outcome)
    }

    fn resolve(
        self: &Arc<Self>,
        outcome: Result<PredictionResult, SubmissionError>,
    ) -> SubmissionState {
        let mut snapshot = self.lock();
        match outcome {
            Ok(result) => {
                info!(summary = %result.formatted_summary(), "prediction received");
                snapshot.state = SubmissionState::Success;
                snapshot.result = Some(result);
                snapshot.error_message = None;
                snapshot.scroll_to_results = true;
            }
            Err(err) => {
                warn!(error = %err, "prediction submission failed");
                snapshot.state = SubmissionState::Failed;
                snapshot.result = None;
                snapshot.error_message = Some(err.display_message(self.translator.as_ref()));
                self.schedule_error_clear();
            }
        }
        snapshot.submit_label = self.label(snapshot.state);
        self.publish(&snapshot);
        snapshot.state
    }

    /// Caller holds the snapshot lock.
    fn schedule_error_clear(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.error_timer.arm(self.settings.error_banner, move |generation| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut snapshot = shared.lock();
            if shared.error_timer.is_current(generation) && snapshot.error_message.is_some() {
                snapshot.error_message = None;
                shared.publish(&snapshot);
                debug!("error banner cleared");
            }
        });
    }
}
