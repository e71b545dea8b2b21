use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::domain::{DisagreementReport, ReportForm, ReportValidationError};
use super::gateway::ReportGateway;
use crate::config::PredictorConfig;
use crate::i18n::{keys, Translate};
use crate::workflows::banner::BannerTimer;
use crate::workflows::prediction::{SubmissionError, SubmissionSnapshot, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingState {
    #[default]
    Idle,
    Sending,
}

impl ReportingState {
    pub const fn send_label_key(self) -> &'static str {
        match self {
            Self::Idle => keys::SEND,
            Self::Sending => keys::SENDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingSnapshot {
    pub state: ReportingState,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub show_field_errors: bool,
    pub send_label: String,
}

impl ReportingSnapshot {
    fn idle(translator: &dyn Translate) -> Self {
        Self {
            state: ReportingState::Idle,
            success_message: None,
            error_message: None,
            show_field_errors: false,
            send_label: translator.translate(keys::SEND),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.state == ReportingState::Sending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingSettings {
    pub success_banner: Duration,
    pub error_banner: Duration,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            success_banner: Duration::from_millis(3_000),
            error_banner: Duration::from_millis(10_000),
        }
    }
}

impl From<&PredictorConfig> for ReportingSettings {
    fn from(config: &PredictorConfig) -> Self {
        Self {
            success_banner: config.timings.report_banner(),
            error_banner: config.timings.error_banner(),
        }
    }
}

#[derive(Debug)]
pub enum SendOutcome {
    Started(ReportTicket),
    Invalid(ReportValidationError),
    AlreadySending,
    SubmissionInFlight,
}

#[derive(Debug)]
pub struct ReportTicket {
    handle: JoinHandle<Result<(), TransportError>>,
}

impl ReportTicket {
    pub async fn finished(self) -> Result<(), TransportError> {
        self.handle
            .await
            .map_err(|err| TransportError::Network(format!("report task failed: {err}")))?
    }
}

/// Idle/Sending lifecycle around a [`ReportGateway`], optionally blocked
/// while a prediction request is running.
pub struct ReportingWorkflow<G> {
    shared: Arc<Shared<G>>,
    submissions: Option<watch::Receiver<SubmissionSnapshot>>,
}

struct Shared<G> {
    gateway: Arc<G>,
    translator: Arc<dyn Translate>,
    settings: ReportingSettings,
    snapshot: Mutex<ReportingSnapshot>,
    publisher: watch::Sender<ReportingSnapshot>,
    success_timer: BannerTimer,
    error_timer: BannerTimer,
}

#[derive(Debug, Clone, Copy)]
enum Banner {
    Success,
    Error,
}

impl<G> ReportingWorkflow<G>
where
    G: ReportGateway + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        translator: Arc<dyn Translate>,
        settings: ReportingSettings,
    ) -> Self {
        let initial = ReportingSnapshot::idle(translator.as_ref());
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            shared: Arc::new(Shared {
                gateway,
                translator,
                settings,
                snapshot: Mutex::new(initial),
                publisher,
                success_timer: BannerTimer::default(),
                error_timer: BannerTimer::default(),
            }),
            submissions: None,
        }
    }

    /// Refuse to send while the observed submission is in flight.
    pub fn guarded_by(mut self, submissions: watch::Receiver<SubmissionSnapshot>) -> Self {
        self.submissions = Some(submissions);
        self
    }

    pub fn snapshot(&self) -> ReportingSnapshot {
        self.shared.lock().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReportingSnapshot> {
        self.shared.publisher.subscribe()
    }

    pub fn is_sending(&self) -> bool {
        self.shared.lock().is_sending()
    }

    /// Validate and dispatch a report. Must be called inside a tokio runtime.
    pub fn send(&self, form: &ReportForm) -> SendOutcome {
        let validated = DisagreementReport::from_form(form);
        let mut snapshot = self.shared.lock();

        if snapshot.is_sending() {
            debug!("report ignored while another one is being sent");
            return SendOutcome::AlreadySending;
        }

        let report = match validated {
            Ok(report) => report,
            Err(err) => {
                snapshot.show_field_errors = true;
                self.shared.publish(&snapshot);
                info!(reason = %err, "disagreement report rejected");
                return SendOutcome::Invalid(err);
            }
        };

        if self.prediction_in_flight() {
            snapshot.error_message = Some(self.shared.translator.translate(keys::REPORT_BLOCKED));
            self.shared.schedule_clear(Banner::Error);
            self.shared.publish(&snapshot);
            info!("disagreement report blocked by running prediction");
            return SendOutcome::SubmissionInFlight;
        }

        self.shared.success_timer.disarm();
        self.shared.error_timer.disarm();
        snapshot.state = ReportingState::Sending;
        snapshot.success_message = None;
        snapshot.error_message = None;
        snapshot.send_label = self.shared.label(ReportingState::Sending);
        self.shared.publish(&snapshot);
        drop(snapshot);

        info!(country = report.country(), "sending disagreement report");
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move { shared.deliver(report).await });
        SendOutcome::Started(ReportTicket { handle })
    }

    fn prediction_in_flight(&self) -> bool {
        self.submissions
            .as_ref()
            .is_some_and(|submissions| submissions.borrow().is_submitting())
    }
}

impl<G> Shared<G>
where
    G: ReportGateway + 'static,
{
    fn lock(&self) -> MutexGuard<'_, ReportingSnapshot> {
        self.snapshot.lock().expect("reporting state mutex poisoned")
    }

    fn publish(&self, snapshot: &ReportingSnapshot) {
        self.publisher.send_replace(snapshot.clone());
    }

    fn label(&self, state: ReportingState) -> String {
        self.translator.translate(state.send_label_key())
    }

    async fn deliver(self: Arc<Self>, report: DisagreementReport) -> Result<(), TransportError> {
        let delivery = self.gateway.send(report).await;

        let mut snapshot = self.lock();
        snapshot.state = ReportingState::Idle;
        snapshot.send_label = self.label(ReportingState::Idle);
        match &delivery {
            Ok(()) => {
                snapshot.success_message = Some(self.translator.translate(keys::REPORT_SUCCESS));
                snapshot.show_field_errors = false;
                self.schedule_clear(Banner::Success);
            }
            Err(err) => {
                warn!(error = %err, "disagreement report failed");
                let message =
                    SubmissionError::from(err.clone()).display_message(self.translator.as_ref());
                snapshot.error_message = Some(message);
                self.schedule_clear(Banner::Error);
            }
        }
        self.publish(&snapshot);
        delivery
    }

    /// Caller holds the snapshot lock.
    fn schedule_clear(self: &Arc<Self>, banner: Banner) {
        let (timer, after) = match banner {
            Banner::Success => (&self.success_timer, self.settings.success_banner),
            Banner::Error => (&self.error_timer, self.settings.error_banner),
        };
        let weak: Weak<Self> = Arc::downgrade(self);
        timer.arm(after, move |generation| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut snapshot = shared.lock();
            let (timer, message) = match banner {
                Banner::Success => (&shared.success_timer, &mut snapshot.success_message),
                Banner::Error => (&shared.error_timer, &mut snapshot.error_message),
            };
            if timer.is_current(generation) && message.take().is_some() {
                shared.publish(&snapshot);
                debug!(?banner, "reporting banner cleared");
            }
        });
    }
}
