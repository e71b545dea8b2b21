use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use hospitalization_predictor::error::AppError;
use hospitalization_predictor::i18n::{keys, Language, Translate};
use hospitalization_predictor::workflows::prediction::{
    AssessmentForm, PredictionView, SubmissionError, SubmissionSettings, SubmissionState,
    SubmissionStateMachine, SubmitOutcome, UreqPredictionClient, ValidationErrors,
};
use tracing::info;

use crate::infra::{field_messages, read_form, Session};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file holding the assessment form
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Display language for this run (fr or en). Defaults to the saved preference.
    #[arg(long, value_parser = crate::infra::parse_language)]
    pub(crate) lang: Option<Language>,
    /// Validate and print the encoded bundle without calling the service
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Include per-model probabilities in the output
    #[arg(long)]
    pub(crate) details: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EncodeArgs {
    /// JSON file holding the assessment form
    #[arg(long)]
    pub(crate) input: PathBuf,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        input,
        lang,
        dry_run,
        details,
    } = args;

    let session = Session::start()?;
    let translator = session.translator(lang);
    let form = read_form(&input)?;
    let settings = SubmissionSettings::from(&session.config);

    if dry_run {
        return print_bundle(&settings, &form, translator.as_ref());
    }

    let client = Arc::new(UreqPredictionClient::new(&session.config.prediction));
    info!(endpoint = client.endpoint(), "requesting hospitalization prediction");
    let machine = SubmissionStateMachine::new(client, Arc::clone(&translator), settings);

    let ticket = match machine.submit(&form) {
        SubmitOutcome::Started(ticket) => ticket,
        SubmitOutcome::Invalid(errors) => {
            return Err(validation_failure(&errors, translator.as_ref()));
        }
        SubmitOutcome::AlreadySubmitting => {
            return Err(AppError::Workflow(
                "a prediction request is already running".to_string(),
            ));
        }
    };

    let state = ticket
        .finished()
        .await
        .map_err(|err| AppError::Workflow(format!("prediction task failed: {err}")))?;
    let snapshot = machine.snapshot();

    match (state, snapshot.result) {
        (SubmissionState::Success, Some(result)) => {
            let view = result.view(translator.as_ref());
            for line in render_prediction(&view, translator.as_ref(), details) {
                println!("{line}");
            }
            Ok(())
        }
        _ => Err(AppError::Workflow(
            snapshot
                .error_message
                .unwrap_or_else(|| translator.translate(keys::ERROR_UNKNOWN)),
        )),
    }
}

pub(crate) fn run_encode(args: EncodeArgs) -> Result<(), AppError> {
    let session = Session::start()?;
    let translator = session.translator(None);
    let form = read_form(&args.input)?;
    let settings = SubmissionSettings::from(&session.config);
    print_bundle(&settings, &form, translator.as_ref())
}

fn print_bundle(
    settings: &SubmissionSettings,
    form: &AssessmentForm,
    translator: &dyn Translate,
) -> Result<(), AppError> {
    let assessment = settings
        .engine
        .validate(form)
        .map_err(|errors| validation_failure(&errors, translator))?;
    let bundle = settings.encoder.encode_now(&assessment);
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}

fn validation_failure(errors: &ValidationErrors, translator: &dyn Translate) -> AppError {
    for line in field_messages(errors, translator) {
        eprintln!("- {line}");
    }
    AppError::Workflow(SubmissionError::from(errors.clone()).display_message(translator))
}

pub(crate) fn render_prediction(
    view: &PredictionView,
    translator: &dyn Translate,
    details: bool,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {}",
        translator.translate(keys::SUMMARY),
        view.summary
    )];
    if details {
        let ambulatory = translator.translate(keys::AMBULATORY);
        let hospitalization = translator.translate(keys::HOSPITALIZATION);
        lines.extend(view.details.iter().map(|model| {
            format!(
                "- {}: {ambulatory} {} | {hospitalization} {}",
                model.method, model.ambulatory, model.hospitalization
            )
        }));
    }
    lines
}
