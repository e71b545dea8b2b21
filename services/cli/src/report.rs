use std::sync::Arc;

use clap::Args;
use hospitalization_predictor::error::AppError;
use hospitalization_predictor::i18n::{keys, Language};
use hospitalization_predictor::workflows::reporting::{
    ReportForm, ReportingSettings, ReportingWorkflow, SendOutcome, SimulatedReportGateway,
};

use crate::infra::Session;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Provider (INAMI/RIZIV) number of the reporting caregiver
    #[arg(long)]
    pub(crate) provider_number: String,
    /// Country of practice, ISO 3166 alpha-2. Defaults to BE.
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Display language for this run (fr or en). Defaults to the saved preference.
    #[arg(long, value_parser = crate::infra::parse_language)]
    pub(crate) lang: Option<Language>,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        provider_number,
        country,
        lang,
    } = args;

    let session = Session::start()?;
    let translator = session.translator(lang);
    let gateway = SimulatedReportGateway::new(session.config.timings.report_latency());
    let workflow = ReportingWorkflow::new(
        Arc::new(gateway),
        Arc::clone(&translator),
        ReportingSettings::from(&session.config),
    );

    let form = ReportForm {
        provider_number,
        country,
    };
    let ticket = match workflow.send(&form) {
        SendOutcome::Started(ticket) => ticket,
        SendOutcome::Invalid(err) => {
            return Err(AppError::Workflow(err.message(translator.as_ref())));
        }
        SendOutcome::SubmissionInFlight => {
            return Err(AppError::Workflow(translator.translate(keys::REPORT_BLOCKED)));
        }
        SendOutcome::AlreadySending => {
            return Err(AppError::Workflow(
                "a disagreement report is already being sent".to_string(),
            ));
        }
    };

    let delivery = ticket.finished().await;
    let snapshot = workflow.snapshot();
    match delivery {
        Ok(()) => {
            if let Some(message) = snapshot.success_message {
                println!("{message}");
            }
            Ok(())
        }
        Err(err) => Err(AppError::Workflow(
            snapshot.error_message.unwrap_or_else(|| err.to_string()),
        )),
    }
}
