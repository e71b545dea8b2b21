mod assess;
mod cli;
mod infra;
mod prefs;
mod report;

use hospitalization_predictor::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
